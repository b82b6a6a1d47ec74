use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// The service manager tracks the daemon through this path; the daemon is
/// told to write it via `--pidfile`.
pub const DEFAULT_PIDFILE: &str = "/var/run/PyMedusa/SickRage.pid";
pub const DEFAULT_DIR: &str = "/usr/local/sickrage";
pub const DEFAULT_USER: &str = "sickrage";
pub const DEFAULT_GROUP: &str = "sickrage";
pub const DEFAULT_INTERPRETER: &str = "/usr/local/bin/python2.7";
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(30);

/// Effective rc configuration for the daemon, assembled from defaults,
/// an optional YAML settings file and `sickrage_*` environment variables,
/// in that order.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Raw value of `sickrage_enable`; parsed on demand by [`Settings::enabled`].
    pub enable: String,
    pub user: String,
    pub group: String,
    pub dir: PathBuf,
    /// `None` means "follow `dir`", the rc default.
    pub datadir: Option<PathBuf>,
    pub interpreter: PathBuf,
    pub pidfile: PathBuf,
    pub stop_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enable: "NO".to_string(),
            user: DEFAULT_USER.to_string(),
            group: DEFAULT_GROUP.to_string(),
            dir: PathBuf::from(DEFAULT_DIR),
            datadir: None,
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            pidfile: PathBuf::from(DEFAULT_PIDFILE),
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

/// Optional YAML settings file; every field falls back to the rc defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub enable: Option<String>,
    pub user: Option<String>,
    pub group: Option<String>,
    pub dir: Option<PathBuf>,
    pub datadir: Option<PathBuf>,
    pub interpreter: Option<PathBuf>,
    pub pidfile: Option<PathBuf>,
    pub stop_timeout_secs: Option<u64>,
}

pub fn load_settings_file(path: &Path) -> Result<SettingsFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    let file: SettingsFile = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse YAML settings {}", path.display()))?;
    Ok(file)
}

impl Settings {
    /// Defaults, then the settings file (when given), then the environment.
    pub fn load(config: Option<&Path>) -> Result<Self> {
        let mut settings = Settings::default();
        if let Some(path) = config {
            settings.apply_file(load_settings_file(path)?);
        }
        settings.overlay_env()?;
        settings.validate()?;
        Ok(settings)
    }

    fn apply_file(&mut self, file: SettingsFile) {
        if let Some(enable) = file.enable {
            self.enable = enable;
        }
        if let Some(user) = file.user {
            self.user = user;
        }
        if let Some(group) = file.group {
            self.group = group;
        }
        if let Some(dir) = file.dir {
            self.dir = dir;
        }
        if let Some(datadir) = file.datadir {
            self.datadir = Some(datadir);
        }
        if let Some(interpreter) = file.interpreter {
            self.interpreter = interpreter;
        }
        if let Some(pidfile) = file.pidfile {
            self.pidfile = pidfile;
        }
        if let Some(secs) = file.stop_timeout_secs {
            self.stop_timeout = Duration::from_secs(secs);
        }
    }

    /// Overlay the `sickrage_*` rc variables from the process environment.
    /// The pidfile path is fixed and deliberately has no variable.
    fn overlay_env(&mut self) -> Result<()> {
        if let Ok(enable) = env::var("sickrage_enable") {
            self.enable = enable;
        }
        if let Ok(user) = env::var("sickrage_user") {
            self.user = user;
        }
        if let Ok(group) = env::var("sickrage_group") {
            self.group = group;
        }
        if let Ok(dir) = env::var("sickrage_dir") {
            self.dir = PathBuf::from(dir);
        }
        if let Ok(datadir) = env::var("sickrage_datadir") {
            self.datadir = Some(PathBuf::from(datadir));
        }
        if let Ok(interp) = env::var("sickrage_interp") {
            self.interpreter = PathBuf::from(interp);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.user.is_empty() || self.group.is_empty() {
            bail!("sickrage_user and sickrage_group must not be empty");
        }
        if self.dir.as_os_str().is_empty() {
            bail!("sickrage_dir must not be empty");
        }
        if let Some(datadir) = &self.datadir
            && datadir.as_os_str().is_empty()
        {
            bail!("sickrage_datadir must not be empty; unset it to follow sickrage_dir");
        }
        Ok(())
    }

    /// Whether `sickrage_enable` allows a plain `start`.
    pub fn enabled(&self) -> Result<bool> {
        checkyesno("sickrage_enable", &self.enable)
    }

    /// Data directory, defaulting to the install directory when unset.
    pub fn datadir(&self) -> &Path {
        self.datadir.as_deref().unwrap_or(&self.dir)
    }

    /// Entry-point script handed to the interpreter.
    pub fn script(&self) -> PathBuf {
        self.dir.join("SickBeard.py")
    }

    /// The fixed launch arguments: data directory, self-daemonize, pidfile,
    /// quiet, and no browser launch.
    pub fn launch_args(&self) -> Vec<String> {
        vec![
            self.script().display().to_string(),
            "--datadir".to_string(),
            self.datadir().display().to_string(),
            "-d".to_string(),
            "--pidfile".to_string(),
            self.pidfile.display().to_string(),
            "-q".to_string(),
            "--nolaunch".to_string(),
        ]
    }
}

/// rc `checkyesno` semantics. Unknown values are an error so a typo in the
/// enable variable never silently disables the service.
pub fn checkyesno(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" | "1" => Ok(true),
        "no" | "false" | "off" | "0" => Ok(false),
        other => bail!("{name} is not set properly: {other}"),
    }
}
