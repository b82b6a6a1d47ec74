use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::commands;
use crate::pidfile::PidFile;
use crate::settings::Settings;
use crate::sysdir;

/// Start the daemon. Plain `start` honors `sickrage_enable`; `force` is the
/// rc `onestart` escape hatch.
pub fn start_daemon(settings: &Settings, force: bool) -> Result<()> {
    if !force && !settings.enabled()? {
        bail!("sickrage is not enabled; set sickrage_enable=YES or use `start --force`");
    }

    let pidfile = PidFile::new(&settings.pidfile);
    if let Some(pid) = pidfile.live_pid()? {
        bail!("sickrage is already running as pid {pid}");
    }

    commands::prestart(settings)?;
    let owner = sysdir::resolve_owner(&settings.user, &settings.group)?;
    commands::spawn(settings, owner)?;
    let pid = commands::wait_for_pidfile(&pidfile, commands::PIDFILE_WAIT)?;
    println!("sickrage started with pid {pid}");
    Ok(())
}

pub fn stop_daemon(settings: &Settings) -> Result<()> {
    let pidfile = PidFile::new(&settings.pidfile);
    let Some(pid) = pidfile.live_pid()? else {
        bail!("sickrage is not running");
    };

    commands::terminate(pid, settings.stop_timeout)?;
    // the daemon removes its own pid file on clean exit; clear any leftover
    pidfile.remove_stale()?;
    println!("sickrage stopped");
    Ok(())
}

/// Stop (tolerating an already-stopped daemon), then start.
pub fn restart_daemon(settings: &Settings, force: bool) -> Result<()> {
    let pidfile = PidFile::new(&settings.pidfile);
    if let Some(pid) = pidfile.live_pid()? {
        commands::terminate(pid, settings.stop_timeout)?;
        pidfile.remove_stale()?;
        println!("sickrage stopped");
    }
    start_daemon(settings, force)
}

#[derive(Debug, Serialize)]
pub struct DaemonState {
    pub name: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<i32>,
    pub pidfile: String,
    /// When running: the pid file's modification time, i.e. the last start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

impl DaemonState {
    pub fn probe(settings: &Settings) -> Result<Self> {
        let pidfile = PidFile::new(&settings.pidfile);
        let state = match pidfile.live_pid()? {
            Some(pid) => DaemonState {
                name: "sickrage",
                status: "running",
                pid: Some(pid.as_raw()),
                pidfile: settings.pidfile.display().to_string(),
                since: started_at(&settings.pidfile)?,
            },
            None => DaemonState {
                name: "sickrage",
                status: "stopped",
                pid: None,
                pidfile: settings.pidfile.display().to_string(),
                since: None,
            },
        };
        Ok(state)
    }
}

fn started_at(pidfile: &Path) -> Result<Option<String>> {
    let modified = fs::metadata(pidfile)
        .and_then(|m| m.modified())
        .with_context(|| format!("failed to stat {}", pidfile.display()))?;
    let local: DateTime<Local> = DateTime::from(modified);
    Ok(Some(local.to_rfc3339_opts(chrono::SecondsFormat::Secs, false)))
}

pub fn status_daemon(settings: &Settings) -> Result<()> {
    let state = DaemonState::probe(settings)?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

/// The rc `rcvar` verb: print the enable variable in rc.conf notation.
pub fn rcvar(settings: &Settings) -> Result<()> {
    println!("sickrage_enable=\"{}\"", settings.enable);
    Ok(())
}
