use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

/// Handle on the daemon's pid file. The daemon writes it at startup; the
/// service manager only ever reads it and removes stale leftovers.
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        PidFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The recorded pid, or `None` when no pid file exists. A file that does
    /// not hold a pid is an error naming the path.
    pub fn read(&self) -> Result<Option<Pid>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read pid file {}", self.path.display()));
            }
        };
        let pid: i32 = content
            .trim()
            .parse()
            .with_context(|| format!("pid file {} does not hold a pid", self.path.display()))?;
        if pid <= 0 {
            bail!("pid file {} holds invalid pid {}", self.path.display(), pid);
        }
        Ok(Some(Pid::from_raw(pid)))
    }

    /// The recorded pid if that process still exists.
    pub fn live_pid(&self) -> Result<Option<Pid>> {
        match self.read()? {
            Some(pid) if process_exists(pid) => Ok(Some(pid)),
            _ => Ok(None),
        }
    }

    /// Remove the pid file iff it does not name a live process. A pid file
    /// that cannot be parsed cannot name a live daemon and is removed too.
    /// Returns whether a file was removed.
    pub fn remove_stale(&self) -> Result<bool> {
        let pid = match self.read() {
            Ok(None) => return Ok(false),
            Ok(Some(pid)) => Some(pid),
            Err(e) => {
                tracing::warn!("unreadable pid file treated as stale: {e:#}");
                None
            }
        };
        if let Some(pid) = pid
            && process_exists(pid)
        {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("failed to remove stale pid file {}", self.path.display()))?;
        tracing::debug!("removed stale pid file {}", self.path.display());
        Ok(true)
    }
}

/// Signal-0 probe. EPERM means the process exists but belongs to someone
/// else, which still counts as running.
pub fn process_exists(pid: Pid) -> bool {
    match kill(pid, None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}
