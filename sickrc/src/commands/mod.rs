use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

use crate::pidfile::{PidFile, process_exists};
use crate::settings::Settings;
use crate::sysdir::{self, Owner};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long `start` waits for the daemon to write its pid file.
pub const PIDFILE_WAIT: Duration = Duration::from_secs(10);

/// Pre-start checks, mirroring the rc script's precmd:
/// a stale pid file is removed; otherwise the pid file's parent directory is
/// created for the service user; the data directory is created either way.
pub fn prestart(settings: &Settings) -> Result<()> {
    let owner = sysdir::resolve_owner(&settings.user, &settings.group)?;
    let pidfile = PidFile::new(&settings.pidfile);

    if pidfile.path().exists() {
        if pidfile.remove_stale()? {
            tracing::info!("removed stale pid file {}", pidfile.path().display());
        }
    } else if let Some(parent) = pidfile.path().parent() {
        sysdir::ensure_owned_dir(parent, owner)?;
    }

    sysdir::ensure_owned_dir(settings.datadir(), owner)?;
    Ok(())
}

/// Launch the daemon as the service user. The daemon detaches itself (`-d`)
/// and writes the pid file, so the spawned interpreter is expected to return
/// promptly once the fork is done.
pub fn spawn(settings: &Settings, owner: Owner) -> Result<()> {
    let mut command = Command::new(&settings.interpreter);
    command
        .args(settings.launch_args())
        .current_dir(&settings.dir)
        .uid(owner.uid.as_raw())
        .gid(owner.gid.as_raw())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    tracing::debug!(
        "launching {} as {}:{}",
        settings.interpreter.display(),
        owner.uid,
        owner.gid
    );
    let status = command
        .status()
        .with_context(|| format!("failed to run {}", settings.interpreter.display()))?;
    if !status.success() {
        bail!("daemon exited with {status} during startup");
    }
    Ok(())
}

/// Wait for the daemon to come up and record itself in the pid file.
pub fn wait_for_pidfile(pidfile: &PidFile, timeout: Duration) -> Result<Pid> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(pid) = pidfile.live_pid()? {
            return Ok(pid);
        }
        if Instant::now() >= deadline {
            bail!(
                "daemon did not write {} within {}s",
                pidfile.path().display(),
                timeout.as_secs()
            );
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// SIGTERM the daemon and poll until it is gone. No SIGKILL escalation; a
/// daemon that ignores the timeout is reported instead.
pub fn terminate(pid: Pid, timeout: Duration) -> Result<()> {
    kill(pid, Signal::SIGTERM).with_context(|| format!("failed to signal pid {pid}"))?;
    let deadline = Instant::now() + timeout;
    while process_exists(pid) {
        if Instant::now() >= deadline {
            bail!("pid {pid} did not exit within {}s", timeout.as_secs());
        }
        thread::sleep(POLL_INTERVAL);
    }
    tracing::debug!("pid {pid} exited");
    Ok(())
}
