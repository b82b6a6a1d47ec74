#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::time::Duration;

use nix::unistd::{Group, User, getgid, getuid};
use sickrc::Settings;

/// Settings rooted in a scratch tree, running the daemon as the current
/// user with /bin/sh standing in for the Python interpreter.
pub fn test_settings(root: &Path) -> Settings {
    let user = User::from_uid(getuid()).unwrap().unwrap();
    let group = Group::from_gid(getgid()).unwrap().unwrap();
    Settings {
        enable: "YES".to_string(),
        user: user.name,
        group: group.name,
        dir: root.join("sickrage"),
        datadir: Some(root.join("data")),
        interpreter: "/bin/sh".into(),
        pidfile: root.join("run/PyMedusa/SickRage.pid"),
        stop_timeout: Duration::from_secs(10),
    }
}

/// A stand-in SickBeard.py: a shell script that backgrounds a sleeping
/// process and records its pid, like the real daemon's `-d` mode.
pub fn install_fake_daemon(settings: &Settings) {
    fs::create_dir_all(&settings.dir).unwrap();
    let script = "\
pidfile=\"\"\n\
while [ $# -gt 0 ]; do\n\
    case \"$1\" in\n\
    --pidfile) pidfile=\"$2\"; shift 2 ;;\n\
    *) shift ;;\n\
    esac\n\
done\n\
sleep 30 >/dev/null 2>&1 &\n\
echo $! > \"$pidfile\"\n";
    fs::write(settings.script(), script).unwrap();
}
