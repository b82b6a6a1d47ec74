use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use nix::unistd::{Gid, Group, Uid, User, chown};

/// Resolved identity the daemon runs as and its directories belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub uid: Uid,
    pub gid: Gid,
}

/// Resolve rc user/group names through the system databases.
pub fn resolve_owner(user: &str, group: &str) -> Result<Owner> {
    let user = User::from_name(user)
        .with_context(|| format!("failed to look up user {user}"))?
        .ok_or_else(|| anyhow!("unknown user: {user}"))?;
    let group = Group::from_name(group)
        .with_context(|| format!("failed to look up group {group}"))?
        .ok_or_else(|| anyhow!("unknown group: {group}"))?;
    Ok(Owner {
        uid: user.uid,
        gid: group.gid,
    })
}

/// `install -d -o user -g group` semantics: create every missing path
/// component and hand the created ones to `owner`. Directories that already
/// exist are left untouched. Returns whether anything was created.
pub fn ensure_owned_dir(path: &Path, owner: Owner) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    if path.exists() {
        bail!("{} exists and is not a directory", path.display());
    }

    let mut missing: Vec<PathBuf> = Vec::new();
    let mut current = path;
    while !current.exists() {
        missing.push(current.to_path_buf());
        match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => current = parent,
            _ => break,
        }
    }

    for dir in missing.iter().rev() {
        fs::create_dir(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        chown(dir, Some(owner.uid), Some(owner.gid))
            .with_context(|| format!("failed to chown {}", dir.display()))?;
        tracing::debug!(
            "created {} owned by {}:{}",
            dir.display(),
            owner.uid,
            owner.gid
        );
    }
    Ok(true)
}
