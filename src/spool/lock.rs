//! Per-group advisory locks
//!
//! Each group directory holds a `.lock` file. Holders take `flock(2)` style
//! locks on it through [`std::fs::File::lock`], which coordinate across
//! processes as well as between sessions in one server. A lock lives exactly
//! as long as its [`GroupLock`] guard, so every exit path releases it.
//!
//! Locks on the same group must never nest within one caller: each guard
//! opens its own file description, so a second exclusive request would wait
//! on the first forever. Functions that need the lock held take a
//! `&GroupLock` argument instead of locking again.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::{error, trace};

use crate::error::{NewsError, Result};

/// Name of the lock file inside a group directory
pub const LOCK_FILE: &str = ".lock";

/// Lock flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Readers wanting a consistent snapshot
    Shared,
    /// Writers (posting, counter rebuild/save)
    Exclusive,
}

/// Guard for a held group lock; released on drop
#[derive(Debug)]
pub struct GroupLock {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl GroupLock {
    /// Block until a shared lock on the group in `dir` is held
    pub fn shared(dir: &Path) -> Result<Self> {
        Self::acquire(dir, LockMode::Shared)
    }

    /// Block until an exclusive lock on the group in `dir` is held
    pub fn exclusive(dir: &Path) -> Result<Self> {
        Self::acquire(dir, LockMode::Exclusive)
    }

    fn acquire(dir: &Path, mode: LockMode) -> Result<Self> {
        let path = dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                error!("cannot open lock file {}: {}", path.display(), e);
                NewsError::io(&path, e)
            })?;

        let locked = match mode {
            LockMode::Shared => file.lock_shared(),
            LockMode::Exclusive => file.lock(),
        };
        locked.map_err(|e| {
            error!("flock({}, {:?}) failed: {}", path.display(), mode, e);
            NewsError::io(&path, e)
        })?;

        trace!("locked {} ({:?})", path.display(), mode);
        Ok(Self { file, path, mode })
    }

    /// Mode this guard holds
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// True for exclusive guards
    pub fn is_exclusive(&self) -> bool {
        self.mode == LockMode::Exclusive
    }
}

impl Drop for GroupLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            error!("unlock of {} failed: {}", self.path.display(), e);
        } else {
            trace!("unlocked {}", self.path.display());
        }
    }
}
