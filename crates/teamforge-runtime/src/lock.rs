//! Single-instance process lock.
//!
//! The engine assumes exactly one active writer process per state file; that
//! is a deployment rule, and this lock is the deployment-level guard for it.
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on
//! Windows). Released on drop.

use anyhow::{bail, Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exclusive lock on a data directory, held for the process lifetime.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Lock file name inside the data directory.
    const LOCK_FILE: &'static str = "teamforge.lock";

    /// Acquires the lock, writing this process's pid into the lock file.
    ///
    /// # Errors
    /// Fails if another live process already holds the lock, with its pid in
    /// the message when readable.
    pub fn acquire(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("creating data directory {}", data_dir.display()))?;
        let path = data_dir.join(Self::LOCK_FILE);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("creating lock file {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            let holder = fs::read_to_string(&path)
                .ok()
                .and_then(|s| s.trim().parse::<u32>().ok());
            match holder {
                Some(pid) => bail!(
                    "another instance (pid {pid}) already holds {}",
                    path.display()
                ),
                None => bail!("another instance already holds {}", path.display()),
            }
        }

        let mut locked = file;
        locked.set_len(0).context("truncating lock file")?;
        writeln!(locked, "{}", std::process::id()).context("writing pid to lock file")?;
        locked.sync_all().context("syncing lock file")?;

        Ok(Self { file: locked, path })
    }

    /// The lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}
