use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Lock file name inside the data directory
pub const LOCK_FILE: &str = ".lock";

/// Exclusive advisory lock on a tasklog data directory.
///
/// Held for the duration of every read-modify-write so a running `watch`
/// and a one-shot command never interleave their saves.
pub struct StoreLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("timed out waiting for {path}: another tasklog process is writing")]
    Timeout { path: PathBuf },
}

impl StoreLock {
    /// Acquire the lock, creating the data directory if needed. Waits up to
    /// `timeout` before giving up.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        std::fs::create_dir_all(data_dir).map_err(|e| LockError::CreateError {
            path: path.clone(),
            source: e,
        })?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::CreateError {
                path: path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    tracing::trace!(path = %path.display(), "lock acquired");
                    return Ok(StoreLock { _file: file, path });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => return Err(LockError::Timeout { path }),
            }
        }
    }

    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, Duration::from_secs(5))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// flock is released when the descriptor closes; the file itself stays so a
// waiting process never locks an unlinked inode.
#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_is_reacquirable_after_drop() {
        let tmp = TempDir::new().unwrap();
        let lock = StoreLock::acquire_default(tmp.path()).unwrap();
        assert!(lock.path().ends_with(LOCK_FILE));
        drop(lock);
        assert!(StoreLock::acquire_default(tmp.path()).is_ok());
    }

    #[test]
    fn creates_missing_data_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("fresh");
        let _lock = StoreLock::acquire_default(&dir).unwrap();
        assert!(dir.join(LOCK_FILE).exists());
    }

    #[cfg(unix)]
    #[test]
    fn contention_times_out() {
        let tmp = TempDir::new().unwrap();
        let _held = StoreLock::acquire_default(tmp.path()).unwrap();
        let second = StoreLock::acquire(tmp.path(), Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Timeout { .. })));
    }
}
