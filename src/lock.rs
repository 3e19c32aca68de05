//! Advisory lock on a project directory for the duration of one run.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const LOCK_FILE: &str = ".smart-scaffold.lock";

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Another scaffold run holds {} (remove it if no run is active)", .path.display())]
    Held { path: PathBuf },
    #[error("Failed to create lock file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Held while it lives; the lock file is removed on drop.
#[derive(Debug)]
pub struct DirLock {
    path: PathBuf,
}

impl DirLock {
    pub fn acquire(dir: &Path) -> Result<Self, LockError> {
        let path = dir.join(LOCK_FILE);
        let io_err = |source| LockError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(LockError::Held { path: path.clone() });
            }
            Err(source) => return Err(io_err(source)),
        };
        writeln!(file, "{}", std::process::id()).map_err(io_err)?;

        log::debug!("acquired {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("failed to remove {}: {}", self.path.display(), e);
        }
    }
}
