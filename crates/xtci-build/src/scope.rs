//! RAII guards for the process working directory and throwaway build contexts.

use std::path::{Path, PathBuf};

/// Changes the process working directory until dropped.
///
/// The previous directory is restored on every exit path, including early
/// `?` returns and panics. The working directory is process-global, so two
/// guards must not be alive on different threads at once.
#[derive(Debug)]
#[must_use = "the previous working directory is restored as soon as the guard is dropped"]
pub struct WorkingDir {
    previous: PathBuf,
}

impl WorkingDir {
    pub fn enter(target: &Path) -> Result<Self, ScopeError> {
        let previous = std::env::current_dir().map_err(|e| ScopeError::CurrentDir { source: e })?;
        std::env::set_current_dir(target).map_err(|e| ScopeError::ChangeDir {
            path: target.to_path_buf(),
            source: e,
        })?;
        tracing::trace!(from = %previous.display(), to = %target.display(), "entered directory");
        Ok(Self { previous })
    }

    /// The working directory at the time the guard was created.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            tracing::error!(
                path = %self.previous.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}

/// A directory that is empty on creation and removed by [`EphemeralDir::finish`].
///
/// Dropping the guard without calling `finish` (an error propagated out of
/// the scope) leaves the directory and its contents on disk.
#[derive(Debug)]
#[must_use = "call finish() to remove the directory on success"]
pub struct EphemeralDir {
    path: PathBuf,
    finished: bool,
}

impl EphemeralDir {
    /// Remove anything at `path` and recreate it empty.
    pub fn prepare(path: &Path) -> Result<Self, ScopeError> {
        if path.is_dir() {
            std::fs::remove_dir_all(path).map_err(|e| ScopeError::Clear {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::create_dir_all(path).map_err(|e| ScopeError::Create {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Success exit: delete the directory and everything in it.
    pub fn finish(mut self) -> Result<(), ScopeError> {
        self.finished = true;
        std::fs::remove_dir_all(&self.path).map_err(|e| ScopeError::Remove {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl Drop for EphemeralDir {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(path = %self.path.display(), "left in place for inspection");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("failed to determine the current working directory")]
    CurrentDir { source: std::io::Error },
    #[error("failed to change working directory to {path}")]
    ChangeDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to clear directory {path}")]
    Clear {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create directory {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove directory {path}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}
