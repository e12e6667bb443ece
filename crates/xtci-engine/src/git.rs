use std::fmt;
use std::path::{Path, PathBuf};

use xtci_core::CI_FILES;

use crate::command::CommandError;
use crate::executor::{GitExecutor, RealGitExecutor};

/// State of a module checkout before xtci touches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanliness {
    Clean,
    Dirty(DirtyReason),
}

impl Cleanliness {
    pub fn is_dirty(&self) -> bool {
        matches!(self, Self::Dirty(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirtyReason {
    /// HEAD is not a symbolic ref to a branch
    DetachedHead,
    /// The index differs from HEAD
    StagedChanges,
    /// Tracked files differ from the index
    UnstagedChanges,
    /// git itself could not be run
    CheckFailed(String),
}

impl fmt::Display for DirtyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DetachedHead => f.write_str("not on a branch"),
            Self::StagedChanges => f.write_str("staged changes"),
            Self::UnstagedChanges => f.write_str("unstaged changes to tracked files"),
            Self::CheckFailed(e) => write!(f, "git check failed: {e}"),
        }
    }
}

/// Result of [`GitClient::commit_ci_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Working tree was clean, nothing was run
    NothingToCommit,
    Committed,
    /// `git commit` failed; logged and ignored
    Failed,
}

/// Git operations, parameterized over the executor for testability.
pub struct GitClient<E: GitExecutor = RealGitExecutor> {
    executor: E,
}

impl GitClient<RealGitExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealGitExecutor,
        }
    }
}

impl Default for GitClient<RealGitExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: GitExecutor> GitClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Full hash of `HEAD` in `dir`.
    pub async fn head_commit(&self, dir: &Path) -> Result<String, GitError> {
        let out = self
            .executor
            .exec(dir, &args(["rev-parse", "HEAD"]))
            .await
            .map_err(|e| GitError::RevParse {
                dir: dir.to_path_buf(),
                source: e,
            })?;

        let commit = out.trim();
        if commit.is_empty() {
            return Err(GitError::EmptyHead(dir.to_path_buf()));
        }
        Ok(commit.to_owned())
    }

    // ── Dirtiness ──

    /// Check that `dir` is on a branch with no staged and no unstaged
    /// changes to tracked files. Untracked files are not considered.
    ///
    /// Any failing check makes the tree dirty; the failure is logged.
    pub async fn cleanliness(&self, dir: &Path) -> Cleanliness {
        let checks = [
            (args(["symbolic-ref", "HEAD"]), DirtyReason::DetachedHead),
            (
                args(["diff-index", "--quiet", "--cached", "HEAD"]),
                DirtyReason::StagedChanges,
            ),
            (args(["diff-files", "--quiet"]), DirtyReason::UnstagedChanges),
        ];

        for (check, reason) in checks {
            if let Err(e) = self.executor.exec(dir, &check).await {
                tracing::warn!(dir = %dir.display(), error = %e, "git check failed");
                let reason = match e {
                    CommandError::CommandFailed { .. } => reason,
                    other => DirtyReason::CheckFailed(other.to_string()),
                };
                return Cleanliness::Dirty(reason);
            }
        }

        Cleanliness::Clean
    }

    pub async fn is_dirty(&self, dir: &Path) -> bool {
        self.cleanliness(dir).await.is_dirty()
    }

    // ── Commit ──

    /// Commit the regenerated CI files in `dir`.
    ///
    /// A clean tree is a no-op. A dirty tree requires a non-blank message.
    /// A failing `git commit` is logged and reported as
    /// [`CommitOutcome::Failed`] rather than an error.
    pub async fn commit_ci_files(
        &self,
        dir: &Path,
        message: Option<&str>,
    ) -> Result<CommitOutcome, CommitError> {
        if !self.is_dirty(dir).await {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let message = match message {
            Some(m) if !m.trim().is_empty() => m,
            _ => {
                return Err(CommitError::CommitMessageMissing {
                    dir: dir.to_path_buf(),
                });
            }
        };

        let mut commit = vec!["commit".to_owned()];
        commit.extend(CI_FILES.iter().map(|f| f.output.to_owned()));
        commit.extend(["-m".to_owned(), message.to_owned()]);

        match self.executor.exec(dir, &commit).await {
            Ok(_) => {
                tracing::info!(dir = %dir.display(), "committed regenerated CI files");
                Ok(CommitOutcome::Committed)
            }
            Err(e) => {
                tracing::error!(dir = %dir.display(), error = %e, "git commit failed");
                Ok(CommitOutcome::Failed)
            }
        }
    }
}

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("git rev-parse HEAD failed in {dir}")]
    RevParse {
        dir: PathBuf,
        source: CommandError,
    },

    #[error("git rev-parse HEAD printed nothing in {0}")]
    EmptyHead(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("no commit message given for {dir}; pass the message as arguments")]
    CommitMessageMissing { dir: PathBuf },
}
