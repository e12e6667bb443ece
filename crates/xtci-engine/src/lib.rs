pub mod command;
pub mod docker;
pub mod executor;
pub mod git;

pub use command::CommandError;
pub use docker::{DockerClient, ImageError};
pub use executor::{DockerExecutor, GitExecutor, RealDockerExecutor, RealGitExecutor};
pub use git::{Cleanliness, CommitError, CommitOutcome, DirtyReason, GitClient, GitError};
