use std::path::{Path, PathBuf};

use xtci_core::ImageRef;

use crate::command::CommandError;
use crate::executor::{DockerExecutor, RealDockerExecutor};

/// Container engine operations, parameterized over the executor for testability.
pub struct DockerClient<E: DockerExecutor = RealDockerExecutor> {
    executor: E,
}

impl DockerClient<RealDockerExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealDockerExecutor,
        }
    }
}

impl Default for DockerClient<RealDockerExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DockerExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Build `context` with `dockerfile`, tagging the result as `image`.
    /// Intermediate containers are kept.
    pub async fn build(
        &self,
        context: &Path,
        dockerfile: &Path,
        image: &ImageRef,
    ) -> Result<(), ImageError> {
        let context_str = path_str(context)?;
        let dockerfile_str = path_str(dockerfile)?;
        let image_str = image.to_string();

        self.executor
            .exec(&args([
                "build",
                "--rm=false",
                "--file",
                dockerfile_str,
                "--tag",
                &image_str,
                context_str,
            ]))
            .await
            .map(drop)
            .map_err(|e| ImageError::Build {
                image: image_str.clone(),
                source: e,
            })
    }

    pub async fn tag(&self, source: &ImageRef, target: &ImageRef) -> Result<(), ImageError> {
        let source_str = source.to_string();
        let target_str = target.to_string();

        self.executor
            .exec(&args(["tag", &source_str, &target_str]))
            .await
            .map(drop)
            .map_err(|e| ImageError::Tag {
                source_image: source_str.clone(),
                target: target_str.clone(),
                source: e,
            })
    }

    /// Push every local tag of `repository`.
    pub async fn push(&self, repository: &str) -> Result<(), ImageError> {
        self.executor
            .exec(&args(["push", "--all-tags", repository]))
            .await
            .map(drop)
            .map_err(|e| ImageError::Push {
                repository: repository.to_owned(),
                source: e,
            })
    }
}

fn path_str(path: &Path) -> Result<&str, ImageError> {
    path.to_str()
        .ok_or_else(|| ImageError::InvalidPath(path.to_path_buf()))
}

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("build path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("docker build failed for {image}")]
    Build {
        image: String,
        source: CommandError,
    },

    #[error("docker tag {source_image} {target} failed")]
    Tag {
        source_image: String,
        target: String,
        source: CommandError,
    },

    #[error(
        "docker push failed for {repository}; make sure the pushing account has write access to this repository on the registry"
    )]
    Push {
        repository: String,
        source: CommandError,
    },
}
