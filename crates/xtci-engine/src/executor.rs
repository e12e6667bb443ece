use std::path::Path;
use std::process::Stdio;

use crate::command::CommandError;

/// Abstraction over docker CLI execution for testability.
///
/// Production code uses [`RealDockerExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Execute a docker command and capture stdout.
    async fn exec(&self, args: &[String]) -> Result<String, CommandError>;
}

/// Abstraction over git CLI execution for testability.
#[allow(async_fn_in_trait)]
pub trait GitExecutor: Send + Sync {
    /// Execute a git command inside `dir` and capture stdout.
    async fn exec(&self, dir: &Path, args: &[String]) -> Result<String, CommandError>;
}

/// Real docker CLI executor.
pub struct RealDockerExecutor;

impl DockerExecutor for RealDockerExecutor {
    async fn exec(&self, args: &[String]) -> Result<String, CommandError> {
        run("docker", args, None).await
    }
}

/// Real git CLI executor.
pub struct RealGitExecutor;

impl GitExecutor for RealGitExecutor {
    async fn exec(&self, dir: &Path, args: &[String]) -> Result<String, CommandError> {
        run("git", args, Some(dir)).await
    }
}

/// Run to completion with output captured, never streamed.
async fn run(
    program: &'static str,
    args: &[String],
    dir: Option<&Path>,
) -> Result<String, CommandError> {
    tracing::debug!("{program} {}", args.join(" "));

    let mut command = tokio::process::Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    let output = command.output().await.map_err(|e| match dir {
        Some(dir) if !dir.is_dir() => CommandError::MissingDir {
            program,
            dir: dir.to_path_buf(),
            source: e,
        },
        _ if e.kind() == std::io::ErrorKind::NotFound => {
            CommandError::NotFound { program, source: e }
        }
        _ => CommandError::Spawn { program, source: e },
    })?;

    if output.status.success() {
        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| CommandError::InvalidUtf8 { program, source: e })?;
        if !stdout.trim().is_empty() {
            tracing::debug!("{}", stdout.trim_end());
        }
        Ok(stdout)
    } else {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        // Severity is up to the caller.
        tracing::debug!("{program} exited with {}: {}", output.status, combined.trim_end());
        Err(CommandError::CommandFailed {
            program,
            args: args.to_vec(),
            output: format!("{} ({})", combined.trim_end(), output.status),
        })
    }
}
