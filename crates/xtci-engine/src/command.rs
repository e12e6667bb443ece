use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{program} not found on PATH")]
    NotFound {
        program: &'static str,
        source: std::io::Error,
    },

    #[error("cannot run {program} in {dir}: directory does not exist")]
    MissingDir {
        program: &'static str,
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to start {program}")]
    Spawn {
        program: &'static str,
        source: std::io::Error,
    },

    #[error("{program} command failed: {args:?}\n{output}")]
    CommandFailed {
        program: &'static str,
        args: Vec<String>,
        output: String,
    },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: &'static str,
        source: std::string::FromUtf8Error,
    },
}
