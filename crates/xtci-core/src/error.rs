use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Validation ──
    #[error("tag matrix is empty; declare at least one [matrix.<tag>] entry")]
    EmptyMatrix,

    #[error("invalid matrix tag {tag:?}: {reason}")]
    InvalidTag { tag: String, reason: &'static str },

    // ── Module registry ──
    #[error(
        "module '{name}' is not registered; known modules: {}",
        format_known(known)
    )]
    UnknownModule { name: String, known: Vec<String> },
}

fn format_known(known: &[String]) -> String {
    if known.is_empty() {
        "(none); add a [module.\"<name>\"] table to xtci.toml".to_owned()
    } else {
        known.join(", ")
    }
}
