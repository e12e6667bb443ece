use std::fmt;

/// A registry-qualified repository plus tag, e.g.
/// `dunecommunity/dune-xt-grid-testing_gcc_full:4f1c2e0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }

    /// Base image repository for one C compiler.
    pub fn base(namespace: &str, cc: &str, commit: &str) -> Self {
        Self::new(format!("{namespace}/dune-xt-docker_base_{cc}"), commit)
    }

    /// Per-module testing repository for one matrix tag.
    pub fn combination(namespace: &str, module: &str, matrix_tag: &str, commit: &str) -> Self {
        Self::new(format!("{namespace}/{module}-testing_{matrix_tag}"), commit)
    }

    /// Same repository, different tag.
    pub fn retag(&self, tag: &str) -> Self {
        Self::new(self.repository.clone(), tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}
