use std::path::{Path, PathBuf};

/// Where templates live and where module checkouts are found.
///
/// Both paths are absolute: image builds change the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub templates_dir: PathBuf,
    pub modules_root: PathBuf,
}

impl Layout {
    /// `modules_root` defaults to two levels above the templates directory,
    /// i.e. the superproject root for `<root>/.ci/templates`.
    pub fn resolve(templates_dir: &Path, modules_root: Option<&Path>) -> std::io::Result<Self> {
        let templates_dir = std::path::absolute(templates_dir)?;
        let modules_root = match modules_root {
            Some(root) => std::path::absolute(root)?,
            None => templates_dir.join("..").join(".."),
        };
        Ok(Self {
            templates_dir,
            modules_root,
        })
    }

    pub fn base_context(&self, cc: &str) -> PathBuf {
        self.templates_dir.join(format!("base_{cc}"))
    }

    pub fn combination_context(&self, module: &str, tag: &str) -> PathBuf {
        self.templates_dir.join(module).join(tag)
    }
}
