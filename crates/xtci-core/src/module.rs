use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Per-module values substituted into the Dockerfile and CI templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMeta {
    /// Maintainer line written into generated files
    #[serde(default)]
    pub authors: String,
    /// Space-separated upstream modules this module never needs
    #[serde(default)]
    pub modules_to_delete: String,
}

/// Module name → metadata, populated once from `xtci.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleRegistry(BTreeMap<String, ModuleMeta>);

impl ModuleRegistry {
    pub fn new(entries: impl IntoIterator<Item = (String, ModuleMeta)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn lookup(&self, name: &str) -> crate::Result<&ModuleMeta> {
        self.0.get(name).ok_or_else(|| crate::Error::UnknownModule {
            name: name.to_owned(),
            known: self.names(),
        })
    }

    /// Resolve a module checkout living under `modules_root`.
    pub fn resolve(&self, name: &str, modules_root: &Path) -> crate::Result<Module> {
        let meta = self.lookup(name)?.clone();
        Ok(Module {
            name: name.to_owned(),
            dir: modules_root.join(name),
            meta,
        })
    }
}

/// A module checkout on disk together with its registry metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub dir: PathBuf,
    pub meta: ModuleMeta,
}

impl Module {
    /// `owner/name` as used by the git hosting service.
    pub fn slug(&self, owner: &str) -> String {
        format!("{owner}/{}", self.name)
    }
}

/// A CI file regenerated inside every module checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CiFile {
    /// Template path, relative to the templates directory
    pub template: &'static str,
    /// Output path, relative to the module directory
    pub output: &'static str,
}

/// The files written by template regeneration and committed afterwards.
pub const CI_FILES: [CiFile; 3] = [
    CiFile {
        template: "travis.yml.in",
        output: ".travis.yml",
    },
    CiFile {
        template: "dune-xt-docker/after_script.bash.in",
        output: ".travis.after_script.bash",
    },
    CiFile {
        template: "dune-xt-docker/script.bash.in",
        output: ".travis.script.bash",
    },
];
