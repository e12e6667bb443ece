use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matrix::TagMatrix;
use crate::module::ModuleRegistry;

/// File name looked up in the templates directory.
pub const CONFIG_FILE_NAME: &str = "xtci.toml";

/// xtci.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XtciConfig {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub modules: ModulesConfig,
    /// Declaring any `[matrix.<tag>]` table replaces the built-in matrix.
    #[serde(default)]
    pub matrix: TagMatrix,
    /// `[module."<name>"]` tables
    #[serde(default, rename = "module")]
    pub module_meta: ModuleRegistry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Docker Hub namespace images are pushed to
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Owner part of the `slug` template variable
    #[serde(default = "default_slug_owner")]
    pub slug_owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulesConfig {
    /// Prefix turning a short name (`grid`) into a module name (`dune-xt-grid`)
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Short names processed when no single module is selected
    #[serde(default = "default_modules")]
    pub default: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            slug_owner: default_slug_owner(),
        }
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            default: default_modules(),
        }
    }
}

impl ModulesConfig {
    /// Expand a short name with the prefix; full names pass through.
    pub fn qualify(&self, name: &str) -> String {
        if name.starts_with(&self.prefix) {
            name.to_owned()
        } else {
            format!("{}{name}", self.prefix)
        }
    }

    pub fn default_names(&self) -> Vec<String> {
        self.default.iter().map(|n| self.qualify(n)).collect()
    }
}

impl XtciConfig {
    /// Load from xtci.toml in the given directory, or return defaults if not found.
    pub fn load(templates_dir: &Path) -> crate::Result<Self> {
        let config_path = templates_dir.join(CONFIG_FILE_NAME);
        let config: Self = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Self::default()
        };

        config.matrix.validate()?;
        Ok(config)
    }
}

fn default_namespace() -> String {
    "dunecommunity".to_owned()
}

fn default_slug_owner() -> String {
    "dune-community".to_owned()
}

fn default_prefix() -> String {
    "dune-xt-".to_owned()
}

fn default_modules() -> Vec<String> {
    ["common", "functions", "la", "grid"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}
