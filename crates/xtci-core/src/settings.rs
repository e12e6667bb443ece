//! Run settings assembled once from the CI environment.
//!
//! | variable             | effect                                         |
//! |----------------------|------------------------------------------------|
//! | `TRAVIS_MODULE_NAME` | process only this module                       |
//! | `CI_COMMIT_SHA`      | image tag instead of `git rev-parse HEAD`      |
//! | `CI_COMMIT_REF_NAME` | secondary image tag instead of `master`        |
//! | `TRAVIS` / `GITLAB`  | hosted CI: skip template regeneration          |

use std::ffi::OsString;

use crate::config::ModulesConfig;

pub const MODULE_NAME_VAR: &str = "TRAVIS_MODULE_NAME";
pub const COMMIT_SHA_VAR: &str = "CI_COMMIT_SHA";
pub const REF_NAME_VAR: &str = "CI_COMMIT_REF_NAME";
pub const HOSTED_CI_VARS: &[&str] = &["TRAVIS", "GITLAB"];

const DEFAULT_REF_NAME: &str = "master";

/// The environment variables xtci cares about, captured once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    pub module_name: Option<String>,
    pub commit_sha: Option<String>,
    pub ref_name: Option<String>,
    pub hosted_ci: bool,
}

impl EnvSnapshot {
    /// Read the current process environment.
    ///
    /// Entries that are not valid UTF-8 are ignored; a relevant one is
    /// logged as a warning.
    pub fn capture() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    pub fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        Self::from_vars(vars.into_iter().filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            if !is_relevant(&key) {
                return None;
            }
            match value.into_string() {
                Ok(value) => Some((key, value)),
                // Hosted CI is detected by presence alone.
                Err(_) if HOSTED_CI_VARS.contains(&key.as_str()) => Some((key, String::new())),
                Err(_) => {
                    tracing::warn!(variable = %key, "ignoring value that is not valid UTF-8");
                    None
                }
            }
        }))
    }

    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut snapshot = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                MODULE_NAME_VAR => snapshot.module_name = Some(value.into()),
                COMMIT_SHA_VAR => snapshot.commit_sha = Some(value.into()),
                REF_NAME_VAR => snapshot.ref_name = Some(value.into()),
                k if HOSTED_CI_VARS.contains(&k) => snapshot.hosted_ci = true,
                _ => {}
            }
        }
        snapshot
    }
}

fn is_relevant(key: &str) -> bool {
    matches!(key, MODULE_NAME_VAR | COMMIT_SHA_VAR | REF_NAME_VAR) || HOSTED_CI_VARS.contains(&key)
}

/// Everything the pipeline needs to know about this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub selected_modules: Vec<String>,
    pub commit_id: String,
    /// Ref name with `/` replaced by `_`, usable as an image tag
    pub ref_name: String,
    pub is_hosted_ci: bool,
}

impl RunSettings {
    /// `commit_id` is the already-resolved commit: the `CI_COMMIT_SHA`
    /// override when present, otherwise the templates checkout's HEAD.
    pub fn resolve(env: &EnvSnapshot, modules: &ModulesConfig, commit_id: String) -> Self {
        let selected_modules = match env.module_name.as_deref() {
            Some(name) => vec![modules.qualify(name)],
            None => modules.default_names(),
        };

        let ref_name = env
            .ref_name
            .as_deref()
            .unwrap_or(DEFAULT_REF_NAME)
            .replace('/', "_");

        Self {
            selected_modules,
            commit_id,
            ref_name,
            is_hosted_ci: env.hosted_ci,
        }
    }
}
