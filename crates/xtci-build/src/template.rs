use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `$$`, `$name` or `${name}`.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\})")
        .expect("placeholder pattern is a valid regex")
});

/// Extensions whose rendered output must be executable.
const SHELL_EXTENSIONS: &[&str] = &["bash", "sh"];

/// Placeholder name → substituted value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions(BTreeMap<String, String>);

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.insert(name.to_owned(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// A text template with `$name` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let text = std::fs::read_to_string(path).map_err(|e| RenderError::TemplateRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self { text })
    }

    /// Substitute known placeholders, leaving unknown ones as written.
    pub fn safe_substitute(&self, vars: &Substitutions) -> String {
        PLACEHOLDER
            .replace_all(&self.text, |caps: &Captures<'_>| {
                if caps.get(1).is_some() {
                    return "$".to_owned();
                }
                let name = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                match vars.get(name) {
                    Some(value) => value.to_owned(),
                    None => caps[0].to_owned(),
                }
            })
            .into_owned()
    }

    /// Render into `output`, overwriting it. Shell scripts are made
    /// executable for the owner.
    pub fn render_to(&self, vars: &Substitutions, output: &Path) -> Result<PathBuf, RenderError> {
        let text = self.safe_substitute(vars);
        std::fs::write(output, text).map_err(|e| RenderError::Write {
            path: output.to_path_buf(),
            source: e,
        })?;

        if is_shell_script(output) {
            make_owner_executable(output)?;
        }

        tracing::debug!(output = %output.display(), "rendered template");
        Ok(output.to_path_buf())
    }
}

/// Load `template_path`, substitute `vars`, and write the result to `output`.
pub fn render_file(
    template_path: &Path,
    vars: &Substitutions,
    output: &Path,
) -> Result<PathBuf, RenderError> {
    Template::load(template_path)?.render_to(vars, output)
}

fn is_shell_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SHELL_EXTENSIONS.contains(&ext))
}

#[cfg(unix)]
fn make_owner_executable(path: &Path) -> Result<(), RenderError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700)).map_err(|e| {
        RenderError::Permissions {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(not(unix))]
fn make_owner_executable(_path: &Path) -> Result<(), RenderError> {
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to read template {path}")]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write rendered file {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to set permissions on {path}")]
    Permissions {
        path: PathBuf,
        source: std::io::Error,
    },
}
