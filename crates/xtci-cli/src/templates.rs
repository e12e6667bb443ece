//! Regeneration of the CI files checked into every module.

use std::path::{Path, PathBuf};

use xtci_build::dockerfile::module_vars;
use xtci_build::{RenderError, render_file};
use xtci_core::{CI_FILES, Module};

/// Render every entry of [`CI_FILES`] into the module checkout.
pub fn regenerate_ci_files(
    templates_dir: &Path,
    module: &Module,
    slug_owner: &str,
) -> Result<Vec<PathBuf>, RenderError> {
    // CI files carry no deletes beyond the module's own: the placeholder
    // renders empty.
    let vars = module_vars(module, slug_owner).set("extra_deletes", "");

    CI_FILES
        .iter()
        .map(|file| {
            render_file(
                &templates_dir.join(file.template),
                &vars,
                &module.dir.join(file.output),
            )
        })
        .collect()
}
