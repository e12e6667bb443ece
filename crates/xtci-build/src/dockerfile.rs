use std::path::{Path, PathBuf};

use xtci_core::{CompilerPair, MatrixEntry, Module};

use crate::template::{RenderError, Substitutions, Template};

/// Base image template, relative to the templates directory.
pub const BASE_TEMPLATE: &str = "dune-xt-docker_base/Dockerfile.in";
/// Per-module image template, relative to the templates directory.
pub const MODULE_TEMPLATE: &str = "dune-xt-docker/Dockerfile.in";
/// File name written into every build context.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Fills a Dockerfile template for one image of the build matrix.
pub struct DockerfileGenerator<'a> {
    template: &'a Template,
    vars: Substitutions,
}

impl<'a> DockerfileGenerator<'a> {
    /// Compiler base image: `commit`, `cc`, `cxx`.
    pub fn base(template: &'a Template, compilers: &CompilerPair, commit: &str) -> Self {
        let vars = Substitutions::new()
            .set("commit", commit)
            .set("cc", compilers.cc.as_str())
            .set("cxx", compilers.cxx.as_str());
        Self { template, vars }
    }

    /// Module image for one matrix tag. The tag's delete list comes first,
    /// followed by the module's own.
    pub fn combination(
        template: &'a Template,
        module: &Module,
        slug_owner: &str,
        entry: &MatrixEntry,
        commit: &str,
    ) -> Self {
        let deletes = join_deletes(&entry.deletes, &module.meta.modules_to_delete);
        tracing::debug!(module = %module.name, delete = %deletes, "modules to delete");

        let vars = module_vars(module, slug_owner)
            .set("modules_to_delete", deletes)
            .set("commit", commit)
            .set("cc", entry.cc.as_str())
            .set("cxx", entry.cxx.as_str());
        Self { template, vars }
    }

    pub fn vars(&self) -> &Substitutions {
        &self.vars
    }

    pub fn render(&self) -> String {
        self.template.safe_substitute(&self.vars)
    }

    /// Write `<dir>/Dockerfile`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, RenderError> {
        self.template.render_to(&self.vars, &dir.join(DOCKERFILE_NAME))
    }
}

/// Variables shared by the module Dockerfile and the regenerated CI files.
pub fn module_vars(module: &Module, slug_owner: &str) -> Substitutions {
    Substitutions::new()
        .set("project_name", module.name.as_str())
        .set("slug", module.slug(slug_owner))
        .set("authors", module.meta.authors.as_str())
        .set("modules_to_delete", module.meta.modules_to_delete.as_str())
}

fn join_deletes(matrix: &str, module: &str) -> String {
    [matrix.trim(), module.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
