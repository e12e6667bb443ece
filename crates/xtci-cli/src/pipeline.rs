use std::fmt;
use std::path::PathBuf;

use xtci_core::{ImageRef, Module, RunSettings, XtciConfig};
use xtci_engine::{
    Cleanliness, CommitOutcome, DirtyReason, DockerClient, DockerExecutor, GitClient,
    GitExecutor, RealDockerExecutor, RealGitExecutor,
};

use crate::images::ImageBuilder;
use crate::layout::Layout;
use crate::templates::regenerate_ci_files;

/// Join command-line words into a commit message; blank means none.
pub fn commit_message(words: &[String]) -> Option<String> {
    let message = words.join(" ");
    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}

/// Why a module's CI files were left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Dirty(DirtyReason),
    HostedCi,
    NoCommitMessage,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dirty(reason) => write!(f, "dirty or on a detached HEAD ({reason})"),
            Self::HostedCi => f.write_str("running on hosted CI"),
            Self::NoCommitMessage => f.write_str("no commit message given"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleOutcome {
    Skipped(SkipReason),
    Regenerated {
        files: Vec<PathBuf>,
        /// Filled in by the commit pass
        commit: Option<CommitOutcome>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReport {
    pub name: String,
    pub images: Vec<ImageRef>,
    pub outcome: ModuleOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub base_images: Vec<ImageRef>,
    pub modules: Vec<ModuleReport>,
}

impl RunReport {
    pub fn combination_images(&self) -> usize {
        self.modules.iter().map(|m| m.images.len()).sum()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleReport> {
        self.modules.iter().find(|m| m.name == name)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} base image(s), {} combination image(s)",
            self.base_images.len(),
            self.combination_images()
        )?;
        for module in &self.modules {
            let outcome = match &module.outcome {
                ModuleOutcome::Skipped(reason) => format!("skipped, {reason}"),
                ModuleOutcome::Regenerated { commit, .. } => match commit {
                    Some(CommitOutcome::Committed) => "regenerated and committed".to_owned(),
                    Some(CommitOutcome::NothingToCommit) => "regenerated, unchanged".to_owned(),
                    Some(CommitOutcome::Failed) => "regenerated, commit failed".to_owned(),
                    None => "regenerated".to_owned(),
                },
            };
            write!(f, "; {}: {outcome}", module.name)?;
        }
        Ok(())
    }
}

/// One linear pass over base images, module images, templates and commits.
pub struct Pipeline<D: DockerExecutor = RealDockerExecutor, G: GitExecutor = RealGitExecutor> {
    docker: DockerClient<D>,
    git: GitClient<G>,
    config: XtciConfig,
    layout: Layout,
    settings: RunSettings,
    message: Option<String>,
}

impl<D: DockerExecutor, G: GitExecutor> Pipeline<D, G> {
    pub fn new(
        docker: DockerClient<D>,
        git: GitClient<G>,
        config: XtciConfig,
        layout: Layout,
        settings: RunSettings,
        message: Option<String>,
    ) -> Self {
        Self {
            docker,
            git,
            config,
            layout,
            settings,
            message,
        }
    }

    pub async fn run(&self) -> anyhow::Result<RunReport> {
        let builder = ImageBuilder::new(&self.docker, &self.config, &self.layout, &self.settings);
        let mut report = RunReport::default();

        tracing::info!(
            commit = %self.settings.commit_id,
            ref_name = %self.settings.ref_name,
            modules = ?self.settings.selected_modules,
            "starting"
        );

        for compilers in self.config.matrix.compiler_pairs() {
            report.base_images.push(builder.build_base(&compilers).await?);
        }

        let mut regenerated = Vec::new();
        for name in &self.settings.selected_modules {
            let module = self
                .config
                .module_meta
                .resolve(name, &self.layout.modules_root)?;

            let images = builder.build_combinations(&module).await?;
            let outcome = self.update_templates(&module).await?;
            if matches!(outcome, ModuleOutcome::Regenerated { .. }) {
                regenerated.push((report.modules.len(), module.dir.clone()));
            }

            report.modules.push(ModuleReport {
                name: module.name,
                images,
                outcome,
            });
        }

        // Each module is committed in its own directory.
        for (index, dir) in regenerated {
            let outcome = self
                .git
                .commit_ci_files(&dir, self.message.as_deref())
                .await?;
            if let ModuleOutcome::Regenerated { commit, .. } = &mut report.modules[index].outcome {
                *commit = Some(outcome);
            }
        }

        tracing::info!("done: {report}");
        Ok(report)
    }

    /// Regenerate the module's CI files unless a skip condition applies.
    async fn update_templates(&self, module: &Module) -> anyhow::Result<ModuleOutcome> {
        let skip = if let Cleanliness::Dirty(reason) = self.git.cleanliness(&module.dir).await {
            Some(SkipReason::Dirty(reason))
        } else if self.settings.is_hosted_ci {
            Some(SkipReason::HostedCi)
        } else if self.message.as_deref().is_none_or(|m| m.trim().is_empty()) {
            Some(SkipReason::NoCommitMessage)
        } else {
            None
        };

        if let Some(reason) = skip {
            tracing::info!("Skipping {}: {reason}", module.name);
            return Ok(ModuleOutcome::Skipped(reason));
        }

        let files = regenerate_ci_files(
            &self.layout.templates_dir,
            module,
            &self.config.registry.slug_owner,
        )?;
        tracing::info!(module = %module.name, "regenerated {} CI files", files.len());

        Ok(ModuleOutcome::Regenerated {
            files,
            commit: None,
        })
    }
}
