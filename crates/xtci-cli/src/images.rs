//! Base and combination image builds.

use std::future::Future;
use std::path::Path;
use std::time::Instant;

use tracing::Instrument;
use xtci_build::dockerfile::{BASE_TEMPLATE, DOCKERFILE_NAME, MODULE_TEMPLATE};
use xtci_build::{DockerfileGenerator, EphemeralDir, Template, WorkingDir};
use xtci_core::{CompilerPair, ImageRef, Module, RunSettings, XtciConfig};
use xtci_engine::{DockerClient, DockerExecutor, ImageError};

use crate::layout::Layout;

pub struct ImageBuilder<'a, D: DockerExecutor> {
    docker: &'a DockerClient<D>,
    config: &'a XtciConfig,
    layout: &'a Layout,
    settings: &'a RunSettings,
}

impl<'a, D: DockerExecutor> ImageBuilder<'a, D> {
    pub fn new(
        docker: &'a DockerClient<D>,
        config: &'a XtciConfig,
        layout: &'a Layout,
        settings: &'a RunSettings,
    ) -> Self {
        Self {
            docker,
            config,
            layout,
            settings,
        }
    }

    /// Build and push `<ns>/dune-xt-docker_base_<cc>`.
    pub async fn build_base(&self, compilers: &CompilerPair) -> anyhow::Result<ImageRef> {
        let template = Template::load(&self.layout.templates_dir.join(BASE_TEMPLATE))?;
        let commit = &self.settings.commit_id;
        let generator = DockerfileGenerator::base(&template, compilers, commit);
        let image = ImageRef::base(&self.config.registry.namespace, &compilers.cc, commit);
        let context = self.layout.base_context(&compilers.cc);

        let span = tracing::info_span!("image", name = %format!("base_{}", compilers.cc));
        self.build_and_push(&context, &generator, image)
            .instrument(span)
            .await
    }

    /// Build and push one image per matrix tag for `module`.
    pub async fn build_combinations(&self, module: &Module) -> anyhow::Result<Vec<ImageRef>> {
        let template = Template::load(&self.layout.templates_dir.join(MODULE_TEMPLATE))?;
        let commit = &self.settings.commit_id;
        let mut built = Vec::with_capacity(self.config.matrix.len());

        for (tag, entry) in self.config.matrix.iter() {
            let generator = DockerfileGenerator::combination(
                &template,
                module,
                &self.config.registry.slug_owner,
                entry,
                commit,
            );
            let image =
                ImageRef::combination(&self.config.registry.namespace, &module.name, tag, commit);
            let context = self.layout.combination_context(&module.name, tag);

            let span = tracing::info_span!("image", name = %format!("{} - {tag}", module.name));
            let image = self
                .build_and_push(&context, &generator, image)
                .instrument(span)
                .await?;
            built.push(image);
        }

        Ok(built)
    }

    /// Render into a fresh context, build and tag from inside it, then push.
    ///
    /// On failure the context directory is left behind.
    async fn build_and_push(
        &self,
        context_dir: &Path,
        generator: &DockerfileGenerator<'_>,
        image: ImageRef,
    ) -> anyhow::Result<ImageRef> {
        let context = EphemeralDir::prepare(context_dir)?;
        {
            let cwd = WorkingDir::enter(context.path())?;
            tracing::debug!(
                from = %cwd.previous().display(),
                context = %context.path().display(),
                "entered build context"
            );
            generator.write_to(Path::new("."))?;

            timed("docker build", async {
                self.docker
                    .build(Path::new("."), Path::new(DOCKERFILE_NAME), &image)
                    .await?;
                self.docker
                    .tag(&image, &image.retag(&self.settings.ref_name))
                    .await?;
                Ok::<_, ImageError>(())
            })
            .await?;
        }
        context.finish()?;

        timed("docker push", self.docker.push(&image.repository)).await?;
        Ok(image)
    }
}

async fn timed<T>(section: &str, fut: impl Future<Output = T>) -> T {
    let start = Instant::now();
    let out = fut.await;
    tracing::info!("{section} took {:.2?}", start.elapsed());
    out
}
