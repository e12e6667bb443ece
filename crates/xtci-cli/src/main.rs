use std::path::PathBuf;

use clap::Parser;
use xtci::{Layout, Pipeline, commit_message};
use xtci_core::{EnvSnapshot, RunSettings, XtciConfig};
use xtci_engine::{DockerClient, GitClient};

#[derive(Parser)]
#[command(
    name = "xtci",
    about = "Build dune-xt CI images and regenerate per-module CI files"
)]
#[command(version)]
struct Cli {
    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding the templates and xtci.toml
    #[arg(long, default_value = ".")]
    templates_dir: PathBuf,

    /// Directory containing the module checkouts [default: <TEMPLATES_DIR>/../..]
    #[arg(long)]
    modules_root: Option<PathBuf>,

    /// Commit message for the regenerated CI files (words are joined with spaces)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    message: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `-v` among the message words still enables debug logging.
    let verbose = cli.verbose || cli.message.iter().any(|w| w == "-v" || w == "--verbose");
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let layout = Layout::resolve(&cli.templates_dir, cli.modules_root.as_deref())?;
    let config = XtciConfig::load(&layout.templates_dir)?;

    let env = EnvSnapshot::capture();
    let git = GitClient::new();
    let commit_id = match env.commit_sha.clone() {
        Some(sha) => sha,
        None => git.head_commit(&layout.templates_dir).await?,
    };
    let settings = RunSettings::resolve(&env, &config.modules, commit_id);

    let pipeline = Pipeline::new(
        DockerClient::new(),
        git,
        config,
        layout,
        settings,
        commit_message(&cli.message),
    );
    pipeline.run().await?;

    Ok(())
}
