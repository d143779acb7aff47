mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use slipway::Topology;

#[derive(Parser)]
#[command(name = "slipway", about = "Build Docker images through Jenkins pipelines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pipeline script for the configured build
    Preview {
        /// Dockerfile to embed (defaults to ./Dockerfile, then generation)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        /// Build topology: standard, kubernetes-dind, or kubernetes-kaniko
        #[arg(long)]
        topology: Option<Topology>,
    },
    /// Render the pipeline, install it on the job, and trigger a build
    Build {
        /// Dockerfile to embed (defaults to ./Dockerfile, then generation)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        /// Build topology: standard, kubernetes-dind, or kubernetes-kaniko
        #[arg(long)]
        topology: Option<Topology>,
        /// Create the job if it does not exist yet
        #[arg(long)]
        create_job: bool,
        /// Print the outcome as JSON instead of human-readable lines
        #[arg(long)]
        json: bool,
    },
    /// Generate a Dockerfile from slipway.toml and project files
    Generate {
        /// Write to this path instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Manage registry projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Scaffold slipway.toml and .env.example in the current directory
    Init,
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create the registry project if it does not exist
    Ensure {
        /// Project name (defaults to the configured image name)
        name: Option<String>,
        /// Make the project publicly pullable
        #[arg(long)]
        public: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tokens live in the environment; a local .env is optional.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Preview { file, topology } => {
            commands::preview(file.as_deref(), topology).await?
        }
        Commands::Build {
            file,
            topology,
            create_job,
            json,
        } => commands::build(file.as_deref(), topology, create_job, json).await?,
        Commands::Generate { output } => commands::generate(output.as_deref()).await?,
        Commands::Project { action } => match action {
            ProjectAction::Ensure { name, public } => {
                commands::project_ensure(name.as_deref(), public).await?
            }
        },
        Commands::Init => commands::init_project().await?,
    }

    Ok(())
}
