mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shipyard_core::Port;

#[derive(Parser)]
#[command(name = "shipyard", about = "Package Python ASGI apps into container images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a shipyard.toml to the current project
    Init,
    /// Validate config, dependency manifest, and entry module
    Check,
    /// Print the Dockerfile that `build` would use
    Render,
    /// Eject Dockerfile for manual customization
    Eject,
    /// Build the container image
    Build {
        /// Allow building with uncommitted changes
        #[arg(long)]
        allow_dirty: bool,
        /// Image tag (default: <name>:latest)
        #[arg(long, short = 't')]
        tag: Option<String>,
        /// Suppress build output and print only the image ID
        #[arg(long, short = 'q')]
        quiet: bool,
        /// Linux launcher binary to embed (default: this executable)
        #[arg(long, env = "SHIPYARD_LAUNCHER")]
        launcher: Option<PathBuf>,
    },
    /// Run the built image locally
    Run {
        /// Image tag to run (default: <name>:latest)
        #[arg(long, short = 't')]
        tag: Option<String>,
        /// Port handed to the container through its port variable
        #[arg(long, short = 'p')]
        port: Option<Port>,
        /// Host port to publish (default: the container port)
        #[arg(long)]
        host_port: Option<Port>,
    },
    /// Container entrypoint: read the port, check the app, start the server
    Launch(commands::LaunchArgs),
    /// Check Docker and project readiness
    Doctor,
    /// Remove the local bundle and the built image
    Clean {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init_project()?,
        Commands::Check => commands::check()?,
        Commands::Render => commands::render()?,
        Commands::Eject => commands::eject()?,
        Commands::Build {
            allow_dirty,
            tag,
            quiet,
            launcher,
        } => {
            let options = commands::BuildOptions {
                allow_dirty,
                tag,
                quiet,
                launcher,
            };
            commands::build(options).await?
        }
        Commands::Run {
            tag,
            port,
            host_port,
        } => commands::run(tag, port, host_port).await?,
        Commands::Launch(args) => commands::launch(args)?,
        Commands::Doctor => commands::doctor().await?,
        Commands::Clean { yes } => commands::clean(yes).await?,
    }

    Ok(())
}
