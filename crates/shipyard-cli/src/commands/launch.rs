use clap::Args;
use shipyard_core::{AppTarget, Port};
use shipyard_launch::{LaunchError, LaunchSpec, Launcher, RuntimeConfig};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct LaunchArgs {
    /// ASGI server executable
    #[arg(long, default_value = "uvicorn")]
    server: String,
    /// Application object as <module>:<attribute>
    #[arg(long, default_value = "main:app")]
    app: AppTarget,
    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
    /// Environment variable holding the listen port
    #[arg(long, default_value = "PORT")]
    port_env: String,
    /// Listen port when the variable is unset or empty
    #[arg(long, default_value_t = Port::DEFAULT)]
    default_port: Port,
    /// Directory to start the server from, relative to the working directory
    #[arg(long)]
    app_dir: Option<PathBuf>,
    /// Print the server command instead of running it
    #[arg(long)]
    dry_run: bool,
}

/// Container entrypoint. Reads the runtime config once, then hands the
/// process over to the server.
pub fn launch(args: LaunchArgs) -> anyhow::Result<()> {
    let runtime = RuntimeConfig::load(&args.port_env, args.default_port)?;
    let spec = LaunchSpec {
        server: args.server,
        app: args.app,
        host: args.host,
        app_dir: args.app_dir,
        root: std::env::current_dir()?,
    };

    let command = Launcher::new(spec, runtime).prepare()?;
    if args.dry_run {
        println!("{command}");
        return Ok(());
    }

    match command.exec() {
        Ok(()) => Ok(()),
        Err(LaunchError::ServerExited { code, .. }) => std::process::exit(code),
        Err(e) => Err(e.into()),
    }
}
