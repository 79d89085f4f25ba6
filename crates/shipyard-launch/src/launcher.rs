use std::net::IpAddr;
use std::path::PathBuf;
use std::process::Command;

use shipyard_core::AppTarget;

use crate::error::LaunchError;
use crate::runtime::RuntimeConfig;

/// What to start, as baked into the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// ASGI server executable, e.g. `uvicorn`
    pub server: String,
    pub app: AppTarget,
    pub host: IpAddr,
    /// Directory the server is started from, relative to `root`
    pub app_dir: Option<PathBuf>,
    /// Image working directory
    pub root: PathBuf,
}

pub struct Launcher {
    spec: LaunchSpec,
    runtime: RuntimeConfig,
}

impl Launcher {
    pub fn new(spec: LaunchSpec, runtime: RuntimeConfig) -> Self {
        Self { spec, runtime }
    }

    /// Checks the entry module is importable from the server's working
    /// directory and builds the argv to hand over.
    pub fn prepare(&self) -> Result<ServerCommand, LaunchError> {
        let current_dir = match &self.spec.app_dir {
            Some(dir) => self.spec.root.join(dir),
            None => self.spec.root.clone(),
        };
        if !current_dir.is_dir() {
            return Err(LaunchError::MissingDirectory { path: current_dir });
        }

        let module = self.spec.app.resolve(&current_dir)?;
        tracing::debug!(module = %module.display(), "entry module present");

        let args = vec![
            self.spec.app.to_string(),
            "--host".to_owned(),
            self.spec.host.to_string(),
            "--port".to_owned(),
            self.runtime.port.to_string(),
        ];

        Ok(ServerCommand {
            program: self.spec.server.clone(),
            args,
            current_dir,
        })
    }
}

/// Fully resolved server invocation. Every value is its own argv item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
}

impl ServerCommand {
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.current_dir);
        cmd
    }

    /// Replaces the current process with the server, so it receives
    /// signals directly. Returns only on failure.
    #[cfg(unix)]
    pub fn exec(&self) -> Result<(), LaunchError> {
        use std::os::unix::process::CommandExt;

        tracing::info!(command = %self, "starting server");
        let source = self.to_command().exec();
        Err(LaunchError::Exec {
            program: self.program.clone(),
            source,
        })
    }

    /// Runs the server to completion and propagates a non-zero exit.
    #[cfg(not(unix))]
    pub fn exec(&self) -> Result<(), LaunchError> {
        tracing::info!(command = %self, "starting server");
        let status = self
            .to_command()
            .status()
            .map_err(|e| LaunchError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(LaunchError::ServerExited {
                program: self.program.clone(),
                code: status.code().unwrap_or(1),
            })
        }
    }
}

impl std::fmt::Display for ServerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
