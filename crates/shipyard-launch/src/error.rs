use std::path::PathBuf;

use shipyard_core::PortError;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("{var}={value:?} is not a valid port (expected an integer in 1..=65535)")]
    InvalidPort {
        var: String,
        value: String,
        source: PortError,
    },

    #[error(transparent)]
    Entry(#[from] shipyard_core::Error),

    #[error("working directory {path} does not exist")]
    MissingDirectory { path: PathBuf },

    #[error("failed to start {program}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to exec {program}")]
    Exec {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with status {code}")]
    ServerExited { program: String, code: i32 },
}
