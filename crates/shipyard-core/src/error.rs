use std::path::PathBuf;

use crate::port::PortError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid path {path:?} for `{field}`: {reason}")]
    InvalidPath {
        field: &'static str,
        path: String,
        reason: &'static str,
    },

    // ── Base image ──
    #[error("invalid image reference {reference:?}: {reason}")]
    InvalidImageRef {
        reference: String,
        reason: &'static str,
    },

    #[error("base image {0:?} is not pinned; use a concrete version tag or digest instead of `latest`")]
    UnpinnedImage(String),

    // ── Runtime configuration ──
    #[error("invalid port {value:?}")]
    InvalidPort { value: String, source: PortError },

    // ── Dependency manifest ──
    #[error("failed to read dependency manifest {path}")]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed requirement in {path} at line {line}: {content:?}")]
    ManifestMalformed {
        path: PathBuf,
        line: usize,
        content: String,
    },

    // ── Entry module ──
    #[error("invalid application target {target:?}: expected `<module>:<attribute>`")]
    InvalidAppTarget { target: String },

    #[error(
        "entry module '{module}' not found; looked for: {}",
        format_candidates(candidates)
    )]
    EntryModuleNotFound {
        module: String,
        candidates: Vec<PathBuf>,
    },
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    if candidates.is_empty() {
        "(none)".to_owned()
    } else {
        candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
