//! Package Python ASGI apps into container images.
//!
//! This is the unified facade crate that re-exports all Shipyard sub-crates.
//! Use feature flags to control which components are included.
//!
//! # Feature flags
//!
//! | Feature | Default | Crate | Description |
//! |---------|---------|-------|-------------|
//! | `core` | yes | [`shipyard-core`](https://crates.io/crates/shipyard-core) | Configuration, port, manifest, and entry types |
//! | `build` | yes | [`shipyard-build`](https://crates.io/crates/shipyard-build) | Build plan, Dockerfile rendering, bundling |
//! | `docker` | yes | [`shipyard-docker`](https://crates.io/crates/shipyard-docker) | Docker build/inspect/run |
//! | `launch` | no | [`shipyard-launch`](https://crates.io/crates/shipyard-launch) | In-container entrypoint |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use shipyard::ShipyardConfig;
//! use shipyard::build::{BuildPlan, DockerfileGenerator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ShipyardConfig::load(Path::new("."))?;
//! let plan = BuildPlan::from_config(&config)?;
//! let dockerfile = DockerfileGenerator::new(&plan).render();
//! # Ok(())
//! # }
//! ```

// Core types flattened into root namespace for convenience.
#[cfg(feature = "core")]
pub use shipyard_core::*;

/// Build plan, Dockerfile rendering, bundling, and eject.
#[cfg(feature = "build")]
pub mod build {
    pub use shipyard_build::*;
}

/// Docker CLI operations.
#[cfg(feature = "docker")]
pub mod docker {
    pub use shipyard_docker::*;
}

/// Container entrypoint: runtime port resolution and server hand-off.
///
/// **Requires** the `launch` feature flag (not enabled by default).
#[cfg(feature = "launch")]
pub mod launch {
    pub use shipyard_launch::*;
}
