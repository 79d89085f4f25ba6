//! Image build plan, Dockerfile generation, build-context bundling, and
//! eject for shipyard.
//!
//! # Build pipeline
//!
//! ```text
//! shipyard build
//!   1. Dirty check  ── git status --porcelain (skip with --allow-dirty)
//!   2. Validate     ── shipyard.toml, manifest syntax, entry module
//!   3. Plan         ── BuildPlan::from_config()
//!   4. Dockerfile   ── DockerfileGenerator::render() (or .shipyard/Dockerfile)
//!   5. Bundle       ── git ls-files → .shipyard-bundle/context/
//!   6. Image        ── docker build
//! ```
//!
//! # Stage order
//!
//! The rendered Dockerfile always follows the [`plan`] order: base image,
//! working directory, manifest, install, source, entrypoint. Only the
//! manifest is copied before dependencies are installed.

pub mod bundle;
pub mod dockerfile;
pub mod eject;
pub mod plan;

pub use bundle::{Bundle, BundleSpec};
pub use dockerfile::DockerfileGenerator;
pub use plan::{BuildPlan, Entrypoint, Stage};
