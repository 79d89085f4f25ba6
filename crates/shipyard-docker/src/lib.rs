//! Docker CLI operations for shipyard.
//!
//! Every call goes through [`DockerExecutor`], so the client can be driven
//! by a mock in tests.

pub mod client;
pub mod docker;
pub mod executor;

pub use client::{
    BuildError, BuildRequest, CheckResult, DockerClient, DoctorReport, ImageError,
    ImageRuntimeConfig, ImageSummary, PreflightError, PreflightReport, RunError, RunOptions,
};
pub use docker::DockerError;
pub use executor::{DockerExecutor, RealExecutor};
