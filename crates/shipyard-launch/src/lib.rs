//! Container entrypoint for shipyard images.
//!
//! Reads the listen port from the environment once at start, checks that
//! the entry module is present, then hands the process over to the ASGI
//! server with the port as its own argument.
//!
//! ```no_run
//! use shipyard_core::{AppTarget, Port};
//! use shipyard_launch::{LaunchSpec, Launcher, RuntimeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = RuntimeConfig::load("PORT", Port::DEFAULT)?;
//! let spec = LaunchSpec {
//!     server: "uvicorn".to_owned(),
//!     app: AppTarget::parse("main:app")?,
//!     host: "0.0.0.0".parse()?,
//!     app_dir: None,
//!     root: std::env::current_dir()?,
//! };
//! let command = Launcher::new(spec, runtime).prepare()?;
//! command.exec()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod launcher;
pub mod runtime;

pub use error::LaunchError;
pub use launcher::{LaunchSpec, Launcher, ServerCommand};
pub use runtime::RuntimeConfig;
