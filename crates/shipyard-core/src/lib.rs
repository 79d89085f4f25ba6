//! Core types and configuration for shipyard.
//!
//! This crate defines the `shipyard.toml` schema ([`ShipyardConfig`]),
//! the validated value types shared by the builder and the launcher
//! ([`Port`], [`ImageRef`], [`AppTarget`]), the dependency manifest
//! reader ([`DependencyManifest`]), and shared error types.

pub mod config;
pub mod entry;
pub mod error;
pub mod image;
pub mod manifest;
pub mod port;

pub use config::{ImageConfig, LauncherKind, ServerConfig, ShipyardConfig};
pub use entry::AppTarget;
pub use error::{Error, Result};
pub use image::ImageRef;
pub use manifest::{DependencyManifest, ManifestEntry};
pub use port::{Port, PortError};
