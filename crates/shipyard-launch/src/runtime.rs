use shipyard_core::Port;

use crate::error::LaunchError;

/// Settings read from the environment when the container starts.
///
/// Resolved exactly once; nothing re-reads the environment afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub port: Port,
}

impl RuntimeConfig {
    /// Loads an optional `.env`, then reads `port_env` from the process
    /// environment.
    pub fn load(port_env: &str, default: Port) -> Result<Self, LaunchError> {
        let dotenv_loaded = dotenvy::dotenv().is_ok();
        tracing::debug!(dotenv = dotenv_loaded, port_env, "loading runtime config");

        Self::from_lookup(port_env, default, |key| {
            std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
        })
    }

    /// Resolves the port through `lookup`.
    ///
    /// Unset or blank falls back to `default`. Anything else must parse as
    /// a port, or start-up fails.
    pub fn from_lookup<F>(port_env: &str, default: Port, lookup: F) -> Result<Self, LaunchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(port_env) {
            Some(raw) if !raw.trim().is_empty() => {
                raw.parse::<Port>().map_err(|e| LaunchError::InvalidPort {
                    var: port_env.to_owned(),
                    value: raw.clone(),
                    source: e,
                })?
            }
            _ => {
                tracing::debug!(port_env, %default, "port not set, using default");
                default
            }
        };

        tracing::info!(%port, "resolved listen port");
        Ok(Self { port })
    }
}
