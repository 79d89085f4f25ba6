//! The ordered image build stages.
//!
//! ```text
//! 1. Base        FROM <pinned base image>
//! 2. Workdir     WORKDIR <absolute path>  (+ static ENV)
//! 3. Manifest    COPY <manifest> ./<file name>
//! 4. Install     RUN <install command> <file name>
//! 5. Source      COPY <source tree> <destination>
//! 6. Entrypoint  ENV <port var>=<default>, EXPOSE, CMD
//! ```
//!
//! Stages 3 and 4 only ever see the manifest, so a change confined to the
//! source tree leaves every instruction before stage 5 untouched and the
//! install layer reusable.

use std::net::IpAddr;
use std::path::Path;

use shipyard_core::{AppTarget, ImageRef, LauncherKind, Port, ShipyardConfig};

/// Where the embedded launcher is installed inside the image.
pub const LAUNCHER_PATH: &str = "/usr/local/bin/shipyard";

/// Name of the extra build context the embedded launcher is copied from.
pub const LAUNCHER_CONTEXT: &str = "shipyard-launcher";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Base {
        image: ImageRef,
    },
    Workdir {
        path: String,
        env: Vec<(String, String)>,
    },
    StageManifest {
        /// Manifest path relative to the build context
        source: String,
        /// File name inside the working directory
        target: String,
    },
    InstallDependencies {
        /// Install program and arguments, staged manifest last
        command: Vec<String>,
    },
    StageSource {
        source: String,
        destination: String,
    },
    Entrypoint(Entrypoint),
}

impl Stage {
    /// 1-based position in the build order.
    pub fn rank(&self) -> usize {
        match self {
            Stage::Base { .. } => 1,
            Stage::Workdir { .. } => 2,
            Stage::StageManifest { .. } => 3,
            Stage::InstallDependencies { .. } => 4,
            Stage::StageSource { .. } => 5,
            Stage::Entrypoint(_) => 6,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Base { .. } => "Base image",
            Stage::Workdir { .. } => "Working directory",
            Stage::StageManifest { .. } => "Dependency manifest",
            Stage::InstallDependencies { .. } => "Install dependencies",
            Stage::StageSource { .. } => "Application code",
            Stage::Entrypoint(_) => "Entrypoint",
        }
    }

    /// Build-context paths this stage reads.
    pub fn context_inputs(&self) -> Vec<&str> {
        match self {
            Stage::StageManifest { source, .. } => vec![source.as_str()],
            Stage::StageSource { source, .. } => vec![source.as_str()],
            _ => Vec::new(),
        }
    }
}

/// How the container process is started.
///
/// The listen port is never part of the start command itself: it is read
/// from `port_env` when the container starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrypoint {
    pub launcher: LauncherKind,
    pub server: String,
    pub app: AppTarget,
    pub host: IpAddr,
    pub app_dir: Option<String>,
    pub port_env: String,
    pub default_port: Port,
}

impl Entrypoint {
    /// Exec-form start command.
    pub fn command(&self) -> Vec<String> {
        match self.launcher {
            LauncherKind::Embedded => {
                let mut cmd = vec![
                    LAUNCHER_PATH.to_owned(),
                    "launch".to_owned(),
                    "--server".to_owned(),
                    self.server.clone(),
                    "--app".to_owned(),
                    self.app.to_string(),
                    "--host".to_owned(),
                    self.host.to_string(),
                    "--port-env".to_owned(),
                    self.port_env.clone(),
                    "--default-port".to_owned(),
                    self.default_port.to_string(),
                ];
                if let Some(dir) = &self.app_dir {
                    cmd.push("--app-dir".to_owned());
                    cmd.push(dir.clone());
                }
                cmd
            }
            LauncherKind::Shell => {
                let cd = self
                    .app_dir
                    .as_deref()
                    .map(|dir| format!("cd {} && ", shell_quote(dir)))
                    .unwrap_or_default();
                // Unset and empty both fall back to the default, as in `launch`.
                let script = format!(
                    "{cd}exec {server} {app} --host {host} --port \"${{{var}:-{default}}}\"",
                    server = shell_quote(&self.server),
                    app = self.app,
                    host = self.host,
                    var = self.port_env,
                    default = self.default_port,
                );
                vec!["sh".to_owned(), "-c".to_owned(), script]
            }
        }
    }
}

/// The full, validated stage sequence for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    stages: Vec<Stage>,
}

impl BuildPlan {
    /// Validate `config` and lay out the stages in build order.
    pub fn from_config(config: &ShipyardConfig) -> shipyard_core::Result<Self> {
        config.validate()?;

        let image = &config.image;
        let server = &config.server;

        let manifest_file = Path::new(&image.manifest)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| shipyard_core::Error::InvalidPath {
                field: "image.manifest",
                path: image.manifest.clone(),
                reason: "must name a file",
            })?;

        let mut install = image.install_command.clone();
        install.push(manifest_file.clone());

        let stages = vec![
            Stage::Base {
                image: image.base_image_ref()?,
            },
            Stage::Workdir {
                path: image.workdir.clone(),
                env: image
                    .env
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            },
            Stage::StageManifest {
                source: image.manifest.clone(),
                target: manifest_file,
            },
            Stage::InstallDependencies { command: install },
            Stage::StageSource {
                source: image.source.clone(),
                destination: image.destination.clone(),
            },
            Stage::Entrypoint(Entrypoint {
                launcher: server.launcher,
                server: server.command.clone(),
                app: server.app_target()?,
                host: server.host_addr()?,
                app_dir: server.app_dir.clone(),
                port_env: server.port_env.clone(),
                default_port: server.default_port,
            }),
        ];

        tracing::debug!(
            base = %image.base_image,
            manifest = %image.manifest,
            launcher = ?server.launcher,
            "build plan ready"
        );
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn base_image(&self) -> Option<&ImageRef> {
        self.stages.iter().find_map(|s| match s {
            Stage::Base { image } => Some(image),
            _ => None,
        })
    }

    pub fn entrypoint(&self) -> Option<&Entrypoint> {
        self.stages.iter().find_map(|s| match s {
            Stage::Entrypoint(e) => Some(e),
            _ => None,
        })
    }

    /// Whether the image needs the launcher build context.
    pub fn needs_launcher(&self) -> bool {
        self.entrypoint()
            .is_some_and(|e| e.launcher == LauncherKind::Embedded)
    }

    /// Every build-context path read before the source tree is copied.
    ///
    /// This is exactly the dependency manifest.
    pub fn inputs_before_source(&self) -> Vec<&str> {
        self.stages
            .iter()
            .take_while(|s| !matches!(s, Stage::StageSource { .. }))
            .flat_map(Stage::context_inputs)
            .collect()
    }
}

/// Single-quote `s` for `sh`, unless it is made of plainly safe characters.
fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':'));
    if safe {
        s.to_owned()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("app"), "app");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("a;b"), "'a;b'");
    }

    #[test]
    fn stages_are_in_rank_order() {
        let plan = BuildPlan::from_config(&ShipyardConfig::default()).unwrap();
        let ranks: Vec<_> = plan.stages().iter().map(Stage::rank).collect();
        assert_eq!(ranks, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn base_image_comes_from_first_stage() {
        let mut config = ShipyardConfig::default();
        config.image.base_image = "python:3.12-alpine".to_owned();
        let plan = BuildPlan::from_config(&config).unwrap();

        let base = plan.base_image().unwrap();
        assert_eq!(base.to_string(), "python:3.12-alpine");
        assert!(base.is_musl_based());
    }
}
