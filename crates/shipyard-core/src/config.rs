use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{AppTarget, ImageRef, Port};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "shipyard.toml";

/// shipyard.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipyardConfig {
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image name used for tagging (defaults to the project directory name)
    pub name: Option<String>,
    /// Pinned language-runtime base image
    #[serde(default = "default_base_image")]
    pub base_image: String,
    /// Absolute working directory inside the image
    #[serde(default = "default_workdir")]
    pub workdir: String,
    /// Dependency manifest, relative to the project directory
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Application source tree, relative to the project directory
    #[serde(default = "default_source")]
    pub source: String,
    /// Where the source tree lands, relative to `workdir`
    #[serde(default = "default_source")]
    pub destination: String,
    /// Install command; the staged manifest path is appended as the last argument
    #[serde(default = "default_install_command")]
    pub install_command: Vec<String>,
    /// Static environment variables baked into the image as ENV directives
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// How the container's start command is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LauncherKind {
    /// Ship the shipyard binary and start through `shipyard launch`
    #[default]
    Embedded,
    /// Start through `sh -c` with shell expansion of the port variable
    Shell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// ASGI server executable
    #[serde(default = "default_server_command")]
    pub command: String,
    /// Application object as `<module>:<attribute>`
    #[serde(default = "default_app")]
    pub app: String,
    /// Directory the server starts in, relative to the image workdir
    #[serde(default)]
    pub app_dir: Option<String>,
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Environment variable holding the listen port
    #[serde(default = "default_port_env")]
    pub port_env: String,
    /// Listen port when `port_env` is unset
    #[serde(default)]
    pub default_port: Port,
    #[serde(default)]
    pub launcher: LauncherKind,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            name: None,
            base_image: default_base_image(),
            workdir: default_workdir(),
            manifest: default_manifest(),
            source: default_source(),
            destination: default_source(),
            install_command: default_install_command(),
            env: BTreeMap::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: default_server_command(),
            app: default_app(),
            app_dir: None,
            host: default_host(),
            port_env: default_port_env(),
            default_port: Port::DEFAULT,
            launcher: LauncherKind::default(),
        }
    }
}

impl ShipyardConfig {
    /// Load from shipyard.toml in the given directory, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            let config = toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path.clone(),
                source: e,
            })?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Check every value the build and the launcher depend on.
    ///
    /// Called before anything is rendered or built, so a bad value stops
    /// the pipeline before the first stage runs.
    pub fn validate(&self) -> crate::Result<()> {
        self.image.validate()?;
        self.server.validate()
    }

    /// Image name for tagging, falling back to the project directory name.
    pub fn image_name(&self, project_dir: &Path) -> String {
        if let Some(name) = &self.image.name {
            return name.clone();
        }
        project_dir
            .canonicalize()
            // arch-lint: allow(no-silent-result-drop) reason="an unresolvable directory falls back to the generic image name"
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_lowercase()))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "app".to_owned())
    }
    /// Host directory that ends up as the server's working directory in
    /// the image, so the entry module can be checked before building.
    ///
    /// The source tree lands at `destination`; a start directory outside
    /// it is taken relative to the project directory.
    pub fn local_app_root(&self, project_dir: &Path) -> PathBuf {
        let app_dir = without_cur_dir(Path::new(self.server.app_dir.as_deref().unwrap_or(".")));
        let destination = without_cur_dir(Path::new(&self.image.destination));

        if app_dir.starts_with(&destination) {
            let rest: PathBuf = app_dir
                .components()
                .skip(destination.components().count())
                .collect();
            project_dir.join(without_cur_dir(Path::new(&self.image.source))).join(rest)
        } else {
            project_dir.join(app_dir)
        }
    }
}

impl ImageConfig {
    pub fn base_image_ref(&self) -> crate::Result<ImageRef> {
        ImageRef::parse(&self.base_image)
    }

    fn validate(&self) -> crate::Result<()> {
        let base = self.base_image_ref()?;
        if !base.is_pinned() {
            return Err(crate::Error::UnpinnedImage(self.base_image.clone()));
        }

        if !self.workdir.starts_with('/') {
            return Err(crate::Error::InvalidPath {
                field: "image.workdir",
                path: self.workdir.clone(),
                reason: "must be an absolute path",
            });
        }
        if self.workdir.chars().any(char::is_whitespace) {
            return Err(crate::Error::InvalidPath {
                field: "image.workdir",
                path: self.workdir.clone(),
                reason: "must not contain whitespace",
            });
        }

        check_relative("image.manifest", &self.manifest)?;
        check_relative("image.source", &self.source)?;
        check_relative("image.destination", &self.destination)?;

        if self.install_command.is_empty() {
            return Err(crate::Error::InvalidConfig {
                field: "image.install_command",
                reason: "must name the install program".to_owned(),
            });
        }

        if let Some(key) = self.env.keys().find(|k| !is_env_name(k)) {
            return Err(crate::Error::InvalidConfig {
                field: "image.env",
                reason: format!("{key:?} is not a valid environment variable name"),
            });
        }

        Ok(())
    }
}

impl ServerConfig {
    pub fn app_target(&self) -> crate::Result<AppTarget> {
        AppTarget::parse(&self.app)
    }

    pub fn host_addr(&self) -> crate::Result<IpAddr> {
        self.host
            .parse()
            .map_err(|e: std::net::AddrParseError| crate::Error::InvalidConfig {
                field: "server.host",
                reason: e.to_string(),
            })
    }

    fn validate(&self) -> crate::Result<()> {
        if self.command.trim().is_empty() {
            return Err(crate::Error::InvalidConfig {
                field: "server.command",
                reason: "must not be empty".to_owned(),
            });
        }
        self.app_target()?;
        self.host_addr()?;

        if !is_env_name(&self.port_env) {
            return Err(crate::Error::InvalidConfig {
                field: "server.port_env",
                reason: format!("{:?} is not a valid environment variable name", self.port_env),
            });
        }

        if let Some(dir) = &self.app_dir {
            check_relative("server.app_dir", dir)?;
        }
        Ok(())
    }
}

/// Paths copied into or resolved inside the image must stay below their root.
fn check_relative(field: &'static str, path: &str) -> crate::Result<()> {
    let invalid = |reason| crate::Error::InvalidPath {
        field,
        path: path.to_owned(),
        reason,
    };

    if path.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if path.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    let p = Path::new(path);
    if p.is_absolute() {
        return Err(invalid("must be relative"));
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(invalid("must not contain `..`"));
    }
    Ok(())
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn default_base_image() -> String {
    "python:3.12-slim".to_owned()
}

fn default_workdir() -> String {
    "/code".to_owned()
}

fn default_manifest() -> String {
    "requirements.txt".to_owned()
}

fn default_source() -> String {
    ".".to_owned()
}

fn default_install_command() -> Vec<String> {
    ["pip", "install", "--no-cache-dir", "--upgrade", "-r"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

fn default_server_command() -> String {
    "uvicorn".to_owned()
}

fn default_app() -> String {
    "main:app".to_owned()
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

fn default_port_env() -> String {
    "PORT".to_owned()
}
