use shipyard_core::{Error, LauncherKind, Port, ShipyardConfig};
use tempfile::TempDir;

#[test]
fn load_returns_defaults_when_no_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = ShipyardConfig::load(tmp.path()).unwrap();

    assert!(config.image.name.is_none());
    assert_eq!(config.image.base_image, "python:3.12-slim");
    assert_eq!(config.image.workdir, "/code");
    assert_eq!(config.image.manifest, "requirements.txt");
    assert_eq!(config.image.source, ".");
    assert_eq!(config.image.destination, ".");
    assert_eq!(
        config.image.install_command,
        vec!["pip", "install", "--no-cache-dir", "--upgrade", "-r"]
    );
    assert!(config.image.env.is_empty());
    assert_eq!(config.server.command, "uvicorn");
    assert_eq!(config.server.app, "main:app");
    assert!(config.server.app_dir.is_none());
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port_env, "PORT");
    assert_eq!(config.server.default_port, Port::DEFAULT);
    assert_eq!(config.server.launcher, LauncherKind::Embedded);
    config.validate().unwrap();
}

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[image]
name = "blog-api"
base_image = "python:3.11.9-slim-bookworm"
workdir = "/srv"
manifest = "app/requirements.txt"
source = "app"
destination = "app"
install_command = ["pip", "install", "--no-cache-dir", "-r"]

[image.env]
PYTHONUNBUFFERED = "1"

[server]
command = "hypercorn"
app = "blog.main:app"
app_dir = "app"
host = "::"
port_env = "APP_PORT"
default_port = 9000
launcher = "shell"
"#;
    std::fs::write(tmp.path().join("shipyard.toml"), toml).unwrap();

    let config = ShipyardConfig::load(tmp.path()).unwrap();

    assert_eq!(config.image.name.as_deref(), Some("blog-api"));
    assert_eq!(config.image.base_image, "python:3.11.9-slim-bookworm");
    assert_eq!(config.image.workdir, "/srv");
    assert_eq!(config.image.manifest, "app/requirements.txt");
    assert_eq!(config.image.source, "app");
    assert_eq!(config.image.destination, "app");
    assert_eq!(config.image.install_command.len(), 4);
    assert_eq!(config.image.env["PYTHONUNBUFFERED"], "1");
    assert_eq!(config.server.command, "hypercorn");
    assert_eq!(config.server.app, "blog.main:app");
    assert_eq!(config.server.app_dir.as_deref(), Some("app"));
    assert_eq!(config.server.host, "::");
    assert_eq!(config.server.port_env, "APP_PORT");
    assert_eq!(config.server.default_port.get(), 9000);
    assert_eq!(config.server.launcher, LauncherKind::Shell);
    config.validate().unwrap();
}

#[test]
fn load_partial_config_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[server]
app_dir = "app"
"#;
    std::fs::write(tmp.path().join("shipyard.toml"), toml).unwrap();

    let config = ShipyardConfig::load(tmp.path()).unwrap();

    assert_eq!(config.server.app_dir.as_deref(), Some("app"));
    assert_eq!(config.server.app, "main:app");
    assert_eq!(config.image.base_image, "python:3.12-slim");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("shipyard.toml"), "not valid {{{{ toml").unwrap();

    let err = ShipyardConfig::load(tmp.path()).unwrap_err().to_string();
    assert!(err.contains("parse"));
}

#[test]
fn load_rejects_zero_default_port() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("shipyard.toml"),
        "[server]\ndefault_port = 0\n",
    )
    .unwrap();

    assert!(matches!(
        ShipyardConfig::load(tmp.path()),
        Err(Error::ConfigParse { .. })
    ));
}

#[test]
fn load_empty_config_returns_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("shipyard.toml"), "").unwrap();

    let config = ShipyardConfig::load(tmp.path()).unwrap();
    assert_eq!(config.server.default_port.get(), 8000);
}

// ── Validation ──

#[test]
fn validate_rejects_floating_base_image() {
    for image in ["python", "python:latest", "docker.io/library/python:latest"] {
        let mut config = ShipyardConfig::default();
        config.image.base_image = image.to_owned();
        assert!(
            matches!(config.validate(), Err(Error::UnpinnedImage(_))),
            "{image} should be rejected"
        );
    }
}

#[test]
fn validate_accepts_digest_pinned_latest() {
    let mut config = ShipyardConfig::default();
    config.image.base_image = "python:latest@sha256:0123abcd".to_owned();
    config.validate().unwrap();
}

#[test]
fn validate_rejects_relative_workdir() {
    let mut config = ShipyardConfig::default();
    config.image.workdir = "code".to_owned();
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("image.workdir"), "got: {err}");
}

#[test]
fn validate_rejects_escaping_paths() {
    let mut config = ShipyardConfig::default();
    config.image.manifest = "../requirements.txt".to_owned();
    assert!(matches!(
        config.validate(),
        Err(Error::InvalidPath { field: "image.manifest", .. })
    ));

    let mut config = ShipyardConfig::default();
    config.server.app_dir = Some("/abs".to_owned());
    assert!(matches!(
        config.validate(),
        Err(Error::InvalidPath { field: "server.app_dir", .. })
    ));
}

#[test]
fn validate_rejects_bad_server_values() {
    let mut config = ShipyardConfig::default();
    config.server.host = "localhost".to_owned();
    assert!(config.validate().is_err());

    let mut config = ShipyardConfig::default();
    config.server.port_env = "MY-PORT".to_owned();
    assert!(config.validate().is_err());

    let mut config = ShipyardConfig::default();
    config.server.app = "main".to_owned();
    assert!(matches!(
        config.validate(),
        Err(Error::InvalidAppTarget { .. })
    ));

    let mut config = ShipyardConfig::default();
    config.image.install_command.clear();
    assert!(config.validate().is_err());
}

#[test]
fn image_name_prefers_config() {
    let tmp = TempDir::new().unwrap();
    let mut config = ShipyardConfig::default();
    config.image.name = Some("blog-api".to_owned());
    assert_eq!(config.image_name(tmp.path()), "blog-api");
}

#[test]
fn image_name_falls_back_to_directory_name() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("My-Service");
    std::fs::create_dir(&dir).unwrap();

    let config = ShipyardConfig::default();
    assert_eq!(config.image_name(&dir), "my-service");
}

#[test]
fn local_app_root_defaults_to_project_dir() {
    let project = std::path::Path::new("/work/blog");
    let config = ShipyardConfig::default();
    assert_eq!(config.local_app_root(project), project);
}

#[test]
fn local_app_root_maps_app_dir_through_source_tree() {
    let project = std::path::Path::new("/work/blog");
    let mut config = ShipyardConfig::default();
    config.image.source = "src".to_owned();
    config.image.destination = "code".to_owned();
    config.server.app_dir = Some("code/api".to_owned());

    assert_eq!(config.local_app_root(project), project.join("src/api"));
}

#[test]
fn local_app_root_outside_destination_is_project_relative() {
    let project = std::path::Path::new("/work/blog");
    let mut config = ShipyardConfig::default();
    config.image.destination = "app".to_owned();
    config.server.app_dir = Some("./other".to_owned());

    assert_eq!(config.local_app_root(project), project.join("other"));
}
