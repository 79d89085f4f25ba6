use shipyard_core::{AppTarget, Port};
use shipyard_launch::{LaunchError, LaunchSpec, Launcher, RuntimeConfig};
use std::path::Path;
use tempfile::TempDir;

fn spec(root: &Path, app: &str, app_dir: Option<&str>) -> LaunchSpec {
    LaunchSpec {
        server: "uvicorn".to_owned(),
        app: AppTarget::parse(app).unwrap(),
        host: "0.0.0.0".parse().unwrap(),
        app_dir: app_dir.map(Into::into),
        root: root.to_path_buf(),
    }
}

fn runtime(port: Option<&str>) -> RuntimeConfig {
    let port = port.map(str::to_owned);
    RuntimeConfig::from_lookup("PORT", Port::DEFAULT, move |_| port.clone()).unwrap()
}

fn project_with_main() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("main.py"), "app = object()\n").unwrap();
    tmp
}

#[test]
fn default_port_when_unset() {
    let tmp = project_with_main();
    let command = Launcher::new(spec(tmp.path(), "main:app", None), runtime(None))
        .prepare()
        .unwrap();

    assert_eq!(command.program, "uvicorn");
    assert_eq!(
        command.args,
        ["main:app", "--host", "0.0.0.0", "--port", "8000"]
    );
    assert_eq!(command.current_dir, tmp.path());
}

#[test]
fn port_from_environment_is_passed_as_its_own_argument() {
    let tmp = project_with_main();
    let command = Launcher::new(spec(tmp.path(), "main:app", None), runtime(Some("9001")))
        .prepare()
        .unwrap();

    let port_flag = command.args.iter().position(|a| a == "--port").unwrap();
    assert_eq!(command.args[port_flag + 1], "9001");
    assert_eq!(
        command.to_string(),
        "uvicorn main:app --host 0.0.0.0 --port 9001"
    );
}

#[test]
fn invalid_port_fails_before_launch() {
    let result = RuntimeConfig::from_lookup("PORT", Port::DEFAULT, |_| Some("http".to_owned()));
    let err = result.unwrap_err();

    assert!(matches!(err, LaunchError::InvalidPort { .. }));
    assert!(err.to_string().contains("PORT=\"http\""));
}

#[test]
fn missing_entry_module_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let err = Launcher::new(spec(tmp.path(), "main:app", None), runtime(None))
        .prepare()
        .unwrap_err();

    assert!(matches!(
        err,
        LaunchError::Entry(shipyard_core::Error::EntryModuleNotFound { .. })
    ));
    assert!(err.to_string().contains("main"));
}

#[test]
fn package_entry_module_resolves() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("blog")).unwrap();
    std::fs::write(tmp.path().join("blog/__init__.py"), "").unwrap();

    let command = Launcher::new(spec(tmp.path(), "blog:app", None), runtime(None))
        .prepare()
        .unwrap();

    assert_eq!(command.args[0], "blog:app");
}

#[test]
fn app_dir_sets_working_directory() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("src/api")).unwrap();
    std::fs::write(tmp.path().join("src/api/server.py"), "").unwrap();

    let command = Launcher::new(spec(tmp.path(), "api.server:app", Some("src")), runtime(None))
        .prepare()
        .unwrap();

    assert_eq!(command.current_dir, tmp.path().join("src"));
    assert_eq!(command.to_command().get_current_dir(), Some(tmp.path().join("src").as_path()));
}

#[test]
fn missing_app_dir_is_fatal() {
    let tmp = project_with_main();
    let err = Launcher::new(spec(tmp.path(), "main:app", Some("nope")), runtime(None))
        .prepare()
        .unwrap_err();

    assert!(matches!(err, LaunchError::MissingDirectory { .. }));
}

#[test]
fn to_command_keeps_argv_unsplit() {
    let tmp = project_with_main();
    let mut launch_spec = spec(tmp.path(), "main:app", None);
    launch_spec.host = "::".parse().unwrap();

    let command = Launcher::new(launch_spec, runtime(Some(" 8080 ")))
        .prepare()
        .unwrap()
        .to_command();

    let args: Vec<_> = command.get_args().map(|a| a.to_str().unwrap()).collect();
    assert_eq!(command.get_program(), "uvicorn");
    assert_eq!(args, ["main:app", "--host", "::", "--port", "8080"]);
}
