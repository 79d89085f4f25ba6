use shipyard_core::config::CONFIG_FILE;
use shipyard_core::{DependencyManifest, ShipyardConfig};
use shipyard_docker::{CheckResult, DockerClient};
use std::path::Path;

pub async fn doctor() -> anyhow::Result<()> {
    let project_dir = Path::new(".");

    let client = DockerClient::new();
    let mut report = client.doctor().await;

    // Config file check
    let config = match ShipyardConfig::load(project_dir).and_then(|c| c.validate().map(|()| c)) {
        Ok(config) => {
            report.config_file = if project_dir.join(CONFIG_FILE).exists() {
                CheckResult::ok("Found")
            } else {
                CheckResult::ok("Not found, using defaults")
            };
            Some(config)
        }
        Err(e) => {
            report.config_file = CheckResult::fail(&e.to_string());
            None
        }
    };

    if let Some(config) = &config {
        let manifest_path = project_dir.join(&config.image.manifest);
        report.manifest = match DependencyManifest::load(&manifest_path) {
            Ok(m) => CheckResult::ok(&format!(
                "{} ({} requirement(s))",
                config.image.manifest,
                m.requirements().count()
            )),
            Err(e) => CheckResult::fail(&e.to_string()),
        };

        report.entry_module = match config
            .server
            .app_target()
            .and_then(|app| app.resolve(&config.local_app_root(project_dir)))
        {
            Ok(path) => CheckResult::ok(&path.display().to_string()),
            Err(e) => CheckResult::fail(&e.to_string()),
        };
    } else {
        report.manifest = CheckResult::fail("skipped, config invalid");
        report.entry_module = CheckResult::fail("skipped, config invalid");
    }

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed, see above for details");
    }

    Ok(())
}
