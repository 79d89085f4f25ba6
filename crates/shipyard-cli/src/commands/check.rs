use shipyard_build::BuildPlan;
use shipyard_core::config::CONFIG_FILE;
use shipyard_core::{DependencyManifest, ShipyardConfig};
use std::path::{Path, PathBuf};

/// Everything `build` needs from the project, checked up front.
pub(crate) struct ProjectCheck {
    pub config: ShipyardConfig,
    pub plan: BuildPlan,
    pub manifest: DependencyManifest,
    pub entry_module: PathBuf,
}

pub(crate) fn inspect_project(project_dir: &Path) -> anyhow::Result<ProjectCheck> {
    let config = super::load_config(project_dir)?;
    let plan = BuildPlan::from_config(&config)?;

    let manifest = DependencyManifest::load(&project_dir.join(&config.image.manifest))?;

    let app = config.server.app_target()?;
    let entry_module = app.resolve(&config.local_app_root(project_dir))?;

    Ok(ProjectCheck {
        config,
        plan,
        manifest,
        entry_module,
    })
}

pub fn check() -> anyhow::Result<()> {
    let project_dir = Path::new(".");
    let project = inspect_project(project_dir)?;
    let config = &project.config;

    let source = if project_dir.join(CONFIG_FILE).exists() {
        CONFIG_FILE
    } else {
        "defaults (no shipyard.toml)"
    };

    println!("Config:      {source}");
    println!("Base image:  {}", config.image.base_image);
    println!("Workdir:     {}", config.image.workdir);
    println!(
        "Manifest:    {} ({} requirement(s))",
        config.image.manifest,
        project.manifest.requirements().count()
    );
    println!("Entry:       {} -> {}", config.server.app, project.entry_module.display());
    println!(
        "Listen:      {}:${} (default {})",
        config.server.host, config.server.port_env, config.server.default_port
    );
    println!("Stages:      {}", project.plan.stages().len());
    if project.plan.needs_launcher()
        && project.plan.base_image().is_some_and(|image| image.is_musl_based())
    {
        println!();
        println!(
            "Note: {} uses musl libc; `shipyard build` needs --launcher with a static musl build.",
            config.image.base_image
        );
    }
    println!();
    println!("All checks passed.");

    Ok(())
}
