mod build;
mod check;
mod clean;
mod doctor;
mod eject;
mod init;
mod launch;
mod render;
mod run;

use shipyard_build::{BuildPlan, DockerfileGenerator, eject as eject_mod};
use shipyard_core::ShipyardConfig;
use std::path::Path;

pub use build::{BuildOptions, build};
pub use check::check;
pub use clean::clean;
pub use doctor::doctor;
pub use eject::eject;
pub use init::init_project;
pub use launch::{LaunchArgs, launch};
pub use render::render;
pub use run::run;

/// Load shipyard.toml and reject anything the build or launcher can't use.
pub(crate) fn load_config(project_dir: &Path) -> anyhow::Result<ShipyardConfig> {
    let config = ShipyardConfig::load(project_dir)?;
    config.validate()?;
    Ok(config)
}

/// Tag used when `--tag` is not given.
pub(crate) fn default_tag(config: &ShipyardConfig, project_dir: &Path) -> String {
    format!("{}:latest", config.image_name(project_dir))
}

/// Dockerfile `build` uses: the ejected one if present, otherwise generated.
pub(crate) struct Dockerfile {
    pub content: String,
    pub ejected: bool,
}

pub(crate) fn dockerfile_for(project_dir: &Path, plan: &BuildPlan) -> anyhow::Result<Dockerfile> {
    if eject_mod::is_ejected(project_dir) {
        Ok(Dockerfile {
            content: eject_mod::load_ejected_dockerfile(project_dir)?,
            ejected: true,
        })
    } else {
        Ok(Dockerfile {
            content: DockerfileGenerator::new(plan).render(),
            ejected: false,
        })
    }
}
