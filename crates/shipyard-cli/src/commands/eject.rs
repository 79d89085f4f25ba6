use shipyard_build::{BuildPlan, DockerfileGenerator};
use std::path::Path;

pub fn eject() -> anyhow::Result<()> {
    let project_dir = Path::new(".");
    let config = super::load_config(project_dir)?;
    let plan = BuildPlan::from_config(&config)?;

    let dockerfile = DockerfileGenerator::new(&plan).render();
    let path = shipyard_build::eject::eject(project_dir, &dockerfile)?;

    println!("Ejected Dockerfile to {}", path.display());
    println!("You can now edit it directly. shipyard build will use this file.");
    Ok(())
}
