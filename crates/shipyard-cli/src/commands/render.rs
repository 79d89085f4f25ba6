use std::path::Path;

pub fn render() -> anyhow::Result<()> {
    let project_dir = Path::new(".");
    let config = super::load_config(project_dir)?;
    let plan = shipyard_build::BuildPlan::from_config(&config)?;

    let dockerfile = super::dockerfile_for(project_dir, &plan)?;
    if dockerfile.ejected {
        eprintln!("Using ejected Dockerfile from .shipyard/Dockerfile");
    }
    print!("{}", dockerfile.content);
    Ok(())
}
