use shipyard_core::Port;
use shipyard_docker::{DockerClient, RunOptions};
use std::path::Path;

/// Run the built image in the foreground.
pub async fn run(
    tag: Option<String>,
    port: Option<Port>,
    host_port: Option<Port>,
) -> anyhow::Result<()> {
    let project_dir = Path::new(".");
    let config = super::load_config(project_dir)?;
    let tag = tag.unwrap_or_else(|| super::default_tag(&config, project_dir));

    let client = DockerClient::new();
    client.check_prerequisites().await?;

    if !client.image_exists(&tag).await {
        anyhow::bail!("image {tag} not found. Run `shipyard build --tag {tag}` first.");
    }

    let options = RunOptions {
        port,
        default_port: config.server.default_port,
        host_port,
        port_env: config.server.port_env.clone(),
    };
    let container_port = port.unwrap_or(config.server.default_port);
    let published = host_port.unwrap_or(container_port);
    println!("Starting {tag} on http://localhost:{published} (container port {container_port})");

    client.run_container(&tag, &options).await?;
    Ok(())
}
