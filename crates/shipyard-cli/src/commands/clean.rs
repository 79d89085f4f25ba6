use shipyard_build::bundle;
use shipyard_docker::DockerClient;
use std::io::Write;
use std::path::Path;

/// Delete the local bundle and the built image.
pub async fn clean(skip_confirm: bool) -> anyhow::Result<()> {
    let project_dir = Path::new(".");
    let config = super::load_config(project_dir)?;
    let tag = super::default_tag(&config, project_dir);

    if !skip_confirm {
        println!("This will delete:");
        println!("  - Local {}/", bundle::BUNDLE_DIR);
        println!("  - Image {tag}");
        println!();
        print!("Are you sure? [y/N] ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !matches!(input.trim(), "y" | "Y" | "yes" | "YES") {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 1. Local bundle
    if bundle::remove_bundle(project_dir)? {
        println!("Removed local {}/", bundle::BUNDLE_DIR);
    }

    // 2. Image
    let client = DockerClient::new();
    if client.image_exists(&tag).await {
        println!("Deleting image {tag}...");
        match client.remove_image(&tag).await {
            Ok(()) => println!("  Deleted."),
            Err(e) => println!("  Skipped ({e})"),
        }
    }

    println!();
    println!("Clean complete.");
    Ok(())
}
