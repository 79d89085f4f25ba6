use shipyard_core::config::CONFIG_FILE;
use std::path::Path;

const SHIPYARD_TOML: &str = r#"[image]
# name = "my-app"
# base_image = "python:3.12-slim"
# workdir = "/code"
# manifest = "requirements.txt"
# source = "."
# destination = "."
# install_command = ["pip", "install", "--no-cache-dir", "--upgrade", "-r"]

# [image.env]
# PYTHONUNBUFFERED = "1"

[server]
# command = "uvicorn"
# app = "main:app"
# app_dir = "app"
# host = "0.0.0.0"
# port_env = "PORT"
# default_port = 8000
# launcher = "embedded"
"#;

const DOCKERIGNORE: &str = "\
.git
.shipyard
.venv
.env
__pycache__
*.pyc
";

/// Initialize shipyard in an existing Python project.
pub fn init_project() -> anyhow::Result<()> {
    let mut created = Vec::new();

    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        eprintln!("{CONFIG_FILE} already exists, skipping");
    } else {
        std::fs::write(config_path, SHIPYARD_TOML)?;
        created.push(CONFIG_FILE);
    }

    let dockerignore_path = Path::new(".dockerignore");
    if dockerignore_path.exists() {
        eprintln!(".dockerignore already exists, skipping");
    } else {
        std::fs::write(dockerignore_path, DOCKERIGNORE)?;
        created.push(".dockerignore");
    }

    if created.is_empty() {
        println!("Nothing to create, already initialized.");
    } else {
        for f in &created {
            println!("Created {f}");
        }
    }

    if !Path::new("requirements.txt").exists() {
        println!();
        println!("Note: requirements.txt not found. Create it or set [image].manifest.");
    }

    println!();
    println!("Next steps:");
    println!();
    println!("  1. Check the project:");
    println!("     shipyard check");
    println!();
    println!("  2. Build the image:");
    println!("     shipyard build");
    println!();
    println!("  3. Run it locally:");
    println!("     shipyard run --port 9001");

    Ok(())
}
