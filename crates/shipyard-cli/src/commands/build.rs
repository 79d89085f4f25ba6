use shipyard_build::bundle::{self, BundleSpec};
use shipyard_build::plan::{BuildPlan, LAUNCHER_CONTEXT};
use shipyard_docker::{BuildRequest, DockerClient};
use std::path::{Path, PathBuf};

pub struct BuildOptions {
    pub allow_dirty: bool,
    pub tag: Option<String>,
    pub quiet: bool,
    pub launcher: Option<PathBuf>,
}

/// Run the build pipeline: dirty check → checks → Dockerfile → bundle → docker build.
pub async fn build(options: BuildOptions) -> anyhow::Result<()> {
    let project_dir = Path::new(".");
    let progress = |msg: &str| {
        if !options.quiet {
            println!("{msg}");
        }
    };

    // Dirty check: refuse to build uncommitted changes unless --allow-dirty.
    // Outside git there is nothing to commit.
    if !options.allow_dirty
        && bundle::is_git_work_tree(project_dir)
        && bundle::is_dirty(project_dir)?
    {
        anyhow::bail!(
            "uncommitted changes detected.\n\
             Commit your changes, or use `shipyard build --allow-dirty` to build anyway."
        );
    }

    // Config, manifest, and entry module must all check out before anything runs
    let project = super::check::inspect_project(project_dir)?;
    let config = &project.config;
    let tag = options
        .tag
        .clone()
        .unwrap_or_else(|| super::default_tag(config, project_dir));
    progress(&format!(
        "Checked {} ({} requirement(s), entry {})",
        config.image.manifest,
        project.manifest.requirements().count(),
        config.server.app
    ));

    let dockerfile = super::dockerfile_for(project_dir, &project.plan)?;
    if dockerfile.ejected {
        progress("Using ejected Dockerfile from .shipyard/Dockerfile");
    }

    let launcher = if project.plan.needs_launcher() {
        Some(launcher_binary(options.launcher.clone(), &project.plan)?)
    } else {
        None
    };

    progress("Bundling source...");
    let spec = BundleSpec {
        dockerfile: &dockerfile.content,
        manifest: &config.image.manifest,
        source: &config.image.source,
        launcher: launcher.as_deref(),
    };
    let bundle = bundle::create_bundle(project_dir, &spec)?;

    let client = DockerClient::new();
    progress("Running pre-flight checks...");
    client.check_prerequisites().await?;

    let dockerfile_path = bundle.dockerfile();
    let contexts: Vec<(&str, &Path)> = bundle
        .launcher_dir
        .as_deref()
        .map(|dir| (LAUNCHER_CONTEXT, dir))
        .into_iter()
        .collect();
    let request = BuildRequest {
        context_dir: &bundle.context_dir,
        dockerfile: &dockerfile_path,
        tag: &tag,
        extra_contexts: &contexts,
        capture: options.quiet,
    };

    progress(&format!("Building {tag}..."));
    let image_id = client.build_image(&request).await?;

    match image_id {
        Some(id) => println!("{id}"),
        None => {
            println!();
            println!("Built: {tag}");
            println!("Run it with: shipyard run");
        }
    }

    Ok(())
}

/// Binary copied into the image as the entrypoint.
///
/// Defaults to this executable, which only works when it is a Linux glibc
/// build and the base image has glibc too.
fn launcher_binary(explicit: Option<PathBuf>, plan: &BuildPlan) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_file() {
            anyhow::bail!("launcher binary not found at {}", path.display());
        }
        return Ok(path);
    }

    if let Some(base) = plan.base_image().filter(|image| image.is_musl_based()) {
        anyhow::bail!(
            "base image {base} uses musl libc, so this executable cannot run in it.\n\
             Pass --launcher <path> (or SHIPYARD_LAUNCHER) with a static musl build \
             (e.g. target x86_64-unknown-linux-musl), or set [server].launcher = \"shell\"."
        );
    }

    if !cfg!(target_os = "linux") {
        anyhow::bail!(
            "the embedded launcher must be a Linux binary.\n\
             Pass --launcher <path> (or SHIPYARD_LAUNCHER), or set [server].launcher = \"shell\"."
        );
    }

    let exe = std::env::current_exe()?;
    tracing::debug!(launcher = %exe.display(), "embedding current executable");
    Ok(exe)
}
