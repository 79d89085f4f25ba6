use std::path::{Component, Path, PathBuf};
use std::process::Command;

use ignore::WalkBuilder;

/// Directory the build context is assembled in, relative to the project.
pub const BUNDLE_DIR: &str = ".shipyard-bundle";

/// Files/directories that shipyard always excludes from bundles,
/// regardless of .gitignore content.
const SHIPYARD_EXCLUDES: &[&str] = &[BUNDLE_DIR, ".shipyard", ".git"];

/// Directory names skipped at any depth.
const EXCLUDED_DIR_NAMES: &[&str] = &["__pycache__"];

/// A prepared build context.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Main build context: project files plus the Dockerfile
    pub context_dir: PathBuf,
    /// Extra build context holding the launcher binary, when embedded
    pub launcher_dir: Option<PathBuf>,
}

impl Bundle {
    pub fn dockerfile(&self) -> PathBuf {
        self.context_dir.join("Dockerfile")
    }
}

/// What goes into a bundle besides the project files.
#[derive(Debug, Clone, Copy)]
pub struct BundleSpec<'a> {
    pub dockerfile: &'a str,
    /// Dependency manifest, relative to the project directory
    pub manifest: &'a str,
    /// Application source tree, relative to the project directory
    pub source: &'a str,
    /// Launcher binary to ship in its own build context
    pub launcher: Option<&'a Path>,
}

/// Bundles project files into a build context.
///
/// Inside a git work tree the files come from `git ls-files` (tracked plus
/// untracked-but-not-ignored). Any other directory is walked directly,
/// honoring `.gitignore` and `.dockerignore`. Either way the files are
/// copied into `.shipyard-bundle/context/` in sorted order. The generated Dockerfile is written into the context.
/// The launcher binary, if any, goes to `.shipyard-bundle/launcher/` so the
/// source-copy stage never picks it up.
pub fn create_bundle(project_dir: &Path, spec: &BundleSpec<'_>) -> Result<Bundle, BundleError> {
    let bundle_dir = project_dir.join(BUNDLE_DIR);

    // Clean previous bundle
    if bundle_dir.exists() {
        std::fs::remove_dir_all(&bundle_dir).map_err(|e| BundleError::Cleanup {
            path: bundle_dir.clone(),
            source: e,
        })?;
    }
    let context_dir = bundle_dir.join("context");
    create_dir(&context_dir)?;

    let mut files = project_files(project_dir)?;
    files.retain(|path| !is_excluded(path));
    files.sort();

    let manifest = normalize(Path::new(spec.manifest));
    if !files.iter().any(|f| *f == manifest) {
        return Err(BundleError::ManifestNotBundled(manifest));
    }
    let source = normalize(Path::new(spec.source));
    if !source.as_os_str().is_empty() && !files.iter().any(|f| f.starts_with(&source)) {
        return Err(BundleError::SourceNotBundled(source));
    }

    for relative_path in &files {
        let src = project_dir.join(relative_path);
        let dst = context_dir.join(relative_path);

        if let Some(parent) = dst.parent() {
            create_dir(parent)?;
        }

        std::fs::copy(&src, &dst).map_err(|e| BundleError::CopyFile {
            path: src,
            source: e,
        })?;
    }
    tracing::debug!(files = files.len(), context = %context_dir.display(), "copied project files");

    // Write generated Dockerfile
    let dockerfile_path = context_dir.join("Dockerfile");
    std::fs::write(&dockerfile_path, spec.dockerfile).map_err(|e| {
        BundleError::WriteDockerfile {
            path: dockerfile_path.clone(),
            source: e,
        }
    })?;

    let launcher_dir = match spec.launcher {
        Some(binary) => {
            let dir = bundle_dir.join("launcher");
            create_dir(&dir)?;
            std::fs::copy(binary, dir.join("shipyard")).map_err(|e| BundleError::CopyLauncher {
                path: binary.to_path_buf(),
                source: e,
            })?;
            Some(dir)
        }
        None => None,
    };

    Ok(Bundle {
        context_dir,
        launcher_dir,
    })
}

/// Removes the bundle directory. Returns whether anything was removed.
pub fn remove_bundle(project_dir: &Path) -> Result<bool, BundleError> {
    let bundle_dir = project_dir.join(BUNDLE_DIR);
    if !bundle_dir.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(&bundle_dir).map_err(|e| BundleError::Cleanup {
        path: bundle_dir,
        source: e,
    })?;
    Ok(true)
}

fn create_dir(path: &Path) -> Result<(), BundleError> {
    std::fs::create_dir_all(path).map_err(|e| BundleError::Create {
        path: path.to_path_buf(),
        source: e,
    })
}

fn is_excluded(relative_path: &Path) -> bool {
    if SHIPYARD_EXCLUDES
        .iter()
        .any(|ex| relative_path.starts_with(ex))
    {
        return true;
    }
    relative_path.components().any(|c| match c {
        Component::Normal(name) => EXCLUDED_DIR_NAMES.iter().any(|ex| name == *ex),
        _ => false,
    })
}

/// Drops `.` components so `./requirements.txt` matches `requirements.txt`.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn project_files(project_dir: &Path) -> Result<Vec<PathBuf>, BundleError> {
    if is_git_work_tree(project_dir) {
        git_ls_files(project_dir)
    } else {
        tracing::debug!(dir = %project_dir.display(), "not a git work tree, walking directory");
        walk_files(project_dir)
    }
}

/// Whether `project_dir` lies inside a git work tree. A missing `git`
/// binary counts as no.
pub fn is_git_work_tree(project_dir: &Path) -> bool {
    match git(project_dir, &["rev-parse", "--is-inside-work-tree"]) {
        Ok(stdout) => String::from_utf8_lossy(&stdout).trim() == "true",
        Err(e) => {
            tracing::debug!(error = %e, "git work tree detection failed");
            false
        }
    }
}

/// Regular files under `project_dir`, skipping whatever `.gitignore` or
/// `.dockerignore` exclude. Hidden files are kept, as git would keep them.
fn walk_files(project_dir: &Path) -> Result<Vec<PathBuf>, BundleError> {
    let walk = WalkBuilder::new(project_dir)
        .add_custom_ignore_filename(".dockerignore")
        .require_git(false)
        .git_global(false)
        .git_exclude(false)
        .hidden(false)
        .filter_entry(|entry| {
            let name = entry.file_name();
            let top_level = entry.depth() == 1 && SHIPYARD_EXCLUDES.iter().any(|ex| name == *ex);
            !top_level && !EXCLUDED_DIR_NAMES.iter().any(|ex| name == *ex)
        })
        .build();

    let mut files = Vec::new();
    for entry in walk {
        let entry = entry.map_err(|e| BundleError::Walk {
            dir: project_dir.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(project_dir)
            .map_err(|_| BundleError::OutsideProject(entry.path().to_path_buf()))?;
        files.push(relative.to_path_buf());
    }
    Ok(files)
}

/// Tracked files plus untracked files that are not ignored, as listed by
/// `git ls-files`. NUL-separated so unusual file names survive unquoted.
fn git_ls_files(project_dir: &Path) -> Result<Vec<PathBuf>, BundleError> {
    let stdout = git(
        project_dir,
        &["ls-files", "-z", "--cached", "--others", "--exclude-standard"],
    )?;

    let files: Vec<PathBuf> = String::from_utf8_lossy(&stdout)
        .split('\0')
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        // Deleted-but-tracked files are still listed by --cached.
        .filter(|path| project_dir.join(path).is_file())
        .collect();
    Ok(files)
}

/// Whether the working tree has uncommitted changes. Shipyard's own
/// bundle directory never counts, ignored or not.
pub fn is_dirty(project_dir: &Path) -> Result<bool, BundleError> {
    let exclude = format!(":(exclude){BUNDLE_DIR}");
    let stdout = git(project_dir, &["status", "--porcelain", "--", ".", &exclude])?;
    Ok(!stdout.is_empty())
}

fn git(project_dir: &Path, args: &[&str]) -> Result<Vec<u8>, BundleError> {
    let subcommand = args.first().copied().unwrap_or_default();
    let output = Command::new("git")
        .args(args)
        .current_dir(project_dir)
        .output()
        .map_err(|e| BundleError::GitCommand {
            detail: format!("failed to execute git {subcommand}"),
            source: e,
        })?;

    if !output.status.success() {
        return Err(BundleError::GitFailed {
            detail: format!(
                "git {subcommand} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(output.stdout)
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("failed to clean up bundle directory {path}")]
    Cleanup {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create directory {path}")]
    Create {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to copy file {path}")]
    CopyFile {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to copy launcher binary {path}")]
    CopyLauncher {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write Dockerfile at {path}")]
    WriteDockerfile {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to walk project directory {dir}")]
    Walk {
        dir: std::path::PathBuf,
        source: ignore::Error,
    },
    #[error("walked outside the project directory: {0}")]
    OutsideProject(std::path::PathBuf),
    #[error("dependency manifest {0} is not part of the project files (ignored, or missing)")]
    ManifestNotBundled(std::path::PathBuf),
    #[error("source tree {0} contains no project files")]
    SourceNotBundled(std::path::PathBuf),
    #[error("git command failed: {detail}")]
    GitCommand {
        detail: String,
        source: std::io::Error,
    },
    #[error("git failed: {detail}")]
    GitFailed { detail: String },
}
