use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use shipyard_core::ImageRef;

/// Directory holding user-owned build files.
pub const EJECT_DIR: &str = ".shipyard";

pub fn ejected_path(project_dir: &Path) -> PathBuf {
    project_dir.join(EJECT_DIR).join("Dockerfile")
}

/// Writes `.shipyard/Dockerfile` for hand editing. From then on
/// `shipyard build` uses it instead of rendering the plan.
///
/// Never overwrites: an existing file is the user's, not ours.
pub fn eject(project_dir: &Path, dockerfile_content: &str) -> Result<PathBuf, EjectError> {
    let path = ejected_path(project_dir);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| EjectError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    let mut file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(EjectError::AlreadyEjected(path));
        }
        Err(e) => return Err(EjectError::Write { path, source: e }),
    };
    file.write_all(dockerfile_content.as_bytes())
        .map_err(|e| EjectError::Write {
            path: path.clone(),
            source: e,
        })?;

    tracing::info!(path = %path.display(), "ejected Dockerfile");
    Ok(path)
}

pub fn is_ejected(project_dir: &Path) -> bool {
    ejected_path(project_dir).is_file()
}

/// Reads the ejected Dockerfile back.
///
/// The file is the user's to edit, so only the base image is looked at:
/// a missing `FROM` is an error, an unpinned one a warning.
pub fn load_ejected_dockerfile(project_dir: &Path) -> Result<String, EjectError> {
    let path = ejected_path(project_dir);
    let content = std::fs::read_to_string(&path).map_err(|e| EjectError::Read {
        path: path.clone(),
        source: e,
    })?;

    let base = base_image(&content).ok_or_else(|| EjectError::MissingFrom(path.clone()))?;
    match ImageRef::parse(base) {
        Ok(image) if image.is_pinned() => {
            tracing::debug!(%image, "ejected Dockerfile base image");
        }
        Ok(image) => {
            tracing::warn!(%image, path = %path.display(), "ejected Dockerfile uses an unpinned base image");
        }
        // `FROM ${BASE}` and similar are left to docker.
        Err(e) => tracing::debug!(error = %e, base, "ejected base image not checked"),
    }

    Ok(content)
}

/// Image named by the first `FROM`, skipping `--platform=...` style flags.
fn base_image(dockerfile: &str) -> Option<&str> {
    dockerfile
        .lines()
        .map(str::trim)
        .find_map(|line| {
            let (keyword, rest) = line.split_once(char::is_whitespace)?;
            keyword.eq_ignore_ascii_case("FROM").then_some(rest)
        })
        .and_then(|rest| rest.split_whitespace().find(|word| !word.starts_with("--")))
}

#[derive(Debug, thiserror::Error)]
pub enum EjectError {
    #[error("failed to create {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Dockerfile already ejected at {0}; edit it directly or delete it to re-eject")]
    AlreadyEjected(PathBuf),
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read ejected Dockerfile at {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("ejected Dockerfile at {0} has no FROM instruction")]
    MissingFrom(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_image_skips_comments_and_flags() {
        let dockerfile = "# === Stage 1: Base image ===\nFROM --platform=linux/amd64 python:3.12-slim AS app\n";
        assert_eq!(base_image(dockerfile), Some("python:3.12-slim"));
    }

    #[test]
    fn base_image_is_case_insensitive() {
        assert_eq!(base_image("from python:3.11\n"), Some("python:3.11"));
    }

    #[test]
    fn base_image_missing() {
        assert_eq!(base_image("# nothing here\nRUN true\n"), None);
    }
}
