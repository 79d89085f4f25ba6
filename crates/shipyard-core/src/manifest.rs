//! Dependency manifest (pip requirements format).
//!
//! Only syntax is checked here. Whether a requirement resolves is decided
//! by the package-install tool during the image build.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEntry {
    /// A package requirement, e.g. `fastapi[standard]>=0.110`
    Requirement {
        /// Distribution name as written (without extras or specifiers)
        name: String,
        /// The full requirement line
        spec: String,
    },
    /// An installer option line, e.g. `-r base.txt` or `--index-url ...`
    Directive(String),
}

#[derive(Debug, Clone)]
pub struct DependencyManifest {
    pub path: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

impl DependencyManifest {
    /// Read and parse the manifest at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::ManifestRead`](crate::Error::ManifestRead) if the file is missing or unreadable
    /// - [`Error::ManifestMalformed`](crate::Error::ManifestMalformed) on the first invalid line
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::ManifestRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let manifest = Self::parse(path, &content)?;

        if manifest.entries.is_empty() {
            tracing::warn!(path = %path.display(), "dependency manifest declares no packages");
        } else {
            tracing::debug!(
                path = %path.display(),
                requirements = manifest.requirements().count(),
                "loaded dependency manifest"
            );
        }
        Ok(manifest)
    }

    pub fn parse(path: &Path, content: &str) -> crate::Result<Self> {
        let mut entries = Vec::new();

        for (line_no, line) in logical_lines(content) {
            let line = strip_comment(&line);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('-') {
                entries.push(ManifestEntry::Directive(line.to_owned()));
                continue;
            }

            let name = requirement_name(line).ok_or_else(|| crate::Error::ManifestMalformed {
                path: path.to_path_buf(),
                line: line_no,
                content: line.to_owned(),
            })?;

            entries.push(ManifestEntry::Requirement {
                name: name.to_owned(),
                spec: line.to_owned(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Declared package names, in manifest order.
    pub fn requirements(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            ManifestEntry::Requirement { name, .. } => Some(name.as_str()),
            ManifestEntry::Directive(_) => None,
        })
    }
}

/// Joins `\` continuations. Yields each logical line with the 1-based
/// number of its first physical line.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (i, raw) in content.lines().enumerate() {
        let (start, mut buf) = pending.take().unwrap_or((i + 1, String::new()));
        match raw.strip_suffix('\\') {
            Some(head) => {
                buf.push_str(head);
                pending = Some((start, buf));
            }
            None => {
                buf.push_str(raw);
                out.push((start, buf));
            }
        }
    }
    if let Some(last) = pending {
        out.push(last);
    }
    out
}

/// `#` starts a comment at line start or after whitespace; `pkg#egg` in a
/// URL fragment is kept.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(i) => &line[..i],
        None => line,
    }
}

/// Leading distribution name of a requirement line, validating any
/// `[extras]` block that follows it.
fn requirement_name(line: &str) -> Option<&str> {
    let first = line.chars().next()?;
    if !first.is_ascii_alphanumeric() {
        return None;
    }

    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(end);

    if let Some(extras) = rest.strip_prefix('[') {
        let close = extras.find(']')?;
        let valid = extras[..close].split(',').all(|extra| {
            let extra = extra.trim();
            !extra.is_empty()
                && extra
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        });
        if !valid {
            return None;
        }
    }

    Some(name)
}
