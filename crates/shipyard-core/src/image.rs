use std::fmt;

/// A parsed container image reference: `[registry[:port]/]name[:tag][@digest]`.
///
/// # Examples
///
/// ```
/// use shipyard_core::ImageRef;
///
/// let image = ImageRef::parse("python:3.12-slim").unwrap();
/// assert_eq!(image.name, "python");
/// assert_eq!(image.tag.as_deref(), Some("3.12-slim"));
/// assert!(image.is_pinned());
///
/// assert!(!ImageRef::parse("python").unwrap().is_pinned());
/// assert!(!ImageRef::parse("python:latest").unwrap().is_pinned());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Repository including any registry prefix, e.g. `ghcr.io/acme/python`
    pub name: String,
    pub tag: Option<String>,
    /// Content digest, e.g. `sha256:...`
    pub digest: Option<String>,
}

impl ImageRef {
    pub fn parse(reference: &str) -> crate::Result<Self> {
        let invalid = |reason| crate::Error::InvalidImageRef {
            reference: reference.to_owned(),
            reason,
        };

        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty reference"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace"));
        }

        let (rest, digest) = match trimmed.split_once('@') {
            Some((rest, digest)) => {
                if !digest.contains(':') || digest.ends_with(':') {
                    return Err(invalid("digest must look like `<algorithm>:<hex>`"));
                }
                (rest, Some(digest.to_owned()))
            }
            None => (trimmed, None),
        };

        // A colon only separates a tag when it comes after the last path
        // segment separator; `localhost:5000/python` has no tag.
        let last_slash = rest.rfind('/').map_or(0, |i| i + 1);
        let (name, tag) = match rest[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                let tag = &rest[split + 1..];
                if tag.is_empty() {
                    return Err(invalid("empty tag"));
                }
                (&rest[..split], Some(tag.to_owned()))
            }
            None => (rest, None),
        };

        if name.is_empty() || name.ends_with('/') || name.starts_with('/') {
            return Err(invalid("empty repository name"));
        }

        Ok(Self {
            name: name.to_owned(),
            tag,
            digest,
        })
    }

    /// Whether this reference names one fixed image over time.
    ///
    /// Digests are always pinned. Tags are pinned unless they are `latest`.
    /// A missing tag means `latest` to every registry client.
    pub fn is_pinned(&self) -> bool {
        if self.digest.is_some() {
            return true;
        }
        matches!(self.tag.as_deref(), Some(tag) if tag != "latest")
    }

    /// Whether the image is built on musl libc rather than glibc, judged
    /// by name: `alpine` images and `*-alpine*` tags such as
    /// `python:3.12-alpine3.20`.
    pub fn is_musl_based(&self) -> bool {
        let repository = self.name.rsplit('/').next().unwrap_or(&self.name);
        repository == "alpine"
            || self
                .tag
                .as_deref()
                .is_some_and(|tag| tag.split('-').any(|part| part.starts_with("alpine")))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}
