//! Application entry point: `<module>:<attribute>`, as handed to the ASGI server.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The object the server imports and serves, e.g. `main:app` or
/// `blog.main:app`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTarget {
    /// Dotted module path, e.g. `blog.main`
    pub module: String,
    /// Attribute on the module holding the application object
    pub attribute: String,
}

impl AppTarget {
    pub fn parse(target: &str) -> crate::Result<Self> {
        let invalid = || crate::Error::InvalidAppTarget {
            target: target.to_owned(),
        };

        let (module, attribute) = target.trim().split_once(':').ok_or_else(invalid)?;

        if !module.split('.').all(is_identifier) || !is_identifier(attribute) {
            return Err(invalid());
        }

        Ok(Self {
            module: module.to_owned(),
            attribute: attribute.to_owned(),
        })
    }

    /// Files that would satisfy an import of the module from `root`,
    /// in the order the import system tries them: a package directory
    /// shadows a module file of the same name.
    pub fn module_paths(&self, root: &Path) -> [PathBuf; 2] {
        let mut base = root.to_path_buf();
        for part in self.module.split('.') {
            base.push(part);
        }
        [base.join("__init__.py"), base.with_extension("py")]
    }

    /// Locates the entry module under `root`.
    ///
    /// # Errors
    ///
    /// [`Error::EntryModuleNotFound`](crate::Error::EntryModuleNotFound) if
    /// neither a module file nor a package `__init__.py` exists.
    pub fn resolve(&self, root: &Path) -> crate::Result<PathBuf> {
        let candidates = self.module_paths(root);
        for candidate in &candidates {
            if candidate.is_file() {
                tracing::debug!(module = %self.module, path = %candidate.display(), "resolved entry module");
                return Ok(candidate.clone());
            }
        }
        Err(crate::Error::EntryModuleNotFound {
            module: self.module.clone(),
            candidates: candidates.to_vec(),
        })
    }
}

impl FromStr for AppTarget {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AppTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.attribute)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_module() {
        let target = AppTarget::parse("blog.main:app").unwrap();
        assert_eq!(target.module, "blog.main");
        assert_eq!(target.attribute, "app");
        assert_eq!(target.to_string(), "blog.main:app");
    }

    #[test]
    fn rejects_missing_attribute() {
        assert!(AppTarget::parse("main").is_err());
        assert!(AppTarget::parse("main:").is_err());
        assert!(AppTarget::parse(":app").is_err());
    }

    #[test]
    fn rejects_non_identifiers() {
        assert!(AppTarget::parse("my-app:app").is_err());
        assert!(AppTarget::parse("blog..main:app").is_err());
        assert!(AppTarget::parse("1main:app").is_err());
        assert!(AppTarget::parse("main:app()").is_err());
    }

    #[test]
    fn module_paths_follow_package_layout() {
        let target = AppTarget::parse("blog.main:app").unwrap();
        let [module, package] = target.module_paths(Path::new("/code"));
        assert_eq!(module, PathBuf::from("/code/blog/main.py"));
        assert_eq!(package, PathBuf::from("/code/blog/main/__init__.py"));
    }
}
