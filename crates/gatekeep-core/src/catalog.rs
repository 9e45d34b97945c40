//! Read-only version catalog.

use crate::error::ConfigurationError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Symbolic tool name to version lookup.
///
/// The on-disk form is a TOML file with a `[versions]` table, the same shape
/// as a Gradle `libs.versions.toml`. Other tables are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionCatalog {
    versions: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    versions: BTreeMap<String, toml::Value>,
}

impl VersionCatalog {
    /// Builds a catalog from in-memory entries.
    #[must_use]
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            versions: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Loads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Catalog`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|message| ConfigurationError::Catalog {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parses catalog TOML.
    ///
    /// Version entries may be plain strings or `{ strictly = "..." }` /
    /// `{ require = "..." }` tables.
    ///
    /// # Errors
    ///
    /// Returns the parse error message.
    pub fn parse(content: &str) -> Result<Self, String> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| e.to_string())?;
        let mut versions = BTreeMap::new();
        for (name, value) in file.versions {
            let version = match &value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Table(t) => t
                    .get("strictly")
                    .or_else(|| t.get("require"))
                    .and_then(toml::Value::as_str)
                    .map(String::from)
                    .ok_or_else(|| format!("unsupported version declaration for '{name}'"))?,
                other => return Err(format!("unsupported version declaration for '{name}': {other}")),
            };
            versions.insert(name, version);
        }
        Ok(Self { versions })
    }

    /// Looks up the version declared for `name`.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigurationError::VersionNotDeclared`] if absent and
    /// [`ConfigurationError::EmptyVersion`] if blank.
    pub fn lookup(&self, name: &str) -> Result<&str, ConfigurationError> {
        let version = self
            .versions
            .get(name)
            .ok_or_else(|| ConfigurationError::VersionNotDeclared {
                name: name.to_string(),
            })?;
        if version.trim().is_empty() {
            return Err(ConfigurationError::EmptyVersion {
                name: name.to_string(),
            });
        }
        Ok(version)
    }

    /// Number of declared versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_declared_version() {
        let catalog = VersionCatalog::from_entries([("checkstyle", "10.12.4")]);
        assert_eq!(catalog.lookup("checkstyle").unwrap(), "10.12.4");
    }

    #[test]
    fn lookup_missing_version_fails() {
        let catalog = VersionCatalog::default();
        assert!(matches!(
            catalog.lookup("detekt"),
            Err(ConfigurationError::VersionNotDeclared { name }) if name == "detekt"
        ));
    }

    #[test]
    fn blank_version_fails() {
        let catalog = VersionCatalog::from_entries([("jacoco", "  ")]);
        assert!(matches!(
            catalog.lookup("jacoco"),
            Err(ConfigurationError::EmptyVersion { .. })
        ));
    }

    #[test]
    fn parse_gradle_style_catalog() {
        let toml = r#"
[versions]
checkstyle = "10.12.4"
detekt = { strictly = "1.23.6" }

[libraries]
junit = { module = "org.junit.jupiter:junit-jupiter", version = "5.10.0" }
"#;
        let catalog = VersionCatalog::parse(toml).expect("Failed to parse");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("detekt").unwrap(), "1.23.6");
    }

    #[test]
    fn parse_rejects_numeric_versions() {
        assert!(VersionCatalog::parse("[versions]\nkotlin = 2\n").is_err());
    }
}
