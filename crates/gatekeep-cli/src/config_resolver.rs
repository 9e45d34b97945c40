//! Locating and loading `gatekeep.toml`.
//!
//! Lookup order: the `--config` flag, then the project root (`gatekeep.toml`
//! before `.gatekeep.toml`), then the user directory
//! (`$GATEKEEP_CONFIG_DIR/config.toml` or `~/.gatekeep/config.toml`), and
//! finally the built-in defaults.
//!
//! The catalog path of a `--config` file is relative to that file's
//! directory. Every other source resolves it against the project root.

use gatekeep_core::{Config, ConfigError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Project config names, in lookup order.
const PROJECT_CONFIG_NAMES: &[&str] = &["gatekeep.toml", ".gatekeep.toml"];

/// Overrides the user config directory.
const USER_DIR_ENV: &str = "GATEKEEP_CONFIG_DIR";

/// Config file name inside the user directory.
const USER_CONFIG_NAME: &str = "config.toml";

/// How a configuration was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Named by `--config`.
    Flag,
    /// Found in the project root.
    Project,
    /// Found in the user directory.
    User,
    /// Nothing found.
    Builtin,
}

/// A located configuration, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    origin: Origin,
    path: Option<PathBuf>,
}

/// A configuration read from its source, with the catalog location fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    /// Parsed configuration.
    pub config: Config,
    /// Version catalog file.
    pub catalog: PathBuf,
}

impl ConfigSource {
    /// A config file found through `origin`.
    #[must_use]
    pub fn file(origin: Origin, path: impl Into<PathBuf>) -> Self {
        Self {
            origin,
            path: Some(path.into()),
        }
    }

    /// The built-in defaults.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            origin: Origin::Builtin,
            path: None,
        }
    }

    /// How this configuration was found.
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Config file, unless this is the built-in default.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads the configuration and fixes the catalog path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(&self, root: &Path) -> Result<LoadedConfig, ConfigError> {
        let config = match &self.path {
            Some(path) => {
                if self.origin == Origin::User {
                    info!("Using user config {}", path.display());
                }
                Config::from_file(path)?
            }
            None => Config::default(),
        };
        let catalog = config.catalog_path(self.base_dir(root));
        Ok(LoadedConfig { config, catalog })
    }

    fn base_dir<'a>(&'a self, root: &'a Path) -> &'a Path {
        match (self.origin, self.path.as_deref().and_then(Path::parent)) {
            (Origin::Flag, Some(dir)) => dir,
            _ => root,
        }
    }
}

/// Locates the configuration for the project at `root`.
#[must_use]
pub fn resolve(root: &Path, flag: Option<&Path>) -> ConfigSource {
    let user_dir = std::env::var_os(USER_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".gatekeep")));
    resolve_in(root, flag, user_dir.as_deref())
}

/// Lookup with the user directory passed in, so tests need no env vars.
fn resolve_in(root: &Path, flag: Option<&Path>, user_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = flag {
        return ConfigSource::file(Origin::Flag, path);
    }

    let project = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file());
    if let Some(path) = project {
        debug!("Project config {}", path.display());
        return ConfigSource::file(Origin::Project, path);
    }

    match user_dir.map(|dir| dir.join(USER_CONFIG_NAME)) {
        Some(path) if path.is_file() => {
            debug!("User config {}", path.display());
            ConfigSource::file(Origin::User, path)
        }
        _ => ConfigSource::builtin(),
    }
}
