//! Configuration types for gatekeep (`gatekeep.toml`).

use crate::context::Toolchain;
use crate::process::{CommandTool, ToolCommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default location of the version catalog, relative to the project root.
pub const DEFAULT_CATALOG_PATH: &str = "gradle/libs.versions.toml";

/// Top-level configuration for gatekeep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Conventions applied to the root module.
    #[serde(default)]
    pub conventions: Vec<String>,

    /// Version catalog location.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Additional modules, keyed by module name.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleConfig>,

    /// External analysis tools, keyed by registration name.
    #[serde(default)]
    pub tools: BTreeMap<String, ToolCommand>,

    /// Toolchain commands, keyed by task name.
    #[serde(default)]
    pub toolchain: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Catalog path resolved against `root`.
    #[must_use]
    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        root.join(&self.catalog.path)
    }

    /// Toolchain command table.
    #[must_use]
    pub fn toolchain(&self) -> Toolchain {
        self.toolchain
            .iter()
            .fold(Toolchain::new(), |tc, (step, command)| {
                tc.step(step.clone(), command.clone())
            })
    }

    /// Command-backed tools declared under `[tools]`.
    #[must_use]
    pub fn command_tools(&self) -> Vec<CommandTool> {
        self.tools
            .iter()
            .map(|(name, command)| CommandTool::new(name.clone(), command.clone()))
            .collect()
    }
}

/// Version catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog file, relative to the project root.
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_PATH)
}

/// A module besides the root one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Module directory relative to the root; defaults to the module name.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Conventions applied to this module.
    #[serde(default)]
    pub conventions: Vec<String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
