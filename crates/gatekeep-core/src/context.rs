//! Read-only build context passed to conventions and task actions.

use crate::catalog::VersionCatalog;
use crate::error::ConfigurationError;
use crate::tool::{AnalysisTool, ToolHandle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// External `key=value` build parameters (`-P name=value`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildParameters {
    values: BTreeMap<String, String>,
}

impl BuildParameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Parses a `name=value` pair. A bare `name` means `name=true`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidParameter`] for an empty name.
    pub fn parse_assignment(raw: &str) -> Result<(String, String), ConfigurationError> {
        let (name, value) = raw.split_once('=').unwrap_or((raw, "true"));
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::InvalidParameter {
                name: String::new(),
                value: raw.to_string(),
                expected: "name=value".to_string(),
            });
        }
        Ok((name.to_string(), value.trim().to_string()))
    }

    /// Raw parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Boolean parameter; absent means `default`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidParameter`] unless the value is
    /// `true` or `false` (case-insensitive).
    pub fn flag(&self, name: &str, default: bool) -> Result<bool, ConfigurationError> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };
        match value.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ConfigurationError::InvalidParameter {
                name: name.to_string(),
                value: value.to_string(),
                expected: "expected 'true' or 'false'".to_string(),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BuildParameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Command templates for toolchain steps (`compileJava`, `test`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolchain {
    steps: BTreeMap<String, Vec<String>>,
}

impl Toolchain {
    /// Creates an empty toolchain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step command template.
    #[must_use]
    pub fn step(mut self, name: impl Into<String>, command: Vec<String>) -> Self {
        self.steps.insert(name.into(), command);
        self
    }

    /// Command template for a step.
    #[must_use]
    pub fn command(&self, step: &str) -> Option<&[String]> {
        self.steps
            .get(step)
            .map(Vec::as_slice)
            .filter(|c| !c.is_empty())
    }
}

/// Shared, read-only inputs of a build.
///
/// Conventions read the catalog and parameters at apply time; task actions
/// read tools and toolchain at execution time. Substitute fakes through
/// [`BuildContext::builder`] to test conventions in isolation.
#[derive(Clone)]
pub struct BuildContext {
    root: PathBuf,
    catalog: VersionCatalog,
    parameters: BuildParameters,
    tools: BTreeMap<String, ToolHandle>,
    toolchain: Toolchain,
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.root)
            .field("catalog", &self.catalog)
            .field("parameters", &self.parameters)
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("toolchain", &self.toolchain)
            .finish()
    }
}

impl BuildContext {
    /// Creates a new builder.
    #[must_use]
    pub fn builder(root: impl Into<PathBuf>) -> BuildContextBuilder {
        BuildContextBuilder::new(root)
    }

    /// Repository root; fixed configuration directories resolve against it.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Version catalog.
    #[must_use]
    pub fn catalog(&self) -> &VersionCatalog {
        &self.catalog
    }

    /// Build parameters.
    #[must_use]
    pub fn parameters(&self) -> &BuildParameters {
        &self.parameters
    }

    /// Analysis tool registered under `name`.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&ToolHandle> {
        self.tools.get(name)
    }

    /// Toolchain command table.
    #[must_use]
    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }
}

/// Builder for [`BuildContext`].
pub struct BuildContextBuilder {
    root: PathBuf,
    catalog: VersionCatalog,
    parameters: BuildParameters,
    tools: BTreeMap<String, ToolHandle>,
    toolchain: Toolchain,
}

impl BuildContextBuilder {
    /// Creates a builder rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            catalog: VersionCatalog::default(),
            parameters: BuildParameters::default(),
            tools: BTreeMap::new(),
            toolchain: Toolchain::default(),
        }
    }

    /// Sets the version catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: VersionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the build parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: BuildParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Registers an analysis tool under its own name.
    #[must_use]
    pub fn tool<T: AnalysisTool + 'static>(self, tool: T) -> Self {
        self.tool_handle(Arc::new(tool))
    }

    /// Registers a shared analysis tool handle under its own name.
    #[must_use]
    pub fn tool_handle(mut self, tool: ToolHandle) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    /// Sets the toolchain.
    #[must_use]
    pub fn toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> BuildContext {
        BuildContext {
            root: self.root,
            catalog: self.catalog,
            parameters: self.parameters,
            tools: self.tools,
            toolchain: self.toolchain,
        }
    }
}
