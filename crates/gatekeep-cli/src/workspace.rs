//! Project loading: configuration, build context and configured modules.

use crate::config_resolver::{ConfigSource, LoadedConfig};
use anyhow::{Context, Result};
use gatekeep_conventions::require;
use gatekeep_core::{
    BuildContext, BuildParameters, ConfigurationError, Module, VersionCatalog, CHECK_TASK,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the root module when the root directory has no usable name.
const ROOT_MODULE: &str = "root";

/// A loaded project with every module fully configured.
#[derive(Debug)]
pub struct Workspace {
    ctx: BuildContext,
    modules: Vec<Module>,
}

impl Workspace {
    /// Loads configuration, builds the context and applies all declared
    /// conventions. Nothing runs yet.
    ///
    /// # Errors
    ///
    /// Fails on unreadable configuration or catalog, and on any
    /// [`ConfigurationError`] raised while applying conventions.
    pub fn load(root: &Path, source: &ConfigSource, parameters: BuildParameters) -> Result<Self> {
        let root = std::fs::canonicalize(root)
            .with_context(|| format!("Project root not found: {}", root.display()))?;
        debug!("Loading configuration ({:?}) from {:?}", source.origin(), source.path());
        let LoadedConfig {
            config,
            catalog: catalog_path,
        } = source.load(&root)?;

        let declares_any = !config.conventions.is_empty()
            || config.modules.values().any(|m| !m.conventions.is_empty());
        let catalog = if declares_any {
            VersionCatalog::from_file(&catalog_path)?
        } else {
            VersionCatalog::default()
        };
        debug!("Catalog declares {} version(s)", catalog.len());

        let mut builder = BuildContext::builder(&root)
            .catalog(catalog)
            .parameters(parameters)
            .toolchain(config.toolchain());
        for tool in config.command_tools() {
            builder = builder.tool(tool);
        }
        let ctx = builder.build();

        let root_name = root
            .file_name()
            .map_or_else(|| ROOT_MODULE.to_string(), |n| n.to_string_lossy().into_owned());
        let mut modules = vec![configure_module(&root_name, root.clone(), &config.conventions, &ctx)?];
        for (name, module) in &config.modules {
            let dir = root.join(module.path.clone().unwrap_or_else(|| PathBuf::from(name)));
            modules.push(configure_module(name, dir, &module.conventions, &ctx)?);
        }

        info!("Configured {} module(s)", modules.len());
        Ok(Self { ctx, modules })
    }

    /// Shared build context.
    #[must_use]
    pub fn ctx(&self) -> &BuildContext {
        &self.ctx
    }

    /// Configured modules, root first.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }
}

fn configure_module(
    name: &str,
    dir: PathBuf,
    conventions: &[String],
    ctx: &BuildContext,
) -> Result<Module, ConfigurationError> {
    let mut module = Module::new(name, dir);
    for id in conventions {
        let convention = require(id)?;
        module.apply(convention.as_ref(), ctx)?;
    }
    module.ensure_gate_complete(CHECK_TASK)?;
    Ok(module)
}

/// Prints a load failure; configuration errors get a full diagnostic.
pub fn report_load_error(err: anyhow::Error) {
    match err.downcast::<ConfigurationError>() {
        Ok(config_err) => eprintln!("{:?}", miette::Report::new(config_err)),
        Err(other) => eprintln!("Error: {other:#}"),
    }
}
