//! # gatekeep-core
//!
//! Core framework for composing build conventions over a per-module task
//! graph.
//!
//! This crate provides the foundational traits and types for building
//! conventions. It includes:
//!
//! - [`Convention`] trait for idempotent, composable build policy
//! - [`Module`] with its [`TaskGraph`], typed [`Extensions`] and source sets
//! - [`AnalysisTool`] trait for the external analysers gatekeep orchestrates
//! - [`Executor`] for running tasks and collecting a [`BuildResult`]
//!
//! ## Example
//!
//! ```ignore
//! use gatekeep_core::{BuildContext, Executor, Module, VersionCatalog};
//!
//! let ctx = BuildContext::builder(".")
//!     .catalog(VersionCatalog::from_file("gradle/libs.versions.toml".as_ref())?)
//!     .tool(MyCheckstyle::new())
//!     .build();
//!
//! let mut module = Module::new("app", ".");
//! module.apply(&CoreLibraryConvention::new(), &ctx)?;
//!
//! let result = Executor::new().run(&module, &ctx, &["check"])?;
//! print!("{}", result.output());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod config;
mod context;
mod convention;
mod error;
mod executor;
mod extension;
mod graph;
mod module;
mod task;
mod tool;
mod types;

/// External command adapters.
pub mod process;

pub use catalog::VersionCatalog;
pub use config::{CatalogConfig, Config, ConfigError, ModuleConfig, DEFAULT_CATALOG_PATH};
pub use context::{BuildContext, BuildContextBuilder, BuildParameters, Toolchain};
pub use convention::{Convention, ConventionBox};
pub use error::{ConfigurationError, ExecutionError, TaskFailure, ToolError};
pub use executor::{BuildResult, Executor, Outcome, TaskResult};
pub use extension::Extensions;
pub use graph::{Task, TaskGraph, TaskGroup, TaskKind};
pub use module::{Module, SourceSet, CHECK_TASK};
pub use process::{CommandTool, ToolCommand};
pub use task::{ActionHandle, TaskAction, TaskContext, TaskOutput};
pub use tool::{AnalysisRequest, AnalysisTool, ReportTarget, ToolHandle, ToolReport};
pub use types::{
    ReportFormat, ReportToggles, Severity, SupportFile, ToolConfiguration, Violation,
};
