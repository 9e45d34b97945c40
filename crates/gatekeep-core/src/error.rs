//! Error taxonomy for configuration, execution, and tool invocation.

use crate::types::Violation;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Apply-time errors. Raised while conventions mutate a module, before any
/// task runs.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigurationError {
    /// The version catalog has no entry for the requested tool.
    #[error("version not declared in catalog: '{name}'")]
    #[diagnostic(
        code(gatekeep::config::version_not_declared),
        help("declare the version in the [versions] table of the catalog")
    )]
    VersionNotDeclared {
        /// Symbolic name that was looked up.
        name: String,
    },

    /// The catalog entry exists but is blank.
    #[error("version for '{name}' is empty")]
    #[diagnostic(code(gatekeep::config::empty_version))]
    EmptyVersion {
        /// Symbolic name that was looked up.
        name: String,
    },

    /// The fixed tool configuration directory does not exist.
    #[error("{tool} configuration directory not found: {path}")]
    #[diagnostic(
        code(gatekeep::config::missing_config_dir),
        help("create the directory or run `gatekeep init`")
    )]
    MissingConfigDirectory {
        /// Tool whose directory is missing.
        tool: String,
        /// Expected directory.
        path: PathBuf,
    },

    /// A build parameter has a value the convention cannot interpret.
    #[error("invalid value '{value}' for build parameter '{name}': {expected}")]
    #[diagnostic(code(gatekeep::config::invalid_parameter))]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Value as given.
        value: String,
        /// What would have been accepted.
        expected: String,
    },

    /// A module declares a convention id nobody knows about.
    #[error("unknown convention '{id}'")]
    #[diagnostic(
        code(gatekeep::config::unknown_convention),
        help("run `gatekeep list-conventions` to see the available ids")
    )]
    UnknownConvention {
        /// Declared id.
        id: String,
    },

    /// A convention (transitively) composes itself.
    #[error("convention '{id}' is applied while it is still being applied")]
    #[diagnostic(code(gatekeep::config::convention_cycle))]
    ConventionCycle {
        /// Convention id found twice on the apply stack.
        id: String,
    },

    /// An analysis task is not reachable from the aggregate gate.
    #[error("analysis task '{task}' is not reachable from '{gate}'")]
    #[diagnostic(code(gatekeep::config::orphaned_task))]
    OrphanedTask {
        /// Unreachable task.
        task: String,
        /// Gate task name.
        gate: String,
    },

    /// The version catalog could not be read or parsed.
    #[error("failed to load version catalog {path}: {message}")]
    #[diagnostic(code(gatekeep::config::catalog))]
    Catalog {
        /// Catalog file.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
}

/// Errors reported by an [`AnalysisTool`](crate::AnalysisTool) implementation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool could not initialize (bad config, missing resource, crash).
    #[error("{0}")]
    Initialization(String),

    /// The tool executable could not be started.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        /// Program that was started.
        program: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// IO error while preparing or inspecting the run.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Execution-time failure of a single task.
#[derive(Debug, Error)]
pub enum TaskFailure {
    /// The tool found more violations than the configured threshold allows.
    #[error("{tool} rule violations were found.")]
    Violations {
        /// Display name of the tool.
        tool: String,
        /// Violations, in report order.
        violations: Vec<Violation>,
        /// Threshold that was exceeded.
        max_violations: usize,
        /// Files the tool rewrote during this run.
        corrected: Vec<PathBuf>,
    },

    /// The tool could not start or initialize.
    #[error("{tool} failed to initialize: {message}")]
    ToolInitialization {
        /// Display name of the tool.
        tool: String,
        /// Tool output or reason.
        message: String,
    },

    /// A toolchain command exited unsuccessfully.
    #[error("command '{program}' exited with status {code}")]
    Command {
        /// Executed program.
        program: String,
        /// Exit code, `-1` when killed by a signal.
        code: i32,
        /// Combined command output.
        output: String,
    },

    /// A configuration problem only detectable at execution time.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// IO error during task execution.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskFailure {
    /// Returns the failure headline followed by every detail line.
    #[must_use]
    pub fn details(&self) -> String {
        use std::fmt::Write;
        let mut out = format!("{self}\n");
        match self {
            Self::Violations {
                violations,
                max_violations,
                corrected,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "{} violation(s) found, {} allowed.",
                    violations.len(),
                    max_violations
                );
                for violation in violations {
                    let _ = writeln!(out, "  {violation}");
                }
                for file in corrected {
                    let _ = writeln!(out, "  Auto-corrected: {}", file.display());
                }
            }
            Self::Command { output, .. } => {
                for line in output.lines() {
                    let _ = writeln!(out, "  {line}");
                }
            }
            _ => {}
        }
        out
    }
}

/// Errors raised by the executor before any task runs.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A requested task, or a declared dependency, does not exist.
    #[error("task '{name}' not found in module '{module}'")]
    UnknownTask {
        /// Missing task name.
        name: String,
        /// Module being executed.
        module: String,
    },

    /// The task graph contains a cycle.
    #[error("dependency cycle detected: {}", .path.join(" -> "))]
    Cycle {
        /// Tasks forming the cycle, first repeated at the end.
        path: Vec<String>,
    },
}
