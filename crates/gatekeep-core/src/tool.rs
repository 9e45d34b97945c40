//! Analysis tool trait.

use crate::error::ToolError;
use crate::types::{ReportFormat, ToolConfiguration, Violation};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A report file the tool is asked to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTarget {
    /// Report format.
    pub format: ReportFormat,
    /// Destination path.
    pub path: PathBuf,
}

/// Everything a tool needs for one invocation.
#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    /// Module directory; relative paths in tool output resolve against it.
    pub module_dir: &'a Path,
    /// Source set name (`main`, `test`) or `all` for tools covering every set.
    pub source_set: &'a str,
    /// Files to analyse.
    pub sources: &'a [PathBuf],
    /// Resolved tool configuration.
    pub config: &'a ToolConfiguration,
    /// Whether the tool may rewrite sources in place.
    pub auto_correct: bool,
    /// Reports to produce.
    pub reports: &'a [ReportTarget],
}

/// Result of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolReport {
    /// Violations found.
    pub violations: Vec<Violation>,
    /// Files the tool rewrote (auto-correct only).
    pub corrected: Vec<PathBuf>,
}

impl ToolReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a report with the given violations.
    #[must_use]
    pub fn with_violations(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            corrected: Vec::new(),
        }
    }
}

/// A pre-existing analysis tool gatekeep orchestrates.
///
/// Implementations do the actual analysis; the owning task decides the
/// verdict from the returned report and the configured threshold.
///
/// # Example
///
/// ```ignore
/// use gatekeep_core::{AnalysisRequest, AnalysisTool, ToolError, ToolReport};
///
/// struct AlwaysClean;
///
/// impl AnalysisTool for AlwaysClean {
///     fn name(&self) -> &str { "checkstyle" }
///
///     fn analyze(&self, _request: &AnalysisRequest<'_>) -> Result<ToolReport, ToolError> {
///         Ok(ToolReport::new())
///     }
/// }
/// ```
pub trait AnalysisTool: Send + Sync {
    /// Registration key of this tool (e.g., `checkstyle`).
    fn name(&self) -> &str;

    /// Runs the tool once.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the tool cannot start or initialize.
    /// Rule violations are not errors; they are part of the report.
    fn analyze(&self, request: &AnalysisRequest<'_>) -> Result<ToolReport, ToolError>;
}

/// Shared tool handle.
pub type ToolHandle = Arc<dyn AnalysisTool>;
