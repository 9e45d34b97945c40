//! Helpers shared by the analysis conventions.

use gatekeep_core::{
    AnalysisRequest, BuildContext, ConfigurationError, Module, ReportTarget, ReportToggles,
    SourceSet, TaskFailure, TaskGroup, TaskOutput, ToolConfiguration, ToolReport, Violation,
    CHECK_TASK,
};
use std::path::PathBuf;
use tracing::debug;

/// Directory holding tool configuration, relative to the project root.
pub const TOOLS_DIR: &str = "tools";

/// Registers the aggregate gate so every analysis convention can bind to it.
pub(crate) fn register_gate(module: &mut Module) {
    module
        .tasks_mut()
        .register_or_get(CHECK_TASK)
        .describe("Runs all checks.")
        .in_group(TaskGroup::Verification);
}

/// Adds `main` and `test` unless the module already declares them.
pub(crate) fn ensure_default_source_sets(module: &mut Module) {
    module.add_source_set(SourceSet::conventional("main"));
    module.add_source_set(SourceSet::conventional("test"));
}

/// `<root>/tools/<tool>`, made absolute when it exists.
pub(crate) fn tool_config_dir(ctx: &BuildContext, tool: &str) -> PathBuf {
    let dir = ctx.root().join(TOOLS_DIR).join(tool);
    std::fs::canonicalize(&dir).unwrap_or(dir)
}

/// Like [`tool_config_dir`], but the directory must exist.
pub(crate) fn required_config_dir(
    ctx: &BuildContext,
    tool: &str,
) -> Result<PathBuf, ConfigurationError> {
    let dir = tool_config_dir(ctx, tool);
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(ConfigurationError::MissingConfigDirectory {
            tool: tool.to_string(),
            path: dir,
        })
    }
}

/// Looks up a catalog version as an owned string.
pub(crate) fn version(ctx: &BuildContext, name: &str) -> Result<String, ConfigurationError> {
    ctx.catalog().lookup(name).map(str::to_string)
}

/// Report destinations under `<module>/build/reports/<tool>/<name>.<ext>`.
pub(crate) fn report_targets(
    module: &Module,
    tool: &str,
    name: &str,
    toggles: ReportToggles,
) -> Vec<ReportTarget> {
    let dir = module.build_dir().join("reports").join(tool);
    toggles
        .enabled()
        .into_iter()
        .map(|format| ReportTarget {
            format,
            path: dir.join(format!("{name}.{}", format.extension())),
        })
        .collect()
}

/// Fails when a file the rule file references is missing.
pub(crate) fn check_support_files(
    tool_label: &str,
    config: &ToolConfiguration,
) -> Result<(), TaskFailure> {
    for support in &config.support_files {
        let path = config.config_dir.join(&support.file);
        if !path.is_file() {
            return Err(TaskFailure::ToolInitialization {
                tool: tool_label.to_string(),
                message: format!(
                    "cannot initialize module {} - Unable to find: {}",
                    support.module,
                    path.display()
                ),
            });
        }
    }
    Ok(())
}

/// Runs the tool registered under `request.config.tool`.
pub(crate) fn invoke(
    ctx: &BuildContext,
    tool_label: &str,
    request: &AnalysisRequest<'_>,
) -> Result<ToolReport, TaskFailure> {
    let name = &request.config.tool;
    let tool = ctx
        .tool(name)
        .ok_or_else(|| TaskFailure::ToolInitialization {
            tool: tool_label.to_string(),
            message: format!("no analysis tool registered as '{name}'"),
        })?;
    debug!(
        "Invoking {} on {} file(s) ({})",
        tool_label,
        request.sources.len(),
        request.source_set
    );
    tool.analyze(request)
        .map_err(|e| TaskFailure::ToolInitialization {
            tool: tool_label.to_string(),
            message: e.to_string(),
        })
}

/// Turns a tool report into the task verdict.
///
/// Exceeding the threshold fails the task, and so does any correction made
/// in this run.
pub(crate) fn verdict(
    tool_label: &str,
    config: &ToolConfiguration,
    report: ToolReport,
) -> Result<TaskOutput, TaskFailure> {
    let ToolReport {
        mut violations,
        mut corrected,
    } = report;
    violations.sort_by(Violation::report_order);
    corrected.sort();

    if config.exceeds_threshold(violations.len()) || !corrected.is_empty() {
        return Err(TaskFailure::Violations {
            tool: tool_label.to_string(),
            violations,
            max_violations: config.max_violations,
            corrected,
        });
    }

    Ok(violations
        .iter()
        .fold(TaskOutput::done(), |out, v| out.with_line(format!("warning: {v}"))))
}
