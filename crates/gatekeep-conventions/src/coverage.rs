//! Coverage reporting over the test run.

use crate::analysis;
use crate::language::{LanguageConvention, ToolchainStep, TEST};
use gatekeep_core::process::TemplateVars;
use gatekeep_core::{
    BuildContext, ConfigurationError, Convention, ConventionBox, Module, ReportToggles, TaskAction,
    TaskContext, TaskFailure, TaskGroup, TaskKind, TaskOutput,
};

/// Convention id.
pub const ID: &str = "coverage";

/// Catalog key of the coverage tool.
pub const VERSION_KEY: &str = "jacoco";

/// Coverage report task.
pub const REPORT_TASK: &str = "jacocoTestReport";

/// Coverage settings of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageExtension {
    /// Tool version from the catalog.
    pub version: String,
    /// Requested report formats.
    pub reports: ReportToggles,
}

/// Registers the coverage report task on top of the `language` test task.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageConvention;

impl CoverageConvention {
    /// Creates the convention.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Convention for CoverageConvention {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "JaCoCo coverage report after the test run"
    }

    fn composes(&self) -> Vec<ConventionBox> {
        vec![Box::new(LanguageConvention::new())]
    }

    fn configure(&self, module: &mut Module, ctx: &BuildContext) -> Result<(), ConfigurationError> {
        let version = analysis::version(ctx, VERSION_KEY)?;
        module.extensions_mut().configure::<CoverageExtension, _>(|ext| {
            ext.version = version;
            ext.reports = ReportToggles {
                xml: true,
                html: true,
                sarif: false,
            };
        });

        module
            .tasks_mut()
            .register_or_get(REPORT_TASK)
            .describe("Generates code coverage report for the test task.")
            .in_group(TaskGroup::Reporting)
            .of_kind(TaskKind::Build)
            .with_action(CoverageReport)
            .depends(TEST);
        Ok(())
    }
}

/// Runs the `jacocoTestReport` toolchain step with `{version}` and
/// `{report_dir}` bound.
#[derive(Debug, Clone, Copy)]
struct CoverageReport;

impl TaskAction for CoverageReport {
    fn execute(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskFailure> {
        let ext = ctx
            .module
            .extensions()
            .get::<CoverageExtension>()
            .cloned()
            .unwrap_or_default();
        let report_dir = ctx.module.build_dir().join("reports").join("jacoco");
        if !ext.reports.enabled().is_empty() {
            std::fs::create_dir_all(&report_dir)?;
        }

        let vars = TemplateVars::new()
            .set("version", ext.version)
            .set("report_dir", report_dir.display().to_string());
        ToolchainStep::new(REPORT_TASK, "main", &["java", "kt", "kts"]).run_with(ctx, vars)
    }
}
