//! detekt convention with opt-in auto-correct.
//!
//! Auto-correct is switched on with the build parameter
//! `detekt.autoCorrect=true`. Corrections rewrite the analysed sources but
//! never turn a failing run into a passing one.

use crate::analysis;
use gatekeep_core::{
    AnalysisRequest, BuildContext, ConfigurationError, Convention, Module, ReportToggles,
    TaskAction, TaskContext, TaskFailure, TaskGroup, TaskKind, TaskOutput, ToolConfiguration,
    CHECK_TASK,
};
use tracing::{debug, info};

/// Convention id.
pub const ID: &str = "detekt";

/// Catalog key and tool registration name.
pub const TOOL: &str = "detekt";

/// Task name.
pub const TASK: &str = "detekt";

/// Optional rule file inside the config directory.
pub const CONFIG_FILE: &str = "detekt.yml";

/// Build parameter enabling auto-correct.
pub const AUTO_CORRECT_PARAM: &str = "detekt.autoCorrect";

/// The module's single detekt configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintExtension {
    /// Resolved tool settings.
    pub tool: ToolConfiguration,
    /// Whether detekt may rewrite sources.
    pub auto_correct: bool,
}

/// Registers the `detekt` task over all source sets and binds it to `check`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LintConvention;

impl LintConvention {
    /// Creates the convention.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Convention for LintConvention {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "detekt over all Kotlin sources with opt-in auto-correct, bound to check"
    }

    fn configure(&self, module: &mut Module, ctx: &BuildContext) -> Result<(), ConfigurationError> {
        let version = analysis::version(ctx, TOOL)?;
        let auto_correct = ctx.parameters().flag(AUTO_CORRECT_PARAM, false)?;
        let config_dir = analysis::tool_config_dir(ctx, TOOL);
        let config_file = config_dir
            .join(CONFIG_FILE)
            .is_file()
            .then(|| CONFIG_FILE.to_string());

        module.extensions_mut().configure::<LintExtension, _>(|ext| {
            ext.tool = ToolConfiguration {
                tool: TOOL.to_string(),
                version,
                config_dir,
                config_file,
                support_files: Vec::new(),
                max_violations: 0,
                reports: ReportToggles::all(),
            };
            ext.auto_correct = auto_correct;
        });
        if auto_correct {
            info!("detekt auto-correct enabled for '{}'", module.name());
        }

        analysis::ensure_default_source_sets(module);
        analysis::register_gate(module);

        module
            .tasks_mut()
            .register_or_get(TASK)
            .describe("Analyse your Kotlin code with detekt.")
            .in_group(TaskGroup::Verification)
            .of_kind(TaskKind::Analysis)
            .with_action(LintAction);
        module.tasks_mut().add_dependency(CHECK_TASK, TASK);
        Ok(())
    }
}

/// Runs detekt once over the Kotlin files of every source set.
#[derive(Debug, Clone, Copy, Default)]
pub struct LintAction;

impl TaskAction for LintAction {
    fn execute(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskFailure> {
        let module = ctx.module;
        let ext = module
            .extensions()
            .get::<LintExtension>()
            .ok_or_else(|| TaskFailure::ToolInitialization {
                tool: TOOL.to_string(),
                message: "detekt is not configured for this module".to_string(),
            })?;

        let mut sources = Vec::new();
        for set in module.source_sets() {
            sources.extend(module.source_files(set, &["kt", "kts"])?);
        }
        sources.sort();
        sources.dedup();
        if sources.is_empty() {
            debug!("{}: no Kotlin sources", ctx.task);
            return Ok(TaskOutput::no_source());
        }

        let reports = analysis::report_targets(module, TOOL, TASK, ext.tool.reports);
        let request = AnalysisRequest {
            module_dir: module.dir(),
            source_set: "all",
            sources: &sources,
            config: &ext.tool,
            auto_correct: ext.auto_correct,
            reports: &reports,
        };
        let report = analysis::invoke(ctx.build, TOOL, &request)?;
        for file in &report.corrected {
            info!("Auto-corrected: {}", file.display());
        }
        analysis::verdict(TOOL, &ext.tool, report)
    }
}
