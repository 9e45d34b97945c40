//! Checkstyle convention.
//!
//! # Configuration
//!
//! - version: catalog key `checkstyle`
//! - config directory: `<root>/tools/checkstyle`, must exist at apply time
//! - rule file: `checkstyle.xml`
//! - support file: `checkstyle-suppressions.xml`, loaded by `SuppressionFilter`
//! - zero tolerance, xml/html/sarif reports
//!
//! A missing support file is not a configuration error: the owning task
//! fails with a tool-initialization error when it runs.

use crate::analysis;
use gatekeep_core::{
    AnalysisRequest, BuildContext, ConfigurationError, Convention, Module, ReportToggles,
    SourceSet, SupportFile, TaskAction, TaskContext, TaskFailure, TaskGroup, TaskKind, TaskOutput,
    ToolConfiguration, CHECK_TASK,
};
use tracing::debug;

/// Convention id.
pub const ID: &str = "checkstyle";

/// Catalog key and tool registration name.
pub const TOOL: &str = "checkstyle";

/// Name used in failure messages.
pub const DISPLAY_NAME: &str = "Checkstyle";

/// Rule file inside the config directory.
pub const CONFIG_FILE: &str = "checkstyle.xml";

/// Suppressions file referenced by the rule file.
pub const SUPPRESSIONS_FILE: &str = "checkstyle-suppressions.xml";

/// Checkstyle module that loads [`SUPPRESSIONS_FILE`].
pub const SUPPRESSION_MODULE: &str = "SuppressionFilter";

/// The module's single Checkstyle configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleCheckExtension {
    /// Resolved tool settings.
    pub tool: ToolConfiguration,
}

/// Name of the Checkstyle task for a source set (`checkstyleMain`).
#[must_use]
pub fn task_name(set: &SourceSet) -> String {
    format!("checkstyle{}", set.task_suffix())
}

/// Registers one Checkstyle task per source set and binds them to `check`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleCheckConvention;

impl StyleCheckConvention {
    /// Creates the convention.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Convention for StyleCheckConvention {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Checkstyle per source set, zero tolerance, bound to check"
    }

    fn configure(&self, module: &mut Module, ctx: &BuildContext) -> Result<(), ConfigurationError> {
        let version = analysis::version(ctx, TOOL)?;
        let config_dir = analysis::required_config_dir(ctx, TOOL)?;

        module.extensions_mut().configure::<StyleCheckExtension, _>(|ext| {
            ext.tool = ToolConfiguration {
                tool: TOOL.to_string(),
                version,
                config_dir,
                config_file: Some(CONFIG_FILE.to_string()),
                support_files: vec![SupportFile::new(SUPPRESSION_MODULE, SUPPRESSIONS_FILE)],
                max_violations: 0,
                reports: ReportToggles::all(),
            };
        });

        analysis::ensure_default_source_sets(module);
        analysis::register_gate(module);

        let sets: Vec<SourceSet> = module.source_sets().cloned().collect();
        for set in sets {
            let name = task_name(&set);
            module
                .tasks_mut()
                .register_or_get(&name)
                .describe(format!("Run Checkstyle analysis for {} classes", set.name))
                .in_group(TaskGroup::Verification)
                .of_kind(TaskKind::Analysis)
                .with_action(StyleCheckAction::new(&set.name));
            module.tasks_mut().add_dependency(CHECK_TASK, &name);
        }
        Ok(())
    }
}

/// Runs Checkstyle over the Java files of one source set.
#[derive(Debug, Clone)]
pub struct StyleCheckAction {
    source_set: String,
}

impl StyleCheckAction {
    /// Creates the action for `source_set`.
    #[must_use]
    pub fn new(source_set: &str) -> Self {
        Self {
            source_set: source_set.to_string(),
        }
    }
}

impl TaskAction for StyleCheckAction {
    fn execute(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskFailure> {
        let module = ctx.module;
        let config = &module
            .extensions()
            .get::<StyleCheckExtension>()
            .ok_or_else(|| TaskFailure::ToolInitialization {
                tool: DISPLAY_NAME.to_string(),
                message: "Checkstyle is not configured for this module".to_string(),
            })?
            .tool;

        let Some(set) = module.source_set(&self.source_set) else {
            return Ok(TaskOutput::no_source());
        };
        let sources = module.source_files(set, &["java"])?;
        if sources.is_empty() {
            debug!("{}: no Java sources", ctx.task);
            return Ok(TaskOutput::no_source());
        }

        analysis::check_support_files(DISPLAY_NAME, config)?;

        let reports = analysis::report_targets(module, TOOL, &self.source_set, config.reports);
        let request = AnalysisRequest {
            module_dir: module.dir(),
            source_set: &self.source_set,
            sources: &sources,
            config,
            auto_correct: false,
            reports: &reports,
        };
        let report = analysis::invoke(ctx.build, DISPLAY_NAME, &request)?;
        analysis::verdict(DISPLAY_NAME, config, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeep_core::VersionCatalog;

    fn project() -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("tools/checkstyle");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE), "<module name=\"Checker\"/>").unwrap();
        std::fs::write(dir.join(SUPPRESSIONS_FILE), "<suppressions/>").unwrap();
        tmp
    }

    fn ctx(root: &std::path::Path) -> BuildContext {
        BuildContext::builder(root)
            .catalog(VersionCatalog::from_entries([(TOOL, "10.12.0")]))
            .build()
    }

    #[test]
    fn registers_task_per_source_set() {
        let tmp = project();
        let mut module = Module::new("app", tmp.path());
        module.apply(&StyleCheckConvention::new(), &ctx(tmp.path())).unwrap();

        let main = module.tasks().get("checkstyleMain").unwrap();
        assert_eq!(main.description(), "Run Checkstyle analysis for main classes");
        assert_eq!(main.kind(), TaskKind::Analysis);
        assert!(module.tasks().contains("checkstyleTest"));
        assert!(module.ensure_gate_complete(CHECK_TASK).is_ok());
    }

    #[test]
    fn extension_uses_catalog_version_and_config_dir() {
        let tmp = project();
        let mut module = Module::new("app", tmp.path());
        module.apply(&StyleCheckConvention::new(), &ctx(tmp.path())).unwrap();

        let config = &module.extensions().get::<StyleCheckExtension>().unwrap().tool;
        assert_eq!(config.version, "10.12.0");
        assert_eq!(config.config_dir_name().as_deref(), Some("checkstyle"));
        assert_eq!(config.max_violations, 0);
        assert_eq!(config.reports, ReportToggles::all());
    }

    #[test]
    fn missing_config_dir_fails_at_apply_time() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut module = Module::new("app", tmp.path());
        assert!(matches!(
            module.apply(&StyleCheckConvention::new(), &ctx(tmp.path())),
            Err(ConfigurationError::MissingConfigDirectory { .. })
        ));
        assert!(module.tasks().is_empty());
    }

    #[test]
    fn task_name_follows_source_set() {
        assert_eq!(task_name(&SourceSet::conventional("main")), "checkstyleMain");
        assert_eq!(task_name(&SourceSet::conventional("test")), "checkstyleTest");
    }
}
