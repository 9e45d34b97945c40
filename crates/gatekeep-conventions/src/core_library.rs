//! The base policy bundle for a buildable module.

use crate::coverage::{CoverageConvention, REPORT_TASK};
use crate::language::{LanguageConvention, ASSEMBLE, BUILD, TEST};
use crate::lint::LintConvention;
use crate::style_check::StyleCheckConvention;
use gatekeep_core::{
    BuildContext, ConfigurationError, Convention, ConventionBox, Module, CHECK_TASK,
};

/// Convention id.
pub const ID: &str = "core-library";

/// Language, coverage, Checkstyle and detekt, all gated by `check`.
///
/// After applying, `check` depends on tests, coverage and every analysis
/// task, and `build` depends on `assemble` and `check`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreLibraryConvention;

impl CoreLibraryConvention {
    /// Creates the convention.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Convention for CoreLibraryConvention {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Language, coverage, Checkstyle and detekt bound into check and build"
    }

    fn composes(&self) -> Vec<ConventionBox> {
        vec![
            Box::new(LanguageConvention::new()),
            Box::new(CoverageConvention::new()),
            Box::new(StyleCheckConvention::new()),
            Box::new(LintConvention::new()),
        ]
    }

    fn configure(&self, module: &mut Module, _ctx: &BuildContext) -> Result<(), ConfigurationError> {
        let tasks = module.tasks_mut();
        tasks.add_dependency(CHECK_TASK, TEST);
        tasks.add_dependency(CHECK_TASK, REPORT_TASK);
        tasks.add_dependency(BUILD, ASSEMBLE);
        tasks.add_dependency(BUILD, CHECK_TASK);

        module.ensure_gate_complete(CHECK_TASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeep_core::VersionCatalog;

    #[test]
    fn composes_in_order() {
        let ids: Vec<_> = CoreLibraryConvention::new()
            .composes()
            .iter()
            .map(|c| c.id())
            .collect();
        assert_eq!(ids, vec!["language", "coverage", "checkstyle", "detekt"]);
    }

    #[test]
    fn missing_catalog_entry_aborts_before_tasks_run() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("tools/checkstyle")).unwrap();
        let ctx = BuildContext::builder(tmp.path())
            .catalog(VersionCatalog::from_entries([
                ("kotlin", "1.9.24"),
                ("jacoco", "0.8.12"),
                ("checkstyle", "10.12.0"),
            ]))
            .build();

        let mut module = Module::new("app", tmp.path());
        assert!(matches!(
            module.apply(&CoreLibraryConvention::new(), &ctx),
            Err(ConfigurationError::VersionNotDeclared { name }) if name == "detekt"
        ));
        assert!(!module.has_applied(ID));
    }
}
