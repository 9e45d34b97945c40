//! Spring Boot library convention layered on top of `core-library`.

use crate::core_library::CoreLibraryConvention;
use gatekeep_core::{
    BuildContext, ConfigurationError, Convention, ConventionBox, Module, TaskAction, TaskContext,
    TaskFailure, TaskGroup, TaskKind, TaskOutput,
};

/// Convention id.
pub const ID: &str = "framework-library";

/// Catalog key of the framework version.
pub const VERSION_KEY: &str = "spring-boot";

/// Task printing the resolved framework wiring.
pub const DEPENDENCIES_TASK: &str = "frameworkDependencies";

/// Coordinates of the framework's dependency platform, without version.
pub const PLATFORM: &str = "org.springframework.boot:spring-boot-dependencies";

/// Starters every framework library depends on.
pub const DEFAULT_STARTERS: &[&str] = &[
    "org.springframework.boot:spring-boot-starter",
    "org.springframework.boot:spring-boot-starter-test",
];

/// Framework wiring of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameworkExtension {
    /// Platform coordinates including version.
    pub platform: String,
    /// Starter coordinates, versions managed by the platform.
    pub starters: Vec<String>,
}

/// `core-library` plus Spring Boot platform wiring.
///
/// Adds nothing to the analysis setup: the inherited Checkstyle and detekt
/// configuration is shared, not recreated.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameworkLibraryConvention;

impl FrameworkLibraryConvention {
    /// Creates the convention.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Convention for FrameworkLibraryConvention {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "core-library plus Spring Boot platform and starters"
    }

    fn composes(&self) -> Vec<ConventionBox> {
        vec![Box::new(CoreLibraryConvention::new())]
    }

    fn configure(&self, module: &mut Module, ctx: &BuildContext) -> Result<(), ConfigurationError> {
        let version = ctx.catalog().lookup(VERSION_KEY)?;
        let platform = format!("{PLATFORM}:{version}");

        module.extensions_mut().configure::<FrameworkExtension, _>(|ext| {
            ext.platform = platform;
            for starter in DEFAULT_STARTERS {
                if !ext.starters.iter().any(|s| s == starter) {
                    ext.starters.push((*starter).to_string());
                }
            }
        });

        module
            .tasks_mut()
            .register_or_get(DEPENDENCIES_TASK)
            .describe("Displays the framework platform and starters.")
            .in_group(TaskGroup::Framework)
            .of_kind(TaskKind::Build)
            .with_action(ShowFramework);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct ShowFramework;

impl TaskAction for ShowFramework {
    fn execute(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskFailure> {
        let Some(ext) = ctx.module.extensions().get::<FrameworkExtension>() else {
            return Ok(TaskOutput::no_source());
        };
        Ok(ext.starters.iter().fold(
            TaskOutput::done().with_line(format!("platform: {}", ext.platform)),
            |out, s| out.with_line(format!("starter: {s}")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_core_library() {
        let ids: Vec<_> = FrameworkLibraryConvention::new()
            .composes()
            .iter()
            .map(|c| c.id())
            .collect();
        assert_eq!(ids, vec!["core-library"]);
    }
}
