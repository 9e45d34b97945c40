//! Language setup: source sets, compilation, assembly and tests.
//!
//! The work itself is delegated to the toolchain command table; a step
//! without a configured command succeeds with a note.

use crate::analysis;
use gatekeep_core::process::{run_step, TemplateVars};
use gatekeep_core::{
    BuildContext, ConfigurationError, Convention, Module, TaskAction, TaskContext, TaskFailure,
    TaskGroup, TaskKind, TaskOutput,
};
use tracing::debug;

/// Convention id.
pub const ID: &str = "language";

/// Catalog key of the language version.
pub const VERSION_KEY: &str = "kotlin";

/// Java compilation task.
pub const COMPILE_JAVA: &str = "compileJava";
/// Kotlin compilation task.
pub const COMPILE_KOTLIN: &str = "compileKotlin";
/// Lifecycle task producing the module's artifacts.
pub const ASSEMBLE: &str = "assemble";
/// Unit test task.
pub const TEST: &str = "test";
/// Lifecycle task building and verifying the module.
pub const BUILD: &str = "build";

/// Language settings of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageExtension {
    /// Kotlin version from the catalog.
    pub kotlin_version: String,
}

/// Registers source sets and the compile/assemble/test/build tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageConvention;

impl LanguageConvention {
    /// Creates the convention.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Convention for LanguageConvention {
    fn id(&self) -> &'static str {
        ID
    }

    fn description(&self) -> &'static str {
        "Java/Kotlin source sets with compile, assemble, test and build tasks"
    }

    fn configure(&self, module: &mut Module, ctx: &BuildContext) -> Result<(), ConfigurationError> {
        let kotlin_version = analysis::version(ctx, VERSION_KEY)?;
        module
            .extensions_mut()
            .configure::<LanguageExtension, _>(|ext| ext.kotlin_version = kotlin_version);
        analysis::ensure_default_source_sets(module);

        let tasks = module.tasks_mut();
        tasks
            .register_or_get(COMPILE_JAVA)
            .describe("Compiles main Java source.")
            .in_group(TaskGroup::Build)
            .of_kind(TaskKind::Build)
            .with_action(ToolchainStep::new(COMPILE_JAVA, "main", &["java"]));
        tasks
            .register_or_get(COMPILE_KOTLIN)
            .describe("Compiles main Kotlin source.")
            .in_group(TaskGroup::Build)
            .of_kind(TaskKind::Build)
            .with_action(ToolchainStep::new(COMPILE_KOTLIN, "main", &["kt", "kts"]));
        tasks
            .register_or_get(ASSEMBLE)
            .describe("Assembles the outputs of this project.")
            .in_group(TaskGroup::Build)
            .depends(COMPILE_JAVA)
            .depends(COMPILE_KOTLIN);
        tasks
            .register_or_get(TEST)
            .describe("Runs the test suite.")
            .in_group(TaskGroup::Verification)
            .of_kind(TaskKind::Build)
            .with_action(ToolchainStep::new(TEST, "test", &["java", "kt", "kts"]))
            .depends(COMPILE_JAVA)
            .depends(COMPILE_KOTLIN);
        tasks
            .register_or_get(BUILD)
            .describe("Assembles and tests this project.")
            .in_group(TaskGroup::Build);
        Ok(())
    }
}

/// Runs the toolchain command configured for `step` over one source set.
#[derive(Debug, Clone)]
pub struct ToolchainStep {
    step: String,
    source_set: String,
    extensions: Vec<&'static str>,
}

impl ToolchainStep {
    /// Creates a step over files of `source_set` with the given extensions.
    #[must_use]
    pub fn new(step: &str, source_set: &str, extensions: &[&'static str]) -> Self {
        Self {
            step: step.to_string(),
            source_set: source_set.to_string(),
            extensions: extensions.to_vec(),
        }
    }

    pub(crate) fn run_with(
        &self,
        ctx: &TaskContext<'_>,
        vars: TemplateVars,
    ) -> Result<TaskOutput, TaskFailure> {
        let module = ctx.module;
        let sources = module
            .source_set(&self.source_set)
            .map(|set| module.source_files(set, &self.extensions))
            .transpose()?
            .unwrap_or_default();
        if sources.is_empty() {
            return Ok(TaskOutput::no_source());
        }

        let Some(template) = ctx.build.toolchain().command(&self.step) else {
            debug!("No toolchain command for '{}'", self.step);
            return Ok(TaskOutput::done().with_line(format!(
                "No toolchain command configured for '{}'; {} file(s) accepted",
                self.step,
                sources.len()
            )));
        };

        let args = vars
            .set("module", module.dir().display().to_string())
            .set("source_set", self.source_set.clone())
            .sources(&sources)
            .expand(template);
        let output = run_step(&args, module.dir())?;
        Ok(output
            .text
            .lines()
            .fold(TaskOutput::done(), |out, line| out.with_line(line)))
    }
}

impl TaskAction for ToolchainStep {
    fn execute(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskFailure> {
        self.run_with(ctx, TemplateVars::new())
    }
}
