//! Sequential task executor and build results.

use crate::context::BuildContext;
use crate::error::{ExecutionError, TaskFailure};
use crate::module::Module;
use crate::task::TaskContext;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};

/// Terminal state of an executed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// The task did its work.
    Success,
    /// Nothing to process; counts as success.
    NoSource,
    /// The tool reported more violations than allowed.
    FailedWithViolations,
    /// The tool could not start or initialize.
    FailedWithToolError,
    /// Any other failure, including a failed lifecycle aggregate.
    Failed,
    /// Not run because a prerequisite did not succeed.
    Skipped,
}

impl Outcome {
    /// Returns `true` for the succeeded states.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::NoSource)
    }

    /// Returns `true` for the failed states.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::FailedWithViolations | Self::FailedWithToolError | Self::Failed
        )
    }

    fn of_failure(failure: &TaskFailure) -> Self {
        match failure {
            TaskFailure::Violations { .. } => Self::FailedWithViolations,
            TaskFailure::ToolInitialization { .. } => Self::FailedWithToolError,
            _ => Self::Failed,
        }
    }

    /// Status label printed after the task path.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "",
            Self::NoSource => "NO-SOURCE",
            Self::FailedWithViolations | Self::FailedWithToolError | Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }
}

/// Result of one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    /// Task name.
    pub task: String,
    /// Terminal state.
    pub outcome: Outcome,
    /// Informational output lines.
    pub output: Vec<String>,
    /// Failure headline and details, for failed tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
}

/// Result of executing tasks in one module.
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    /// Module name.
    pub module: String,
    /// Task results in execution order.
    pub tasks: Vec<TaskResult>,
}

impl BuildResult {
    /// Outcome of `task`, if it was part of the run.
    #[must_use]
    pub fn outcome(&self, task: &str) -> Option<Outcome> {
        self.result(task).map(|r| r.outcome)
    }

    /// Result of `task`, if it was part of the run.
    #[must_use]
    pub fn result(&self, task: &str) -> Option<&TaskResult> {
        self.tasks.iter().find(|r| r.task == task)
    }

    /// Returns `true` if no task failed or was skipped.
    #[must_use]
    pub fn success(&self) -> bool {
        self.tasks.iter().all(|r| r.outcome.is_success())
    }

    /// Names of failed tasks.
    #[must_use]
    pub fn failed_tasks(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|r| r.outcome.is_failure())
            .map(|r| r.task.as_str())
            .collect()
    }

    /// Console log of the run: one `> Task :module:name STATUS` line per task
    /// followed by its output and failure details.
    #[must_use]
    pub fn output(&self) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        for result in &self.tasks {
            let label = result.outcome.label();
            if label.is_empty() {
                let _ = writeln!(out, "> Task :{}:{}", self.module, result.task);
            } else {
                let _ = writeln!(out, "> Task :{}:{} {}", self.module, result.task, label);
            }
            for line in &result.output {
                let _ = writeln!(out, "{line}");
            }
            if let Some(failure) = &result.failure {
                out.push_str(failure);
                if !failure.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// Runs tasks of a configured module in dependency order.
///
/// Execution never stops at the first failure: tasks that do not depend on a
/// failed task still run, tasks that do are skipped, and action-less
/// lifecycle tasks fail when any of their dependencies did not succeed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor;

impl Executor {
    /// Creates an executor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes `requested` and everything they depend on.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] if a task is unknown or the graph has a
    /// cycle. Task failures are reported in the [`BuildResult`], not as errors.
    pub fn run(
        &self,
        module: &Module,
        ctx: &BuildContext,
        requested: &[&str],
    ) -> Result<BuildResult, ExecutionError> {
        let plan = module.tasks().plan(module.name(), requested)?;
        info!("Executing {} task(s) in '{}'", plan.len(), module.name());

        let mut outcomes: BTreeMap<&str, Outcome> = BTreeMap::new();
        let mut results = Vec::with_capacity(plan.len());

        for name in &plan {
            let Some(task) = module.tasks().get(name) else {
                continue;
            };
            let start = Instant::now();
            let unsuccessful: Vec<&str> = task
                .depends_on()
                .iter()
                .map(String::as_str)
                .filter(|dep| !outcomes.get(dep).is_some_and(|o| o.is_success()))
                .collect();

            let result = match (task.action(), unsuccessful.is_empty()) {
                (Some(_), false) => TaskResult {
                    task: name.clone(),
                    outcome: Outcome::Skipped,
                    output: vec![format!("Skipped: prerequisite {} did not succeed", unsuccessful.join(", "))],
                    failure: None,
                    duration_ms: 0,
                },
                (None, false) => TaskResult {
                    task: name.clone(),
                    outcome: Outcome::Failed,
                    output: Vec::new(),
                    failure: Some(format!(
                        "{} dependency task(s) did not succeed: {}",
                        unsuccessful.len(),
                        unsuccessful.join(", ")
                    )),
                    duration_ms: 0,
                },
                (None, true) => TaskResult {
                    task: name.clone(),
                    outcome: Outcome::Success,
                    output: Vec::new(),
                    failure: None,
                    duration_ms: 0,
                },
                (Some(action), true) => {
                    let task_ctx = TaskContext {
                        task: name,
                        module,
                        build: ctx,
                    };
                    match action.execute(&task_ctx) {
                        Ok(output) => TaskResult {
                            task: name.clone(),
                            outcome: if output.no_source {
                                Outcome::NoSource
                            } else {
                                Outcome::Success
                            },
                            output: output.lines,
                            failure: None,
                            duration_ms: elapsed_ms(start),
                        },
                        Err(failure) => {
                            warn!("Task '{}' failed: {}", name, failure);
                            TaskResult {
                                task: name.clone(),
                                outcome: Outcome::of_failure(&failure),
                                output: Vec::new(),
                                failure: Some(failure.details()),
                                duration_ms: elapsed_ms(start),
                            }
                        }
                    }
                }
            };

            outcomes.insert(name.as_str(), result.outcome);
            results.push(result);
        }

        let build = BuildResult {
            module: module.name().to_string(),
            tasks: results,
        };
        if build.success() {
            info!("Module '{}': BUILD SUCCESSFUL", module.name());
        } else {
            warn!(
                "Module '{}': BUILD FAILED ({})",
                module.name(),
                build.failed_tasks().join(", ")
            );
        }
        Ok(build)
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TaskKind;
    use crate::module::CHECK_TASK;
    use crate::task::{TaskAction, TaskOutput};
    use crate::types::Violation;

    struct Passing;

    impl TaskAction for Passing {
        fn execute(&self, _ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskFailure> {
            Ok(TaskOutput::done())
        }
    }

    struct Violating;

    impl TaskAction for Violating {
        fn execute(&self, _ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskFailure> {
            Err(TaskFailure::Violations {
                tool: "Checkstyle".to_string(),
                violations: vec![Violation::new("JavadocPackage", "A.java", "Missing package declaration.")],
                max_violations: 0,
                corrected: vec![],
            })
        }
    }

    fn module_with(style: impl TaskAction + 'static) -> Module {
        let mut module = Module::new("app", ".");
        let tasks = module.tasks_mut();
        tasks.register_or_get("compileJava").of_kind(TaskKind::Build).with_action(Passing);
        tasks
            .register_or_get("test")
            .of_kind(TaskKind::Build)
            .with_action(Passing)
            .depends("compileJava");
        tasks
            .register_or_get("checkstyleMain")
            .of_kind(TaskKind::Analysis)
            .with_action(style);
        tasks
            .register_or_get("jacocoTestReport")
            .of_kind(TaskKind::Build)
            .with_action(Passing)
            .depends("checkstyleMain");
        tasks.add_dependency(CHECK_TASK, "test");
        tasks.add_dependency(CHECK_TASK, "checkstyleMain");
        module
    }

    fn ctx() -> BuildContext {
        BuildContext::builder(".").build()
    }

    #[test]
    fn clean_run_succeeds() {
        let module = module_with(Passing);
        let result = Executor::new().run(&module, &ctx(), &[CHECK_TASK]).unwrap();
        assert!(result.success());
        assert_eq!(result.outcome(CHECK_TASK), Some(Outcome::Success));
        assert_eq!(result.tasks.len(), 4);
    }

    #[test]
    fn gate_fails_when_analysis_fails() {
        let module = module_with(Violating);
        let result = Executor::new().run(&module, &ctx(), &[CHECK_TASK]).unwrap();

        assert!(!result.success());
        assert_eq!(result.outcome("checkstyleMain"), Some(Outcome::FailedWithViolations));
        assert_eq!(result.outcome("test"), Some(Outcome::Success));
        assert_eq!(result.outcome(CHECK_TASK), Some(Outcome::Failed));
        assert!(result.output().contains("> Task :app:checkstyleMain FAILED"));
        assert!(result.output().contains("Missing package declaration."));
    }

    #[test]
    fn dependents_of_failed_task_are_skipped() {
        let module = module_with(Violating);
        let result = Executor::new()
            .run(&module, &ctx(), &[CHECK_TASK, "jacocoTestReport"])
            .unwrap();
        assert_eq!(result.outcome("jacocoTestReport"), Some(Outcome::Skipped));
        assert_eq!(result.failed_tasks(), vec!["checkstyleMain", CHECK_TASK]);
    }

    #[test]
    fn unknown_task_is_an_error() {
        let module = module_with(Passing);
        assert!(matches!(
            Executor::new().run(&module, &ctx(), &["assemble"]),
            Err(ExecutionError::UnknownTask { .. })
        ));
    }
}
