//! Task actions executed by the engine.

use crate::context::BuildContext;
use crate::error::TaskFailure;
use crate::module::Module;
use std::sync::Arc;

/// Context handed to a task action at execution time.
#[derive(Debug, Clone, Copy)]
pub struct TaskContext<'a> {
    /// Name of the executing task.
    pub task: &'a str,
    /// Fully configured module.
    pub module: &'a Module,
    /// Shared build inputs.
    pub build: &'a BuildContext,
}

/// Successful result of a task action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOutput {
    /// `true` when the task had nothing to process.
    pub no_source: bool,
    /// Informational output lines.
    pub lines: Vec<String>,
}

impl TaskOutput {
    /// The action did its work.
    #[must_use]
    pub fn done() -> Self {
        Self::default()
    }

    /// The action found no input to process.
    #[must_use]
    pub fn no_source() -> Self {
        Self {
            no_source: true,
            lines: Vec::new(),
        }
    }

    /// Appends an output line.
    #[must_use]
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

/// The work a task performs. Lifecycle tasks have none.
///
/// Actions read their configuration lazily from the module's extensions, so
/// every convention applied before execution is visible to them.
pub trait TaskAction: Send + Sync {
    /// Executes the action.
    ///
    /// # Errors
    ///
    /// Returns a [`TaskFailure`] describing why the task failed.
    fn execute(&self, ctx: &TaskContext<'_>) -> Result<TaskOutput, TaskFailure>;
}

/// Shared task action handle.
pub type ActionHandle = Arc<dyn TaskAction>;
