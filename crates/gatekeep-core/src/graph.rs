//! Task graph: register-or-get registration, dependencies, and planning.

use crate::error::ExecutionError;
use crate::task::{ActionHandle, TaskAction};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Display group of a task, used by task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskGroup {
    /// Compilation and assembly.
    Build,
    /// Tests, analysis, and the aggregate gate.
    Verification,
    /// Report generation.
    Reporting,
    /// Framework wiring.
    Framework,
    /// Everything else.
    Other,
}

impl TaskGroup {
    /// Heading used in task listings.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Build => "Build tasks",
            Self::Verification => "Verification tasks",
            Self::Reporting => "Reporting tasks",
            Self::Framework => "Framework tasks",
            Self::Other => "Other tasks",
        }
    }
}

/// What role a task plays in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Aggregates its dependencies; has no action.
    Lifecycle,
    /// Runs an analysis tool and must be reachable from the gate.
    Analysis,
    /// Any other action (compile, test, report).
    Build,
}

/// A node in the task graph.
#[derive(Clone)]
pub struct Task {
    name: String,
    description: String,
    group: TaskGroup,
    kind: TaskKind,
    depends_on: BTreeSet<String>,
    action: Option<ActionHandle>,
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("kind", &self.kind)
            .field("depends_on", &self.depends_on)
            .field("has_action", &self.action.is_some())
            .finish_non_exhaustive()
    }
}

impl Task {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            group: TaskGroup::Other,
            kind: TaskKind::Lifecycle,
            depends_on: BTreeSet::new(),
            action: None,
        }
    }

    /// Task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Task group.
    #[must_use]
    pub fn group(&self) -> TaskGroup {
        self.group
    }

    /// Task kind.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Direct dependencies.
    #[must_use]
    pub fn depends_on(&self) -> &BTreeSet<String> {
        &self.depends_on
    }

    /// Task action, if any.
    #[must_use]
    pub fn action(&self) -> Option<&ActionHandle> {
        self.action.as_ref()
    }

    /// Sets the description.
    pub fn describe(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Sets the group.
    pub fn in_group(&mut self, group: TaskGroup) -> &mut Self {
        self.group = group;
        self
    }

    /// Sets the kind.
    pub fn of_kind(&mut self, kind: TaskKind) -> &mut Self {
        self.kind = kind;
        self
    }

    /// Sets the action, replacing any previous one.
    pub fn with_action<A: TaskAction + 'static>(&mut self, action: A) -> &mut Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Adds a dependency.
    pub fn depends(&mut self, task: impl Into<String>) -> &mut Self {
        self.depends_on.insert(task.into());
        self
    }
}

/// The tasks of one module.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: BTreeMap<String, Task>,
}

impl TaskGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the task named `name`, registering an empty lifecycle task first
    /// if it does not exist yet.
    pub fn register_or_get(&mut self, name: &str) -> &mut Task {
        self.tasks
            .entry(name.to_string())
            .or_insert_with(|| Task::new(name))
    }

    /// Returns the task named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Makes `task` depend on `dependency`, registering `task` if needed.
    pub fn add_dependency(&mut self, task: &str, dependency: &str) {
        self.register_or_get(task).depends(dependency);
    }

    /// All tasks, ordered by name.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Names of tasks of the given kind.
    #[must_use]
    pub fn names_of_kind(&self, kind: TaskKind) -> Vec<String> {
        self.tasks
            .values()
            .filter(|t| t.kind == kind)
            .map(|t| t.name.clone())
            .collect()
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no task is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Transitive dependencies of `name`, excluding `name` itself.
    ///
    /// Unknown names contribute nothing; [`TaskGraph::plan`] reports them.
    #[must_use]
    pub fn dependency_closure(&self, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&str> = vec![name];
        while let Some(current) = stack.pop() {
            let Some(task) = self.tasks.get(current) else {
                continue;
            };
            for dep in &task.depends_on {
                if seen.insert(dep.clone()) {
                    stack.push(dep);
                }
            }
        }
        seen.remove(name);
        seen
    }

    /// Execution order for `requested`: every dependency before its
    /// dependents, ties broken by name.
    ///
    /// # Errors
    ///
    /// Fails if a requested task or a dependency is missing, or on a cycle.
    pub fn plan(&self, module: &str, requested: &[&str]) -> Result<Vec<String>, ExecutionError> {
        let mut order = Vec::new();
        let mut done = BTreeSet::new();
        let mut visiting = Vec::new();

        for name in requested {
            self.visit(module, name, &mut visiting, &mut done, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        module: &str,
        name: &str,
        visiting: &mut Vec<String>,
        done: &mut BTreeSet<String>,
        order: &mut Vec<String>,
    ) -> Result<(), ExecutionError> {
        if done.contains(name) {
            return Ok(());
        }
        if let Some(pos) = visiting.iter().position(|n| n == name) {
            let mut path = visiting[pos..].to_vec();
            path.push(name.to_string());
            return Err(ExecutionError::Cycle { path });
        }
        let task = self.tasks.get(name).ok_or_else(|| ExecutionError::UnknownTask {
            name: name.to_string(),
            module: module.to_string(),
        })?;

        visiting.push(name.to_string());
        for dep in &task.depends_on {
            self.visit(module, dep, visiting, done, order)?;
        }
        visiting.pop();

        done.insert(name.to_string());
        order.push(name.to_string());
        Ok(())
    }
}
