//! Tasks command implementation.

use crate::config_resolver::ConfigSource;
use crate::workspace::{report_load_error, Workspace};
use anyhow::Result;
use gatekeep_core::{BuildParameters, Module, TaskGroup};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

/// Runs the tasks command.
pub fn run(root: &Path, source: &ConfigSource, all: bool) -> Result<()> {
    let workspace = match Workspace::load(root, source, BuildParameters::new()) {
        Ok(workspace) => workspace,
        Err(err) => {
            report_load_error(err);
            std::process::exit(super::run::USAGE_ERROR);
        }
    };

    for module in workspace.modules() {
        print!("{}", render(module, all));
    }
    Ok(())
}

/// Renders the task listing of one module, grouped by task group.
///
/// Ungrouped tasks are only listed with `all`.
#[must_use]
pub fn render(module: &Module, all: bool) -> String {
    let mut groups: BTreeMap<TaskGroup, Vec<String>> = BTreeMap::new();
    for task in module.tasks().tasks() {
        if task.group() == TaskGroup::Other && !all {
            continue;
        }
        let line = if task.description().is_empty() {
            task.name().to_string()
        } else {
            format!("{} - {}", task.name(), task.description())
        };
        groups.entry(task.group()).or_default().push(line);
    }

    let rule = "-".repeat(60);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}\nTasks runnable from module '{}'\n{rule}", module.name());
    if groups.is_empty() {
        out.push_str("\nNo tasks.\n");
    }
    for (group, lines) in groups {
        let title = group.title();
        let _ = writeln!(out, "\n{title}\n{}", "-".repeat(title.len()));
        for line in lines {
            let _ = writeln!(out, "{line}");
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeep_core::{TaskKind, CHECK_TASK};

    fn module() -> Module {
        let mut module = Module::new("app", ".");
        module
            .tasks_mut()
            .register_or_get("checkstyleMain")
            .describe("Run Checkstyle analysis for main classes")
            .in_group(TaskGroup::Verification)
            .of_kind(TaskKind::Analysis);
        module
            .tasks_mut()
            .register_or_get(CHECK_TASK)
            .describe("Runs all checks.")
            .in_group(TaskGroup::Verification);
        module.tasks_mut().register_or_get("scratch");
        module
    }

    #[test]
    fn lists_tasks_with_descriptions() {
        let out = render(&module(), false);
        assert!(out.contains("Verification tasks"));
        assert!(out.contains("checkstyleMain - Run Checkstyle analysis for main classes"));
        assert!(out.contains("check - Runs all checks."));
        assert!(!out.contains("scratch"));
    }

    #[test]
    fn all_includes_ungrouped_tasks() {
        let out = render(&module(), true);
        assert!(out.contains("Other tasks"));
        assert!(out.contains("scratch"));
    }
}
