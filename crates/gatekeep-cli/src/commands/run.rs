//! Run command implementation.

use crate::config_resolver::ConfigSource;
use crate::workspace::{report_load_error, Workspace};
use crate::OutputFormat;
use anyhow::{bail, Context, Result};
use gatekeep_core::{BuildParameters, BuildResult, Executor, Module};
use std::path::Path;

/// Exit status when a task failed.
const TASK_FAILED: i32 = 1;

/// Exit status for configuration and usage errors.
pub const USAGE_ERROR: i32 = 2;

/// Runs the run command. Exits `1` if any task failed and `2` on
/// configuration errors or unknown tasks and modules.
pub fn run(
    root: &Path,
    source: &ConfigSource,
    tasks: &[String],
    params: &[String],
    module_filter: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let parameters = match parse_parameters(params) {
        Ok(parameters) => parameters,
        Err(err) => {
            report_load_error(err);
            std::process::exit(USAGE_ERROR);
        }
    };
    let workspace = match Workspace::load(root, source, parameters) {
        Ok(workspace) => workspace,
        Err(err) => {
            report_load_error(err);
            std::process::exit(USAGE_ERROR);
        }
    };

    let outcome = execute(&workspace, tasks, module_filter);
    let code = exit_code(&outcome);
    match outcome {
        Ok(results) => super::output::print(&results, format)?,
        Err(err) => report_load_error(err),
    }
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// `0` when every task succeeded, `1` when one failed, `2` when nothing could
/// run.
fn exit_code(outcome: &Result<Vec<BuildResult>>) -> i32 {
    match outcome {
        Err(_) => USAGE_ERROR,
        Ok(results) if results.iter().any(|r| !r.success()) => TASK_FAILED,
        Ok(_) => 0,
    }
}

fn parse_parameters(raw: &[String]) -> Result<BuildParameters> {
    raw.iter()
        .map(|p| BuildParameters::parse_assignment(p).map_err(anyhow::Error::from))
        .collect()
}

/// Runs `tasks` in every selected module that defines at least one of them.
///
/// # Errors
///
/// Fails if the module filter matches nothing, if no module defines any of
/// the tasks, or on an [`gatekeep_core::ExecutionError`].
pub fn execute(
    workspace: &Workspace,
    tasks: &[String],
    module_filter: Option<&str>,
) -> Result<Vec<BuildResult>> {
    let modules: Vec<&Module> = workspace
        .modules()
        .iter()
        .filter(|m| module_filter.map_or(true, |name| m.name() == name))
        .collect();
    if modules.is_empty() {
        bail!("module '{}' not found", module_filter.unwrap_or_default());
    }

    let executor = Executor::new();
    let mut results = Vec::new();
    for module in modules {
        let requested: Vec<&str> = tasks
            .iter()
            .map(String::as_str)
            .filter(|t| module.tasks().contains(t))
            .collect();
        if requested.is_empty() {
            continue;
        }
        let result = executor
            .run(module, workspace.ctx(), &requested)
            .with_context(|| format!("Cannot run tasks in module '{}'", module.name()))?;
        results.push(result);
    }

    if results.is_empty() {
        bail!("task(s) not found in any module: {}", tasks.join(", "));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_resolver::Origin;
    use gatekeep_core::Outcome;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(
            root.join("gatekeep.toml"),
            r#"conventions = ["core-library"]

[tools.checkstyle]
command = ["sh", "-c", "exit 0"]

[tools.detekt]
command = ["sh", "-c", "exit 0"]
"#,
        )
        .unwrap();
        fs::create_dir_all(root.join("gradle")).unwrap();
        fs::write(
            root.join("gradle/libs.versions.toml"),
            "[versions]\nkotlin = \"1.9.24\"\njacoco = \"0.8.12\"\ncheckstyle = \"10.12.0\"\ndetekt = \"1.23.6\"\n",
        )
        .unwrap();
        fs::create_dir_all(root.join("tools/checkstyle")).unwrap();
        fs::write(root.join("tools/checkstyle/checkstyle-suppressions.xml"), "<suppressions/>").unwrap();
        fs::create_dir_all(root.join("tools/detekt")).unwrap();
        fs::create_dir_all(root.join("src/main/java/com/example")).unwrap();
        fs::write(
            root.join("src/main/java/com/example/MyClass.java"),
            "package com.example;\n\npublic class MyClass {}\n",
        )
        .unwrap();
        tmp
    }

    fn load(tmp: &TempDir) -> Workspace {
        let source = ConfigSource::file(Origin::Project, tmp.path().join("gatekeep.toml"));
        Workspace::load(tmp.path(), &source, BuildParameters::new()).unwrap()
    }

    #[test]
    fn check_passes_with_clean_command_tools() {
        let tmp = project();
        let results = execute(&load(&tmp), &["check".to_string()], None).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].success(), "{}", results[0].output());
        assert_eq!(results[0].outcome("checkstyleMain"), Some(Outcome::Success));
    }

    #[test]
    fn unknown_task_is_a_usage_error() {
        let tmp = project();
        let outcome = execute(&load(&tmp), &["publish".to_string()], None);
        assert!(outcome.is_err());
        assert_eq!(exit_code(&outcome), USAGE_ERROR);
    }

    #[test]
    fn unknown_module_is_a_usage_error() {
        let tmp = project();
        let outcome = execute(&load(&tmp), &["check".to_string()], Some("web"));
        assert!(outcome.is_err());
        assert_eq!(exit_code(&outcome), USAGE_ERROR);
    }

    #[test]
    fn exit_code_separates_success_from_task_failure() {
        let tmp = project();
        let outcome = execute(&load(&tmp), &["check".to_string()], None);
        assert_eq!(exit_code(&outcome), 0);

        fs::write(
            tmp.path().join("gatekeep.toml"),
            "conventions = [\"core-library\"]\n\n[tools.checkstyle]\ncommand = [\"sh\", \"-c\", \"echo 'A.java:1: Missing package declaration. [JavadocPackage]'; exit 1\"]\n\n[tools.detekt]\ncommand = [\"sh\", \"-c\", \"exit 0\"]\n",
        )
        .unwrap();
        let outcome = execute(&load(&tmp), &["check".to_string()], None);
        assert_eq!(exit_code(&outcome), TASK_FAILED);
    }

    #[test]
    fn parameters_parse_from_assignments() {
        let params = parse_parameters(&["detekt.autoCorrect=true".to_string()]).unwrap();
        assert_eq!(params.get("detekt.autoCorrect"), Some("true"));
        assert!(parse_parameters(&["=oops".to_string()]).is_err());
    }
}
