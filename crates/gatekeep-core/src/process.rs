//! External command adapters: analysis tools and toolchain steps.

use crate::error::{TaskFailure, ToolError};
use crate::tool::{AnalysisRequest, AnalysisTool, ToolReport};
use crate::types::{ReportFormat, Severity, Violation};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tracing::debug;

/// Placeholder values for a command template.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    values: BTreeMap<&'static str, String>,
    sources: Vec<PathBuf>,
}

impl TemplateVars {
    /// Creates an empty set of variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `{name}` to `value`.
    #[must_use]
    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    /// Files substituted for a standalone `{sources}` argument.
    #[must_use]
    pub fn sources(mut self, sources: &[PathBuf]) -> Self {
        self.sources = sources.to_vec();
        self
    }

    /// Expands a template. A standalone `{sources}` argument becomes one
    /// argument per file; other placeholders are replaced in place.
    #[must_use]
    pub fn expand(&self, template: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(template.len());
        for arg in template {
            if arg == "{sources}" {
                args.extend(self.sources.iter().map(|p| p.display().to_string()));
                continue;
            }
            let mut expanded = arg.clone();
            for (name, value) in &self.values {
                expanded = expanded.replace(&format!("{{{name}}}"), value);
            }
            args.push(expanded);
        }
        args
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `-1` when terminated by a signal.
    pub code: i32,
    /// stdout followed by stderr.
    pub text: String,
}

impl CommandOutput {
    /// Returns `true` for exit code zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs `args[0]` with the remaining arguments in `dir`.
///
/// # Errors
///
/// Returns [`ToolError::Launch`] if the program cannot be started.
pub fn run_command(args: &[String], dir: &Path) -> Result<CommandOutput, ToolError> {
    let Some((program, rest)) = args.split_first() else {
        return Err(ToolError::Initialization("empty command".to_string()));
    };
    debug!("Running {} {}", program, rest.join(" "));

    let output = Command::new(program)
        .args(rest)
        .current_dir(dir)
        .output()
        .map_err(|source| ToolError::Launch {
            program: program.clone(),
            source,
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }

    Ok(CommandOutput {
        code: output.status.code().unwrap_or(-1),
        text,
    })
}

/// Runs a toolchain step and maps failures to [`TaskFailure::Command`].
///
/// # Errors
///
/// Fails if the program cannot start or exits non-zero.
pub fn run_step(args: &[String], dir: &Path) -> Result<CommandOutput, TaskFailure> {
    let program = args.first().cloned().unwrap_or_default();
    let output = run_command(args, dir).map_err(|e| TaskFailure::Command {
        program: program.clone(),
        code: -1,
        output: e.to_string(),
    })?;
    if output.success() {
        Ok(output)
    } else {
        Err(TaskFailure::Command {
            program,
            code: output.code,
            output: output.text,
        })
    }
}

/// How to invoke an analysis tool as an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Command template. Placeholders: `{sources}`, `{config_dir}`,
    /// `{config_file}`, `{version}`, `{source_set}`, `{module}`.
    pub command: Vec<String>,
    /// Extra arguments appended when auto-correct is enabled.
    #[serde(default)]
    pub auto_correct_args: Vec<String>,
    /// Extra arguments per enabled report format; `{path}` is the report file.
    #[serde(default)]
    pub report_args: BTreeMap<ReportFormat, Vec<String>>,
}

/// An [`AnalysisTool`] backed by an external command.
///
/// Output lines shaped `[SEVERITY] <file>:<line>[:<col>]: <message> [<Rule>]`
/// become violations. A non-zero exit without any recognised violation
/// means the tool itself failed, and its output becomes the error message.
#[derive(Debug, Clone)]
pub struct CommandTool {
    name: String,
    template: ToolCommand,
}

impl CommandTool {
    /// Creates a command-backed tool registered as `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, template: ToolCommand) -> Self {
        Self {
            name: name.into(),
            template,
        }
    }

    fn arguments(&self, request: &AnalysisRequest<'_>) -> Vec<String> {
        let config = request.config;
        let vars = TemplateVars::new()
            .set("config_dir", config.config_dir.display().to_string())
            .set(
                "config_file",
                config
                    .config_file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            )
            .set("version", config.version.clone())
            .set("source_set", request.source_set)
            .set("module", request.module_dir.display().to_string())
            .sources(request.sources);

        let mut args = vars.expand(&self.template.command);
        if request.auto_correct {
            args.extend(vars.expand(&self.template.auto_correct_args));
        }
        for target in request.reports {
            if let Some(template) = self.template.report_args.get(&target.format) {
                let report_vars = TemplateVars::new().set("path", target.path.display().to_string());
                args.extend(report_vars.expand(template));
            }
        }
        args
    }
}

impl AnalysisTool for CommandTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze(&self, request: &AnalysisRequest<'_>) -> Result<ToolReport, ToolError> {
        for target in request.reports {
            if let Some(parent) = target.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let before = if request.auto_correct {
            snapshot(request.sources)
        } else {
            Vec::new()
        };

        let output = run_command(&self.arguments(request), request.module_dir)?;
        let mut violations: Vec<Violation> = output
            .text
            .lines()
            .filter_map(|line| parse_diagnostic(line, request.module_dir))
            .collect();

        if violations.is_empty() && !output.success() {
            return Err(ToolError::Initialization(output.text.trim().to_string()));
        }
        violations.sort_by(Violation::report_order);
        violations.dedup();

        let corrected = before
            .into_iter()
            .filter(|(path, content)| std::fs::read(path).ok().as_ref() != Some(content))
            .map(|(path, _)| path)
            .collect();

        Ok(ToolReport {
            violations,
            corrected,
        })
    }
}

fn snapshot(sources: &[PathBuf]) -> Vec<(PathBuf, Vec<u8>)> {
    sources
        .iter()
        .filter_map(|p| std::fs::read(p).ok().map(|c| (p.clone(), c)))
        .collect()
}

fn diagnostic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?:\[(?P<sev>[A-Za-z]+)\]\s+)?(?P<file>(?P<drive>[A-Za-z]:[\\/])?[^:\s\[][^:]*):(?P<line>\d+)(?::(?P<col>\d+))?:\s*(?P<msg>.*?)\s*\[(?P<rule>[A-Za-z0-9_.-]+)\]\s*$",
        )
        .unwrap_or_else(|e| unreachable!("invalid diagnostic pattern: {e}"))
    })
}

/// Parses one diagnostic line. Relative file paths resolve against `base`;
/// drive-prefixed paths (`C:\...`) are kept as they are.
#[must_use]
pub fn parse_diagnostic(line: &str, base: &Path) -> Option<Violation> {
    let caps = diagnostic_pattern().captures(line.trim())?;
    let file = PathBuf::from(&caps["file"]);
    let file = if file.is_absolute() || caps.name("drive").is_some() {
        file
    } else {
        base.join(file)
    };
    let line_no = caps["line"].parse().ok()?;
    let column = caps.name("col").and_then(|c| c.as_str().parse().ok());
    let severity = caps
        .name("sev")
        .and_then(|s| Severity::from_label(s.as_str()))
        .unwrap_or(Severity::Error);

    Some(
        Violation::new(&caps["rule"], file, &caps["msg"])
            .at(line_no, column)
            .with_severity(severity),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ReportTarget;
    use crate::types::ToolConfiguration;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn parses_checkstyle_plain_output() {
        let v = parse_diagnostic(
            "[ERROR] /work/src/main/java/BadClass.java:1: Missing package declaration. [JavadocPackage]",
            Path::new("/work"),
        )
        .unwrap();
        assert_eq!(v.rule, "JavadocPackage");
        assert_eq!(v.file, PathBuf::from("/work/src/main/java/BadClass.java"));
        assert_eq!(v.line, Some(1));
        assert_eq!(v.column, None);
        assert_eq!(v.message, "Missing package declaration.");
    }

    #[test]
    fn parses_relative_path_with_column() {
        let v = parse_diagnostic(
            "[WARN] src/main/java/com/example/BadClass.java:3:15: '{' is not preceded with whitespace. [WhitespaceAround]",
            Path::new("/work"),
        )
        .unwrap();
        assert_eq!(v.file, PathBuf::from("/work/src/main/java/com/example/BadClass.java"));
        assert_eq!(v.column, Some(15));
        assert_eq!(v.severity, Severity::Warning);
    }

    #[test]
    fn parses_drive_prefixed_paths() {
        let v = parse_diagnostic(
            r"[ERROR] C:\work\src\main\java\BadClass.java:3:15: '{' is not preceded with whitespace. [WhitespaceAround]",
            Path::new("/work"),
        )
        .unwrap();
        assert_eq!(v.file, PathBuf::from(r"C:\work\src\main\java\BadClass.java"));
        assert_eq!(v.line, Some(3));
        assert_eq!(v.column, Some(15));
        assert_eq!(v.rule, "WhitespaceAround");

        let v = parse_diagnostic("D:/ci/Main.kt:7: Missing newline. [FinalNewline]", Path::new("/work")).unwrap();
        assert_eq!(v.file, PathBuf::from("D:/ci/Main.kt"));
        assert_eq!(v.line, Some(7));
    }

    #[test]
    fn ignores_noise_lines() {
        assert!(parse_diagnostic("Starting audit...", Path::new(".")).is_none());
        assert!(parse_diagnostic("Audit done.", Path::new(".")).is_none());
    }

    #[test]
    fn expands_sources_and_placeholders() {
        let vars = TemplateVars::new()
            .set("config_file", "/cfg/checkstyle.xml")
            .sources(&[PathBuf::from("A.java"), PathBuf::from("B.java")]);
        let args = vars.expand(&strings(&["checkstyle", "-c", "{config_file}", "{sources}"]));
        assert_eq!(args, strings(&["checkstyle", "-c", "/cfg/checkstyle.xml", "A.java", "B.java"]));
    }

    #[test]
    fn failing_step_reports_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = run_step(&strings(&["sh", "-c", "echo boom; exit 3"]), tmp.path()).unwrap_err();
        match err {
            TaskFailure::Command { code, output, .. } => {
                assert_eq!(code, 3);
                assert!(output.contains("boom"));
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    fn request<'a>(
        dir: &'a Path,
        sources: &'a [PathBuf],
        config: &'a ToolConfiguration,
        reports: &'a [ReportTarget],
    ) -> AnalysisRequest<'a> {
        AnalysisRequest {
            module_dir: dir,
            source_set: "main",
            sources,
            config,
            auto_correct: false,
            reports,
        }
    }

    #[test]
    fn command_tool_collects_violations() {
        let tmp = tempfile::TempDir::new().unwrap();
        let tool = CommandTool::new(
            "checkstyle",
            ToolCommand {
                command: strings(&[
                    "sh",
                    "-c",
                    "echo '[ERROR] src/main/java/BadClass.java:1: Missing package declaration. [JavadocPackage]'; exit 1",
                ]),
                ..ToolCommand::default()
            },
        );
        let config = ToolConfiguration::default();
        let report = tool.analyze(&request(tmp.path(), &[], &config, &[])).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].rule, "JavadocPackage");
    }

    #[test]
    fn command_tool_maps_crash_to_initialization_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let tool = CommandTool::new(
            "checkstyle",
            ToolCommand {
                command: strings(&[
                    "sh",
                    "-c",
                    "echo 'cannot initialize module SuppressionFilter - Unable to find: tools/checkstyle/checkstyle-suppressions.xml' >&2; exit 254",
                ]),
                ..ToolCommand::default()
            },
        );
        let config = ToolConfiguration::default();
        let err = tool.analyze(&request(tmp.path(), &[], &config, &[])).unwrap_err();
        assert!(err.to_string().contains("Unable to find: tools/checkstyle/checkstyle-suppressions.xml"));
    }

    #[test]
    fn command_tool_passes_report_arguments() {
        let tmp = tempfile::TempDir::new().unwrap();
        let report_path = tmp.path().join("build/reports/checkstyle/main.xml");
        let mut report_args = BTreeMap::new();
        report_args.insert(ReportFormat::Xml, strings(&["{path}"]));
        let tool = CommandTool::new(
            "checkstyle",
            ToolCommand {
                command: strings(&["sh", "-c", "touch \"$0\""]),
                auto_correct_args: vec![],
                report_args,
            },
        );
        let config = ToolConfiguration::default();
        let reports = [ReportTarget {
            format: ReportFormat::Xml,
            path: report_path.clone(),
        }];
        let report = tool.analyze(&request(tmp.path(), &[], &config, &reports)).unwrap();
        assert!(report.violations.is_empty());
        assert!(report_path.exists());
    }

    #[test]
    fn command_tool_reports_auto_corrected_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fixable = tmp.path().join("Fixable.kt");
        let clean = tmp.path().join("Clean.kt");
        std::fs::write(&fixable, "class Fixable").unwrap();
        std::fs::write(&clean, "class Clean\n").unwrap();
        let script = r#"fix=0
for a in "$@"; do [ "$a" = --auto-correct ] && fix=1; done
for f in "$@"; do
  case "$f" in
    *Fixable.kt)
      echo "$f:1:13: File must end with a newline. [FinalNewline]"
      if [ "$fix" = 1 ]; then printf '\n' >> "$f"; fi ;;
  esac
done
exit 1"#;
        let tool = CommandTool::new(
            "detekt",
            ToolCommand {
                command: strings(&["sh", "-c", script, "detekt", "{sources}"]),
                auto_correct_args: strings(&["--auto-correct"]),
                report_args: BTreeMap::new(),
            },
        );
        let config = ToolConfiguration::default();
        let sources = [clean.clone(), fixable.clone()];

        let report = tool.analyze(&request(tmp.path(), &sources, &config, &[])).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert!(report.corrected.is_empty());
        assert_eq!(std::fs::read_to_string(&fixable).unwrap(), "class Fixable");

        let fixing = AnalysisRequest {
            auto_correct: true,
            ..request(tmp.path(), &sources, &config, &[])
        };
        let report = tool.analyze(&fixing).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.corrected, vec![fixable.clone()]);
        assert_eq!(std::fs::read_to_string(&fixable).unwrap(), "class Fixable\n");
        assert_eq!(std::fs::read_to_string(&clean).unwrap(), "class Clean\n");
    }
}
