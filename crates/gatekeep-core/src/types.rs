//! Core types shared by tools, conventions, and reports.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

/// Severity reported by an analysis tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Parses a tool severity label (`ERROR`, `warn`, ...).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "error" | "err" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A rule violation reported by an analysis tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule identity as named by the tool (e.g., `WhitespaceAround`).
    pub rule: String,
    /// Offending file.
    pub file: PathBuf,
    /// Line number (1-indexed), if the tool reported one.
    pub line: Option<usize>,
    /// Column number (1-indexed), if the tool reported one.
    pub column: Option<usize>,
    /// Human-readable message.
    pub message: String,
    /// Severity as reported by the tool.
    pub severity: Severity,
}

impl Violation {
    /// Creates an error-severity violation without a position.
    #[must_use]
    pub fn new(rule: impl Into<String>, file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            file: file.into(),
            line: None,
            column: None,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Sets the position of this violation.
    #[must_use]
    pub fn at(mut self, line: usize, column: Option<usize>) -> Self {
        self.line = Some(line);
        self.column = column;
        self
    }

    /// Sets the severity of this violation.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Report ordering: file, line, column, rule.
    #[must_use]
    pub fn report_order(a: &Self, b: &Self) -> Ordering {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.column.cmp(&b.column))
            .then(a.rule.cmp(&b.rule))
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        write!(f, ": {} [{}]", self.message, self.rule)
    }
}

/// Report formats a tool can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Machine-readable XML.
    Xml,
    /// Human-readable HTML.
    Html,
    /// Static Analysis Results Interchange Format.
    Sarif,
}

impl ReportFormat {
    /// File extension for reports in this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Html => "html",
            Self::Sarif => "sarif",
        }
    }
}

/// Independent on/off switches for each report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportToggles {
    /// Machine-readable report.
    pub xml: bool,
    /// Human-readable report.
    pub html: bool,
    /// Diagnostic-interchange report.
    pub sarif: bool,
}

impl ReportToggles {
    /// All formats enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            xml: true,
            html: true,
            sarif: true,
        }
    }

    /// Returns the enabled formats in a fixed order.
    #[must_use]
    pub fn enabled(&self) -> Vec<ReportFormat> {
        [
            (self.xml, ReportFormat::Xml),
            (self.html, ReportFormat::Html),
            (self.sarif, ReportFormat::Sarif),
        ]
        .into_iter()
        .filter_map(|(on, format)| on.then_some(format))
        .collect()
    }
}

/// A file inside the configuration directory that the rule file references.
///
/// Its absence is not detected at configuration time; the owning task fails
/// with a tool-initialization error when it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportFile {
    /// Tool module that loads the file (e.g., `SuppressionFilter`).
    pub module: String,
    /// File name relative to the configuration directory.
    pub file: String,
}

impl SupportFile {
    /// Creates a support file entry.
    #[must_use]
    pub fn new(module: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            file: file.into(),
        }
    }
}

/// Resolved settings bound to one analysis tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfiguration {
    /// Tool name, also the key of its [`AnalysisTool`](crate::AnalysisTool) registration.
    pub tool: String,
    /// Tool version, resolved from the version catalog.
    pub version: String,
    /// Absolute configuration directory.
    pub config_dir: PathBuf,
    /// Main rule file inside `config_dir`.
    pub config_file: Option<String>,
    /// Files referenced by the rule file.
    pub support_files: Vec<SupportFile>,
    /// Maximum tolerated violations; `0` fails on any violation.
    pub max_violations: usize,
    /// Requested report formats.
    pub reports: ReportToggles,
}

impl ToolConfiguration {
    /// Absolute path of the main rule file, if one is configured.
    #[must_use]
    pub fn config_file_path(&self) -> Option<PathBuf> {
        self.config_file.as_ref().map(|f| self.config_dir.join(f))
    }

    /// Name of the configuration directory (last path component).
    #[must_use]
    pub fn config_dir_name(&self) -> Option<String> {
        self.config_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Returns `true` when `count` violations exceed the threshold.
    #[must_use]
    pub fn exceeds_threshold(&self, count: usize) -> bool {
        count > self.max_violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_display_includes_rule() {
        let v = Violation::new("WhitespaceAround", "BadClass.java", "'{' is not preceded with whitespace.")
            .at(3, Some(15));
        assert_eq!(
            v.to_string(),
            "BadClass.java:3:15: '{' is not preceded with whitespace. [WhitespaceAround]"
        );
    }

    #[test]
    fn violation_display_without_position() {
        let v = Violation::new("FinalNewline", "Bad.kt", "File must end with a newline");
        assert_eq!(v.to_string(), "Bad.kt: File must end with a newline [FinalNewline]");
    }

    #[test]
    fn zero_threshold_fails_on_single_violation() {
        let config = ToolConfiguration::default();
        assert!(!config.exceeds_threshold(0));
        assert!(config.exceeds_threshold(1));
    }

    #[test]
    fn enabled_reports_follow_toggles() {
        let toggles = ReportToggles {
            xml: true,
            html: false,
            sarif: true,
        };
        assert_eq!(toggles.enabled(), vec![ReportFormat::Xml, ReportFormat::Sarif]);
        assert_eq!(ReportToggles::all().enabled().len(), 3);
    }

    #[test]
    fn severity_labels() {
        assert_eq!(Severity::from_label("ERROR"), Some(Severity::Error));
        assert_eq!(Severity::from_label("warn"), Some(Severity::Warning));
        assert_eq!(Severity::from_label("fatal"), None);
    }
}
