//! Init command implementation.

use anyhow::{bail, Context, Result};
use gatekeep_core::DEFAULT_CATALOG_PATH;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# gatekeep configuration

# Conventions applied to the root module
conventions = ["core-library"]

[catalog]
path = "gradle/libs.versions.toml"

# Additional modules
# [modules.core]
# path = "core"
# conventions = ["framework-library"]

# Analysis tools. Output lines shaped
#   [SEVERITY] <file>:<line>[:<col>]: <message> [<Rule>]
# are reported as violations.
[tools.checkstyle]
command = ["checkstyle", "-c", "{config_file}", "{sources}"]

[tools.checkstyle.report_args]
xml = ["-f", "xml", "-o", "{path}"]

[tools.detekt]
command = ["detekt", "--input", "{module}/src", "--config", "{config_file}"]
auto_correct_args = ["--auto-correct"]

[tools.detekt.report_args]
xml = ["--report", "xml:{path}"]
html = ["--report", "html:{path}"]
sarif = ["--report", "sarif:{path}"]

# Toolchain commands by task name. Unconfigured steps succeed with a note.
[toolchain]
# compileJava = ["javac", "-d", "build/classes/java/main", "{sources}"]
# test = ["./run-tests.sh"]
"#;

const DEFAULT_CATALOG: &str = r#"[versions]
kotlin = "1.9.24"
jacoco = "0.8.12"
checkstyle = "10.17.0"
detekt = "1.23.6"
spring-boot = "3.3.0"
"#;

const CHECKSTYLE_CONFIG: &str = r#"<?xml version="1.0"?>
<!DOCTYPE module PUBLIC
    "-//Checkstyle//DTD Checkstyle Configuration 1.3//EN"
    "https://checkstyle.org/dtds/configuration_1_3.dtd">
<module name="Checker">
  <module name="SuppressionFilter">
    <property name="file" value="${config_loc}/checkstyle-suppressions.xml"/>
  </module>
  <module name="JavadocPackage"/>
  <module name="TreeWalker">
    <module name="WhitespaceAround"/>
  </module>
</module>
"#;

const CHECKSTYLE_SUPPRESSIONS: &str = r#"<?xml version="1.0"?>
<!DOCTYPE suppressions PUBLIC
    "-//Checkstyle//DTD SuppressionFilter Configuration 1.2//EN"
    "https://checkstyle.org/dtds/suppressions_1_2.dtd">
<suppressions>
</suppressions>
"#;

const DETEKT_CONFIG: &str = "formatting:\n  FinalNewline:\n    active: true\n";

/// Files written by `init`, relative to the root.
pub const FILES: &[(&str, &str)] = &[
    ("gatekeep.toml", DEFAULT_CONFIG),
    (DEFAULT_CATALOG_PATH, DEFAULT_CATALOG),
    ("tools/checkstyle/checkstyle.xml", CHECKSTYLE_CONFIG),
    ("tools/checkstyle/checkstyle-suppressions.xml", CHECKSTYLE_SUPPRESSIONS),
    ("tools/detekt/detekt.yml", DETEKT_CONFIG),
];

/// Runs the init command.
pub fn run(root: &Path, force: bool) -> Result<()> {
    let config_path = root.join("gatekeep.toml");
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    for relative in write_files(root, force)? {
        println!("Created {relative}");
    }

    println!("\nNext steps:");
    println!("  1. Edit gatekeep.toml to point the tools at your installation");
    println!("  2. Run: gatekeep tasks");
    println!("  3. Run: gatekeep run check");

    Ok(())
}

/// Writes the scaffold files, keeping existing ones unless `force`.
/// Returns the files written.
fn write_files(root: &Path, force: bool) -> Result<Vec<&'static str>> {
    let mut written = Vec::new();
    for (relative, content) in FILES {
        let path = root.join(relative);
        if path.exists() && !force {
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(*relative);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeep_core::{Config, VersionCatalog};

    #[test]
    fn scaffold_is_loadable() {
        let tmp = tempfile::TempDir::new().unwrap();
        let written = write_files(tmp.path(), false).unwrap();
        assert_eq!(written.len(), FILES.len());

        let config = Config::from_file(&tmp.path().join("gatekeep.toml")).unwrap();
        assert_eq!(config.conventions, vec!["core-library"]);
        assert_eq!(config.tools.len(), 2);

        let catalog = VersionCatalog::from_file(&config.catalog_path(tmp.path())).unwrap();
        assert_eq!(catalog.lookup("checkstyle").unwrap(), "10.17.0");
    }

    #[test]
    fn existing_files_are_kept_without_force() {
        let tmp = tempfile::TempDir::new().unwrap();
        let catalog = tmp.path().join(DEFAULT_CATALOG_PATH);
        std::fs::create_dir_all(catalog.parent().unwrap()).unwrap();
        std::fs::write(&catalog, "[versions]\n").unwrap();

        let written = write_files(tmp.path(), false).unwrap();
        assert!(!written.contains(&DEFAULT_CATALOG_PATH));
        assert_eq!(std::fs::read_to_string(&catalog).unwrap(), "[versions]\n");
    }

    #[test]
    fn refuses_to_overwrite_config() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("gatekeep.toml"), "").unwrap();
        assert!(run(tmp.path(), false).is_err());
    }
}
