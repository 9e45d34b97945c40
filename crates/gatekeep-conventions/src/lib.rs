//! # gatekeep-conventions
//!
//! Built-in conventions for gatekeep.
//!
//! Each convention is an idempotent unit of build policy. Bundles compose
//! building blocks, and every analysis task they register is bound to the
//! aggregate `check` gate.
//!
//! ## Available Conventions
//!
//! | Id | Composes | Description |
//! |----|----------|-------------|
//! | `language` | | Source sets, `compileJava`, `compileKotlin`, `assemble`, `test`, `build` |
//! | `coverage` | `language` | `jacocoTestReport` after `test` |
//! | `checkstyle` | | `checkstyle<SourceSet>` tasks, zero tolerance |
//! | `detekt` | | `detekt` task with opt-in auto-correct (`-P detekt.autoCorrect=true`) |
//! | `core-library` | `language`, `coverage`, `checkstyle`, `detekt` | Binds everything into `check` and `build` |
//! | `framework-library` | `core-library` | Adds the Spring Boot platform and starters |
//!
//! ## Usage
//!
//! ```ignore
//! use gatekeep_core::{BuildContext, Module};
//! use gatekeep_conventions::resolve;
//!
//! let mut module = Module::new("core", "core");
//! let convention = resolve("framework-library").unwrap();
//! module.apply(convention.as_ref(), &ctx)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analysis;
mod core_library;
mod coverage;
mod framework_library;
mod language;
mod lint;
mod registry;
mod style_check;

pub use analysis::TOOLS_DIR;
pub use core_library::CoreLibraryConvention;
pub use coverage::{CoverageConvention, CoverageExtension};
pub use framework_library::{FrameworkExtension, FrameworkLibraryConvention};
pub use language::{LanguageConvention, LanguageExtension, ToolchainStep};
pub use lint::{LintAction, LintConvention, LintExtension, AUTO_CORRECT_PARAM};
pub use registry::{all_conventions, require, resolve};
pub use style_check::{StyleCheckAction, StyleCheckConvention, StyleCheckExtension};

/// Task and file names used by the conventions.
pub mod names {
    pub use crate::coverage::REPORT_TASK as COVERAGE_REPORT;
    pub use crate::language::{ASSEMBLE, BUILD, COMPILE_JAVA, COMPILE_KOTLIN, TEST};
    pub use crate::lint::TASK as LINT;
    pub use crate::style_check::{task_name as style_check_task, SUPPRESSIONS_FILE};
    pub use gatekeep_core::CHECK_TASK as CHECK;
}

/// Re-export core types for convenience.
pub use gatekeep_core::{Convention, ConventionBox, Module};
