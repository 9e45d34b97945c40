//! Shared output formatting for build results.

use anyhow::Result;
use gatekeep_core::{BuildResult, Outcome};

use crate::OutputFormat;

/// Print build results in the specified format.
pub fn print(results: &[BuildResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(results),
        OutputFormat::Json => return print_json(results),
    }
    Ok(())
}

fn print_text(results: &[BuildResult]) {
    for result in results {
        print!("{}", result.output());
    }
    println!();
    println!("{}", summary(results));
}

fn print_json(results: &[BuildResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    println!("{json}");
    Ok(())
}

/// Final status line, colored like a terminal build log.
#[must_use]
pub fn summary(results: &[BuildResult]) -> String {
    let outcomes: Vec<Outcome> = results
        .iter()
        .flat_map(|r| r.tasks.iter().map(|t| t.outcome))
        .collect();
    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    let skipped = outcomes.iter().filter(|o| **o == Outcome::Skipped).count();
    let succeeded = outcomes.len() - failed - skipped;

    let (color, status) = if failed == 0 && skipped == 0 {
        ("\x1b[32m", "BUILD SUCCESSFUL")
    } else {
        ("\x1b[31m", "BUILD FAILED")
    };
    format!(
        "{color}{status}\x1b[0m: {} task(s), {succeeded} succeeded, {failed} failed, {skipped} skipped",
        outcomes.len()
    )
}
