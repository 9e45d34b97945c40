//! List conventions command implementation.

use gatekeep_conventions::all_conventions;

/// Runs the list-conventions command.
pub fn run() {
    println!("Available conventions:\n");
    println!("{:<20} {:<40} Description", "Id", "Composes");
    println!("{}", "-".repeat(100));

    for convention in all_conventions() {
        let composes: Vec<&str> = convention.composes().iter().map(|c| c.id()).collect();
        println!(
            "{:<20} {:<40} {}",
            convention.id(),
            composes.join(", "),
            convention.description()
        );
    }

    println!("\nDeclare conventions in gatekeep.toml, e.g.:");
    println!("  conventions = [\"core-library\"]");
    println!("\nAuto-correct for detekt is opt-in:");
    println!("  gatekeep run detekt -P detekt.autoCorrect=true");
}
