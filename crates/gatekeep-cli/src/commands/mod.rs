//! Subcommand implementations.

pub mod init;
pub mod list_conventions;
pub mod output;
pub mod run;
pub mod tasks;
