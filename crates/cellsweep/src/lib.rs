//! Command-line front end for `cellsweep_core`
//!
//! `cellsweep plan` runs inside a batch allocation: it reads the scheduler
//! environment, creates the run directories and prints the node's jobs for a
//! launcher script to consume. `check` and `directives` help write the sweep
//! and its batch script before submitting.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Command};
pub use logging::{default_log_dir, init_logging};
pub use output::OutputFormat;
