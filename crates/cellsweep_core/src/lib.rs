//! Parameter-sweep planning for batch simulation runs
//!
//! This crate turns a sweep definition (stimulus types, stimulus indices,
//! cell ranges, run counts) into the jobs an HPC launcher should start and
//! the output directories they write into. It does not run simulations or
//! talk to the scheduler; it only plans.
//!
//! - Axes are combined as a cross product (first axis outermost) or zipped
//! - Every output and metadata path is unique and lives in a planned directory
//! - Templates fail loudly on unknown placeholders
//! - Scheduler state is passed in as a [`SubmissionContext`]
//!
//! ```ignore
//! use cellsweep_core::{SubmissionContext, SweepBuilder, SweepPlanner};
//! use cellsweep_core::model::SweepAxis;
//!
//! let config = SweepBuilder::new("{stim_type}-{stim_idx}-{run}.h5")
//!     .axis(SweepAxis::labels("stim_type", ["ramp", "step", "noise"])?)
//!     .axis(SweepAxis::range("stim_idx", 0..8)?)
//!     .samples(40, 1)
//!     .args(["--outfile", "{outfile}", "--num", "{num}"])
//!     .build()?;
//!
//! let planner = SweepPlanner::new(config, SubmissionContext::from_env()?)?;
//! planner.create_directories()?;
//! for job in planner.jobs() {
//!     let job = job?;
//!     // hand job.command_line() to the launcher
//! }
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod context;
pub mod entities;
pub mod error;
pub mod manifest;
pub mod plan;
pub mod samples;
pub mod scheduler;
pub mod template;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{SweepBuilder, SweepConfig, SweepFile};
pub use context::SubmissionContext;
pub use error::{ConfigError, FilesystemError, PlanError};
pub use plan::{SweepMode, SweepPlanner};
