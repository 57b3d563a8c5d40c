//! Sweep configuration
//!
//! [`SweepConfig`] is everything the planner needs apart from the submission
//! context. It is usually read from a YAML sweep file ([`SweepFile`]) or put
//! together in code with [`SweepBuilder`].
//!
//! ```ignore
//! use cellsweep_core::config::SweepBuilder;
//! use cellsweep_core::model::SweepAxis;
//!
//! let config = SweepBuilder::new("{stim_type}-{stim_idx:02}-{run}.h5")
//!     .axis(SweepAxis::labels("stim_type", ["ramp", "step", "noise"])?)
//!     .axis(SweepAxis::range("stim_idx", 0..8)?)
//!     .samples(10_000, 4)
//!     .tasks(64)
//!     .command(["srun", "-n", "{tasks}", "python", "run.py"])
//!     .args(["--outfile", "{outfile}", "--num", "{num}"])
//!     .build()?;
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::SweepAxis;
use crate::plan::SweepMode;
use crate::samples::SampleBudget;
use crate::scheduler::SchedulerRequest;
use crate::template::Template;

mod builder;
mod file;

pub use builder::SweepBuilder;
pub use file::{AxisFile, EntitySelection, RangeFile, SweepFile};

pub(crate) fn default_run_root() -> PathBuf {
    PathBuf::from("runs")
}

pub(crate) fn default_tasks_per_job() -> u32 {
    1
}

pub(crate) fn default_metadata_suffix() -> String {
    "-meta.yaml".to_string()
}

/// Launcher command prefix and argument templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherTemplates {
    /// Program prefix, e.g. `[srun, -n, "{tasks}", python, run.py]`
    #[serde(default)]
    pub command: Vec<Template>,
    /// Per-job arguments
    pub args: Vec<Template>,
    /// Full command line (launcher prefix included) of the serial step that
    /// creates the output file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepare: Option<Vec<Template>>,
}

/// Complete sweep definition
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Axes in enumeration order (first outermost)
    pub axes: Vec<SweepAxis>,
    pub mode: SweepMode,
    /// Axis whose values each get their own output directory
    pub partition: Option<String>,
    /// Split jobs round-robin over the nodes of the allocation
    pub shard_by_node: bool,
    /// `NSAMPLES` / `NRUNS`; adds the `run` axis and `{num}`
    pub samples: Option<SampleBudget>,
    pub tasks_per_job: u32,
    /// Output file name, relative to the job's directory
    pub output: Template,
    /// Appended to the output stem to name the metadata file
    pub metadata_suffix: String,
    /// Parent of the per-job run directory
    pub run_root: PathBuf,
    pub launcher: LauncherTemplates,
    pub scheduler: Option<SchedulerRequest>,
}
