use std::path::PathBuf;

use serde::Serialize;

use super::AxisValue;

/// One axis value chosen for a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub axis: String,
    pub value: AxisValue,
}

/// A fully resolved unit of work handed to the external launcher.
///
/// The planner never interprets `args`; it only builds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSpec {
    /// Position of this job in the whole sweep (0-based)
    pub sequence: usize,
    /// Position of this job within its output directory (0-based)
    pub run_index: usize,
    /// Axis values in axis declaration order
    pub bindings: Vec<Binding>,
    pub output_path: PathBuf,
    pub metadata_path: PathBuf,
    /// Parallel workers requested from the launcher
    pub task_count: u32,
    /// Launcher prefix, e.g. `srun -n 64 python run.py`
    pub command: Vec<String>,
    pub args: Vec<String>,
    /// Full command line of the serial step that creates the output file
    /// before the parallel run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepare_command: Option<Vec<String>>,
}

impl JobSpec {
    /// Value bound to `axis`, if the sweep has such an axis
    pub fn value(&self, axis: &str) -> Option<&AxisValue> {
        self.bindings
            .iter()
            .find(|binding| binding.axis == axis)
            .map(|binding| &binding.value)
    }

    /// Launcher prefix followed by the job arguments
    pub fn command_line(&self) -> Vec<&str> {
        self.command
            .iter()
            .chain(&self.args)
            .map(String::as_str)
            .collect()
    }

    pub fn prepare_command_line(&self) -> Option<Vec<&str>> {
        let prepare = self.prepare_command.as_ref()?;
        Some(prepare.iter().map(String::as_str).collect())
    }
}
