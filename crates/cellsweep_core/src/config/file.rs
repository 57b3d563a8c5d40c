//! YAML sweep files
//!
//! ```yaml
//! run_root: runs
//! partition: cell
//! tasks_per_job: 64
//! samples: { total: 40, runs: 1 }
//! output: "{cell}-{stim_type}-{node_id}-{run}.h5"
//! axes:
//!   - name: stim_type
//!     values: [ramp, step, noise]
//!   - name: cell
//!     entities: { csv: cells.csv, start: 85, count: 24 }
//! launcher:
//!   command: [srun, -N, "1", -n, "{tasks}", python, run.py]
//!   args: [--outfile, "{outfile}", --stim-type, "{stim_type}", --num, "{num}"]
//! scheduler:
//!   nodes: 24
//!   time: "02:00:00"
//!   queue: regular
//!   constraint: knl
//! ```
//!
//! Entity list paths are relative to the sweep file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    LauncherTemplates, SweepConfig, default_metadata_suffix, default_run_root,
    default_tasks_per_job,
};
use crate::entities::EntityList;
use crate::error::{ConfigError, FilesystemError, PlanError};
use crate::model::SweepAxis;
use crate::plan::SweepMode;
use crate::samples::SampleBudget;
use crate::scheduler::SchedulerRequest;
use crate::template::Template;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepFile {
    #[serde(default = "default_run_root")]
    pub run_root: PathBuf,
    #[serde(default)]
    pub mode: SweepMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    #[serde(default)]
    pub shard_by_node: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<SampleBudget>,
    #[serde(default = "default_tasks_per_job")]
    pub tasks_per_job: u32,
    pub output: Template,
    #[serde(default = "default_metadata_suffix")]
    pub metadata_suffix: String,
    pub axes: Vec<AxisFile>,
    pub launcher: LauncherTemplates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerRequest>,
}

/// One axis as written in a sweep file; exactly one source must be set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<EntitySelection>,
}

/// Half-open integer range
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangeFile {
    pub start: u64,
    pub end: u64,
}

/// `count` rows of an entity list starting at 0-based row `start`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySelection {
    pub csv: PathBuf,
    pub start: usize,
    pub count: usize,
}

impl SweepFile {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and resolve a sweep file
    pub fn load(path: &Path) -> Result<SweepConfig, PlanError> {
        let text = fs::read_to_string(path)
            .map_err(|e| FilesystemError::new("read sweep file", path, e))?;
        let file = Self::from_yaml(&text)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        tracing::debug!(path = %path.display(), axes = file.axes.len(), "loaded sweep file");
        file.resolve(base_dir)
    }

    /// Build the in-memory configuration, loading entity lists relative to
    /// `base_dir`
    pub fn resolve(self, base_dir: &Path) -> Result<SweepConfig, PlanError> {
        let axes = self
            .axes
            .into_iter()
            .map(|axis| axis.resolve(base_dir))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SweepConfig {
            axes,
            mode: self.mode,
            partition: self.partition,
            shard_by_node: self.shard_by_node,
            samples: self.samples,
            tasks_per_job: self.tasks_per_job,
            output: self.output,
            metadata_suffix: self.metadata_suffix,
            run_root: self.run_root,
            launcher: self.launcher,
            scheduler: self.scheduler,
        })
    }
}

impl AxisFile {
    fn resolve(self, base_dir: &Path) -> Result<SweepAxis, PlanError> {
        let axis = match (self.values, self.range, self.entities) {
            (Some(values), None, None) => SweepAxis::labels(self.name, values)?,
            (None, Some(range), None) => SweepAxis::range(self.name, range.start..range.end)?,
            (None, None, Some(selection)) => {
                let list = EntityList::load(&base_dir.join(&selection.csv))?;
                SweepAxis::entities(self.name, &list, selection.start, selection.count)?
            }
            _ => return Err(ConfigError::AxisSource(self.name).into()),
        };
        Ok(axis)
    }
}
