//! Plan manifest written into the run directory
//!
//! `plan.yaml` records what a submission was planned from, so a run
//! directory can be understood without the sweep file that produced it.

use std::fs;
use std::path::PathBuf;

use jiff::Timestamp;
use serde::Serialize;

use crate::error::{FilesystemError, PlanError};
use crate::plan::{SweepMode, SweepPlanner};

pub const MANIFEST_FILE: &str = "plan.yaml";

#[derive(Debug, Clone, Serialize)]
pub struct PlanManifest {
    pub job_id: String,
    pub node_count: u32,
    pub planned_at: Timestamp,
    pub mode: SweepMode,
    pub sharded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    pub axes: Vec<AxisSummary>,
    pub total_jobs: usize,
    pub tasks_per_job: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<SampleSummary>,
    pub output: String,
    pub directories: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisSummary {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleSummary {
    pub total: u64,
    pub runs: u64,
    pub per_run: u64,
    pub dropped: u64,
}

impl SweepPlanner {
    pub fn manifest(&self, planned_at: Timestamp) -> PlanManifest {
        let config = self.config();
        PlanManifest {
            job_id: self.context().job_id.clone(),
            node_count: self.context().node_count,
            planned_at,
            mode: config.mode,
            sharded: config.shard_by_node,
            partition: config.partition.clone(),
            axes: self
                .axes()
                .iter()
                .map(|axis| AxisSummary {
                    name: axis.name().to_string(),
                    values: axis.values().iter().map(ToString::to_string).collect(),
                })
                .collect(),
            total_jobs: self.total_jobs(),
            tasks_per_job: config.tasks_per_job,
            samples: config.samples.map(|samples| SampleSummary {
                total: samples.total,
                runs: samples.runs,
                per_run: samples.per_run(),
                dropped: samples.dropped(),
            }),
            output: config.output.to_string(),
            directories: self.plan_directories().into_iter().collect(),
        }
    }

    /// Write `plan.yaml` into the run directory, which must already exist
    pub fn write_manifest(&self) -> Result<PathBuf, PlanError> {
        let manifest = self.manifest(Timestamp::now());
        let yaml =
            serde_saphyr::to_string(&manifest).map_err(|e| PlanError::Manifest(e.to_string()))?;

        let path = self.run_dir().join(MANIFEST_FILE);
        fs::write(&path, yaml).map_err(|e| FilesystemError::new("write manifest", &path, e))?;
        tracing::info!(path = %path.display(), "wrote plan manifest");
        Ok(path)
    }
}
