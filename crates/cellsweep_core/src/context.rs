//! Submission context
//!
//! The scheduler exposes the job id, node id, process id and node count
//! through environment variables. They are read once into a
//! [`SubmissionContext`] and passed to the planner explicitly, so planning
//! never touches the process environment.

use serde::Serialize;

use crate::error::ConfigError;

pub const JOB_ID_VAR: &str = "SLURM_JOB_ID";
pub const NODE_ID_VAR: &str = "SLURM_NODEID";
pub const PROC_ID_VAR: &str = "SLURM_PROCID";
pub const NODE_COUNT_VAR: &str = "SLURM_JOB_NUM_NODES";
/// Older SLURM releases only set this one
pub const NODE_COUNT_FALLBACK_VAR: &str = "SLURM_NNODES";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionContext {
    /// Scheduler-assigned id, used to namespace the run directory
    pub job_id: String,
    pub node_id: u32,
    pub proc_id: u32,
    pub node_count: u32,
}

impl SubmissionContext {
    /// Single-node context for the given job id
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            node_id: 0,
            proc_id: 0,
            node_count: 1,
        }
    }

    #[must_use]
    pub fn with_node(mut self, node_id: u32, node_count: u32) -> Self {
        self.node_id = node_id;
        self.node_count = node_count;
        self
    }

    #[must_use]
    pub fn with_proc_id(mut self, proc_id: u32) -> Self {
        self.proc_id = proc_id;
        self
    }

    /// Read the context from the scheduler environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the context through an arbitrary variable lookup.
    ///
    /// Only the job id is required; node id and process id default to 0 and
    /// the node count to 1.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let job_id = lookup(JOB_ID_VAR)
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingEnvironment(JOB_ID_VAR))?;

        let node_id = parse_var(&lookup, NODE_ID_VAR)?.unwrap_or(0);
        let proc_id = parse_var(&lookup, PROC_ID_VAR)?.unwrap_or(0);
        let node_count = match parse_var(&lookup, NODE_COUNT_VAR)? {
            Some(count) => count,
            None => parse_var(&lookup, NODE_COUNT_FALLBACK_VAR)?.unwrap_or(1),
        };

        let context = Self {
            job_id: job_id.trim().to_string(),
            node_id,
            proc_id,
            node_count,
        };
        context.validate()?;
        Ok(context)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !crate::plan::is_path_component(&self.job_id) {
            return Err(ConfigError::InvalidPathComponent(self.job_id.clone()));
        }
        if self.node_count == 0 || self.node_id >= self.node_count {
            return Err(ConfigError::NodeOutOfRange {
                node_id: self.node_id,
                node_count: self.node_count,
            });
        }
        Ok(())
    }
}

fn parse_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<u32>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvironment { name, value }),
    }
}
