//! Command-line arguments

use std::path::PathBuf;

use cellsweep_core::SubmissionContext;
use cellsweep_core::context::{JOB_ID_VAR, NODE_COUNT_VAR, NODE_ID_VAR, PROC_ID_VAR};
use cellsweep_core::error::ConfigError;
use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "cellsweep")]
#[command(about = "Plan parameter-sweep jobs and run directories for batch simulations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Directory for the log file (default: ~/.cellsweep/)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Only log to stderr
    #[arg(long, global = true)]
    pub no_log_file: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the run directories and print this node's jobs to stdout.
    Plan(PlanArgs),

    /// Print the `#SBATCH` header for the sweep's scheduler request.
    Directives {
        /// Path to the sweep file
        sweep: PathBuf,
    },

    /// Validate a sweep and summarize what it would plan.
    Check {
        /// Path to the sweep file
        sweep: PathBuf,

        #[command(flatten)]
        context: ContextArgs,
    },
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the sweep file
    pub sweep: PathBuf,

    #[command(flatten)]
    pub context: ContextArgs,

    /// Override the sweep file's run root
    #[arg(long)]
    pub run_root: Option<PathBuf>,

    /// How jobs are written to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Print jobs without creating directories or writing the manifest
    #[arg(long)]
    pub dry_run: bool,

    /// Do not write plan.yaml into the run directory
    #[arg(long)]
    pub no_manifest: bool,
}

/// Overrides for the scheduler environment
#[derive(Args, Debug, Default, Clone)]
pub struct ContextArgs {
    /// Scheduler job id (default: $SLURM_JOB_ID)
    #[arg(long)]
    pub job_id: Option<String>,

    /// This node's index in the allocation (default: $SLURM_NODEID)
    #[arg(long)]
    pub node_id: Option<u32>,

    /// Nodes in the allocation (default: $SLURM_JOB_NUM_NODES)
    #[arg(long)]
    pub node_count: Option<u32>,

    /// Process rank (default: $SLURM_PROCID)
    #[arg(long)]
    pub proc_id: Option<u32>,
}

impl ContextArgs {
    /// Build the submission context, preferring flags over `lookup`
    pub fn resolve(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<SubmissionContext, ConfigError> {
        let overrides = [
            (JOB_ID_VAR, self.job_id.clone()),
            (NODE_ID_VAR, self.node_id.map(|id| id.to_string())),
            (NODE_COUNT_VAR, self.node_count.map(|count| count.to_string())),
            (PROC_ID_VAR, self.proc_id.map(|id| id.to_string())),
        ];

        SubmissionContext::from_lookup(|name| {
            overrides
                .iter()
                .find(|(var, _)| *var == name)
                .and_then(|(_, value)| value.clone())
                .or_else(|| lookup(name))
        })
    }
}
