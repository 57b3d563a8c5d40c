//! Sweep Builder
//!
//! Fluent construction of a [`SweepConfig`] in code. Templates are kept as
//! strings until [`SweepBuilder::build`], which parses them all and reports
//! the first malformed one.

use std::path::PathBuf;

use super::{
    LauncherTemplates, SweepConfig, default_metadata_suffix, default_run_root,
    default_tasks_per_job,
};
use crate::error::ConfigError;
use crate::model::SweepAxis;
use crate::plan::SweepMode;
use crate::samples::SampleBudget;
use crate::scheduler::SchedulerRequest;
use crate::template::{Template, parse_all};

pub struct SweepBuilder {
    axes: Vec<SweepAxis>,
    mode: SweepMode,
    partition: Option<String>,
    shard_by_node: bool,
    samples: Option<(u64, u64)>,
    tasks_per_job: u32,
    output: String,
    metadata_suffix: String,
    run_root: PathBuf,
    command: Vec<String>,
    args: Vec<String>,
    prepare: Option<Vec<String>>,
    scheduler: Option<SchedulerRequest>,
}

impl SweepBuilder {
    /// Start a sweep whose output files are named by `output`
    #[must_use]
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            axes: Vec::new(),
            mode: SweepMode::CrossProduct,
            partition: None,
            shard_by_node: false,
            samples: None,
            tasks_per_job: default_tasks_per_job(),
            output: output.into(),
            metadata_suffix: default_metadata_suffix(),
            run_root: default_run_root(),
            command: Vec::new(),
            args: Vec::new(),
            prepare: None,
            scheduler: None,
        }
    }

    // =========================================================================
    // Axes
    // =========================================================================

    /// Append an axis; earlier axes are enumerated further out
    #[must_use]
    pub fn axis(mut self, axis: SweepAxis) -> Self {
        self.axes.push(axis);
        self
    }

    /// Give every value of `axis` its own output directory
    #[must_use]
    pub fn partition(mut self, axis: impl Into<String>) -> Self {
        self.partition = Some(axis.into());
        self
    }

    /// Zip axes instead of taking their cross product
    #[must_use]
    pub fn linear(mut self) -> Self {
        self.mode = SweepMode::Linear;
        self
    }

    #[must_use]
    pub fn shard_by_node(mut self) -> Self {
        self.shard_by_node = true;
        self
    }

    /// `total` samples split over `runs` runs
    #[must_use]
    pub fn samples(mut self, total: u64, runs: u64) -> Self {
        self.samples = Some((total, runs));
        self
    }

    // =========================================================================
    // Output layout
    // =========================================================================

    #[must_use]
    pub fn run_root(mut self, run_root: impl Into<PathBuf>) -> Self {
        self.run_root = run_root.into();
        self
    }

    #[must_use]
    pub fn metadata_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.metadata_suffix = suffix.into();
        self
    }

    // =========================================================================
    // Launcher
    // =========================================================================

    #[must_use]
    pub fn tasks(mut self, tasks_per_job: u32) -> Self {
        self.tasks_per_job = tasks_per_job;
        self
    }

    #[must_use]
    pub fn command<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = parts.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Full command line of the serial output-creation step
    #[must_use]
    pub fn prepare<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prepare = Some(args.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn scheduler(mut self, request: SchedulerRequest) -> Self {
        self.scheduler = Some(request);
        self
    }

    pub fn build(self) -> Result<SweepConfig, ConfigError> {
        let samples = self
            .samples
            .map(|(total, runs)| SampleBudget::new(total, runs))
            .transpose()?;

        Ok(SweepConfig {
            axes: self.axes,
            mode: self.mode,
            partition: self.partition,
            shard_by_node: self.shard_by_node,
            samples,
            tasks_per_job: self.tasks_per_job,
            output: Template::parse(&self.output)?,
            metadata_suffix: self.metadata_suffix,
            run_root: self.run_root,
            launcher: LauncherTemplates {
                command: parse_all(&self.command)?,
                args: parse_all(&self.args)?,
                prepare: self.prepare.as_deref().map(parse_all).transpose()?,
            },
            scheduler: self.scheduler,
        })
    }
}
