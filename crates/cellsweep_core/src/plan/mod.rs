//! Sweep planning
//!
//! [`SweepPlanner`] turns a [`SweepConfig`] and a [`SubmissionContext`] into
//! the set of run directories and the ordered sequence of [`JobSpec`]s to
//! hand to the launcher. It never runs or schedules anything.
//!
//! Everything that can be wrong with a sweep is checked in
//! [`SweepPlanner::new`], before any directory exists:
//! axis names and sizes, template placeholders, and output name collisions
//! across the whole sweep.
//!
//! # Placeholders
//!
//! Templates may reference every axis by name (`{stim_type}`), the position
//! of its value (`{stim_type.pos}`), and for entity axes the source row
//! (`{cell.row}`, `{cell.row_end}`). Built-ins:
//!
//! | name | value |
//! | --- | --- |
//! | `job_id`, `node_id`, `proc_id`, `node_count` | submission context |
//! | `run_dir` | `<run_root>/<job_id>` |
//! | `partition_dir` | directory holding this job's output |
//! | `tasks` | tasks per job |
//! | `sequence`, `run_index` | position in the sweep / in `partition_dir` |
//! | `num` | samples per run (only with a sample budget) |
//! | `outfile`, `metadata_file`, `stem` | resolved output names (not in `output`) |

mod directories;
mod enumerate;

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::SweepConfig;
use crate::context::SubmissionContext;
use crate::error::ConfigError;
use crate::model::{Binding, JobSpec, SweepAxis};
use crate::template::{Bindings, Template};

pub use enumerate::Jobs;

/// Name of the axis appended for a sample budget's runs
pub const RUN_AXIS: &str = "run";

/// Placeholder names that axes may not shadow
pub const BUILTIN_PLACEHOLDERS: &[&str] = &[
    "job_id",
    "node_id",
    "proc_id",
    "node_count",
    "run_dir",
    "partition_dir",
    "tasks",
    "sequence",
    "run_index",
    "num",
    "outfile",
    "metadata_file",
    "stem",
];

/// How axis values are combined into jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// Every combination; the first axis is outermost, the last varies fastest
    #[default]
    CrossProduct,
    /// Axes zipped by position; single-valued axes are broadcast
    Linear,
}

#[derive(Debug, Clone)]
pub struct SweepPlanner {
    config: SweepConfig,
    context: SubmissionContext,
    run_dir: PathBuf,
    partition: Option<usize>,
    total: usize,
}

impl SweepPlanner {
    /// Validate a sweep and prepare it for planning.
    ///
    /// With a sample budget, a `run` axis over `0..runs` is appended as the
    /// innermost axis.
    pub fn new(mut config: SweepConfig, context: SubmissionContext) -> Result<Self, ConfigError> {
        context.validate()?;
        if config.tasks_per_job == 0 {
            return Err(ConfigError::ZeroTasks);
        }
        if let Some(samples) = config.samples {
            samples.validate()?;
            samples.warn_if_truncated();
            config.axes.push(SweepAxis::range(RUN_AXIS, 0..samples.runs)?);
        }
        check_axis_names(&config.axes)?;

        let total = match config.mode {
            SweepMode::CrossProduct => config.axes.iter().map(SweepAxis::len).product(),
            SweepMode::Linear => linear_len(&config.axes)?,
        };

        let partition = match &config.partition {
            None => None,
            Some(name) => {
                let index = config
                    .axes
                    .iter()
                    .position(|axis| axis.name() == name)
                    .ok_or_else(|| ConfigError::UnknownPartitionAxis(name.clone()))?;
                for value in config.axes[index].values() {
                    let dir = value.to_string();
                    if !is_path_component(&dir) {
                        return Err(ConfigError::InvalidPathComponent(dir));
                    }
                }
                Some(index)
            }
        };

        let metadata_name = format!("job{}", config.metadata_suffix);
        if config.metadata_suffix.is_empty() || !is_path_component(&metadata_name) {
            return Err(ConfigError::InvalidPathComponent(
                config.metadata_suffix.clone(),
            ));
        }

        let run_dir = config.run_root.join(&context.job_id);
        let planner = Self {
            config,
            context,
            run_dir,
            partition,
            total,
        };
        planner.check_templates()?;
        planner.validate()?;

        tracing::debug!(
            job_id = %planner.context.job_id,
            total_jobs = planner.total,
            axes = planner.config.axes.len(),
            "sweep validated"
        );
        Ok(planner)
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn context(&self) -> &SubmissionContext {
        &self.context
    }

    /// Axes in enumeration order, including an appended `run` axis
    pub fn axes(&self) -> &[SweepAxis] {
        &self.config.axes
    }

    /// `<run_root>/<job_id>`
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn partition_axis(&self) -> Option<&SweepAxis> {
        self.partition.map(|index| &self.config.axes[index])
    }

    /// Jobs in the whole sweep, across all nodes
    pub fn total_jobs(&self) -> usize {
        self.total
    }

    /// Jobs yielded by [`jobs`](Self::jobs) on this node
    pub fn shard_jobs(&self) -> usize {
        match self.shard() {
            None => self.total,
            Some((node, count)) if node < self.total => (self.total - node).div_ceil(count),
            Some(_) => 0,
        }
    }

    /// Jobs for this invocation in enumeration order.
    ///
    /// With `shard_by_node`, node `k` of `n` only gets jobs whose sequence
    /// number is `k` modulo `n`. Each call starts a fresh enumeration.
    pub fn jobs(&self) -> Jobs<'_> {
        Jobs::new(self, self.shard())
    }

    /// Jobs for every node, ignoring sharding
    pub fn all_jobs(&self) -> Jobs<'_> {
        Jobs::new(self, None)
    }

    /// Resolve every job once and reject colliding output or metadata paths
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = FxHashSet::default();
        for job in self.all_jobs() {
            let job = job?;
            for path in [job.output_path, job.metadata_path] {
                if seen.contains(&path) {
                    return Err(ConfigError::DuplicateOutputPath(path));
                }
                seen.insert(path);
            }
        }
        Ok(())
    }

    fn shard(&self) -> Option<(usize, usize)> {
        self.config.shard_by_node.then(|| {
            (
                self.context.node_id as usize,
                self.context.node_count as usize,
            )
        })
    }

    fn axis_index(&self, name: &str) -> Option<usize> {
        self.config.axes.iter().position(|axis| axis.name() == name)
    }

    fn check_templates(&self) -> Result<(), ConfigError> {
        self.config
            .output
            .check(|name| self.is_known_placeholder(name, false))?;

        let launcher = &self.config.launcher;
        let templates = launcher
            .command
            .iter()
            .chain(&launcher.args)
            .chain(launcher.prepare.iter().flatten());
        for template in templates {
            template.check(|name| self.is_known_placeholder(name, true))?;
        }
        Ok(())
    }

    fn is_known_placeholder(&self, name: &str, with_files: bool) -> bool {
        match name {
            "outfile" | "metadata_file" | "stem" => with_files,
            "num" => self.config.samples.is_some(),
            _ if BUILTIN_PLACEHOLDERS.contains(&name) => true,
            _ => {
                let (axis, field) = split_field(name);
                let Some(index) = self.axis_index(axis) else {
                    return false;
                };
                match field {
                    None | Some("pos") => true,
                    Some("row" | "row_end") => self.config.axes[index].is_entity_axis(),
                    Some(_) => false,
                }
            }
        }
    }

    /// Directory holding the output of the job at `indices`
    fn job_dir(&self, indices: &[usize]) -> PathBuf {
        match self.partition {
            Some(axis) => {
                let value = &self.config.axes[axis].values()[indices[axis]];
                self.run_dir.join(value.to_string())
            }
            None => self.run_dir.clone(),
        }
    }

    fn resolve(
        &self,
        sequence: usize,
        indices: &[usize],
        run_index: usize,
        dir: PathBuf,
    ) -> Result<JobSpec, ConfigError> {
        let mut scope = JobScope {
            planner: self,
            indices,
            sequence,
            run_index,
            dir: &dir,
            files: None,
        };

        let file_name = self.config.output.render(&scope)?;
        if !is_path_component(&file_name) {
            return Err(ConfigError::InvalidPathComponent(file_name));
        }
        let stem = Path::new(&file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        let output_path = dir.join(&file_name);
        let metadata_path = dir.join(format!("{stem}{}", self.config.metadata_suffix));

        scope.files = Some(FileNames {
            outfile: output_path.display().to_string(),
            metadata_file: metadata_path.display().to_string(),
            stem,
        });

        let launcher = &self.config.launcher;
        let command = render_all(&launcher.command, &scope)?;
        let args = render_all(&launcher.args, &scope)?;
        let prepare_command = launcher
            .prepare
            .as_ref()
            .map(|prepare| render_all(prepare, &scope))
            .transpose()?;

        let bindings = self
            .config
            .axes
            .iter()
            .zip(indices)
            .map(|(axis, &index)| Binding {
                axis: axis.name().to_string(),
                value: axis.values()[index].clone(),
            })
            .collect();

        Ok(JobSpec {
            sequence,
            run_index,
            bindings,
            output_path,
            metadata_path,
            task_count: self.config.tasks_per_job,
            command,
            args,
            prepare_command,
        })
    }
}

struct FileNames {
    outfile: String,
    metadata_file: String,
    stem: String,
}

/// Placeholder values for one job
struct JobScope<'a> {
    planner: &'a SweepPlanner,
    indices: &'a [usize],
    sequence: usize,
    run_index: usize,
    dir: &'a Path,
    files: Option<FileNames>,
}

impl Bindings for JobScope<'_> {
    fn lookup(&self, name: &str) -> Option<String> {
        let planner = self.planner;
        let context = &planner.context;
        let value = match name {
            "job_id" => context.job_id.clone(),
            "node_id" => context.node_id.to_string(),
            "proc_id" => context.proc_id.to_string(),
            "node_count" => context.node_count.to_string(),
            "run_dir" => planner.run_dir.display().to_string(),
            "partition_dir" => self.dir.display().to_string(),
            "tasks" => planner.config.tasks_per_job.to_string(),
            "sequence" => self.sequence.to_string(),
            "run_index" => self.run_index.to_string(),
            "num" => planner.config.samples?.per_run().to_string(),
            "outfile" => self.files.as_ref()?.outfile.clone(),
            "metadata_file" => self.files.as_ref()?.metadata_file.clone(),
            "stem" => self.files.as_ref()?.stem.clone(),
            _ => {
                let (axis, field) = split_field(name);
                let index = planner.axis_index(axis)?;
                let position = *self.indices.get(index)?;
                let value = planner.config.axes[index].values().get(position)?;
                match field {
                    None => value.to_string(),
                    Some("pos") => position.to_string(),
                    Some("row") => value.row()?.to_string(),
                    Some("row_end") => (value.row()? + 1).to_string(),
                    Some(_) => return None,
                }
            }
        };
        Some(value)
    }
}

fn render_all(templates: &[Template], scope: &JobScope<'_>) -> Result<Vec<String>, ConfigError> {
    templates
        .iter()
        .map(|template| template.render(scope))
        .collect()
}

fn split_field(name: &str) -> (&str, Option<&str>) {
    match name.split_once('.') {
        Some((axis, field)) => (axis, Some(field)),
        None => (name, None),
    }
}

fn check_axis_names(axes: &[SweepAxis]) -> Result<(), ConfigError> {
    let mut seen = FxHashSet::default();
    for axis in axes {
        let name = axis.name();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::InvalidAxisName(name.to_string()));
        }
        if BUILTIN_PLACEHOLDERS.contains(&name) {
            return Err(ConfigError::ReservedAxisName(name.to_string()));
        }
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateAxis(name.to_string()));
        }
    }
    Ok(())
}

/// Common length of zipped axes; length-1 axes broadcast
fn linear_len(axes: &[SweepAxis]) -> Result<usize, ConfigError> {
    let expected = axes.iter().map(SweepAxis::len).max().unwrap_or(1);
    for axis in axes {
        if axis.len() != 1 && axis.len() != expected {
            return Err(ConfigError::AxisLengthMismatch {
                axis: axis.name().to_string(),
                len: axis.len(),
                expected,
            });
        }
    }
    Ok(expected)
}

/// True for a non-empty name that stays inside its parent directory
pub fn is_path_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
