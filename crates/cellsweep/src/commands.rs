//! Subcommand implementations
//!
//! Every command reads the scheduler environment through a lookup function
//! and writes its report to `out`, so the binary passes `std::env::var` and
//! stdout while tests pass fixed values and a buffer.

use std::io::Write;
use std::path::Path;

use cellsweep_core::context::JOB_ID_VAR;
use cellsweep_core::samples::TaskPartition;
use cellsweep_core::scheduler::format_wall_time;
use cellsweep_core::{SubmissionContext, SweepConfig, SweepFile, SweepPlanner};
use color_eyre::eyre::{Result, WrapErr, eyre};

use crate::cli::{Command, ContextArgs, PlanArgs};
use crate::output::{shell_line, write_job};

/// Job id used by `check` outside an allocation
pub const CHECK_JOB_ID: &str = "check";

/// Axis values listed per axis in `check` output
const PREVIEW_VALUES: usize = 4;

/// Run `command` against the process environment
pub fn run(command: Command, out: &mut impl Write) -> Result<()> {
    run_with(command, |name| std::env::var(name).ok(), out)
}

pub fn run_with(
    command: Command,
    lookup: impl Fn(&str) -> Option<String>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Plan(args) => plan(&args, lookup, out)?,
        Command::Directives { sweep } => directives(&sweep, out)?,
        Command::Check { sweep, context } => check(&sweep, &context, lookup, out)?,
    }
    out.flush()?;
    Ok(())
}

fn load_sweep(path: &Path) -> Result<SweepConfig> {
    SweepFile::load(path).wrap_err_with(|| format!("failed to load sweep {}", path.display()))
}

fn plan(
    args: &PlanArgs,
    lookup: impl Fn(&str) -> Option<String>,
    out: &mut impl Write,
) -> Result<()> {
    let mut config = load_sweep(&args.sweep)?;
    if let Some(run_root) = &args.run_root {
        config.run_root = run_root.clone();
    }
    let context = args
        .context
        .resolve(lookup)
        .wrap_err("failed to read the submission context")?;
    let planner = SweepPlanner::new(config, context)
        .wrap_err_with(|| format!("invalid sweep {}", args.sweep.display()))?;

    if args.dry_run {
        tracing::info!("dry run, no directories created");
    } else {
        planner.create_directories()?;
        // Every node plans the same sweep; one manifest is enough
        if !args.no_manifest && planner.context().node_id == 0 {
            planner.write_manifest()?;
        }
    }

    let mut written = 0;
    for job in planner.jobs() {
        write_job(out, &job?, args.format)?;
        written += 1;
    }

    tracing::info!(
        job_id = %planner.context().job_id,
        node_id = planner.context().node_id,
        jobs = written,
        total_jobs = planner.total_jobs(),
        "planned jobs"
    );
    Ok(())
}

fn directives(sweep: &Path, out: &mut impl Write) -> Result<()> {
    let config = load_sweep(sweep)?;
    let request = config
        .scheduler
        .ok_or_else(|| eyre!("sweep {} has no scheduler section", sweep.display()))?;

    for line in request.directives() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn check(
    sweep: &Path,
    context: &ContextArgs,
    lookup: impl Fn(&str) -> Option<String>,
    out: &mut impl Write,
) -> Result<()> {
    let config = load_sweep(sweep)?;
    let mut context = context.clone();
    if context.job_id.is_none() && lookup(JOB_ID_VAR).is_none() {
        context.job_id = Some(CHECK_JOB_ID.to_string());
    }
    let context = context
        .resolve(lookup)
        .wrap_err("failed to read the submission context")?;
    let planner = SweepPlanner::new(config, context)
        .wrap_err_with(|| format!("invalid sweep {}", sweep.display()))?;

    write_summary(&planner, out)?;
    writeln!(out, "ok")?;
    Ok(())
}

fn write_summary(planner: &SweepPlanner, out: &mut impl Write) -> Result<()> {
    let config = planner.config();
    let SubmissionContext {
        job_id,
        node_id,
        node_count,
        ..
    } = planner.context();

    writeln!(out, "job {job_id}, node {node_id} of {node_count}")?;
    writeln!(out, "mode: {:?}", config.mode)?;
    writeln!(out, "axes:")?;
    for axis in planner.axes() {
        let mut preview: Vec<String> = axis
            .values()
            .iter()
            .take(PREVIEW_VALUES)
            .map(ToString::to_string)
            .collect();
        if axis.len() > PREVIEW_VALUES {
            preview.push("...".to_string());
        }
        writeln!(
            out,
            "  {}: {} values ({})",
            axis.name(),
            axis.len(),
            preview.join(", ")
        )?;
    }

    let total = planner.total_jobs();
    if config.shard_by_node {
        let count = *node_count as usize;
        writeln!(
            out,
            "jobs: {total} in total, {} to {} per node, {} on this node",
            total / count,
            total.div_ceil(count),
            planner.shard_jobs()
        )?;
    } else {
        writeln!(out, "jobs: {total}")?;
    }

    let dirs = planner.plan_directories();
    writeln!(
        out,
        "directories: {} under {}",
        dirs.len(),
        planner.run_dir().display()
    )?;

    if let Some(samples) = config.samples {
        writeln!(
            out,
            "samples: {} over {} runs, {} per run, {} dropped",
            samples.total,
            samples.runs,
            samples.per_run(),
            samples.dropped()
        )?;

        let partition = TaskPartition::new(samples.per_run(), config.tasks_per_job)?;
        writeln!(
            out,
            "tasks: {} per job, up to {} samples each",
            config.tasks_per_job,
            partition.per_task()
        )?;
        let idle = partition.idle_ranks();
        if idle > 0 {
            tracing::warn!(idle, "some ranks get no samples");
            writeln!(out, "warning: {idle} ranks get no samples")?;
        }
    } else {
        writeln!(out, "tasks: {} per job", config.tasks_per_job)?;
    }

    if let Some(request) = &config.scheduler {
        writeln!(
            out,
            "scheduler: {} nodes for {}",
            request.nodes,
            format_wall_time(request.time)
        )?;
    }

    if let Some(job) = planner.all_jobs().next() {
        let job = job?;
        writeln!(out, "first job: {}", shell_line(&job.command_line()))?;
    }
    Ok(())
}
