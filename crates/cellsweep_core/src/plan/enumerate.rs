use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::{SweepMode, SweepPlanner};
use crate::error::ConfigError;
use crate::model::JobSpec;

/// Index walk over the axes.
enum Walk {
    /// Row-major: the last axis varies fastest
    Grid {
        shape: Vec<usize>,
        current: Vec<usize>,
        done: bool,
    },
    /// Position `i` of every axis, or 0 for broadcast axes
    Zip {
        lens: Vec<usize>,
        next: usize,
        total: usize,
    },
}

impl Walk {
    fn new(planner: &SweepPlanner) -> Self {
        let lens: Vec<usize> = planner.axes().iter().map(|axis| axis.len()).collect();
        match planner.config().mode {
            SweepMode::CrossProduct => Walk::Grid {
                current: vec![0; lens.len()],
                done: lens.contains(&0),
                shape: lens,
            },
            SweepMode::Linear => Walk::Zip {
                lens,
                next: 0,
                total: planner.total_jobs(),
            },
        }
    }
}

impl Iterator for Walk {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Walk::Grid {
                shape,
                current,
                done,
            } => {
                if *done {
                    return None;
                }
                let result = current.clone();

                // Count in mixed radix; a carry out of the first axis ends the walk
                let mut carry = true;
                for i in (0..shape.len()).rev() {
                    current[i] += 1;
                    if current[i] < shape[i] {
                        carry = false;
                        break;
                    }
                    current[i] = 0;
                }
                *done = carry;

                Some(result)
            }
            Walk::Zip { lens, next, total } => {
                if *next >= *total {
                    return None;
                }
                let position = *next;
                *next += 1;
                Some(
                    lens.iter()
                        .map(|&len| if len == 1 { 0 } else { position })
                        .collect(),
                )
            }
        }
    }
}

/// Lazy job sequence returned by [`SweepPlanner::jobs`]
pub struct Jobs<'a> {
    planner: &'a SweepPlanner,
    walk: Walk,
    sequence: usize,
    /// Jobs seen so far per output directory, for `run_index`
    per_dir: FxHashMap<PathBuf, usize>,
    shard: Option<(usize, usize)>,
}

impl<'a> Jobs<'a> {
    pub(super) fn new(planner: &'a SweepPlanner, shard: Option<(usize, usize)>) -> Self {
        Self {
            planner,
            walk: Walk::new(planner),
            sequence: 0,
            per_dir: FxHashMap::default(),
            shard,
        }
    }
}

impl Iterator for Jobs<'_> {
    type Item = Result<JobSpec, ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let indices = self.walk.next()?;
            let sequence = self.sequence;
            self.sequence += 1;

            // Counted for every job so run indices agree across shards
            let dir = self.planner.job_dir(&indices);
            let counter = self.per_dir.entry(dir.clone()).or_insert(0);
            let run_index = *counter;
            *counter += 1;

            if self
                .shard
                .is_some_and(|(node, count)| sequence % count != node)
            {
                continue;
            }

            let job = self.planner.resolve(sequence, &indices, run_index, dir);
            if let Ok(job) = &job {
                tracing::trace!(
                    sequence,
                    run_index,
                    output = %job.output_path.display(),
                    "planned job"
                );
            }
            return Some(job);
        }
    }
}
