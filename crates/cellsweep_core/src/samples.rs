//! Sample budgets and per-rank task partitions

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// `NSAMPLES` split over `NRUNS` runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleBudget {
    pub total: u64,
    pub runs: u64,
}

impl SampleBudget {
    pub fn new(total: u64, runs: u64) -> Result<Self, ConfigError> {
        let budget = Self { total, runs };
        budget.validate()?;
        Ok(budget)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runs == 0 {
            return Err(ConfigError::ZeroRuns);
        }
        Ok(())
    }

    /// Samples handed to each run.
    ///
    /// Integer division: when `total` is not a multiple of `runs` the
    /// remainder is not simulated.
    pub fn per_run(&self) -> u64 {
        self.total / self.runs
    }

    /// Samples lost to the integer division in [`per_run`](Self::per_run)
    pub fn dropped(&self) -> u64 {
        self.total % self.runs
    }

    pub fn warn_if_truncated(&self) {
        let dropped = self.dropped();
        if dropped > 0 {
            tracing::warn!(
                total = self.total,
                runs = self.runs,
                per_run = self.per_run(),
                dropped,
                "sample count is not divisible by run count; remainder will not be simulated"
            );
        }
    }
}

/// How the launcher's ranks divide a job's samples among themselves.
///
/// Every rank gets `samples / tasks + 1` samples except the tail, which is
/// clipped to `samples`. With many tasks some trailing ranks get nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPartition {
    samples: u64,
    tasks: u32,
}

impl TaskPartition {
    pub fn new(samples: u64, tasks: u32) -> Result<Self, ConfigError> {
        if tasks == 0 {
            return Err(ConfigError::ZeroTasks);
        }
        Ok(Self { samples, tasks })
    }

    pub fn per_task(&self) -> u64 {
        self.samples / u64::from(self.tasks) + 1
    }

    /// Sample range processed by `rank`; empty for idle ranks
    pub fn range(&self, rank: u32) -> Range<u64> {
        let per_task = self.per_task();
        let stop = per_task
            .saturating_mul(u64::from(rank) + 1)
            .min(self.samples);
        let start = per_task.saturating_mul(u64::from(rank)).min(stop);
        start..stop
    }

    pub fn ranges(&self) -> impl Iterator<Item = (u32, Range<u64>)> + '_ {
        (0..self.tasks).map(|rank| (rank, self.range(rank)))
    }

    /// Ranks that receive no samples
    pub fn idle_ranks(&self) -> u32 {
        // u32 fits: bounded by self.tasks
        self.ranges().filter(|(_, range)| range.is_empty()).count() as u32
    }
}
