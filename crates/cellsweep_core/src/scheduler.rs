//! Scheduler resource requests and `#SBATCH` directive rendering

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Resources requested for one batch submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    pub nodes: u32,
    /// Wall-time limit
    #[serde(with = "wall_time")]
    pub time: SignedDuration,
    /// Queue / QOS class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    /// Hardware constraint, e.g. `knl` or `haswell`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl SchedulerRequest {
    pub fn new(nodes: u32, time: SignedDuration) -> Self {
        Self {
            job_name: None,
            nodes,
            time,
            queue: None,
            constraint: None,
            account: None,
        }
    }

    /// Header lines for a batch script, in a fixed order
    pub fn directives(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(name) = &self.job_name {
            lines.push(format!("#SBATCH --job-name={name}"));
        }
        lines.push(format!("#SBATCH --nodes={}", self.nodes));
        lines.push(format!("#SBATCH --time={}", format_wall_time(self.time)));
        if let Some(queue) = &self.queue {
            lines.push(format!("#SBATCH --qos={queue}"));
        }
        if let Some(constraint) = &self.constraint {
            lines.push(format!("#SBATCH --constraint={constraint}"));
        }
        if let Some(account) = &self.account {
            lines.push(format!("#SBATCH --account={account}"));
        }
        lines
    }
}

/// Parse a SLURM time limit.
///
/// Accepted forms: `MM`, `MM:SS`, `HH:MM:SS`, `D-HH`, `D-HH:MM`, `D-HH:MM:SS`.
pub fn parse_wall_time(text: &str) -> Result<SignedDuration, ConfigError> {
    let invalid = || ConfigError::InvalidWallTime(text.to_string());
    let number = |part: &str| part.trim().parse::<i64>().map_err(|_| invalid());

    let (days, clock) = match text.trim().split_once('-') {
        Some((days, clock)) => (Some(number(days)?), clock),
        None => (None, text.trim()),
    };
    let parts = clock
        .split(':')
        .map(number)
        .collect::<Result<Vec<_>, _>>()?;

    let (hours, minutes, seconds) = match (days.is_some(), parts.as_slice()) {
        (false, [minutes]) => (0, *minutes, 0),
        (false, [minutes, seconds]) => (0, *minutes, *seconds),
        (_, [hours, minutes, seconds]) => (*hours, *minutes, *seconds),
        (true, [hours]) => (*hours, 0, 0),
        (true, [hours, minutes]) => (*hours, *minutes, 0),
        _ => return Err(invalid()),
    };
    if [hours, minutes, seconds].iter().any(|&v| v < 0) {
        return Err(invalid());
    }

    let total = days
        .unwrap_or(0)
        .checked_mul(24)
        .and_then(|h| h.checked_add(hours))
        .and_then(|h| h.checked_mul(60))
        .and_then(|m| m.checked_add(minutes))
        .and_then(|m| m.checked_mul(60))
        .and_then(|s| s.checked_add(seconds))
        .filter(|&total| total > 0)
        .ok_or_else(invalid)?;
    Ok(SignedDuration::from_secs(total))
}

/// Render a time limit as `HH:MM:SS`, or `D-HH:MM:SS` from one day up
pub fn format_wall_time(duration: SignedDuration) -> String {
    let total = duration.as_secs().max(0);
    let (days, rest) = (total / 86_400, total % 86_400);
    let (hours, minutes, seconds) = (rest / 3600, rest % 3600 / 60, rest % 60);
    if days > 0 {
        format!("{days}-{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

mod wall_time {
    use jiff::SignedDuration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        duration: &SignedDuration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_wall_time(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<SignedDuration, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_wall_time(&text).map_err(serde::de::Error::custom)
    }
}
