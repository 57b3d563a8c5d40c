use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors in the sweep definition itself.
///
/// All of these are reported before any directory is created or any job is
/// handed to the launcher.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("axis `{0}` has no values")]
    EmptyAxis(String),
    #[error("axis `{0}` is declared more than once")]
    DuplicateAxis(String),
    #[error("axis name `{0}` is reserved for a built-in placeholder")]
    ReservedAxisName(String),
    #[error("axis name `{0}` may only contain letters, digits and `_`")]
    InvalidAxisName(String),
    #[error("axis `{0}` must declare exactly one of `values`, `range` or `entities`")]
    AxisSource(String),
    #[error("axis `{axis}` has {len} values but the linear sweep has {expected}")]
    AxisLengthMismatch {
        axis: String,
        len: usize,
        expected: usize,
    },
    #[error("partition axis `{0}` is not declared")]
    UnknownPartitionAxis(String),
    #[error("unresolved placeholder `{{{name}}}` in template `{template}`")]
    UnresolvedPlaceholder { name: String, template: String },
    #[error("malformed template `{template}`: {reason}")]
    MalformedTemplate {
        template: String,
        reason: &'static str,
    },
    #[error("`{0}` is not usable as a single file or directory name")]
    InvalidPathComponent(String),
    #[error("output path {} is produced by more than one job", .0.display())]
    DuplicateOutputPath(PathBuf),
    #[error("sample budget needs at least one run")]
    ZeroRuns,
    #[error("task count must be at least 1")]
    ZeroTasks,
    #[error("entity rows {start}..{end} are out of bounds for a list of {len} rows")]
    EntityRangeOutOfBounds { start: usize, end: usize, len: usize },
    #[error("entity list row {0} has an empty name")]
    EmptyEntityName(usize),
    #[error("environment variable {0} is not set")]
    MissingEnvironment(&'static str),
    #[error("environment variable {name} has invalid value `{value}`")]
    InvalidEnvironment { name: &'static str, value: String },
    #[error("node id {node_id} is out of range for {node_count} node(s)")]
    NodeOutOfRange { node_id: u32, node_count: u32 },
    #[error("invalid wall time `{0}` (expected MM, MM:SS, HH:MM:SS or D-HH[:MM[:SS]])")]
    InvalidWallTime(String),
    #[error("failed to parse sweep configuration: {0}")]
    Parse(String),
}

/// A filesystem operation that failed while preparing a submission.
#[derive(Debug, Error)]
#[error("failed to {operation} {}: {source}", .path.display())]
pub struct FilesystemError {
    pub operation: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FilesystemError {
    pub fn new(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Any failure of a planning run. None of these are retried.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
    #[error("failed to serialize plan manifest: {0}")]
    Manifest(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;
