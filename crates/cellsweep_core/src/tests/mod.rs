//! Tests for the sweep planner
//!
//! Tests are organized by topic:
//! - `enumeration` - job order, counts, sharding and placeholder resolution
//! - `directories` - directory layout, creation and the plan manifest
//! - `templates` - template parsing and rendering
//! - `samples` - sample budgets and task partitions
//! - `context` - scheduler environment handling
//! - `sweep_file` - YAML sweep files and entity lists
//! - `scheduler` - wall times and `#SBATCH` directives

mod directories;
mod sweep_file;
