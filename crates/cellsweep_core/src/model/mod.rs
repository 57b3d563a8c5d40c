//! Sweep data model
//!
//! - [`SweepAxis`] / [`AxisValue`]: the declared dimensions of a sweep
//! - [`JobSpec`]: one resolved combination, produced by the planner

mod axis;
mod job;

pub use axis::{AxisValue, SweepAxis};
pub use job::{Binding, JobSpec};
