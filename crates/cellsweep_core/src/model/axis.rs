//! Sweep axes: named dimensions with an ordered list of discrete values

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::entities::EntityList;
use crate::error::ConfigError;

/// One value along a sweep axis
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum AxisValue {
    /// Free-form label, e.g. a stimulus type
    Label(String),
    /// Integer index, e.g. a stimulus index or run number
    Index(u64),
    /// A named entity taken from row `row` (0-based) of an entity list
    Entity { name: String, row: usize },
}

impl AxisValue {
    /// Source row for entity values
    pub fn row(&self) -> Option<usize> {
        match self {
            AxisValue::Entity { row, .. } => Some(*row),
            _ => None,
        }
    }
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisValue::Label(label) => f.write_str(label),
            AxisValue::Index(index) => write!(f, "{index}"),
            AxisValue::Entity { name, .. } => f.write_str(name),
        }
    }
}

/// A named sweep dimension. Never empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepAxis {
    name: String,
    values: Vec<AxisValue>,
}

impl SweepAxis {
    pub fn new(name: impl Into<String>, values: Vec<AxisValue>) -> Result<Self, ConfigError> {
        let name = name.into();
        if values.is_empty() {
            return Err(ConfigError::EmptyAxis(name));
        }
        Ok(Self { name, values })
    }

    /// Axis of free-form labels, in the given order
    pub fn labels<I, S>(name: impl Into<String>, labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = labels
            .into_iter()
            .map(|label| AxisValue::Label(label.into()))
            .collect();
        Self::new(name, values)
    }

    /// Axis over a half-open integer range
    pub fn range(name: impl Into<String>, range: Range<u64>) -> Result<Self, ConfigError> {
        Self::new(name, range.map(AxisValue::Index).collect())
    }

    /// Axis over `count` entities starting at 0-based row `start` of `list`
    pub fn entities(
        name: impl Into<String>,
        list: &EntityList,
        start: usize,
        count: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(name, list.select(start, count)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[AxisValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed axis
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every value came from an entity list
    pub fn is_entity_axis(&self) -> bool {
        self.values.iter().all(|value| value.row().is_some())
    }
}
