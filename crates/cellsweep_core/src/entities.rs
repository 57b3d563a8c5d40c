//! Entity (cell) lists
//!
//! An entity list is a text file with one entity per row. Only the first
//! comma-separated field of a row is used as the entity name, so both a bare
//! name list and a CSV whose first column is the name work. Rows are counted
//! as they appear in the file; there is no header handling.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, FilesystemError};
use crate::model::AxisValue;

#[derive(Debug, Clone, Default)]
pub struct EntityList {
    rows: Vec<String>,
}

impl EntityList {
    pub fn parse(text: &str) -> Self {
        let mut rows: Vec<String> = text
            .lines()
            .map(|line| line.split(',').next().unwrap_or("").trim().to_string())
            .collect();
        // A trailing newline or blank tail is not a row
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        Self { rows }
    }

    pub fn load(path: &Path) -> Result<Self, FilesystemError> {
        let text = fs::read_to_string(path)
            .map_err(|e| FilesystemError::new("read entity list", path, e))?;
        let list = Self::parse(&text);
        tracing::debug!(path = %path.display(), rows = list.len(), "loaded entity list");
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Entities on 0-based rows `start..start + count`.
    ///
    /// `start` follows the `START_CELL` convention of the run scripts, so
    /// `select(85, 24)` returns 1-indexed rows 86 through 109.
    pub fn select(&self, start: usize, count: usize) -> Result<Vec<AxisValue>, ConfigError> {
        let end = start.saturating_add(count);
        if end > self.rows.len() {
            return Err(ConfigError::EntityRangeOutOfBounds {
                start,
                end,
                len: self.rows.len(),
            });
        }

        self.rows[start..end]
            .iter()
            .enumerate()
            .map(|(offset, name)| {
                let row = start + offset;
                if name.is_empty() {
                    return Err(ConfigError::EmptyEntityName(row + 1));
                }
                Ok(AxisValue::Entity {
                    name: name.clone(),
                    row,
                })
            })
            .collect()
    }
}
