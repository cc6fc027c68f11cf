//! Edit model — structural mutations over a rubric document.
//!
//! Every operation validates its arguments against the document
//! invariants before touching anything, so a failed call leaves the
//! document exactly as it was. Single-writer, synchronous: the UI holds
//! one document per editing session and applies operations in order.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::document::{Criterion, RubricDocument, RubricMetadata};

/// A mutation was rejected because it would break the document
/// structure. All variants are recoverable; the UI disables or rejects
/// the action rather than retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("a performance level named '{0}' already exists")]
    DuplicateLevelName(String),

    #[error("a rubric needs at least {MIN_LEVEL_COUNT} performance levels")]
    MinimumLevelCount,

    #[error("no criterion with id {0}")]
    CriterionNotFound(Uuid),

    #[error("'{0}' is not a performance level of this rubric")]
    UnknownLevel(String),

    #[error("performance level index {0} is out of range")]
    LevelIndexOutOfRange(usize),

    #[error("this rubric does not track point values")]
    PointsDisabled,
}

/// Fewest levels a rubric may keep; below this the grid stops being a
/// rubric.
pub const MIN_LEVEL_COUNT: usize = 2;

/// Direction for `move_criterion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

impl RubricDocument {
    /// Rename the level at `index`. Renaming a level to itself is a
    /// no-op; renaming onto another existing level is rejected.
    pub fn rename_level(&mut self, index: usize, new_name: &str) -> Result<(), EditError> {
        let old_name = self
            .performance_levels
            .get(index)
            .cloned()
            .ok_or(EditError::LevelIndexOutOfRange(index))?;
        if old_name == new_name {
            return Ok(());
        }
        if self.performance_levels.iter().any(|l| l == new_name) {
            return Err(EditError::DuplicateLevelName(new_name.to_string()));
        }

        self.performance_levels[index] = new_name.to_string();
        for criterion in &mut self.criteria {
            if let Some(text) = criterion.levels.remove(&old_name) {
                criterion.levels.insert(new_name.to_string(), text);
            }
            if let Some(points) = criterion.points.as_mut() {
                if let Some(value) = points.remove(&old_name) {
                    points.insert(new_name.to_string(), value);
                }
            }
        }
        Ok(())
    }

    /// Append a new level and back-fill every criterion with an empty
    /// cell (and a zero point entry when points are tracked).
    pub fn add_level(&mut self, name: &str) -> Result<(), EditError> {
        if self.performance_levels.iter().any(|l| l == name) {
            return Err(EditError::DuplicateLevelName(name.to_string()));
        }
        self.performance_levels.push(name.to_string());
        for criterion in &mut self.criteria {
            criterion.levels.insert(name.to_string(), String::new());
            if let Some(points) = criterion.points.as_mut() {
                points.insert(name.to_string(), 0);
            }
        }
        Ok(())
    }

    /// Remove the level at `index` together with its column of cells.
    pub fn remove_level(&mut self, index: usize) -> Result<(), EditError> {
        if index >= self.performance_levels.len() {
            return Err(EditError::LevelIndexOutOfRange(index));
        }
        if self.performance_levels.len() <= MIN_LEVEL_COUNT {
            return Err(EditError::MinimumLevelCount);
        }
        let removed = self.performance_levels.remove(index);
        for criterion in &mut self.criteria {
            criterion.levels.remove(&removed);
            if let Some(points) = criterion.points.as_mut() {
                points.remove(&removed);
            }
        }
        Ok(())
    }

    /// Append a new criterion with a fresh id, empty name, and one
    /// empty cell per existing level. Returns the new id.
    pub fn add_criterion(&mut self) -> Uuid {
        let criterion = Criterion::blank(
            "",
            &self.performance_levels,
            self.metadata.include_point_values,
        );
        let id = criterion.id;
        self.criteria.push(criterion);
        id
    }

    pub fn remove_criterion(&mut self, id: &Uuid) -> Result<(), EditError> {
        let index = self
            .criteria
            .iter()
            .position(|c| c.id == *id)
            .ok_or(EditError::CriterionNotFound(*id))?;
        self.criteria.remove(index);
        Ok(())
    }

    pub fn rename_criterion(&mut self, id: &Uuid, name: &str) -> Result<(), EditError> {
        let criterion = self
            .criterion_mut(id)
            .ok_or(EditError::CriterionNotFound(*id))?;
        criterion.name = name.to_string();
        Ok(())
    }

    /// Swap a criterion with its neighbor. A move past either end is a
    /// no-op rather than an error, so the UI can leave both arrows
    /// enabled.
    pub fn move_criterion(&mut self, index: usize, direction: MoveDirection) {
        match direction {
            MoveDirection::Up => {
                if index > 0 && index < self.criteria.len() {
                    self.criteria.swap(index, index - 1);
                }
            }
            MoveDirection::Down => {
                if index + 1 < self.criteria.len() {
                    self.criteria.swap(index, index + 1);
                }
            }
        }
    }

    pub fn set_cell_text(
        &mut self,
        id: &Uuid,
        level: &str,
        text: &str,
    ) -> Result<(), EditError> {
        if !self.performance_levels.iter().any(|l| l == level) {
            return Err(EditError::UnknownLevel(level.to_string()));
        }
        let criterion = self
            .criterion_mut(id)
            .ok_or(EditError::CriterionNotFound(*id))?;
        criterion.levels.insert(level.to_string(), text.to_string());
        Ok(())
    }

    /// Set a point value. `points` is unsigned, so the ≥ 0 clamp is
    /// enforced by the type.
    pub fn set_cell_points(
        &mut self,
        id: &Uuid,
        level: &str,
        points: u32,
    ) -> Result<(), EditError> {
        if !self.metadata.include_point_values {
            return Err(EditError::PointsDisabled);
        }
        if !self.performance_levels.iter().any(|l| l == level) {
            return Err(EditError::UnknownLevel(level.to_string()));
        }
        let criterion = self
            .criterion_mut(id)
            .ok_or(EditError::CriterionNotFound(*id))?;
        if let Some(map) = criterion.points.as_mut() {
            map.insert(level.to_string(), points);
        }
        Ok(())
    }

    /// Replace the document metadata. Toggling point tracking adds
    /// zeroed point maps or drops them, keeping the grid consistent.
    pub fn update_metadata(&mut self, metadata: RubricMetadata) {
        let points_now = metadata.include_point_values;
        let points_before = self.metadata.include_point_values;
        self.metadata = metadata;

        if points_now == points_before {
            return;
        }
        let zeroed: std::collections::HashMap<String, u32> = self
            .performance_levels
            .iter()
            .map(|l| (l.clone(), 0u32))
            .collect();
        for criterion in &mut self.criteria {
            criterion.points = points_now.then(|| zeroed.clone());
        }
    }
}
