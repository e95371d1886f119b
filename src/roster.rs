use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::invariants;
use crate::models::{HeadcountRow, ProjectId, RowField, RowFilter, RowId};

/// Where a dragged row lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveTarget {
    /// Take the slot of another row, adopting its project.
    Row { row_id: RowId },
    /// Placeholder shown for a project with no rows.
    EmptyGroup { project_id: ProjectId },
}

/// Ordered rows of one or more projects with per-project HC numbering.
///
/// Storage order is display order. Every structural change (move, insert,
/// delete) leaves each project's HC numbers as `1..=N` in storage order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    rows: Vec<HeadcountRow>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster from rows taken as-is, rejecting duplicate ids.
    pub fn from_rows(rows: Vec<HeadcountRow>) -> Result<Self> {
        invariants::ensure_unique_row_ids(&rows)?;
        Ok(Self { rows })
    }

    /// Replaces every row. On error the current rows are kept.
    pub fn replace(&mut self, rows: Vec<HeadcountRow>) -> Result<()> {
        invariants::ensure_unique_row_ids(&rows)?;
        self.rows = rows;
        Ok(())
    }

    pub fn rows(&self) -> &[HeadcountRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<HeadcountRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row_id: RowId) -> Option<&HeadcountRow> {
        self.rows.iter().find(|row| row.id == row_id)
    }

    pub fn group(&self, project_id: ProjectId) -> impl Iterator<Item = &HeadcountRow> {
        self.rows
            .iter()
            .filter(move |row| row.project_id == project_id)
    }

    pub fn group_len(&self, project_id: ProjectId) -> usize {
        self.group(project_id).count()
    }

    pub fn filtered<'a>(
        &'a self,
        project_id: ProjectId,
        filter: &'a RowFilter,
    ) -> impl Iterator<Item = &'a HeadcountRow> {
        self.group(project_id).filter(move |row| filter.matches(row))
    }

    fn position(&self, row_id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == row_id)
    }

    /// Moves `active` onto `target` and renumbers every project.
    ///
    /// Returns `false` without touching anything when the ids are equal or
    /// either row is unknown.
    pub fn move_row(&mut self, active: RowId, target: MoveTarget) -> bool {
        if matches!(target, MoveTarget::Row { row_id } if row_id == active) {
            return false;
        }
        let Some(old_index) = self.position(active) else {
            return false;
        };

        match target {
            MoveTarget::Row { row_id } => {
                let Some(new_index) = self.position(row_id) else {
                    return false;
                };
                let project_id = self.rows[new_index].project_id;
                let mut moved = self.rows.remove(old_index);
                moved.project_id = project_id;
                self.rows.insert(new_index, moved);
            }
            MoveTarget::EmptyGroup { project_id } => {
                let mut moved = self.rows.remove(old_index);
                moved.project_id = project_id;
                self.rows.push(moved);
            }
        }

        tracing::debug!(row_id = %active, ?target, "moved roster row");
        self.renumber();
        true
    }

    /// Appends a blank row to `project_id` numbered after its last member.
    ///
    /// `None` means no project is selected and nothing happens.
    pub fn insert(&mut self, project_id: Option<ProjectId>) -> Option<RowId> {
        let project_id = project_id?;
        let next_number = self.group_len(project_id) as u32 + 1;
        let row_id = RowId::new_draft();
        self.rows
            .push(HeadcountRow::blank(row_id, project_id, next_number));
        Some(row_id)
    }

    /// Removes a row and renumbers the project it belonged to.
    pub fn delete(&mut self, row_id: RowId) -> Option<HeadcountRow> {
        let index = self.position(row_id)?;
        let removed = self.rows.remove(index);
        self.renumber_group(removed.project_id);
        Some(removed)
    }

    /// Replaces one field. Never reorders or renumbers.
    pub fn set_field(&mut self, row_id: RowId, field: RowField) -> bool {
        match self.rows.iter_mut().find(|row| row.id == row_id) {
            Some(row) => {
                field.apply(row);
                true
            }
            None => false,
        }
    }

    /// Flips the vacancy flag, returning the new value.
    pub fn toggle_vacancy(&mut self, row_id: RowId) -> Option<bool> {
        let row = self.rows.iter_mut().find(|row| row.id == row_id)?;
        row.is_vacant = !row.is_vacant;
        Some(row.is_vacant)
    }

    /// Numbers every project's members `1..=N` in storage order.
    pub fn renumber(&mut self) {
        let mut counters: HashMap<ProjectId, u32> = HashMap::new();
        for row in &mut self.rows {
            let counter = counters.entry(row.project_id).or_insert(0);
            *counter += 1;
            row.hc_number = *counter;
        }
    }

    fn renumber_group(&mut self, project_id: ProjectId) {
        let mut counter = 0;
        for row in self
            .rows
            .iter_mut()
            .filter(|row| row.project_id == project_id)
        {
            counter += 1;
            row.hc_number = counter;
        }
    }
}
