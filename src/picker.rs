use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Employee, EmployeeId, RowField, RowId};
use crate::roster::Roster;

/// A person that can be attached to a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: EmployeeId,
    pub name: String,
}

impl Candidate {
    pub fn new(id: EmployeeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Employees the backend has not assigned an id yet cannot be picked.
    pub fn from_employee(employee: Employee) -> Option<Self> {
        employee.id.map(|id| Self::new(id, employee.full_name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSlot {
    Employee,
    Manager,
}

impl AssignmentSlot {
    pub fn field(self, employee_id: Option<EmployeeId>) -> RowField {
        match self {
            AssignmentSlot::Employee => RowField::Employee(employee_id),
            AssignmentSlot::Manager => RowField::Manager(employee_id),
        }
    }
}

/// Case-insensitive substring match on the display name. An empty query
/// matches everyone.
pub fn filter_candidates<'a>(query: &str, directory: &'a [Candidate]) -> Vec<&'a Candidate> {
    let needle = query.trim().to_lowercase();
    directory
        .iter()
        .filter(|candidate| candidate.name.to_lowercase().contains(&needle))
        .collect()
}

/// Search state for one row's employee or manager slot.
///
/// Selecting consumes the picker, which is how it closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPicker {
    row_id: RowId,
    slot: AssignmentSlot,
    query: String,
}

impl AssignmentPicker {
    pub fn open(row_id: RowId, slot: AssignmentSlot) -> Self {
        Self {
            row_id,
            slot,
            query: String::new(),
        }
    }

    pub fn row_id(&self) -> RowId {
        self.row_id
    }

    pub fn slot(&self) -> AssignmentSlot {
        self.slot
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn matches<'a>(&self, directory: &'a [Candidate]) -> Vec<&'a Candidate> {
        filter_candidates(&self.query, directory)
    }

    /// Writes the candidate into the row. Returns `false` if the row is gone.
    pub fn select(self, candidate: &Candidate, roster: &mut Roster) -> bool {
        roster.set_field(self.row_id, self.slot.field(Some(candidate.id)))
    }

    /// Clears the slot.
    pub fn unassign(self, roster: &mut Roster) -> bool {
        roster.set_field(self.row_id, self.slot.field(None))
    }
}

/// Names of employees seen so far, for rendering assignee and manager cells.
#[derive(Debug, Clone, Default)]
pub struct NameDirectory {
    names: HashMap<EmployeeId, String>,
}

impl NameDirectory {
    pub fn remember(&mut self, candidate: &Candidate) {
        self.names.insert(candidate.id, candidate.name.clone());
    }

    pub fn remember_all<'a>(&mut self, candidates: impl IntoIterator<Item = &'a Candidate>) {
        for candidate in candidates {
            self.remember(candidate);
        }
    }

    pub fn contains(&self, employee_id: EmployeeId) -> bool {
        self.names.contains_key(&employee_id)
    }

    /// Name for `employee_id`, or an empty string when absent or unknown.
    pub fn display_name(&self, employee_id: Option<EmployeeId>) -> &str {
        employee_id
            .and_then(|id| self.names.get(&id))
            .map(String::as_str)
            .unwrap_or("")
    }
}
