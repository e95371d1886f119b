use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::error::{LibError, Result};
use crate::models::{HeadcountRow, ProjectId, RowId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NumberingViolation {
    DuplicateRowId {
        row_id: RowId,
    },
    DuplicateNumber {
        project_id: ProjectId,
        hc_number: u32,
        row_ids: Vec<RowId>,
    },
    OutOfRange {
        project_id: ProjectId,
        row_id: RowId,
        hc_number: u32,
        group_size: usize,
    },
    Gap {
        project_id: ProjectId,
        missing: Vec<u32>,
    },
}

impl NumberingViolation {
    pub const fn error_code(&self) -> &'static str {
        match self {
            NumberingViolation::DuplicateRowId { .. } => "roster_duplicate_row_id",
            NumberingViolation::DuplicateNumber { .. } => "roster_duplicate_hc_number",
            NumberingViolation::OutOfRange { .. } => "roster_hc_number_out_of_range",
            NumberingViolation::Gap { .. } => "roster_hc_number_gap",
        }
    }

    pub const fn public_message(&self) -> &'static str {
        match self {
            NumberingViolation::DuplicateRowId { .. } => "Headcount rows must have unique ids",
            NumberingViolation::DuplicateNumber { .. } => {
                "HC numbers must be unique within a project"
            }
            NumberingViolation::OutOfRange { .. } => {
                "HC numbers must run from 1 to the number of rows in the project"
            }
            NumberingViolation::Gap { .. } => "HC numbers within a project must be contiguous",
        }
    }
}

/// Reports every way `rows` departs from per-project `1..=N` numbering.
///
/// Groups are reported in ascending project order.
pub fn numbering_violations(rows: &[HeadcountRow]) -> Vec<NumberingViolation> {
    let mut violations = Vec::new();

    let mut seen_ids = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen_ids.insert(row.id) {
            violations.push(NumberingViolation::DuplicateRowId { row_id: row.id });
        }
    }

    let mut groups: BTreeMap<ProjectId, Vec<&HeadcountRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.project_id).or_default().push(row);
    }

    for (project_id, members) in groups {
        let group_size = members.len();
        let mut by_number: HashMap<u32, Vec<RowId>> = HashMap::with_capacity(group_size);

        for row in &members {
            let in_range = row.hc_number >= 1 && (row.hc_number as usize) <= group_size;
            if !in_range {
                violations.push(NumberingViolation::OutOfRange {
                    project_id,
                    row_id: row.id,
                    hc_number: row.hc_number,
                    group_size,
                });
                continue;
            }
            by_number.entry(row.hc_number).or_default().push(row.id);
        }

        let mut duplicates = by_number
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(number, ids)| (*number, ids.clone()))
            .collect::<Vec<_>>();
        duplicates.sort_by_key(|(number, _)| *number);
        for (hc_number, row_ids) in duplicates {
            violations.push(NumberingViolation::DuplicateNumber {
                project_id,
                hc_number,
                row_ids,
            });
        }

        let missing = (1..=group_size as u32)
            .filter(|number| !by_number.contains_key(number))
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            violations.push(NumberingViolation::Gap {
                project_id,
                missing,
            });
        }
    }

    violations
}

pub fn ensure_contiguous_numbering(rows: &[HeadcountRow]) -> Result<()> {
    let violations = numbering_violations(rows);
    if let Some(first) = violations.first() {
        return Err(LibError::invalid_with_code(
            first.error_code(),
            first.public_message(),
            anyhow!("roster numbering validation failed: {:?}", violations),
        ));
    }

    Ok(())
}

pub fn ensure_unique_row_ids(rows: &[HeadcountRow]) -> Result<()> {
    let mut seen_ids = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen_ids.insert(row.id) {
            let violation = NumberingViolation::DuplicateRowId { row_id: row.id };
            return Err(LibError::invalid_with_code(
                violation.error_code(),
                violation.public_message(),
                anyhow!("duplicate row id {}", row.id),
            ));
        }
    }

    Ok(())
}
