use std::collections::{BTreeMap, HashMap};

use crate::models::{EmployeeId, HeadCountRecord, HeadcountId, HeadcountRow, ProjectId, RowId};

/// Turns fetched records into rows, resolving each `ParentId` (a headcount
/// id) to the employee sitting in that headcount.
///
/// Parents outside the fetched list, or parents without an employee, leave
/// the manager unset.
pub fn resolve_manager_references(records: Vec<HeadCountRecord>) -> Vec<HeadcountRow> {
    let employee_by_headcount: HashMap<HeadcountId, EmployeeId> = records
        .iter()
        .filter_map(|record| Some((HeadcountId(record.id), record.employee_id?)))
        .collect();

    records
        .into_iter()
        .map(|record| {
            let manager = record
                .parent_id
                .and_then(|parent| employee_by_headcount.get(&parent).copied());
            row_from_record(record, manager)
        })
        .collect()
}

fn row_from_record(record: HeadCountRecord, manager: Option<EmployeeId>) -> HeadcountRow {
    let id = if record.id > 0 {
        RowId::Persisted(HeadcountId(record.id))
    } else {
        RowId::new_draft()
    };

    HeadcountRow {
        id,
        project_id: record.project_id,
        functional_area_id: record.functional_area_id,
        section_id: record.section_id,
        sub_section_id: record.sub_section_id,
        position_id: record.position_id,
        employee_id: record.employee_id,
        manager_employee_id: manager,
        is_vacant: record.is_vacant,
        hc_number: record.hc_number.unwrap_or(0),
        recruiter_comment: record.recruiter_comment,
    }
}

/// Headcount whose assignee is `manager`, for writing `ParentId` back.
///
/// Only persisted rows qualify; the first match in roster order wins.
pub fn parent_headcount_for(manager: EmployeeId, rows: &[HeadcountRow]) -> Option<HeadcountId> {
    rows.iter()
        .filter(|row| row.employee_id == Some(manager))
        .find_map(|row| row.id.headcount_id())
}

pub fn direct_reports(manager: EmployeeId, rows: &[HeadcountRow]) -> Vec<&HeadcountRow> {
    rows.iter()
        .filter(|row| row.manager_employee_id == Some(manager))
        .collect()
}

pub fn group_sizes(rows: &[HeadcountRow]) -> BTreeMap<ProjectId, usize> {
    let mut sizes = BTreeMap::new();
    for row in rows {
        *sizes.entry(row.project_id).or_insert(0) += 1;
    }
    sizes
}
