use std::collections::HashSet;
use std::future::Future;

use anyhow::anyhow;
use serde::Serialize;
use tokio::task::JoinSet;

use crate::algorithms::parent_headcount_for;
use crate::error::{LibError, Result};
use crate::invariants;
use crate::models::{Employee, EmployeeId, HeadCountRecord, HeadcountId, HeadcountRow, ProjectId, RowId};

/// Backend operations the roster needs.
///
/// Implementations are cheap to clone; a batch save hands one clone to
/// every in-flight request.
pub trait HeadcountStore: Clone + Send + Sync + 'static {
    fn list_headcounts(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<HeadCountRecord>>> + Send;

    fn create_headcount(&self, record: HeadCountRecord) -> impl Future<Output = Result<()>> + Send;

    fn update_headcount(&self, record: HeadCountRecord) -> impl Future<Output = Result<()>> + Send;

    fn delete_headcount(&self, id: HeadcountId) -> impl Future<Output = Result<()>> + Send;

    fn search_employees(&self, term: &str) -> impl Future<Output = Result<Vec<Employee>>> + Send;

    fn get_employee(&self, id: EmployeeId) -> impl Future<Output = Result<Employee>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    Updated,
}

#[derive(Debug)]
pub struct SyncFailure {
    pub row_id: RowId,
    pub error: LibError,
}

/// Per-row outcome of a batch save, in completion order.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub created: Vec<RowId>,
    pub updated: Vec<RowId>,
    pub failed: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn attempted(&self) -> usize {
        self.created.len() + self.updated.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Wire record for `row`. `rows` is the roster the row lives in, used to
/// map the manager back to the manager's headcount.
pub fn normalize_row(row: &HeadcountRow, rows: &[HeadcountRow]) -> HeadCountRecord {
    let parent_id = row.manager_employee_id.and_then(|manager| {
        let parent = parent_headcount_for(manager, rows);
        if parent.is_none() {
            tracing::warn!(
                row_id = %row.id,
                manager_employee_id = %manager,
                "manager has no saved headcount in this roster; sending no parent"
            );
        }
        parent
    });

    HeadCountRecord {
        id: row.id.headcount_id().map(|id| id.0).unwrap_or(0),
        project_id: row.project_id,
        functional_area_id: row.functional_area_id,
        section_id: row.section_id,
        sub_section_id: row.sub_section_id,
        position_id: row.position_id,
        employee_id: row.employee_id,
        hc_number: Some(row.hc_number),
        parent_id,
        is_vacant: row.is_vacant,
        recruiter_comment: row.recruiter_comment.clone(),
    }
}

pub fn normalize_rows(rows: &[HeadcountRow]) -> Vec<(RowId, HeadCountRecord)> {
    rows.iter()
        .map(|row| (row.id, normalize_row(row, rows)))
        .collect()
}

/// Creates a draft row or updates a persisted one.
pub async fn save_row<S: HeadcountStore>(
    store: &S,
    row: &HeadcountRow,
    rows: &[HeadcountRow],
) -> Result<SyncAction> {
    submit(store, row.id, normalize_row(row, rows)).await
}

async fn submit<S: HeadcountStore>(
    store: &S,
    row_id: RowId,
    record: HeadCountRecord,
) -> Result<SyncAction> {
    if row_id.is_draft() {
        store.create_headcount(record).await?;
        Ok(SyncAction::Created)
    } else {
        store.update_headcount(record).await?;
        Ok(SyncAction::Updated)
    }
}

/// Submits every row as an independent request.
///
/// Requests run concurrently and complete in any order. A failure is
/// recorded and logged; it neither stops nor undoes the other requests.
pub async fn save_all<S: HeadcountStore>(store: &S, rows: &[HeadcountRow]) -> SyncReport {
    let violations = invariants::numbering_violations(rows);
    if !violations.is_empty() {
        tracing::warn!(
            violation_count = violations.len(),
            ?violations,
            "saving roster with non-contiguous HC numbers"
        );
    }

    let mut pending: HashSet<RowId> = HashSet::with_capacity(rows.len());
    let mut tasks = JoinSet::new();
    for (row_id, record) in normalize_rows(rows) {
        pending.insert(row_id);
        let store = store.clone();
        tasks.spawn(async move { (row_id, submit(&store, row_id, record).await) });
    }

    let mut report = SyncReport::default();
    while let Some(joined) = tasks.join_next().await {
        let (row_id, outcome) = match joined {
            Ok(done) => done,
            Err(err) => {
                tracing::error!(error = %err, "headcount save task did not finish");
                continue;
            }
        };
        pending.remove(&row_id);
        match outcome {
            Ok(SyncAction::Created) => report.created.push(row_id),
            Ok(SyncAction::Updated) => report.updated.push(row_id),
            Err(error) => {
                tracing::error!(
                    row_id = %row_id,
                    kind = ?error.kind,
                    status = ?error.status,
                    error = %error.source,
                    "headcount save failed"
                );
                report.failed.push(SyncFailure { row_id, error });
            }
        }
    }

    for row_id in pending {
        report.failed.push(SyncFailure {
            row_id,
            error: LibError::unknown(
                "Headcount save did not finish",
                anyhow!("save task for row {} aborted", row_id),
            ),
        });
    }

    tracing::info!(
        created = report.created.len(),
        updated = report.updated.len(),
        failed = report.failed.len(),
        "roster save finished"
    );
    report
}
