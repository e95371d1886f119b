use std::collections::{BTreeMap, BTreeSet};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::algorithms::{direct_reports, group_sizes, resolve_manager_references};
use crate::drag::DragOutcome;
use crate::error::{LibError, Result};
use crate::models::{EmployeeId, HeadcountRow, ProjectId, RowField, RowFilter, RowId};
use crate::picker::{AssignmentSlot, Candidate, NameDirectory};
use crate::roster::{MoveTarget, Roster};
use crate::sync::{self, HeadcountStore, SyncAction, SyncReport};

/// High-level roster actions, one per user gesture.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum RosterOperation {
    SelectProject {
        project_id: ProjectId,
    },
    Refresh,
    Move {
        active: RowId,
        target: MoveTarget,
    },
    /// Move followed by a save of the whole roster, as a finished drag does.
    Reorder {
        active: RowId,
        target: MoveTarget,
    },
    Insert {
        #[serde(default)]
        project_id: Option<ProjectId>,
    },
    Delete {
        row_id: RowId,
    },
    SetField {
        row_id: RowId,
        #[serde(flatten)]
        field: RowField,
    },
    ToggleVacancy {
        row_id: RowId,
    },
    Assign {
        row_id: RowId,
        slot: AssignmentSlot,
        #[serde(default)]
        employee_id: Option<EmployeeId>,
    },
    SearchEmployees {
        query: String,
    },
    SaveRow {
        row_id: RowId,
    },
    SaveAll,
    Summary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRow {
    pub row_id: RowId,
    pub code: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RosterOperationResult {
    Rows {
        rows: Vec<HeadcountRow>,
    },
    Moved {
        moved: bool,
    },
    Inserted {
        row_id: Option<RowId>,
    },
    Deleted {
        row_id: RowId,
    },
    FieldSet {
        row_id: RowId,
        applied: bool,
    },
    Vacancy {
        row_id: RowId,
        is_vacant: bool,
    },
    Candidates {
        candidates: Vec<Candidate>,
    },
    Saved {
        row_id: RowId,
        action: SyncAction,
    },
    SaveReport {
        created: Vec<RowId>,
        updated: Vec<RowId>,
        failed: Vec<FailedRow>,
    },
    Summary {
        summary: RosterSummary,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerSummary {
    pub employee_id: EmployeeId,
    pub name: String,
    pub direct_reports: usize,
}

/// Counts shown above the roster table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub project_id: Option<ProjectId>,
    pub group_sizes: BTreeMap<ProjectId, usize>,
    pub vacant: usize,
    /// Managers in order of first appearance.
    pub managers: Vec<ManagerSummary>,
}

/// The roster of the selected project together with the store it syncs to.
///
/// Local edits are synchronous and never touch the store. Store failures
/// are logged and leave the local rows as they were.
pub struct RosterSession<S: HeadcountStore> {
    store: S,
    roster_page_size: u32,
    active_project: Option<ProjectId>,
    roster: Roster,
    names: NameDirectory,
}

#[cfg(feature = "client")]
impl RosterSession<crate::client::RosterClient> {
    pub fn connect(config: crate::config::ApiConfig) -> Result<Self> {
        let roster_page_size = config.roster_page_size;
        let client = crate::client::RosterClient::new(config)?;
        Ok(Self::new(client, roster_page_size))
    }
}

impl<S: HeadcountStore> RosterSession<S> {
    pub fn new(store: S, roster_page_size: u32) -> Self {
        Self {
            store,
            roster_page_size,
            active_project: None,
            roster: Roster::new(),
            names: NameDirectory::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn active_project(&self) -> Option<ProjectId> {
        self.active_project
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn names(&self) -> &NameDirectory {
        &self.names
    }

    /// Active project rows passing `filter`; empty when no project is selected.
    pub fn visible_rows<'a>(
        &'a self,
        filter: &'a RowFilter,
    ) -> impl Iterator<Item = &'a HeadcountRow> + 'a {
        self.active_project
            .into_iter()
            .flat_map(move |project_id| self.roster.filtered(project_id, filter))
    }

    pub async fn execute(&mut self, operation: RosterOperation) -> Result<RosterOperationResult> {
        match operation {
            RosterOperation::SelectProject { project_id } => {
                self.select_project(project_id).await?;
                Ok(self.rows_result())
            }
            RosterOperation::Refresh => {
                self.refresh().await?;
                Ok(self.rows_result())
            }
            RosterOperation::Move { active, target } => Ok(RosterOperationResult::Moved {
                moved: self.move_row(active, target),
            }),
            RosterOperation::Reorder { active, target } => {
                match self.reorder(active, target).await {
                    Some(report) => Ok(save_report_result(report)),
                    None => Ok(RosterOperationResult::Moved { moved: false }),
                }
            }
            RosterOperation::Insert { project_id } => Ok(RosterOperationResult::Inserted {
                row_id: self.insert(project_id),
            }),
            RosterOperation::Delete { row_id } => {
                self.delete(row_id).await?;
                Ok(RosterOperationResult::Deleted { row_id })
            }
            RosterOperation::SetField { row_id, field } => Ok(RosterOperationResult::FieldSet {
                row_id,
                applied: self.roster.set_field(row_id, field),
            }),
            RosterOperation::ToggleVacancy { row_id } => {
                let is_vacant = self
                    .roster
                    .toggle_vacancy(row_id)
                    .ok_or_else(|| missing_row(row_id))?;
                Ok(RosterOperationResult::Vacancy { row_id, is_vacant })
            }
            RosterOperation::Assign {
                row_id,
                slot,
                employee_id,
            } => Ok(RosterOperationResult::FieldSet {
                row_id,
                applied: self.roster.set_field(row_id, slot.field(employee_id)),
            }),
            RosterOperation::SearchEmployees { query } => {
                let candidates = self.search_employees(&query).await?;
                Ok(RosterOperationResult::Candidates { candidates })
            }
            RosterOperation::SaveRow { row_id } => {
                let action = self.save_row(row_id).await?;
                Ok(RosterOperationResult::Saved { row_id, action })
            }
            RosterOperation::SaveAll => Ok(save_report_result(self.save_all().await)),
            RosterOperation::Summary => Ok(RosterOperationResult::Summary {
                summary: self.summary(),
            }),
        }
    }

    /// Switches to `project_id`, replacing every row with the fetched list.
    ///
    /// The previous project and rows stay in place if the fetch fails.
    pub async fn select_project(&mut self, project_id: ProjectId) -> Result<()> {
        let rows = self.fetch(project_id).await?;
        self.roster.replace(rows)?;
        self.active_project = Some(project_id);
        tracing::info!(
            project_id = %project_id,
            rows = self.roster.len(),
            "loaded project roster"
        );
        self.resolve_names().await;
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<()> {
        let Some(project_id) = self.active_project else {
            return Err(LibError::invalid_with_code(
                "no_project_selected",
                "Select a project first",
                anyhow!("refresh without an active project"),
            ));
        };
        self.select_project(project_id).await
    }

    /// Appends a blank row to `project_id`, or to the active project.
    pub fn insert(&mut self, project_id: Option<ProjectId>) -> Option<RowId> {
        self.roster.insert(project_id.or(self.active_project))
    }

    pub fn move_row(&mut self, active: RowId, target: MoveTarget) -> bool {
        self.roster.move_row(active, target)
    }

    /// Applies a finished drag locally. Cancelled drags change nothing.
    pub fn apply_drop(&mut self, outcome: DragOutcome) -> bool {
        match outcome.into_move() {
            Some((active, target)) => self.move_row(active, target),
            None => false,
        }
    }

    /// Applies a finished drag and saves the renumbered roster. `None` when
    /// the drag moved nothing and no request was sent.
    pub async fn drop_and_save(&mut self, outcome: DragOutcome) -> Option<SyncReport> {
        if !self.apply_drop(outcome) {
            return None;
        }
        Some(self.save_all().await)
    }

    /// Moves a row and saves the renumbered roster.
    pub async fn reorder(&mut self, active: RowId, target: MoveTarget) -> Option<SyncReport> {
        if !self.move_row(active, target) {
            return None;
        }
        Some(self.save_all().await)
    }

    pub fn summary(&self) -> RosterSummary {
        let rows = self.roster.rows();
        let mut seen = BTreeSet::new();
        let managers = rows
            .iter()
            .filter_map(|row| row.manager_employee_id)
            .filter(|employee_id| seen.insert(*employee_id))
            .map(|employee_id| ManagerSummary {
                employee_id,
                name: self.names.display_name(Some(employee_id)).to_string(),
                direct_reports: direct_reports(employee_id, rows).len(),
            })
            .collect();

        RosterSummary {
            project_id: self.active_project,
            group_sizes: group_sizes(rows),
            vacant: rows.iter().filter(|row| row.is_vacant).count(),
            managers,
        }
    }

    pub fn set_field(&mut self, row_id: RowId, field: RowField) -> bool {
        self.roster.set_field(row_id, field)
    }

    /// Deletes a saved row on the backend first, then locally. Draft rows
    /// are only removed locally.
    pub async fn delete(&mut self, row_id: RowId) -> Result<HeadcountRow> {
        if self.roster.get(row_id).is_none() {
            return Err(missing_row(row_id));
        }
        if let Some(headcount_id) = row_id.headcount_id() {
            self.store.delete_headcount(headcount_id).await.inspect_err(|err| {
                tracing::error!(
                    row_id = %row_id,
                    error = %err.source,
                    "headcount delete failed; keeping row"
                );
            })?;
        }
        self.roster.delete(row_id).ok_or_else(|| missing_row(row_id))
    }

    /// Searches employees by name and remembers every returned name.
    pub async fn search_employees(&mut self, query: &str) -> Result<Vec<Candidate>> {
        let employees = self.store.search_employees(query).await?;
        let candidates = employees
            .into_iter()
            .filter_map(Candidate::from_employee)
            .collect::<Vec<_>>();
        self.names.remember_all(&candidates);
        Ok(candidates)
    }

    /// Saves one row, then reloads the project so drafts pick up their ids.
    pub async fn save_row(&mut self, row_id: RowId) -> Result<SyncAction> {
        let row = self.roster.get(row_id).ok_or_else(|| missing_row(row_id))?;
        let action = sync::save_row(&self.store, row, self.roster.rows()).await?;
        self.refresh_after_save().await;
        Ok(action)
    }

    /// Saves every row. The project is reloaded only when every row saved;
    /// after a partial failure the local rows, drafts and unsaved edits
    /// included, stay as they are.
    pub async fn save_all(&mut self) -> SyncReport {
        let report = sync::save_all(&self.store, self.roster.rows()).await;
        if report.is_complete() {
            self.refresh_after_save().await;
        } else {
            tracing::warn!(
                failed = report.failed.len(),
                "roster save incomplete; keeping local rows"
            );
        }
        report
    }

    async fn refresh_after_save(&mut self) {
        if self.active_project.is_none() {
            return;
        }
        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "reload after save failed; showing local rows");
        }
    }

    async fn fetch(&self, project_id: ProjectId) -> Result<Vec<HeadcountRow>> {
        let records = self
            .store
            .list_headcounts(project_id, self.roster_page_size)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    project_id = %project_id,
                    error = %err.source,
                    "headcount fetch failed"
                );
            })?;
        Ok(resolve_manager_references(records))
    }

    /// Looks up names for assignees and managers not seen before.
    async fn resolve_names(&mut self) {
        let unknown = self
            .roster
            .rows()
            .iter()
            .flat_map(|row| [row.employee_id, row.manager_employee_id])
            .flatten()
            .filter(|id| !self.names.contains(*id))
            .collect::<BTreeSet<_>>();

        for employee_id in unknown {
            match self.store.get_employee(employee_id).await {
                Ok(employee) => {
                    if let Some(candidate) = Candidate::from_employee(employee) {
                        self.names.remember(&candidate);
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        employee_id = %employee_id,
                        error = %err.source,
                        "employee name lookup failed"
                    );
                }
            }
        }
    }

    fn rows_result(&self) -> RosterOperationResult {
        RosterOperationResult::Rows {
            rows: self.roster.rows().to_vec(),
        }
    }
}

fn save_report_result(report: SyncReport) -> RosterOperationResult {
    RosterOperationResult::SaveReport {
        created: report.created,
        updated: report.updated,
        failed: report
            .failed
            .into_iter()
            .map(|failure| FailedRow {
                row_id: failure.row_id,
                code: failure.error.code,
                message: failure.error.public,
            })
            .collect(),
    }
}

fn missing_row(row_id: RowId) -> LibError {
    LibError::not_found("Headcount row not found", anyhow!("row {} not in roster", row_id))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::drag::{DragController, DropZone, Point, PointerWithin, Rect};
    use crate::models::{Employee, HeadCountRecord, HeadcountId};
    use crate::sync::testing::MemoryStore;

    fn record(
        id: i64,
        project: i64,
        hc: u32,
        employee: Option<i64>,
        parent: Option<i64>,
    ) -> HeadCountRecord {
        HeadCountRecord {
            id,
            project_id: ProjectId(project),
            functional_area_id: None,
            section_id: None,
            sub_section_id: None,
            position_id: None,
            employee_id: employee.map(EmployeeId),
            hc_number: Some(hc),
            parent_id: parent.map(HeadcountId),
            is_vacant: false,
            recruiter_comment: None,
        }
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::with_records(vec![
            record(1, 7, 1, Some(100), None),
            record(2, 7, 2, Some(101), Some(1)),
            record(3, 7, 3, None, Some(1)),
            record(4, 8, 1, None, None),
        ]);
        *store.employees.lock().expect("lock") = vec![
            Employee {
                id: Some(EmployeeId(100)),
                full_name: "John Doe".to_string(),
            },
            Employee {
                id: Some(EmployeeId(101)),
                full_name: "Alice Johnson".to_string(),
            },
            Employee {
                id: Some(EmployeeId(102)),
                full_name: "Bob Brown".to_string(),
            },
        ];
        store
    }

    fn persisted(id: i64) -> RowId {
        RowId::Persisted(HeadcountId(id))
    }

    #[tokio::test]
    async fn selecting_project_loads_rows_and_names() {
        let mut session = RosterSession::new(seeded_store(), 100);
        session
            .select_project(ProjectId(7))
            .await
            .expect("select should succeed");

        assert_eq!(session.active_project(), Some(ProjectId(7)));
        assert_eq!(session.roster().len(), 3);
        let row = session.roster().get(persisted(3)).expect("row 3");
        assert_eq!(row.manager_employee_id, Some(EmployeeId(100)));
        assert_eq!(session.names().display_name(row.manager_employee_id), "John Doe");
        assert_eq!(session.names().display_name(Some(EmployeeId(101))), "Alice Johnson");
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_rows() {
        let store = seeded_store();
        let mut session = RosterSession::new(store.clone(), 100);
        session.select_project(ProjectId(7)).await.expect("select");

        *store.fail_listing.lock().expect("lock") = true;
        let err = session
            .select_project(ProjectId(8))
            .await
            .expect_err("fetch should fail");
        assert_eq!(err.code, "transport_error");
        assert_eq!(session.active_project(), Some(ProjectId(7)));
        assert_eq!(session.roster().len(), 3);
    }

    #[tokio::test]
    async fn delete_hits_store_before_local_removal() {
        let store = seeded_store();
        let mut session = RosterSession::new(store.clone(), 100);
        session.select_project(ProjectId(7)).await.expect("select");

        store.fail_id(2);
        assert!(session.delete(persisted(2)).await.is_err());
        assert_eq!(session.roster().len(), 3);

        let removed = session.delete(persisted(1)).await.expect("delete");
        assert_eq!(removed.hc_number, 1);
        assert_eq!(*store.deleted.lock().expect("lock"), vec![HeadcountId(1)]);
        let numbers = session
            .roster()
            .rows()
            .iter()
            .map(|row| row.hc_number)
            .collect::<Vec<_>>();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn draft_delete_is_local_only() {
        let store = seeded_store();
        let mut session = RosterSession::new(store.clone(), 100);
        session.select_project(ProjectId(7)).await.expect("select");

        let draft = session.insert(None).expect("active project");
        assert_eq!(session.roster().get(draft).map(|row| row.hc_number), Some(4));
        session.delete(draft).await.expect("delete draft");
        assert!(store.deleted.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn insert_without_project_does_nothing() {
        let mut session = RosterSession::new(MemoryStore::default(), 100);
        let result = session
            .execute(RosterOperation::Insert { project_id: None })
            .await
            .expect("insert");
        assert!(matches!(result, RosterOperationResult::Inserted { row_id: None }));
        assert!(session.roster().is_empty());
    }

    #[tokio::test]
    async fn partial_save_keeps_drafts_and_unsaved_edits() {
        let store = seeded_store();
        let mut session = RosterSession::new(store.clone(), 100);
        session.select_project(ProjectId(7)).await.expect("select");
        let draft = session.insert(None).expect("draft");
        assert!(session.set_field(persisted(2), RowField::Vacant(true)));
        store.fail_id(0);
        store.fail_id(2);

        let result = session
            .execute(RosterOperation::SaveAll)
            .await
            .expect("save all returns a report");
        let RosterOperationResult::SaveReport {
            created,
            updated,
            failed,
        } = result
        else {
            panic!("expected a save report");
        };
        assert!(created.is_empty());
        assert_eq!(updated.len(), 2);
        assert_eq!(failed.len(), 2);
        assert!(failed.iter().all(|row| row.code == "api_error"));
        assert!(failed.iter().any(|row| row.row_id == draft));
        assert!(failed.iter().any(|row| row.row_id == persisted(2)));

        assert_eq!(session.roster().len(), 4);
        assert!(session.roster().get(draft).is_some());
        assert_eq!(
            session.roster().get(persisted(2)).map(|row| row.is_vacant),
            Some(true)
        );

        let parent_of_three = store
            .updated
            .lock()
            .expect("lock")
            .iter()
            .find(|record| record.id == 3)
            .and_then(|record| record.parent_id);
        assert_eq!(parent_of_three, Some(HeadcountId(1)));
    }

    #[tokio::test]
    async fn complete_save_reloads_stored_rows() {
        let store = seeded_store();
        let mut session = RosterSession::new(store.clone(), 100);
        session.select_project(ProjectId(7)).await.expect("select");
        session.insert(None).expect("draft");

        let report = session.save_all().await;
        assert!(report.is_complete());
        assert_eq!(report.created.len(), 1);
        assert_eq!(session.roster().len(), 4);
        assert!(session.roster().rows().iter().all(|row| !row.id.is_draft()));
        assert_eq!(session.roster().rows()[3].hc_number, 4);
    }

    #[tokio::test]
    async fn visible_rows_follow_active_project_and_filter() {
        let store = seeded_store();
        store.records.lock().expect("lock")[1].section_id = Some(crate::models::SectionId(5));
        let mut session = RosterSession::new(store, 100);
        let filter = RowFilter {
            section_id: Some(crate::models::SectionId(5)),
            ..RowFilter::default()
        };
        assert_eq!(session.visible_rows(&filter).count(), 0);

        session.select_project(ProjectId(7)).await.expect("select");
        let visible = session
            .visible_rows(&filter)
            .map(|row| row.id)
            .collect::<Vec<_>>();
        assert_eq!(visible, vec![persisted(2)]);
        assert_eq!(session.visible_rows(&RowFilter::default()).count(), 3);
    }

    #[tokio::test]
    async fn search_remembers_candidate_names() {
        let mut session = RosterSession::new(seeded_store(), 100);
        let candidates = session.search_employees("bo").await.expect("search");
        assert_eq!(candidates, vec![Candidate::new(EmployeeId(102), "Bob Brown")]);
        assert_eq!(session.names().display_name(Some(EmployeeId(102))), "Bob Brown");
    }

    #[tokio::test]
    async fn drop_outcome_moves_rows() {
        let mut session = RosterSession::new(seeded_store(), 100);
        session.select_project(ProjectId(7)).await.expect("select");

        let zones = vec![DropZone {
            target: MoveTarget::Row {
                row_id: persisted(1),
            },
            rect: Rect::new(0.0, 0.0, 100.0, 20.0),
        }];
        let mut drag = DragController::new(PointerWithin);
        assert!(drag.pointer_down(persisted(3), Point::new(10.0, 60.0)));
        drag.pointer_move(Point::new(10.0, 10.0), &zones);
        let outcome = drag
            .pointer_up(Point::new(10.0, 10.0), &zones)
            .expect("drag finished");

        assert!(session.apply_drop(outcome));
        let order = session
            .roster()
            .rows()
            .iter()
            .map(|row| (row.id, row.hc_number))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![(persisted(3), 1), (persisted(1), 2), (persisted(2), 3)]
        );
    }

    fn stored_numbers(store: &MemoryStore) -> Vec<(i64, Option<u32>)> {
        let mut numbers = store
            .updated
            .lock()
            .expect("lock")
            .iter()
            .map(|record| (record.id, record.hc_number))
            .collect::<Vec<_>>();
        numbers.sort();
        numbers
    }

    #[tokio::test]
    async fn dropping_a_row_saves_the_renumbered_roster() {
        let store = seeded_store();
        let mut session = RosterSession::new(store.clone(), 100);
        session.select_project(ProjectId(7)).await.expect("select");

        let report = session
            .drop_and_save(DragOutcome::Dropped {
                active: persisted(3),
                target: MoveTarget::Row {
                    row_id: persisted(1),
                },
            })
            .await
            .expect("drop moved a row");
        assert!(report.is_complete());
        assert_eq!(report.updated.len(), 3);
        assert_eq!(
            stored_numbers(&store),
            vec![(1, Some(2)), (2, Some(3)), (3, Some(1))]
        );

        let order = session
            .roster()
            .rows()
            .iter()
            .map(|row| row.id)
            .collect::<Vec<_>>();
        assert_eq!(order, vec![persisted(3), persisted(1), persisted(2)]);
    }

    #[tokio::test]
    async fn failed_drop_save_keeps_local_order() {
        let store = seeded_store();
        let mut session = RosterSession::new(store.clone(), 100);
        session.select_project(ProjectId(7)).await.expect("select");
        store.fail_id(1);

        let result = session
            .execute(RosterOperation::Reorder {
                active: persisted(3),
                target: MoveTarget::Row {
                    row_id: persisted(1),
                },
            })
            .await
            .expect("reorder returns a report");
        let RosterOperationResult::SaveReport { failed, .. } = result else {
            panic!("expected a save report");
        };
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].row_id, persisted(1));

        let order = session
            .roster()
            .rows()
            .iter()
            .map(|row| (row.id, row.hc_number))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![(persisted(3), 1), (persisted(1), 2), (persisted(2), 3)]
        );
    }

    #[tokio::test]
    async fn cancelled_or_noop_drops_send_nothing() {
        let store = seeded_store();
        let mut session = RosterSession::new(store.clone(), 100);
        session.select_project(ProjectId(7)).await.expect("select");

        let cancelled = session
            .drop_and_save(DragOutcome::Cancelled {
                active: persisted(2),
            })
            .await;
        assert!(cancelled.is_none());

        let result = session
            .execute(RosterOperation::Reorder {
                active: persisted(2),
                target: MoveTarget::Row {
                    row_id: persisted(2),
                },
            })
            .await
            .expect("reorder");
        assert!(matches!(result, RosterOperationResult::Moved { moved: false }));
        assert!(store.updated.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn summary_counts_groups_vacancies_and_reports() {
        let mut session = RosterSession::new(seeded_store(), 100);
        session.select_project(ProjectId(7)).await.expect("select");
        session
            .execute(RosterOperation::ToggleVacancy {
                row_id: persisted(3),
            })
            .await
            .expect("toggle");

        let RosterOperationResult::Summary { summary } = session
            .execute(RosterOperation::Summary)
            .await
            .expect("summary")
        else {
            panic!("expected a summary");
        };
        assert_eq!(summary.project_id, Some(ProjectId(7)));
        assert_eq!(summary.group_sizes.get(&ProjectId(7)), Some(&3));
        assert_eq!(summary.vacant, 1);
        assert_eq!(
            summary.managers,
            vec![ManagerSummary {
                employee_id: EmployeeId(100),
                name: "John Doe".to_string(),
                direct_reports: 2,
            }]
        );
    }

    #[test]
    fn operations_deserialize_from_tagged_json() {
        let operation: RosterOperation = serde_json::from_value(json!({
            "operation": "set_field",
            "row_id": 12,
            "field": "hcNumber",
            "value": 4
        }))
        .expect("set_field should parse");
        assert!(matches!(
            operation,
            RosterOperation::SetField {
                row_id: RowId::Persisted(HeadcountId(12)),
                field: RowField::HcNumber(4),
            }
        ));

        let operation: RosterOperation = serde_json::from_value(json!({
            "operation": "move",
            "active": 1,
            "target": {"kind": "empty_group", "project_id": 9}
        }))
        .expect("move should parse");
        assert!(matches!(
            operation,
            RosterOperation::Move {
                target: MoveTarget::EmptyGroup {
                    project_id: ProjectId(9)
                },
                ..
            }
        ));
    }
}
