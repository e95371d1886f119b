pub mod algorithms;
#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod drag;
pub mod error;
pub mod invariants;
pub mod models;
pub mod operations;
pub mod picker;
pub mod roster;
pub mod sync;

pub mod prelude {
    pub use crate::algorithms::{
        direct_reports, group_sizes, parent_headcount_for, resolve_manager_references,
    };
    #[cfg(feature = "client")]
    pub use crate::client::RosterClient;
    pub use crate::config::ApiConfig;
    pub use crate::drag::{
        ClosestCenter, CollisionPolicy, DragController, DragKey, DragOutcome, DragState, DropZone,
        Point, PointerWithin, Rect,
    };
    pub use crate::error::{ErrorKind, LibError, Result};
    pub use crate::invariants::{NumberingViolation, numbering_violations};
    pub use crate::models::{
        Employee, EmployeeId, HeadCountRecord, HeadcountId, HeadcountRow, ListQuery, Paged,
        ProjectId, Resource, RowField, RowFilter, RowId,
    };
    pub use crate::operations::{
        ManagerSummary, RosterOperation, RosterOperationResult, RosterSession, RosterSummary,
    };
    pub use crate::picker::{AssignmentPicker, AssignmentSlot, Candidate, NameDirectory};
    pub use crate::roster::{MoveTarget, Roster};
    pub use crate::sync::{HeadcountStore, SyncAction, SyncReport, save_all, save_row};
}
