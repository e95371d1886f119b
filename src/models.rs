use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{LibError, Result};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Server-assigned headcount id.
    HeadcountId
);
entity_id!(
    /// Group key of the roster.
    ProjectId
);
entity_id!(SectionId);
entity_id!(SubSectionId);
entity_id!(PositionId);
entity_id!(FunctionalAreaId);
entity_id!(FormatId);
entity_id!(StoreId);
entity_id!(EmployeeId);

/// Identity of a roster row.
///
/// Rows fetched from the backend carry their headcount id. Rows inserted
/// locally get a draft id until the backend assigns one on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Persisted(HeadcountId),
    Draft(Uuid),
}

impl RowId {
    pub fn new_draft() -> Self {
        Self::Draft(Uuid::new_v4())
    }

    pub const fn headcount_id(self) -> Option<HeadcountId> {
        match self {
            RowId::Persisted(id) => Some(id),
            RowId::Draft(_) => None,
        }
    }

    pub const fn is_draft(self) -> bool {
        matches!(self, RowId::Draft(_))
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Persisted(id) => write!(f, "{}", id),
            RowId::Draft(id) => write!(f, "draft:{}", id),
        }
    }
}

impl From<HeadcountId> for RowId {
    fn from(value: HeadcountId) -> Self {
        Self::Persisted(value)
    }
}

/// One slot of the org chart, owned by the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadcountRow {
    pub id: RowId,
    pub project_id: ProjectId,
    pub functional_area_id: Option<FunctionalAreaId>,
    pub section_id: Option<SectionId>,
    pub sub_section_id: Option<SubSectionId>,
    pub position_id: Option<PositionId>,
    pub employee_id: Option<EmployeeId>,
    /// Employee id of the manager; the manager is another row's assignee.
    pub manager_employee_id: Option<EmployeeId>,
    pub is_vacant: bool,
    pub hc_number: u32,
    pub recruiter_comment: Option<String>,
}

impl HeadcountRow {
    pub fn blank(id: RowId, project_id: ProjectId, hc_number: u32) -> Self {
        Self {
            id,
            project_id,
            functional_area_id: None,
            section_id: None,
            sub_section_id: None,
            position_id: None,
            employee_id: None,
            manager_employee_id: None,
            is_vacant: false,
            hc_number,
            recruiter_comment: None,
        }
    }
}

/// A single editable field of a row together with its new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum RowField {
    FunctionalArea(Option<FunctionalAreaId>),
    Section(Option<SectionId>),
    SubSection(Option<SubSectionId>),
    Position(Option<PositionId>),
    Employee(Option<EmployeeId>),
    Manager(Option<EmployeeId>),
    Vacant(bool),
    HcNumber(u32),
    RecruiterComment(Option<String>),
}

impl RowField {
    pub fn apply(self, row: &mut HeadcountRow) {
        match self {
            RowField::FunctionalArea(value) => row.functional_area_id = value,
            RowField::Section(value) => row.section_id = value,
            RowField::SubSection(value) => row.sub_section_id = value,
            RowField::Position(value) => row.position_id = value,
            RowField::Employee(value) => row.employee_id = value,
            RowField::Manager(value) => row.manager_employee_id = value,
            RowField::Vacant(value) => row.is_vacant = value,
            RowField::HcNumber(value) => row.hc_number = value,
            RowField::RecruiterComment(value) => {
                row.recruiter_comment = value
                    .map(|comment| comment.trim().to_string())
                    .filter(|comment| !comment.is_empty());
            }
        }
    }
}

/// Column filters over the roster. Unset filters match every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFilter {
    pub functional_area_id: Option<FunctionalAreaId>,
    pub section_id: Option<SectionId>,
    pub sub_section_id: Option<SubSectionId>,
}

impl RowFilter {
    pub fn matches(&self, row: &HeadcountRow) -> bool {
        self.functional_area_id
            .is_none_or(|id| row.functional_area_id == Some(id))
            && self.section_id.is_none_or(|id| row.section_id == Some(id))
            && self
                .sub_section_id
                .is_none_or(|id| row.sub_section_id == Some(id))
    }
}

/// Headcount record as the backend stores it.
///
/// Absent optional fields serialize as explicit `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HeadCountRecord {
    /// `0` for records the backend has not assigned an id yet.
    #[serde(default)]
    pub id: i64,
    pub project_id: ProjectId,
    pub functional_area_id: Option<FunctionalAreaId>,
    pub section_id: Option<SectionId>,
    pub sub_section_id: Option<SubSectionId>,
    pub position_id: Option<PositionId>,
    pub employee_id: Option<EmployeeId>,
    #[serde(rename = "HCNumber")]
    pub hc_number: Option<u32>,
    /// Headcount id of the manager's row.
    pub parent_id: Option<HeadcountId>,
    #[serde(default)]
    pub is_vacant: bool,
    pub recruiter_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProjectId>,
    pub project_code: String,
    pub project_name: String,
    #[serde(default)]
    pub is_store: bool,
    #[serde(default)]
    pub is_head_office: bool,
    pub functional_area_id: Option<FunctionalAreaId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SectionId>,
    pub name: String,
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SubSectionId>,
    pub name: String,
    pub section_id: Option<SectionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PositionId>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionalArea {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FunctionalAreaId>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Format {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FormatId>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Store {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StoreId>,
    pub project_id: Option<ProjectId>,
    pub functional_area_id: Option<FunctionalAreaId>,
    pub format_id: Option<FormatId>,
    pub head_count_number: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub is_success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// An entity exposed by the backend under `/api/{PATH}`.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    const PATH: &'static str;
    /// Key holding the items inside a list envelope.
    const COLLECTION_KEY: &'static str;
    /// Key holding the total item count inside a list envelope.
    const TOTAL_KEY: &'static str;

    fn resource_id(&self) -> Option<i64>;
}

macro_rules! resource {
    ($ty:ty, $path:literal, $collection:literal, $total:literal) => {
        impl Resource for $ty {
            const PATH: &'static str = $path;
            const COLLECTION_KEY: &'static str = $collection;
            const TOTAL_KEY: &'static str = $total;

            fn resource_id(&self) -> Option<i64> {
                self.id.map(|id| id.0)
            }
        }
    };
}

resource!(Project, "Project", "Projects", "TotalProjectCount");
resource!(Section, "Section", "Sections", "TotalSectionCount");
resource!(SubSection, "SubSection", "SubSections", "TotalSubSectionCount");
resource!(Position, "Position", "Positions", "TotalPositionCount");
resource!(FunctionalArea, "FunctionalArea", "FunctionalAreas", "TotalCount");
resource!(Format, "Format", "Formats", "TotalFormatCount");
resource!(Store, "Store", "Stores", "TotalStoreCount");
resource!(Employee, "Employee", "Employees", "TotalEmployeeCount");

impl Resource for HeadCountRecord {
    const PATH: &'static str = "HeadCount";
    const COLLECTION_KEY: &'static str = "HeadCounts";
    const TOTAL_KEY: &'static str = "TotalHeadCountCount";

    fn resource_id(&self) -> Option<i64> {
        (self.id > 0).then_some(self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((key.into(), value.to_string()));
        self
    }

    pub fn pagination(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(10).clamp(1, 200);
        (page, limit)
    }

    /// Query string pairs in the backend's naming.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let (page, limit) = self.pagination();
        let mut pairs = Vec::with_capacity(self.filters.len() + 2);
        pairs.push(("Page".to_string(), page.to_string()));
        pairs.push(("ShowMore.Take".to_string(), limit.to_string()));
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

/// Decodes a list envelope into a page of `R`.
///
/// The backend returns either the envelope object itself or a one-element
/// array wrapping it.
pub fn decode_page<R: Resource>(body: Value, page: u32, limit: u32) -> Result<Paged<R>> {
    let envelope = match body {
        Value::Array(mut entries) => {
            if entries.is_empty() {
                return Ok(Paged {
                    page,
                    limit,
                    total: 0,
                    items: Vec::new(),
                });
            }
            entries.swap_remove(0)
        }
        other => other,
    };

    let Value::Object(mut envelope) = envelope else {
        return Err(LibError::decode(
            "Unexpected list response shape",
            anyhow!("{} list envelope is not an object", R::PATH),
        ));
    };

    let items: Vec<R> = match envelope.remove(R::COLLECTION_KEY) {
        Some(Value::Null) | None => Vec::new(),
        Some(raw) => serde_json::from_value(raw).map_err(|err| {
            LibError::decode(
                "Unexpected list response shape",
                anyhow!("failed to decode {}: {}", R::COLLECTION_KEY, err),
            )
        })?,
    };

    let total = envelope
        .get(R::TOTAL_KEY)
        .or_else(|| envelope.get("TotalCount"))
        .and_then(Value::as_u64)
        .unwrap_or(items.len() as u64);

    Ok(Paged {
        page,
        limit,
        total,
        items,
    })
}
