//! Reference lists (teachers, groups, rooms, ...) and conflict reports.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{event_model::GroupCourseRef, Id};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Teacher {
    pub id: Id,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Group {
    pub id: Id,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: Id,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Room {
    pub id: Id,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Subsidiary {
    pub id: Id,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SchedulePlan {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `group-courses/` serves the same shape that is nested in events.
pub type GroupCourse = GroupCourseRef;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConflictType {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored conflict. `status` is one of detected, acknowledged,
/// in_progress, resolved, ignored.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Conflict {
    pub id: Id,
    #[serde(default)]
    pub conflict_type: Option<ConflictType>,
    #[serde(default)]
    pub scheduled_event_id: Option<Id>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Conflict {
    pub fn is_resolved(&self) -> bool {
        matches!(self.status.as_str(), "resolved" | "ignored")
    }
}

/// Response of `POST schedule-plans/{id}/check_conflicts/`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConflictCheckReport {
    pub conflicts_found: u32,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConflictResolution {
    pub conflict_id: Id,
    #[serde(default)]
    pub solutions: Value,
    #[serde(default)]
    pub auto_resolved: bool,
}

/// Response of `POST schedule-plans/{id}/resolve_conflicts/`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConflictResolutionReport {
    #[serde(default)]
    pub results: Vec<ConflictResolution>,
}

impl ConflictResolutionReport {
    pub fn auto_resolved(&self) -> usize {
        self.results.iter().filter(|r| r.auto_resolved).count()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConflictSummary {
    pub id: Id,
    #[serde(rename = "type")]
    pub conflict_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub scheduled_event_id: Option<Id>,
}

/// Response of `POST check_conflicts/`, which checks the active plan.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ActivePlanConflicts {
    pub plan_id: Id,
    pub plan_name: String,
    #[serde(default)]
    pub conflicts: Vec<ConflictSummary>,
    #[serde(default)]
    pub total_conflicts: u32,
}

/// Everything the filter checkboxes next to the calendar are built from.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct FilterOptions {
    pub groups: Vec<Group>,
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub rooms: Vec<Room>,
}
