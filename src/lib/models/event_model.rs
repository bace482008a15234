//! Scheduled event records as served by `scheduled-events/`.
//!
//! Nested references are optional because the backend may omit or null them;
//! every struct keeps the fields it does not model in `extra` so an update can
//! send the record back untouched apart from the edited fields.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Id;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct GroupRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct RoomRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct SubjectRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The backend renders a teacher's user account as a display string.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct TeacherRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct CourseRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct GroupCourseRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One lesson slot. Exactly one of `specific_date` (one-off) and `weekday`
/// (weekly, 0 = Monday) anchors it on the calendar.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct ScheduledEventRecord {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_course: Option<GroupCourseRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomRef>,
    /// Ids of every teacher assigned to the slot; the backend's `teacher`
    /// filter matches against this list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teachers: Option<Vec<Id>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScheduledEventRecord {
    /// Assigned teachers plus the teacher of the group course.
    pub fn teacher_ids(&self) -> impl Iterator<Item = Id> + '_ {
        let group_course_teacher = self
            .group_course
            .as_ref()
            .and_then(|gc| gc.teacher.as_ref())
            .and_then(|t| t.id);
        self.teachers
            .iter()
            .flatten()
            .copied()
            .chain(group_course_teacher)
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group_course
            .as_ref()?
            .group
            .as_ref()?
            .name
            .as_deref()
    }

    pub fn teacher_name(&self) -> Option<&str> {
        self.group_course
            .as_ref()?
            .teacher
            .as_ref()?
            .user
            .as_deref()
    }

    pub fn subject_name(&self) -> Option<&str> {
        self.group_course
            .as_ref()?
            .course
            .as_ref()?
            .subject
            .as_ref()?
            .name
            .as_deref()
    }

    pub fn room_name(&self) -> Option<&str> {
        self.room.as_ref()?.name.as_deref()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Weekly,
    Single,
}

/// Body of `POST scheduled-events/`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct EventDraft {
    pub schedule_plan: Id,
    pub group: Id,
    pub group_course: Id,
    #[serde(default)]
    pub teachers: Vec<Id>,
    pub room: Id,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_date: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub topic: String,
}
