//! Events in the shape the calendar widget renders.
//!
//! Recomputed on every fetch and never persisted.
use serde::{Deserialize, Serialize};

use super::{event_model::ScheduledEventRecord, Id};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDisplayEvent {
    pub id: Id,
    pub title: String,
    /// Local wall-clock timestamp without offset, e.g. `2024-05-01T09:00`.
    pub start: String,
    pub end: String,
    pub class_name: String,
    pub extended_props: DisplayProps,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayProps {
    pub original_event: ScheduledEventRecord,
    pub group_name: String,
    pub teacher_name: String,
    pub room_name: String,
    pub subject_name: String,
    pub duration: Option<u32>,
    pub has_conflicts: bool,
}

impl CalendarDisplayEvent {
    pub fn record(&self) -> &ScheduledEventRecord {
        &self.extended_props.original_event
    }
}
