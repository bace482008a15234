//! Seams between the sync controller and the UI around it.

use chrono::NaiveDateTime;

use super::error::SyncError;
use crate::models::{
    display_model::CalendarDisplayEvent, event_model::ScheduledEventRecord, DateRange, Id,
};

/// A trait, necessary for every calendar view the controller feeds.
pub trait CalendarWidget {
    /// Replaces what is shown for `range`.
    fn render_events(&self, range: &DateRange, events: &[CalendarDisplayEvent]);

    /// The fetch for `range` failed; whatever was shown before stays.
    fn render_error(&self, range: &DateRange, error: &SyncError);

    /// Undo the drag or resize the user just made on `event_id`.
    fn revert(&self, event_id: Id);
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorRequest {
    Create {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    Edit(Box<ScheduledEventRecord>),
}

/// A trait for the form that creates and edits events.
pub trait EventEditor {
    fn open(&self, request: EditorRequest);
}

/// Callbacks a calendar widget adapter invokes on user interaction.
#[allow(async_fn_in_trait)]
pub trait CalendarCallbacks {
    async fn on_range_requested(&self, range: DateRange);

    async fn on_item_moved(&self, event: &CalendarDisplayEvent, new_start: NaiveDateTime);

    async fn on_item_resized(
        &self,
        event: &CalendarDisplayEvent,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    );

    fn on_item_selected(&self, event: &CalendarDisplayEvent);

    fn on_range_selected(&self, start: NaiveDateTime, end: NaiveDateTime);
}
