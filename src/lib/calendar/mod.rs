//! Calendar side of the sync: formatting records for display and keeping the
//! widget and the backend in step.

mod error;
pub mod formatter;
pub mod schedule_time;
pub mod sync_controller;
pub mod widget;

pub use error::{FormatError, SyncError};
pub use sync_controller::{CalendarSyncController, EditOutcome, RangeOutcome, RangeState};
pub use widget::{CalendarCallbacks, CalendarWidget, EditorRequest, EventEditor};
