use thiserror::Error;

use crate::{api::ApiError, models::Id};

/// A record that cannot be placed on the calendar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("event {id} has neither a specific date nor a weekday")]
    MissingAnchor { id: Id },

    #[error("event {id} starts at {start} but ends at {end}")]
    InvertedTimes { id: Id, start: String, end: String },

    #[error("invalid time of day: {value:?}")]
    InvalidTime { value: String },

    #[error("invalid weekday: {value}")]
    InvalidWeekday { value: u8 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Format(#[from] FormatError),

    /// The edited event would end on a later day than it starts
    #[error("event {id} would span midnight")]
    SpansMidnight { id: Id },
}
