//! Turns backend event records into calendar display events.
//!
//! Everything here is pure. Missing nested references (group, teacher, room,
//! subject) render as empty strings; only a missing anchor date or inverted
//! times make a record unformattable.

use chrono::NaiveDate;

use super::{
    error::FormatError,
    schedule_time::{weekday_date, weekday_dates},
};
use crate::models::{
    display_model::{CalendarDisplayEvent, DisplayProps},
    event_model::ScheduledEventRecord,
    DateRange,
};

pub const DEFAULT_TOPIC: &str = "Lesson";

pub const DEFAULT_SUBJECT_CLASS: &str = "subject-default";

pub const SUBJECT_CLASSES: [&str; 9] = [
    "subject-math",
    "subject-physics",
    "subject-chemistry",
    "subject-biology",
    "subject-history",
    "subject-geography",
    "subject-literature",
    "subject-language",
    "subject-art",
];

/// String hash over UTF-16 code units with 32-bit shift semantics:
/// `hash = unit + ((hash << 5) - hash)`, where the shift truncates `hash` to
/// a signed 32-bit integer and the subtraction does not.
pub fn subject_hash(name: &str) -> i64 {
    name.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(unit) + (shifted - hash)
    })
}

/// Color class of a subject. Stable across runs.
pub fn subject_class(name: &str) -> &'static str {
    if name.is_empty() {
        return DEFAULT_SUBJECT_CLASS;
    }
    let index = subject_hash(name).unsigned_abs() % SUBJECT_CLASSES.len() as u64;
    SUBJECT_CLASSES[index as usize]
}

/// Topic, group and room on separate lines.
pub fn event_title(record: &ScheduledEventRecord) -> String {
    let topic = record
        .topic
        .as_deref()
        .filter(|topic| !topic.trim().is_empty())
        .unwrap_or(DEFAULT_TOPIC);
    format!(
        "{}\n{}\n{}",
        topic,
        record.group_name().unwrap_or_default(),
        record.room_name().unwrap_or_default()
    )
}

/// The date part of the display timestamps.
///
/// `specific_date` wins. A weekly event is placed in the week of `week_of`
/// when one is given; otherwise its weekday number is used as is.
pub fn anchor_date(
    record: &ScheduledEventRecord,
    week_of: Option<NaiveDate>,
) -> Result<String, FormatError> {
    if let Some(date) = record.specific_date.as_deref().filter(|d| !d.is_empty()) {
        return Ok(date.to_owned());
    }
    match (record.weekday, week_of) {
        (Some(weekday), Some(week_of)) => {
            Ok(weekday_date(week_of, weekday)?.format("%Y-%m-%d").to_string())
        }
        (Some(weekday), None) => Ok(weekday.to_string()),
        (None, _) => Err(FormatError::MissingAnchor { id: record.id }),
    }
}

pub fn format_event(record: &ScheduledEventRecord) -> Result<CalendarDisplayEvent, FormatError> {
    format_event_in_week(record, None)
}

pub fn format_event_in_week(
    record: &ScheduledEventRecord,
    week_of: Option<NaiveDate>,
) -> Result<CalendarDisplayEvent, FormatError> {
    let anchor = anchor_date(record, week_of)?;
    // Zero-padded times compare correctly as strings
    if record.start_time >= record.end_time {
        return Err(FormatError::InvertedTimes {
            id: record.id,
            start: record.start_time.clone(),
            end: record.end_time.clone(),
        });
    }

    let subject_name = record.subject_name().unwrap_or_default();
    Ok(CalendarDisplayEvent {
        id: record.id,
        title: event_title(record),
        start: format!("{}T{}", anchor, record.start_time),
        end: format!("{}T{}", anchor, record.end_time),
        class_name: subject_class(subject_name).to_owned(),
        extended_props: DisplayProps {
            original_event: record.clone(),
            group_name: record.group_name().unwrap_or_default().to_owned(),
            teacher_name: record.teacher_name().unwrap_or_default().to_owned(),
            room_name: record.room_name().unwrap_or_default().to_owned(),
            subject_name: subject_name.to_owned(),
            duration: record.duration_minutes,
            has_conflicts: false,
        },
    })
}

/// Formats a whole batch for `range`. One malformed record fails the batch.
///
/// A dated record yields one event. A weekly record yields one event per
/// occurrence of its weekday in `range`, all sharing the record id.
pub fn format_events(
    records: &[ScheduledEventRecord],
    range: &DateRange,
) -> Result<Vec<CalendarDisplayEvent>, FormatError> {
    let mut events = Vec::with_capacity(records.len());
    for record in records {
        let dated = record.specific_date.as_deref().is_some_and(|d| !d.is_empty());
        match record.weekday {
            Some(weekday) if !dated => {
                let dates = weekday_dates(range, weekday)?;
                if dates.is_empty() {
                    // Validates the times of a lesson that does not occur in range
                    format_event(record)?;
                }
                for date in dates {
                    events.push(format_event_in_week(record, Some(date))?);
                }
            }
            _ => events.push(format_event_in_week(record, Some(range.start))?),
        }
    }
    Ok(events)
}

#[cfg(test)]
#[path = "tests/formatter_tests.rs"]
mod tests;
