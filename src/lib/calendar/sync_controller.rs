//! Mediates between calendar widget callbacks and the backend.
//!
//! Fetches run per visible range through `Idle -> Loading -> Loaded | LoadFailed`.
//! Every fetch is tagged with a generation number; a response that completes
//! after a newer fetch was issued is dropped, so the last issued range wins.
//! Drags and resizes are already shown by the widget when they reach the
//! controller, a failed update asks the widget to revert and tells the user.

use std::{
    cell::{Cell, RefCell},
    sync::Arc,
};

use chrono::NaiveDateTime;
use log::{debug, error, info};

use super::{
    error::SyncError,
    formatter::format_events,
    schedule_time,
    widget::{CalendarCallbacks, CalendarWidget, EditorRequest, EventEditor},
};
use crate::{
    api::ScheduleApi,
    models::{
        display_model::CalendarDisplayEvent,
        event_model::{EventDraft, ScheduledEventRecord},
        reference_model::{ActivePlanConflicts, ConflictCheckReport, ConflictResolutionReport},
        DateRange, EventQuery, Facet, FilterState, Id,
    },
    notify::Level,
    session::Session,
};

pub const LOAD_FAILED: &str = "Failed to load events";
pub const MOVE_FAILED: &str = "Failed to move event";
pub const RESIZE_FAILED: &str = "Failed to change event duration";
pub const CREATE_FAILED: &str = "Failed to create event";
pub const DELETE_FAILED: &str = "Failed to delete event";
pub const CONFLICT_CHECK_FAILED: &str = "Failed to check conflicts";
pub const CONFLICT_RESOLVE_FAILED: &str = "Failed to resolve conflicts";
pub const NO_CONFLICTS: &str = "No conflicts found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeState {
    #[default]
    Idle,
    Loading(DateRange),
    Loaded(DateRange),
    LoadFailed(DateRange),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeOutcome {
    /// The widget received this many events
    Loaded(usize),
    /// The widget received the error
    Failed(SyncError),
    /// A newer range was requested meanwhile; nothing was delivered
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Committed(ScheduledEventRecord),
    Reverted(SyncError),
}

pub struct CalendarSyncController<A, W, E> {
    api: A,
    widget: W,
    editor: E,
    session: Arc<Session>,
    plan: Option<Id>,
    state: Cell<RangeState>,
    current_range: Cell<Option<DateRange>>,
    generation: Cell<u64>,
    records: RefCell<Vec<ScheduledEventRecord>>,
}

impl<A: ScheduleApi, W: CalendarWidget, E: EventEditor> CalendarSyncController<A, W, E> {
    pub fn new(api: A, widget: W, editor: E, session: Arc<Session>) -> Self {
        Self {
            api,
            widget,
            editor,
            session,
            plan: None,
            state: Cell::new(RangeState::Idle),
            current_range: Cell::new(None),
            generation: Cell::new(0),
            records: RefCell::new(Vec::new()),
        }
    }

    /// Restricts every fetch to one schedule plan.
    pub fn with_plan(mut self, plan: Option<Id>) -> Self {
        self.plan = plan;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn state(&self) -> RangeState {
        self.state.get()
    }

    pub fn current_range(&self) -> Option<DateRange> {
        self.current_range.get()
    }

    /// Records behind the last successfully loaded range.
    pub fn records(&self) -> Vec<ScheduledEventRecord> {
        self.records.borrow().clone()
    }

    fn notify(&self, message: &str, level: Level) {
        self.session.notifier().notify(message, level);
    }

    fn query_for(&self, range: &DateRange, filters: &FilterState) -> EventQuery {
        let mut query = EventQuery::for_range(range);
        query.plan = self.plan;
        filters.apply_to(&mut query);
        query
    }

    async fn load(
        &self,
        range: DateRange,
        filters: &FilterState,
    ) -> Result<(Vec<ScheduledEventRecord>, Vec<CalendarDisplayEvent>), SyncError> {
        let query = self.query_for(&range, filters);
        let records = self
            .api
            .list_events(&query)
            .await?
            .into_iter()
            .filter(|record| filters.matches(record))
            .collect::<Vec<_>>();
        let events = format_events(&records, &range)?;
        Ok((records, events))
    }

    /// Fetches, formats and delivers the events of `range` with the active filters.
    pub async fn request_range(&self, range: DateRange) -> RangeOutcome {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.current_range.set(Some(range));
        self.state.set(RangeState::Loading(range));
        info!("Loading events for {}", range);

        let filters = self.session.filters();
        let result = self.load(range, &filters).await;

        if self.generation.get() != generation {
            debug!("Dropping stale response for {}", range);
            return RangeOutcome::Superseded;
        }

        match result {
            Ok((records, events)) => {
                info!("Loaded {} event(s) for {}", events.len(), range);
                *self.records.borrow_mut() = records;
                self.state.set(RangeState::Loaded(range));
                self.widget.render_events(&range, &events);
                RangeOutcome::Loaded(events.len())
            }
            Err(e) => {
                error!("Loading events for {} failed: {}", range, e);
                self.state.set(RangeState::LoadFailed(range));
                self.widget.render_error(&range, &e);
                self.notify(LOAD_FAILED, Level::Error);
                RangeOutcome::Failed(e)
            }
        }
    }

    /// Re-requests the current range, if there is one.
    pub async fn refresh(&self) -> Option<RangeOutcome> {
        let range = self.current_range.get()?;
        Some(self.request_range(range).await)
    }

    /// Checks or unchecks a filter and refreshes when the selection changed.
    pub async fn set_filter(&self, facet: Facet, id: Id, selected: bool) -> Option<RangeOutcome> {
        if !self.session.set_filter(facet, id, selected) {
            return None;
        }
        debug!("Filter {:?} {} set to {}", facet, id, selected);
        self.refresh().await
    }

    fn finish_edit(
        &self,
        event_id: Id,
        result: Result<ScheduledEventRecord, SyncError>,
        failure_message: &str,
    ) -> EditOutcome {
        match result {
            Ok(saved) => {
                info!("Saved event {}", event_id);
                if let Some(stored) = self
                    .records
                    .borrow_mut()
                    .iter_mut()
                    .find(|record| record.id == event_id)
                {
                    *stored = saved.clone();
                }
                EditOutcome::Committed(saved)
            }
            Err(e) => {
                error!("Saving event {} failed: {}", event_id, e);
                self.widget.revert(event_id);
                self.notify(failure_message, Level::Error);
                EditOutcome::Reverted(e)
            }
        }
    }

    async fn save(
        &self,
        updated: Result<ScheduledEventRecord, SyncError>,
    ) -> Result<ScheduledEventRecord, SyncError> {
        let updated = updated?;
        Ok(self.api.update_event(updated.id, &updated).await?)
    }

    /// The widget already shows `event` at `new_start`; persists it keeping the duration.
    pub async fn move_event(
        &self,
        event: &CalendarDisplayEvent,
        new_start: NaiveDateTime,
    ) -> EditOutcome {
        let record = event.record();
        info!("Moving event {} to {}", record.id, new_start);
        let result = self.save(schedule_time::moved(record, new_start)).await;
        self.finish_edit(record.id, result, MOVE_FAILED)
    }

    /// The widget already shows `event` at `new_start..new_end`; persists the new bounds.
    pub async fn resize_event(
        &self,
        event: &CalendarDisplayEvent,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) -> EditOutcome {
        let record = event.record();
        info!("Resizing event {} to {}..{}", record.id, new_start, new_end);
        let result = self
            .save(schedule_time::resized(record, new_start, new_end))
            .await;
        self.finish_edit(record.id, result, RESIZE_FAILED)
    }

    pub fn select_range(&self, start: NaiveDateTime, end: NaiveDateTime) {
        self.editor.open(EditorRequest::Create { start, end });
    }

    pub fn select_event(&self, event: &CalendarDisplayEvent) {
        self.editor.open(EditorRequest::Edit(Box::new(event.record().clone())));
    }

    pub async fn create_event(
        &self,
        draft: &EventDraft,
    ) -> Result<ScheduledEventRecord, SyncError> {
        match self.api.create_event(draft).await {
            Ok(created) => {
                info!("Created event {}", created.id);
                self.notify("Event created", Level::Success);
                self.refresh().await;
                Ok(created)
            }
            Err(e) => {
                error!("Creating event failed: {}", e);
                self.notify(CREATE_FAILED, Level::Error);
                Err(e.into())
            }
        }
    }

    pub async fn delete_event(&self, id: Id) -> Result<(), SyncError> {
        match self.api.delete_event(id).await {
            Ok(()) => {
                info!("Deleted event {}", id);
                self.records.borrow_mut().retain(|record| record.id != id);
                self.notify("Event deleted", Level::Success);
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                error!("Deleting event {} failed: {}", id, e);
                self.notify(DELETE_FAILED, Level::Error);
                Err(e.into())
            }
        }
    }

    fn report_conflicts(&self, count: usize) {
        if count > 0 {
            self.notify(&format!("Conflicts found: {}", count), Level::Warning);
        } else {
            self.notify(NO_CONFLICTS, Level::Success);
        }
    }

    pub async fn check_conflicts(&self, plan_id: Id) -> Result<ConflictCheckReport, SyncError> {
        match self.api.check_conflicts(plan_id).await {
            Ok(report) => {
                info!(
                    "Plan {}: {} new conflict(s), {} open",
                    plan_id,
                    report.conflicts_found,
                    report.conflicts.len()
                );
                self.report_conflicts(report.conflicts.len());
                Ok(report)
            }
            Err(e) => {
                error!("Checking conflicts of plan {} failed: {}", plan_id, e);
                self.notify(CONFLICT_CHECK_FAILED, Level::Error);
                Err(e.into())
            }
        }
    }

    /// Toolbar action: runs conflict detection on the active plan.
    pub async fn check_active_plan_conflicts(&self) -> Result<ActivePlanConflicts, SyncError> {
        match self.api.check_active_plan_conflicts().await {
            Ok(report) => {
                info!(
                    "Active plan {} ({}): {} conflict(s)",
                    report.plan_id,
                    report.plan_name,
                    report.conflicts.len()
                );
                self.report_conflicts(report.conflicts.len());
                Ok(report)
            }
            Err(e) => {
                error!("Checking conflicts of the active plan failed: {}", e);
                self.notify(CONFLICT_CHECK_FAILED, Level::Error);
                Err(e.into())
            }
        }
    }

    pub async fn resolve_conflicts(
        &self,
        plan_id: Id,
    ) -> Result<ConflictResolutionReport, SyncError> {
        match self.api.resolve_conflicts(plan_id).await {
            Ok(report) => {
                let resolved = report.auto_resolved();
                info!(
                    "Plan {}: {} of {} conflict(s) resolved automatically",
                    plan_id,
                    resolved,
                    report.results.len()
                );
                self.notify(
                    &format!(
                        "Resolved automatically: {} of {}",
                        resolved,
                        report.results.len()
                    ),
                    Level::Success,
                );
                self.refresh().await;
                Ok(report)
            }
            Err(e) => {
                error!("Resolving conflicts of plan {} failed: {}", plan_id, e);
                self.notify(CONFLICT_RESOLVE_FAILED, Level::Error);
                Err(e.into())
            }
        }
    }
}

impl<A: ScheduleApi, W: CalendarWidget, E: EventEditor> CalendarCallbacks
    for CalendarSyncController<A, W, E>
{
    async fn on_range_requested(&self, range: DateRange) {
        self.request_range(range).await;
    }

    async fn on_item_moved(&self, event: &CalendarDisplayEvent, new_start: NaiveDateTime) {
        self.move_event(event, new_start).await;
    }

    async fn on_item_resized(
        &self,
        event: &CalendarDisplayEvent,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
    ) {
        self.resize_event(event, new_start, new_end).await;
    }

    fn on_item_selected(&self, event: &CalendarDisplayEvent) {
        self.select_event(event);
    }

    fn on_range_selected(&self, start: NaiveDateTime, end: NaiveDateTime) {
        self.select_range(start, end);
    }
}
