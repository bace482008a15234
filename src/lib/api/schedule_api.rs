use super::{ApiClient, ApiError, Resource};
use crate::models::{
    event_model::{EventDraft, ScheduledEventRecord},
    reference_model::{
        ActivePlanConflicts, Conflict, ConflictCheckReport, ConflictResolutionReport,
    },
    ConflictQuery, EventQuery, Id,
};

/// A trait, necessary for every backend the calendar can be synced against.
#[allow(async_fn_in_trait)]
pub trait ScheduleApi {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<ScheduledEventRecord>, ApiError>;

    async fn get_event(&self, id: Id) -> Result<ScheduledEventRecord, ApiError>;

    async fn create_event(&self, draft: &EventDraft) -> Result<ScheduledEventRecord, ApiError>;

    async fn update_event(
        &self,
        id: Id,
        record: &ScheduledEventRecord,
    ) -> Result<ScheduledEventRecord, ApiError>;

    async fn delete_event(&self, id: Id) -> Result<(), ApiError>;

    async fn list_conflicts(&self, query: &ConflictQuery) -> Result<Vec<Conflict>, ApiError>;

    async fn check_conflicts(&self, plan_id: Id) -> Result<ConflictCheckReport, ApiError>;

    async fn resolve_conflicts(&self, plan_id: Id) -> Result<ConflictResolutionReport, ApiError>;

    /// Runs conflict detection on whichever plan is currently active.
    async fn check_active_plan_conflicts(&self) -> Result<ActivePlanConflicts, ApiError>;
}

/// Allows to use ApiClient for syncing via requests to the REST backend.
impl ScheduleApi for ApiClient {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<ScheduledEventRecord>, ApiError> {
        self.list(Resource::ScheduledEvents, &query.to_pairs()).await
    }

    async fn get_event(&self, id: Id) -> Result<ScheduledEventRecord, ApiError> {
        self.get(Resource::ScheduledEvents, id).await
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<ScheduledEventRecord, ApiError> {
        self.create(Resource::ScheduledEvents, draft).await
    }

    async fn update_event(
        &self,
        id: Id,
        record: &ScheduledEventRecord,
    ) -> Result<ScheduledEventRecord, ApiError> {
        self.update(Resource::ScheduledEvents, id, record).await
    }

    async fn delete_event(&self, id: Id) -> Result<(), ApiError> {
        self.delete(Resource::ScheduledEvents, id).await
    }

    async fn list_conflicts(&self, query: &ConflictQuery) -> Result<Vec<Conflict>, ApiError> {
        self.list(Resource::Conflicts, &query.to_pairs()).await
    }

    async fn check_conflicts(&self, plan_id: Id) -> Result<ConflictCheckReport, ApiError> {
        self.plan_action(plan_id, "check_conflicts").await
    }

    async fn resolve_conflicts(&self, plan_id: Id) -> Result<ConflictResolutionReport, ApiError> {
        self.plan_action(plan_id, "resolve_conflicts").await
    }

    async fn check_active_plan_conflicts(&self) -> Result<ActivePlanConflicts, ApiError> {
        self.post_empty("check_conflicts/").await
    }
}
