//! REST client for the scheduling backend.

use serde::Deserialize;

mod client;
mod error;
mod schedule_api;

pub use client::ApiClient;
pub use error::ApiError;
pub use schedule_api::ScheduleApi;

/// Collections exposed by the backend router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Resource {
    ScheduledEvents,
    Teachers,
    Groups,
    Subjects,
    Rooms,
    Subsidiaries,
    SchedulePlans,
    GroupCourses,
    Conflicts,
}

impl Resource {
    /// Path relative to the API base, with the trailing slash the router expects.
    pub fn path(self) -> &'static str {
        match self {
            Resource::ScheduledEvents => "scheduled-events/",
            Resource::Teachers => "teachers/",
            Resource::Groups => "groups/",
            Resource::Subjects => "subjects/",
            Resource::Rooms => "rooms/",
            Resource::Subsidiaries => "subsidiaries/",
            Resource::SchedulePlans => "schedule-plans/",
            Resource::GroupCourses => "group-courses/",
            Resource::Conflicts => "conflicts/",
        }
    }

    pub fn item_path(self, id: crate::models::Id) -> String {
        format!("{}{}/", self.path(), id)
    }
}

/// List endpoints answer either with a pagination envelope or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Paginated {
        results: Vec<T>,
        /// Absolute URL of the following page
        #[serde(default)]
        next: Option<String>,
    },
}

impl<T> ListResponse<T> {
    pub fn next_page(&self) -> Option<&str> {
        match self {
            ListResponse::Bare(_) => None,
            ListResponse::Paginated { next, .. } => next.as_deref().filter(|n| !n.is_empty()),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) => items,
            ListResponse::Paginated { results, .. } => results,
        }
    }
}
