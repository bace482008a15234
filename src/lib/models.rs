use std::{collections::BTreeSet, path::PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::api::Resource;

pub mod display_model;
pub mod event_model;
pub mod reference_model;

/// Backend primary key.
pub type Id = u32;

/// A visible calendar range, `end` exclusive the way calendar widgets report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Query for `GET scheduled-events/`. Absent values are never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub plan: Option<Id>,
    pub teacher: Option<Id>,
    pub group: Option<Id>,
    pub room: Option<Id>,
}

impl EventQuery {
    pub fn for_range(range: &DateRange) -> Self {
        Self {
            start_date: Some(range.start),
            end_date: Some(range.end),
            ..Default::default()
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(date) = self.start_date {
            pairs.push(("start_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.end_date {
            pairs.push(("end_date", date.format("%Y-%m-%d").to_string()));
        }
        let ids = [
            ("plan", self.plan),
            ("teacher", self.teacher),
            ("group", self.group),
            ("room", self.room),
        ];
        for (key, value) in ids {
            if let Some(id) = value {
                pairs.push((key, id.to_string()));
            }
        }
        pairs
    }
}

/// Query for `GET conflicts/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictQuery {
    pub plan: Option<Id>,
    pub resolved: Option<bool>,
    pub conflict_type: Option<Id>,
}

impl ConflictQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(plan) = self.plan {
            pairs.push(("plan", plan.to_string()));
        }
        if let Some(resolved) = self.resolved {
            pairs.push(("resolved", resolved.to_string()));
        }
        if let Some(conflict_type) = self.conflict_type {
            pairs.push(("type", conflict_type.to_string()));
        }
        pairs
    }
}

/// Filter facets exposed as checkboxes next to the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Facet {
    Group,
    Teacher,
    Subject,
    Room,
}

/// Selected ids per facet. An empty facet does not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub groups: BTreeSet<Id>,
    pub teachers: BTreeSet<Id>,
    pub subjects: BTreeSet<Id>,
    pub rooms: BTreeSet<Id>,
}

impl FilterState {
    pub fn facet(&self, facet: Facet) -> &BTreeSet<Id> {
        match facet {
            Facet::Group => &self.groups,
            Facet::Teacher => &self.teachers,
            Facet::Subject => &self.subjects,
            Facet::Room => &self.rooms,
        }
    }

    fn facet_mut(&mut self, facet: Facet) -> &mut BTreeSet<Id> {
        match facet {
            Facet::Group => &mut self.groups,
            Facet::Teacher => &mut self.teachers,
            Facet::Subject => &mut self.subjects,
            Facet::Room => &mut self.rooms,
        }
    }

    /// Checks or unchecks one id. Returns whether the selection changed.
    pub fn set(&mut self, facet: Facet, id: Id, selected: bool) -> bool {
        let ids = self.facet_mut(facet);
        if selected {
            ids.insert(id)
        } else {
            ids.remove(&id)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
            && self.teachers.is_empty()
            && self.subjects.is_empty()
            && self.rooms.is_empty()
    }

    /// Narrows a query with every facet the backend can filter on by itself,
    /// i.e. those with exactly one selected id.
    pub fn apply_to(&self, query: &mut EventQuery) {
        let single = |facet: Facet| {
            let ids = self.facet(facet);
            match ids.len() {
                1 => ids.first().copied(),
                _ => None,
            }
        };
        query.group = query.group.or(single(Facet::Group));
        query.teacher = query.teacher.or(single(Facet::Teacher));
        query.room = query.room.or(single(Facet::Room));
    }

    /// Whether a record passes every non-empty facet.
    ///
    /// A record passes the teacher facet through any of its assigned teachers
    /// or the teacher of its group course.
    pub fn matches(&self, record: &event_model::ScheduledEventRecord) -> bool {
        fn passes(ids: &BTreeSet<Id>, values: impl IntoIterator<Item = Id>) -> bool {
            ids.is_empty() || values.into_iter().any(|id| ids.contains(&id))
        }
        let group_course = record.group_course.as_ref();
        let group = group_course.and_then(|gc| gc.group.as_ref()).and_then(|g| g.id);
        let subject = group_course
            .and_then(|gc| gc.course.as_ref())
            .and_then(|c| c.subject.as_ref())
            .and_then(|s| s.id);
        let room = record.room.as_ref().and_then(|r| r.id);

        passes(self.facet(Facet::Group), group)
            && passes(self.facet(Facet::Teacher), record.teacher_ids())
            && passes(self.facet(Facet::Subject), subject)
            && passes(self.facet(Facet::Room), room)
    }
}

/// Command line of the `schedule-sync` binary.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config_json_path: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Obtain a bearer token and persist it
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SCHEDULE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Print the calendar events of a date range as JSON
    Events {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        plan: Option<Id>,
        #[arg(long = "group")]
        groups: Vec<Id>,
        #[arg(long = "teacher")]
        teachers: Vec<Id>,
        #[arg(long = "subject")]
        subjects: Vec<Id>,
        #[arg(long = "room")]
        rooms: Vec<Id>,
    },
    /// Move an event to a new start, keeping its duration
    Move {
        #[arg(long)]
        id: Id,
        #[arg(long)]
        start: chrono::NaiveDateTime,
    },
    /// Change the bounds of an event
    Resize {
        #[arg(long)]
        id: Id,
        #[arg(long)]
        start: chrono::NaiveDateTime,
        #[arg(long)]
        end: chrono::NaiveDateTime,
    },
    /// Create an event from a JSON draft
    Create {
        #[arg(long, value_name = "FILE")]
        draft_json_path: PathBuf,
    },
    /// Delete an event
    Delete {
        #[arg(long)]
        id: Id,
    },
    /// Print a reference list as JSON
    List {
        #[arg(value_enum)]
        resource: Resource,
    },
    /// Print the groups, teachers, subjects and rooms the filters offer
    FilterOptions,
    /// Print recorded conflicts as JSON
    Conflicts {
        #[arg(long)]
        plan: Option<Id>,
        #[arg(long)]
        resolved: Option<bool>,
        #[arg(long = "type")]
        conflict_type: Option<Id>,
    },
    /// Run conflict detection for a plan, or for the active plan when omitted
    CheckConflicts {
        #[arg(long)]
        plan: Option<Id>,
    },
    /// Let the backend resolve the conflicts of a plan
    ResolveConflicts {
        #[arg(long)]
        plan: Id,
    },
}

/// Runtime configuration, read from `config.json` and `SCHEDULE_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_login_url() -> String {
    "/admin/login/".to_string()
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("schedule-calendar-sync/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            csrf_token: None,
            login_url: default_login_url(),
            token_path: None,
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}
