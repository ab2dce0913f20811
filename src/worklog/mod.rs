use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::comment::{format_marker, parse_description};
use crate::date_util::jira_timestamp;

/// Jira refuses worklogs shorter than a minute.
pub const MIN_TIME_SPENT_SECONDS: u64 = 60;

/// One Toggl time entry, normalized for Jira.
///
/// Ticket and comment are derived from the description once, at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogEntry {
    started: DateTime<FixedOffset>,
    time_spent: u64,
    toggl_id: u64,
    ticket: Option<String>,
    comment: Option<String>,
}

impl WorklogEntry {
    /// Negative durations (running timers) are floored like any other short
    /// entry; callers must filter those out before building an entry.
    pub fn new(
        started: DateTime<FixedOffset>,
        duration_seconds: i64,
        description: &str,
        toggl_id: u64,
    ) -> Self {
        let parsed = parse_description(description);
        let time_spent = u64::try_from(duration_seconds)
            .unwrap_or(0)
            .max(MIN_TIME_SPENT_SECONDS);
        Self {
            started,
            time_spent,
            toggl_id,
            ticket: parsed.ticket,
            comment: parsed.comment,
        }
    }

    pub fn started(&self) -> &DateTime<FixedOffset> {
        &self.started
    }

    pub fn time_spent(&self) -> u64 {
        self.time_spent
    }

    pub fn toggl_id(&self) -> u64 {
        self.toggl_id
    }

    pub fn ticket(&self) -> Option<&str> {
        self.ticket.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Body for `POST issue/{ticket}/worklog`, with the identity marker appended.
    pub fn to_remote_payload(&self) -> WorklogPayload {
        let marker = format_marker(self.toggl_id);
        let comment = match &self.comment {
            Some(text) => format!("{text} {marker}"),
            None => marker,
        };
        WorklogPayload {
            comment,
            started: jira_timestamp(&self.started),
            time_spent_seconds: self.time_spent,
        }
    }
}

impl fmt::Display for WorklogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Worklog(toggl_id: {} task: {})",
            self.toggl_id,
            self.ticket.as_deref().unwrap_or("-")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPayload {
    pub comment: String,
    pub started: String,
    pub time_spent_seconds: u64,
}
