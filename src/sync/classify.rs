use crate::toggl::TimeEntry;
use crate::worklog::WorklogEntry;

/// What a raw time entry means for the sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Timer still running (negative duration); never synced.
    Running,
    /// No ticket key in the description; never synced.
    Unresolved(WorklogEntry),
    /// Candidate for Jira.
    Ready(WorklogEntry),
}

impl Classification {
    pub fn entry(&self) -> Option<&WorklogEntry> {
        match self {
            Classification::Running => None,
            Classification::Unresolved(entry) | Classification::Ready(entry) => Some(entry),
        }
    }
}

/// The running check looks at the raw duration, before the one-minute floor.
pub fn classify(raw: &TimeEntry) -> Classification {
    if raw.is_running() {
        return Classification::Running;
    }
    let entry = WorklogEntry::new(raw.start, raw.duration, &raw.description, raw.id);
    if entry.ticket().is_some() {
        Classification::Ready(entry)
    } else {
        Classification::Unresolved(entry)
    }
}
