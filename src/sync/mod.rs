pub mod classify;
pub mod reconciler;
pub mod store;

#[cfg(test)]
pub(crate) mod fake;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::date_util::Window;
use crate::error::Error;
use crate::toggl::TimeEntry;
use crate::worklog::WorklogEntry;

pub use classify::{classify, Classification};

/// Options controlling a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Look back this many days from now.
    pub days: u32,
    /// Actually create the missing worklogs; otherwise only report them.
    pub write: bool,
}

impl SyncOptions {
    pub fn window(&self, now: DateTime<Utc>) -> Window {
        Window::lookback(now, self.days)
    }
}

/// Report returned after a sync run completes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub entries_total: usize,
    pub entries_running: usize,
    pub entries_unresolved: usize,
    pub tickets_checked: usize,
    pub tickets_skipped: usize,
    pub missing: usize,
    pub submitted: usize,
    pub failed: usize,
    pub status: SyncStatus,
    pub errors: Vec<String>,
}

impl SyncReport {
    /// Derive the status from the counts gathered so far.
    ///
    /// Once a write fails, only successful writes make the run partial.
    /// Without write failures, skipped tickets make it partial as long as
    /// some other ticket was read.
    pub fn finish(mut self) -> Self {
        self.status = if self.failed == 0 && self.tickets_skipped == 0 {
            SyncStatus::Success
        } else if self.failed > 0 {
            if self.submitted > 0 {
                SyncStatus::PartialFailure
            } else {
                SyncStatus::Failed
            }
        } else if self.tickets_checked > self.tickets_skipped {
            SyncStatus::PartialFailure
        } else {
            SyncStatus::Failed
        };
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SyncStatus {
    #[default]
    Success,
    PartialFailure,
    Failed,
}

/// Hooks for reporting a run to the operator. Every method defaults to a no-op.
pub trait SyncProgress: Send + Sync {
    fn on_entries_fetched(&self, _window: &Window, _count: usize) {}

    fn on_entry(&self, _raw: &TimeEntry, _class: &Classification) {}

    fn on_ticket_checked(&self, _ticket: &str, _synced: usize, _missing: usize) {}

    fn on_ticket_skipped(&self, _ticket: &str, _error: &Error) {}

    fn on_missing(&self, _entry: &WorklogEntry) {}

    fn on_submit_progress(&self, _current: usize, _total: usize) {}

    fn on_submit_failed(&self, _entry: &WorklogEntry, _error: &Error) {}
}

pub struct NoopProgress;

impl SyncProgress for NoopProgress {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_success() {
        let report = SyncReport {
            tickets_checked: 2,
            missing: 3,
            submitted: 3,
            ..Default::default()
        }
        .finish();
        assert_eq!(report.status, SyncStatus::Success);
    }

    #[test]
    fn test_status_partial() {
        let report = SyncReport {
            tickets_checked: 2,
            submitted: 2,
            failed: 1,
            ..Default::default()
        }
        .finish();
        assert_eq!(report.status, SyncStatus::PartialFailure);

        let report = SyncReport {
            tickets_checked: 2,
            tickets_skipped: 1,
            ..Default::default()
        }
        .finish();
        assert_eq!(report.status, SyncStatus::PartialFailure);
    }

    #[test]
    fn test_status_failed() {
        let report = SyncReport {
            tickets_checked: 1,
            missing: 2,
            failed: 2,
            ..Default::default()
        }
        .finish();
        assert_eq!(report.status, SyncStatus::Failed);

        let report = SyncReport {
            tickets_checked: 2,
            tickets_skipped: 2,
            ..Default::default()
        }
        .finish();
        assert_eq!(report.status, SyncStatus::Failed);
    }
}
