pub mod comment;
pub mod config;
pub mod date_util;
pub mod error;
pub mod jira;
pub mod sync;
pub mod toggl;
pub mod worklog;

pub use comment::{extract_toggl_id, format_marker, parse_description, ParsedDescription};
pub use config::Config;
pub use date_util::Window;
pub use error::{Error, Result};
pub use jira::{JiraClient, TicketApi};
pub use sync::{Classification, NoopProgress, SyncOptions, SyncProgress, SyncReport, SyncStatus};
pub use toggl::{TimeEntry, TimeEntrySource, TogglClient};
pub use worklog::{WorklogEntry, WorklogPayload};

use sync::reconciler;

/// Main entry point: moves Toggl time entries into Jira worklogs.
pub struct Tlog {
    toggl: Box<dyn TimeEntrySource>,
    jira: Box<dyn TicketApi>,
}

impl Tlog {
    pub fn new(toggl: Box<dyn TimeEntrySource>, jira: Box<dyn TicketApi>) -> Self {
        Self { toggl, jira }
    }

    /// Validate `config` and build the HTTP clients. No request is sent yet.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let toggl = TogglClient::new(config)?;
        let jira = JiraClient::new(config)?;
        Ok(Self::new(Box::new(toggl), Box::new(jira)))
    }

    /// Make sure the Jira credentials work before doing anything else.
    pub async fn check_access(&self) -> Result<()> {
        self.jira.myself().await
    }

    /// Sync the lookback window ending now.
    pub async fn sync(&self, options: &SyncOptions, progress: &dyn SyncProgress) -> Result<SyncReport> {
        let window = options.window(chrono::Utc::now());
        self.sync_window(&window, options.write, progress).await
    }

    pub async fn sync_window(
        &self,
        window: &Window,
        write: bool,
        progress: &dyn SyncProgress,
    ) -> Result<SyncReport> {
        log::info!(
            "Syncing {} .. {} (write: {write})",
            window.start_param(),
            window.end_param()
        );
        reconciler::sync_window(self.toggl.as_ref(), self.jira.as_ref(), window, write, progress)
            .await
    }
}
