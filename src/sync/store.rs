use std::collections::HashSet;

use crate::comment::extract_toggl_id;
use crate::error::{Error, Result};
use crate::jira::{RemoteWorklog, TicketApi};
use crate::worklog::WorklogEntry;

/// Worklog reads and writes for single tickets.
pub struct TicketWorklogStore<'a> {
    api: &'a dyn TicketApi,
}

impl<'a> TicketWorklogStore<'a> {
    pub fn new(api: &'a dyn TicketApi) -> Self {
        Self { api }
    }

    /// Every worklog of `ticket`, across all pages.
    ///
    /// The page size comes from the first response; page `p` starts at
    /// `(p - 1) * maxResults`.
    pub async fn fetch_worklogs(&self, ticket: &str) -> Result<Vec<RemoteWorklog>> {
        let first = self.api.list_worklogs(ticket, 0).await?;
        let page_size = first.max_results;
        let total = first.total;
        let mut worklogs = first.worklogs;

        if page_size == 0 || total <= page_size {
            log::debug!("{ticket}: {} worklogs in one page", worklogs.len());
            return Ok(worklogs);
        }

        let pages = total.div_ceil(page_size);
        for page in 2..=pages {
            let start_at = (page - 1) * page_size;
            let next = self.api.list_worklogs(ticket, start_at).await?;
            if next.start_at != start_at {
                log::warn!(
                    "{ticket}: asked for startAt={start_at}, got {}, stopping early",
                    next.start_at
                );
                break;
            }
            if next.worklogs.is_empty() {
                log::warn!("{ticket}: page {page}/{pages} came back empty, stopping early");
                break;
            }
            worklogs.extend(next.worklogs);
        }
        log::debug!("{ticket}: {} of {total} worklogs in {pages} pages", worklogs.len());
        Ok(worklogs)
    }

    /// Toggl IDs already recorded on `ticket`, read back from worklog comments.
    pub async fn fetch_synced_identities(&self, ticket: &str) -> Result<HashSet<u64>> {
        let worklogs = self.fetch_worklogs(ticket).await?;
        Ok(worklogs
            .iter()
            .filter_map(|w| w.comment.as_deref())
            .filter_map(extract_toggl_id)
            .collect())
    }

    /// Create one worklog. No retries here.
    pub async fn submit(&self, entry: &WorklogEntry) -> Result<()> {
        let ticket = entry
            .ticket()
            .ok_or_else(|| Error::Other(format!("{entry} has no task to log work on")))?;
        self.api
            .create_worklog(ticket, &entry.to_remote_payload())
            .await
    }
}
