use std::collections::HashMap;

use crate::date_util::Window;
use crate::error::{Error, Result};
use crate::jira::TicketApi;
use crate::sync::classify::{classify, Classification};
use crate::sync::store::TicketWorklogStore;
use crate::sync::{SyncProgress, SyncReport};
use crate::toggl::TimeEntrySource;
use crate::worklog::WorklogEntry;

/// Result of diffing local entries against Jira.
#[derive(Debug, Default)]
pub struct Plan {
    /// Entries with no matching marker in their ticket, in per-ticket order.
    pub missing: Vec<WorklogEntry>,
    pub tickets_checked: usize,
    /// Tickets left out of this run, with the reason.
    pub skipped: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct SubmitOutcome {
    pub submitted: usize,
    pub failures: Vec<(u64, String)>,
}

/// Group entries by ticket, keeping first-seen ticket order and entry order.
pub fn group_by_ticket(entries: Vec<WorklogEntry>) -> Vec<(String, Vec<WorklogEntry>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<WorklogEntry>)> = Vec::new();
    for entry in entries {
        let Some(ticket) = entry.ticket().map(str::to_string) else {
            continue;
        };
        match index.get(&ticket) {
            Some(&i) => groups[i].1.push(entry),
            None => {
                index.insert(ticket.clone(), groups.len());
                groups.push((ticket, vec![entry]));
            }
        }
    }
    groups
}

pub struct Reconciler<'a> {
    store: TicketWorklogStore<'a>,
    progress: &'a dyn SyncProgress,
}

impl<'a> Reconciler<'a> {
    pub fn new(api: &'a dyn TicketApi, progress: &'a dyn SyncProgress) -> Self {
        Self {
            store: TicketWorklogStore::new(api),
            progress,
        }
    }

    /// Work out which entries have no worklog in Jira yet.
    ///
    /// One paginated fetch per distinct ticket. Entries without a ticket are
    /// ignored. A ticket that does not exist is skipped; any other fetch error
    /// ends the run.
    pub async fn reconcile(&self, entries: Vec<WorklogEntry>) -> Result<Plan> {
        let mut plan = Plan::default();
        for (ticket, group) in group_by_ticket(entries) {
            let synced = match self.store.fetch_synced_identities(&ticket).await {
                Ok(ids) => ids,
                Err(e @ Error::TicketNotFound(_)) => {
                    log::warn!("Skipping {} entries for {ticket}: {e}", group.len());
                    self.progress.on_ticket_skipped(&ticket, &e);
                    plan.skipped.push((ticket, e.to_string()));
                    continue;
                }
                Err(e) => return Err(e),
            };
            plan.tickets_checked += 1;

            let before = plan.missing.len();
            plan.missing.extend(
                group
                    .into_iter()
                    .filter(|e| !synced.contains(&e.toggl_id())),
            );
            let missing = plan.missing.len() - before;
            log::info!("{ticket}: {} synced IDs, {missing} missing", synced.len());
            self.progress.on_ticket_checked(&ticket, synced.len(), missing);
        }
        Ok(plan)
    }

    /// Create every entry in order. A failure is recorded and the rest are still attempted.
    pub async fn submit_all(&self, missing: &[WorklogEntry]) -> SubmitOutcome {
        let mut outcome = SubmitOutcome::default();
        let total = missing.len();
        for (i, entry) in missing.iter().enumerate() {
            match self.store.submit(entry).await {
                Ok(()) => outcome.submitted += 1,
                Err(e) => {
                    log::warn!("Failed to add {entry}: {e}");
                    self.progress.on_submit_failed(entry, &e);
                    outcome.failures.push((entry.toggl_id(), e.to_string()));
                }
            }
            self.progress.on_submit_progress(i + 1, total);
        }
        outcome
    }
}

/// One full pass: fetch the window from Toggl, diff against Jira, optionally write.
///
/// Every entry is classified and reported before any write happens.
pub async fn sync_window(
    source: &dyn TimeEntrySource,
    api: &dyn TicketApi,
    window: &Window,
    write: bool,
    progress: &dyn SyncProgress,
) -> Result<SyncReport> {
    let raw = source.time_entries(window).await?;
    progress.on_entries_fetched(window, raw.len());

    let mut report = SyncReport {
        entries_total: raw.len(),
        ..Default::default()
    };
    let mut candidates = Vec::new();
    for item in &raw {
        let class = classify(item);
        progress.on_entry(item, &class);
        match class {
            Classification::Running => report.entries_running += 1,
            Classification::Unresolved(_) => report.entries_unresolved += 1,
            Classification::Ready(entry) => candidates.push(entry),
        }
    }

    if candidates.is_empty() {
        log::info!("No time entries with a task key in this window");
        return Ok(report.finish());
    }

    let reconciler = Reconciler::new(api, progress);
    let plan = reconciler.reconcile(candidates).await?;
    report.tickets_checked = plan.tickets_checked + plan.skipped.len();
    report.tickets_skipped = plan.skipped.len();
    report.missing = plan.missing.len();
    report
        .errors
        .extend(plan.skipped.iter().map(|(_, reason)| reason.clone()));

    for entry in &plan.missing {
        progress.on_missing(entry);
    }

    if write && !plan.missing.is_empty() {
        let outcome = reconciler.submit_all(&plan.missing).await;
        report.submitted = outcome.submitted;
        report.failed = outcome.failures.len();
        report.errors.extend(
            outcome
                .failures
                .into_iter()
                .map(|(id, reason)| format!("Toggl ID {id}: {reason}")),
        );
    }

    Ok(report.finish())
}
