//! In-memory Jira used by the sync tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::jira::{RemoteWorklog, TicketApi, WorklogPage};
use crate::worklog::WorklogPayload;

pub struct FakeJira {
    pub page_size: u32,
    worklogs: Mutex<HashMap<String, Vec<RemoteWorklog>>>,
    missing_tickets: HashSet<String>,
    rejected_comments: HashSet<String>,
    ignore_offset: bool,
    pub list_calls: Mutex<Vec<(String, u32)>>,
    pub created: Mutex<Vec<(String, WorklogPayload)>>,
}

impl FakeJira {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            worklogs: Mutex::new(HashMap::new()),
            missing_tickets: HashSet::new(),
            rejected_comments: HashSet::new(),
            ignore_offset: false,
            list_calls: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn with_comments(self, ticket: &str, comments: &[&str]) -> Self {
        let logs = comments
            .iter()
            .map(|c| RemoteWorklog {
                comment: Some(c.to_string()),
                ..Default::default()
            })
            .collect();
        self.worklogs.lock().unwrap().insert(ticket.to_string(), logs);
        self
    }

    pub fn with_missing_ticket(mut self, ticket: &str) -> Self {
        self.missing_tickets.insert(ticket.to_string());
        self
    }

    /// Reject any create whose comment equals `comment` with a 400.
    pub fn rejecting(mut self, comment: &str) -> Self {
        self.rejected_comments.insert(comment.to_string());
        self
    }

    /// Always answer with the first page, like a server that drops `startAt`.
    pub fn ignoring_offset(mut self) -> Self {
        self.ignore_offset = true;
        self
    }

    pub fn list_calls_for(&self, ticket: &str) -> Vec<u32> {
        self.list_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == ticket)
            .map(|(_, start)| *start)
            .collect()
    }

    pub fn created_comments(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.comment.clone())
            .collect()
    }
}

#[async_trait]
impl TicketApi for FakeJira {
    async fn myself(&self) -> Result<()> {
        Ok(())
    }

    async fn list_worklogs(&self, ticket: &str, start_at: u32) -> Result<WorklogPage> {
        self.list_calls
            .lock()
            .unwrap()
            .push((ticket.to_string(), start_at));
        if self.missing_tickets.contains(ticket) {
            return Err(Error::TicketNotFound(ticket.to_string()));
        }
        let all = self
            .worklogs
            .lock()
            .unwrap()
            .get(ticket)
            .cloned()
            .unwrap_or_default();
        let start_at = if self.ignore_offset { 0 } else { start_at };
        let worklogs = all
            .iter()
            .skip(start_at as usize)
            .take(self.page_size as usize)
            .cloned()
            .collect();
        Ok(WorklogPage {
            start_at,
            max_results: self.page_size,
            total: all.len() as u32,
            worklogs,
        })
    }

    async fn create_worklog(&self, ticket: &str, payload: &WorklogPayload) -> Result<()> {
        if self.missing_tickets.contains(ticket) {
            return Err(Error::TicketNotFound(ticket.to_string()));
        }
        if self.rejected_comments.contains(&payload.comment) {
            return Err(Error::InvalidWorklog {
                ticket: ticket.to_string(),
                body: "rejected".into(),
            });
        }
        self.worklogs
            .lock()
            .unwrap()
            .entry(ticket.to_string())
            .or_default()
            .push(RemoteWorklog {
                comment: Some(payload.comment.clone()),
                started: Some(payload.started.clone()),
                time_spent_seconds: Some(payload.time_spent_seconds),
                ..Default::default()
            });
        self.created
            .lock()
            .unwrap()
            .push((ticket.to_string(), payload.clone()));
        Ok(())
    }
}
