//! Jira REST v2 worklog endpoints.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::worklog::WorklogPayload;

/// One page of `GET issue/{key}/worklog`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPage {
    #[serde(default)]
    pub start_at: u32,
    pub max_results: u32,
    pub total: u32,
    #[serde(default)]
    pub worklogs: Vec<RemoteWorklog>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteWorklog {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub started: Option<String>,
    #[serde(default)]
    pub time_spent_seconds: Option<u64>,
}

/// The subset of the ticketing system the sync needs.
#[async_trait]
pub trait TicketApi: Send + Sync {
    /// Cheap credential/reachability check.
    async fn myself(&self) -> Result<()>;

    /// One page of worklogs, starting at offset `start_at`.
    async fn list_worklogs(&self, ticket: &str, start_at: u32) -> Result<WorklogPage>;

    async fn create_worklog(&self, ticket: &str, payload: &WorklogPayload) -> Result<()>;
}

#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    api_root: String,
    username: String,
    password: String,
}

impl JiraClient {
    /// The password must already be resolved (config, env or prompt).
    pub fn new(config: &Config) -> Result<Self> {
        let password = config
            .jira_password
            .clone()
            .ok_or_else(|| Error::Config("Jira password is not set".into()))?;
        let http = build_http_client(config)?;
        Ok(Self {
            http,
            api_root: config.jira_api_root(),
            username: config.jira_username.clone(),
            password,
        })
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.api_root.clone();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    fn worklog_path(ticket: &str) -> String {
        format!("issue/{ticket}/worklog")
    }

    async fn read_error(response: Response) -> (u16, String) {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        (status, body)
    }
}

#[async_trait]
impl TicketApi for JiraClient {
    async fn myself(&self) -> Result<()> {
        let response = self
            .http
            .get(self.url_for("myself"))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        if response.status() == StatusCode::OK {
            return Ok(());
        }
        let (status, body) = Self::read_error(response).await;
        log::error!("Jira access check failed: {status} {body}");
        Err(Error::Authentication { status, body })
    }

    async fn list_worklogs(&self, ticket: &str, start_at: u32) -> Result<WorklogPage> {
        let url = self.url_for(&Self::worklog_path(ticket));
        log::debug!("GET {url} startAt={start_at}");
        let response = self
            .http
            .get(url)
            .query(&[("startAt", start_at)])
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        match response.status() {
            StatusCode::OK => Ok(response.json::<WorklogPage>().await?),
            StatusCode::NOT_FOUND => {
                let (_, body) = Self::read_error(response).await;
                log::debug!("Task {ticket} not found: {body}");
                Err(Error::TicketNotFound(ticket.to_string()))
            }
            _ => {
                let (status, body) = Self::read_error(response).await;
                Err(Error::Api { status, body })
            }
        }
    }

    async fn create_worklog(&self, ticket: &str, payload: &WorklogPayload) -> Result<()> {
        let url = self.url_for(&Self::worklog_path(ticket));
        log::debug!("POST {url} {payload:?}");
        let response = self
            .http
            .post(url)
            .json(payload)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        match response.status() {
            StatusCode::CREATED => Ok(()),
            StatusCode::BAD_REQUEST => {
                let (_, body) = Self::read_error(response).await;
                Err(Error::InvalidWorklog {
                    ticket: ticket.to_string(),
                    body,
                })
            }
            StatusCode::FORBIDDEN => {
                let (_, body) = Self::read_error(response).await;
                Err(Error::PermissionDenied {
                    ticket: ticket.to_string(),
                    body,
                })
            }
            _ => {
                let (status, body) = Self::read_error(response).await;
                Err(Error::Api { status, body })
            }
        }
    }
}

fn build_http_client(config: &Config) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(Error::from)
}
