use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_TOGGL_URL: &str = "https://api.track.toggl.com/api/v9";
pub const DEFAULT_DAYS_AGO: u32 = 7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]+$").unwrap());

/// Everything a run needs, validated once at startup.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub toggl_token: String,
    pub toggl_url: String,
    pub jira_url: String,
    pub jira_username: String,
    pub jira_password: Option<String>,
    pub days_ago: u32,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            toggl_token: String::new(),
            toggl_url: DEFAULT_TOGGL_URL.to_string(),
            jira_url: String::new(),
            jira_username: String::new(),
            jira_password: None,
            days_ago: DEFAULT_DAYS_AGO,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("toggl_url", &self.toggl_url)
            .field("jira_url", &self.jira_url)
            .field("jira_username", &self.jira_username)
            .field("jira_password", &self.jira_password.as_ref().map(|_| "***"))
            .field("days_ago", &self.days_ago)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Default config file location (`~/.tlog/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::home_dir()
            .ok_or_else(|| Error::Config("cannot determine home directory".into()))?
            .join(".tlog");
        Ok(dir.join("config.toml"))
    }

    /// Load from `path` (or the default location), then apply `TLOG_*` environment overrides.
    ///
    /// A missing default file is fine; a missing explicit file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let p = Self::default_path()?;
                if p.exists() {
                    Self::from_file(&p)?
                } else {
                    log::debug!("No config file at {}, using defaults", p.display());
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay values from the environment. `lookup` is injectable for tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("TLOG_TOGGL_TOKEN") {
            self.toggl_token = v;
        }
        if let Some(v) = lookup("TLOG_TOGGL_URL") {
            self.toggl_url = v;
        }
        if let Some(v) = lookup("TLOG_JIRA_URL") {
            self.jira_url = v;
        }
        if let Some(v) = lookup("TLOG_JIRA_USERNAME") {
            self.jira_username = v;
        }
        if let Some(v) = lookup("TLOG_JIRA_PASSWORD") {
            self.jira_password = Some(v);
        }
        if let Some(v) = lookup("TLOG_DAYS_AGO") {
            self.days_ago = v.trim().parse().map_err(|_| {
                Error::Config(format!("Check the days ago, we got '{v}', expect integer number"))
            })?;
        }
        Ok(())
    }

    /// Reject anything that would only fail later, after talking to the network.
    pub fn validate(&self) -> Result<()> {
        if !RE_TOKEN.is_match(&self.toggl_token) {
            return Err(Error::Config(format!(
                "Check the token, we got '{}', but it seems not token string",
                self.toggl_token
            )));
        }
        check_http_url("Toggl", &self.toggl_url)?;
        check_http_url("Jira", &self.jira_url)?;
        if self.jira_username.trim().is_empty() {
            return Err(Error::Config("Jira username is not set".into()));
        }
        if self.days_ago == 0 {
            return Err(Error::Config(
                "Check the days ago, we got '0', expect a positive number of days".into(),
            ));
        }
        Ok(())
    }

    /// `<jira_url>/rest/api/2/`, whether or not the configured URL ends with a slash.
    pub fn jira_api_root(&self) -> String {
        format!("{}/rest/api/2/", self.jira_url.trim_end_matches('/'))
    }

    pub fn toggl_api_root(&self) -> String {
        format!("{}/", self.toggl_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn check_http_url(label: &str, value: &str) -> Result<()> {
    let bad = || {
        Error::Config(format!(
            "Check the {label} url, we got '{value}', but it seems not url string"
        ))
    };
    let parsed = url::Url::parse(value).map_err(|_| bad())?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        _ => Err(bad()),
    }
}
