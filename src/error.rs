use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Jira access check failed ({status}): {body}")]
    Authentication { status: u16, body: String },

    #[error("Task {0} not found")]
    TicketNotFound(String),

    #[error("Invalid worklog for {ticket}: {body}")]
    InvalidWorklog { ticket: String, body: String },

    #[error("No permission to add worklog to {ticket}: {body}")]
    PermissionDenied { ticket: String, body: String },

    #[error("Remote API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
