//! Error types for Catat

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Empty response from AI backend")]
    EmptyResponse,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a free-text entry could not be turned into a transaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("not a recognizable amount")]
    NotNumeric,

    #[error("amount is too large")]
    AmountTooLarge,

    #[error("no amount found in input")]
    NoAmountFound,

    #[error("nothing left to describe the transaction")]
    EmptyDescription,

    #[error("amount must be greater than zero")]
    NonPositiveAmount,
}

/// Why a remote classification did not produce a category.
///
/// Only used for logging; the classifier always collapses these to `other`.
#[derive(Error, Debug)]
pub enum ClassificationFault {
    #[error("no AI backend credentials configured")]
    MissingCredentials,

    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("response carried no text")]
    EmptyPayload,

    #[error("reply did not name a category: {0:?}")]
    Unrecognized(String),

    #[error("backend error: {0}")]
    Backend(Error),
}

impl ClassificationFault {
    /// Short label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::Timeout => "timeout",
            Self::HttpStatus { .. } => "http_status",
            Self::Transport(_) => "transport",
            Self::EmptyPayload => "empty_payload",
            Self::Unrecognized(_) => "unrecognized",
            Self::Backend(_) => "backend",
        }
    }
}

impl From<Error> for ClassificationFault {
    fn from(err: Error) -> Self {
        match err {
            Error::Api { status, body } => Self::HttpStatus { status, body },
            Error::Http(e) if e.is_timeout() => Self::Timeout,
            // Drop the URL so query parameters never reach the logs
            Error::Http(e) => Self::Transport(e.without_url()),
            Error::EmptyResponse => Self::EmptyPayload,
            other => Self::Backend(other),
        }
    }
}
