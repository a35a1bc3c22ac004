//! Error types for smartinv-core.
//!
//! Every failure of the remote gateway falls into one of two families:
//!
//! | Error | Family | Meaning |
//! |-------|--------|---------|
//! | [`Error::Remote`] | remote | The service answered with a non-success status |
//! | [`Error::Transport`] | transport | The request could not be completed |
//! | [`Error::InvalidBody`] | transport | The service answered but the body is not the expected JSON |
//! | [`Error::Timeout`] | transport | No answer within the caller's deadline |
//! | [`Error::InvalidUrl`] | configuration | The base URL cannot be used |
//!
//! The gateway never retries and sets no deadline of its own. Callers decide what to do with a failure; the
//! dashboard reduces it to a single message via `Display`.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the inventory service.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-success HTTP status. The body is captured verbatim.
    #[error("{status} {status_text}: {body}")]
    Remote {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Network failure or the response body could not be read.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body is not valid JSON for the expected shape.
    #[error("Malformed response from {url}: {source}")]
    InvalidBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The caller gave up waiting.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The configured base URL is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Build a [`Error::Remote`] from a status code, filling in the
    /// canonical reason phrase.
    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();
        Error::Remote {
            status,
            status_text,
            body: body.into(),
        }
    }

    /// HTTP status of a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request never produced a usable response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::InvalidBody { .. } | Error::Timeout(_)
        )
    }
}

/// Result type for smartinv-core operations.
pub type Result<T> = std::result::Result<T, Error>;
