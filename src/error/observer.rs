use std::time::Duration;
use thiserror::Error;

/// Failures talking to the external game API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObserverError {
    /// The request did not complete within the per-request timeout.
    #[error("Game API request timed out")]
    Timeout,

    /// The provider asked us to slow down.
    ///
    /// `retry_after` carries the provider-supplied delay when one was sent.
    #[error("Game API rate limit hit (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// Non-success HTTP status other than 404 and 429.
    #[error("Game API returned HTTP {status}")]
    Http { status: u16 },

    /// Connection-level failure before a response was received.
    #[error("Game API transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("Failed to decode game API response: {0}")]
    Decode(String),

    /// The configured platform has no regional routing entry.
    #[error("Unknown game platform '{0}'")]
    UnknownPlatform(String),
}

impl ObserverError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ObserverError::Timeout
            | ObserverError::RateLimited { .. }
            | ObserverError::Transport(_) => true,
            ObserverError::Http { status } => *status >= 500,
            ObserverError::Decode(_) | ObserverError::UnknownPlatform(_) => false,
        }
    }
}

impl From<reqwest::Error> for ObserverError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ObserverError::Timeout
        } else if err.is_decode() {
            ObserverError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ObserverError::Http {
                status: status.as_u16(),
            }
        } else {
            ObserverError::Transport(err.to_string())
        }
    }
}
