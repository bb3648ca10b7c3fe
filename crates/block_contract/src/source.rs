use serde_json::Value;
use thiserror::Error;

use crate::BlockDescriptor;

/// Failure reported by a block data source.
///
/// The display string is what the dashboard shows in the card's error indicator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Required settings (credentials, API keys) are missing or still placeholders.
    #[error("not configured: {0}")]
    NotConfigured(String),
    /// The upstream service rejected the supplied credentials.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Transport failure or non-success HTTP status.
    #[error("request failed: {0}")]
    Http(String),
    /// The upstream payload could not be interpreted.
    #[error("unexpected response: {0}")]
    Parse(String),
    /// Any other source-specific failure.
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Returns the bare message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::NotConfigured(message)
            | Self::Auth(message)
            | Self::Http(message)
            | Self::Parse(message)
            | Self::Other(message) => message,
        }
    }
}

/// A data source backing one dashboard block.
///
/// Sources are built per host from a [`crate::BlockRegistry`] and are polled on their
/// descriptor's refresh cadence. `fetch` may block on network I/O; hosts call it off the UI
/// thread and never run two fetches of the same source concurrently.
pub trait BlockSource: Send + Sync {
    /// Static metadata for this source.
    fn descriptor(&self) -> &BlockDescriptor;

    /// Fetches the current payload.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing why no payload could be produced. Callers surface it
    /// as a per-block error indicator and retry on the next refresh tick.
    fn fetch(&self) -> Result<Value, FetchError>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fetch_error_display_includes_category() {
        assert_eq!(
            FetchError::NotConfigured("TMDB api key missing".to_string()).to_string(),
            "not configured: TMDB api key missing"
        );
        assert_eq!(FetchError::Other("boom".to_string()).to_string(), "boom");
    }

    #[test]
    fn fetch_error_message_strips_category() {
        assert_eq!(
            FetchError::Http("status 503".to_string()).message(),
            "status 503"
        );
    }
}
