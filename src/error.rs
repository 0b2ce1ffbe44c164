//! Error types for the CMS boundary and the post feed

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while talking to the content source
#[derive(Error, Debug)]
pub enum CmsError {
    #[error("No {kind} document with uid {uid:?}")]
    NotFound { kind: String, uid: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed response from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No master ref advertised by {0}")]
    NoMasterRef(String),

    #[error("Invalid page cursor: {0}")]
    InvalidCursor(String),

    #[error("Failed to read fixtures {path:?}: {message}")]
    Fixture { path: PathBuf, message: String },
}

impl CmsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CmsError::NotFound { .. })
    }
}

/// Errors raised by the "load more" accumulator
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("There is no further page to load")]
    Exhausted,

    #[error("A page load is already in flight")]
    InFlight,

    #[error(transparent)]
    Cms(#[from] CmsError),
}
