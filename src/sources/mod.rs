//! Paper-search providers and DOI resolution.
//!
//! The [`Source`] trait is the seam between the citation pipeline and whatever
//! answers keyword searches. [`SemanticScholarSource`] is the production
//! implementation; [`MockSource`] serves canned papers in tests.
//!
//! DOI checks go through the [`DoiResolver`] trait, wrapped by the caching
//! [`DoiValidator`].
//!
//! # Environment Variables
//!
//! - `SEMANTIC_SCHOLAR_API_KEY` - Optional API key sent as `x-api-key` for higher rate limits

pub mod doi;
pub mod mock;
mod semantic;

pub use doi::{DoiResolver, DoiValidator, HttpDoiResolver, DOI_RESOLVER_BASE};
pub use mock::{MockResolver, MockSource};
pub use semantic::{SemanticScholarSource, SEARCH_FIELDS, SEMANTIC_API_BASE};

use crate::models::{Paper, SearchQuery};
use async_trait::async_trait;

/// A keyword search provider returning paper records.
///
/// Implementations report failures as [`SourceError`]; callers decide which
/// failures are worth retrying via [`crate::utils::TransientError`].
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g., "semantic")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for papers matching the query, in provider relevance order
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError>;
}

/// Errors that can occur when interacting with a source or resolver
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// Connection failure or other transport error
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Parsing error in the provider's response body
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// The provider answered with a 5xx status
    #[error("Server error: HTTP {0}")]
    Server(u16),

    /// Any other error status from the provider
    #[error("API error: {0}")]
    Api(String),
}

impl SourceError {
    /// Classify an unsuccessful HTTP status
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            SourceError::RateLimit
        } else if status.is_server_error() {
            SourceError::Server(status.as_u16())
        } else {
            SourceError::Api(format!("unexpected status {}", status))
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::from_status(status)
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
