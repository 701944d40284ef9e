//! Utility modules supporting the citation pipeline.
//!
//! - [`format_citation`], [`format_bibtex`], [`format_ris`]: bibliographic formatting
//! - [`CitationStyle`]: supported output styles
//! - [`FifoCache`]: bounded in-memory cache with insertion-order eviction
//! - [`HttpClient`]: shared reqwest client with a per-request timeout
//! - [`RetryConfig`]: configuration for retry logic with exponential backoff
//! - [`with_retry`]: execute an operation with automatic retry on transient errors
//!
//! # Formatting
//!
//! ```rust
//! use citation_finder::models::PaperBuilder;
//! use citation_finder::utils::{format_citation, CitationStyle};
//!
//! let paper = PaperBuilder::new("Sleep and Memory")
//!     .author("Robert Stickgold")
//!     .year(2005)
//!     .venue("Nature")
//!     .build();
//!
//! assert_eq!(
//!     format_citation(&paper, CitationStyle::Apa),
//!     "Stickgold, R. (2005). Sleep and Memory *Nature*."
//! );
//! ```
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use citation_finder::models::SearchQuery;
//! use citation_finder::sources::{SemanticScholarSource, Source};
//! use citation_finder::utils::{with_retry, HttpClient, RetryConfig};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = SemanticScholarSource::new(HttpClient::with_timeout(Duration::from_secs(10))?);
//! let query = SearchQuery::new("sleep memory consolidation").limit(3);
//! let papers = with_retry(RetryConfig::default(), || source.search(&query)).await?;
//! # Ok(())
//! # }
//! ```

mod cache;
mod cite;
mod http;
mod retry;

pub use cache::{FifoCache, DEFAULT_DOI_CACHE_CAPACITY, DEFAULT_SEARCH_CACHE_CAPACITY};
pub use cite::{
    format_authors, format_bibtex, format_citation, format_ris, AuthorPolicy, CitationStyle,
    ListJoin, NameForm, Overflow, NO_DATE, UNKNOWN_AUTHOR, UNTITLED,
};
pub use http::{HttpClient, USER_AGENT};
pub use retry::{with_retry, RetryConfig, TransientError};
