//! # Citation Finder
//!
//! Detects sentences in a block of prose that make factual claims without a
//! citation, searches for academic papers supporting each claim, and formats
//! the candidates in common bibliographic styles.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`text`]: Sentence segmentation, claim detection and query building
//! - [`models`]: Core data structures (Paper, CitationRequest, SentenceResult, etc.)
//! - [`sources`]: Paper-search providers and DOI resolution
//! - [`search`]: Cached, filtered search on top of a provider
//! - [`finder`]: Concurrent orchestration from text to ordered results
//! - [`utils`]: Citation formatting, caching, retry and HTTP helpers
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal rendering for the command-line front end
//!
//! ## Example
//!
//! ```rust,no_run
//! use citation_finder::config::get_config;
//! use citation_finder::models::CitationRequest;
//! use citation_finder::CitationFinder;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let finder = CitationFinder::from_config(&get_config())?;
//! let results = finder
//!     .find_citations(
//!         "Studies show that regular exercise reduces cardiovascular disease.",
//!         &CitationRequest::default(),
//!     )
//!     .await?;
//! for result in results {
//!     println!("{} -> {}", result.sentence, result.citations[0].formatted);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod finder;
pub mod models;
pub mod search;
pub mod sources;
pub mod text;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use finder::{CitationFinder, CitationStream, FinderError};
pub use models::{CitationRequest, Paper, SentenceResult, StreamEvent};
pub use search::SearchClient;
pub use sources::{Source, SourceError};
pub use utils::CitationStyle;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
