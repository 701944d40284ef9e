//! Core data models for papers, search requests, and citation results.

mod paper;
mod result;
mod search;

pub use paper::{Author, ExternalIds, OpenAccessPdf, Paper, PaperBuilder};
pub use result::{CitationBundle, SentenceResult, StreamEvent};
pub use search::{
    CitationRequest, SearchFilters, SearchQuery, SortBy, DEFAULT_RESULTS_PER_SENTENCE,
    MAX_RESULTS_PER_SENTENCE,
};
