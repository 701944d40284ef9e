//! Output models: formatted citations and per-sentence results.

use serde::{Deserialize, Serialize};

use crate::text::ClaimReason;

/// One paper rendered for a request: the requested style plus fixed exports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationBundle {
    /// Citation in the requested style
    pub formatted: String,

    /// BibTeX entry
    pub bibtex: String,

    /// RIS entry
    pub ris: String,

    pub title: String,

    pub year: Option<i32>,

    pub venue: String,

    pub doi: String,

    /// Whether the DOI resolved; `None` when there is no DOI or the check failed
    pub doi_valid: Option<bool>,

    /// Landing page, falling back to the resolved DOI link
    pub url: String,

    pub pdf_url: String,

    pub citation_count: Option<u32>,

    pub r#abstract: String,
}

/// Suggested citations for one flagged sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceResult {
    /// The sentence as it appears in the input
    pub sentence: String,

    /// Query sent to the provider
    pub query: String,

    /// Why the sentence was flagged
    pub reason: ClaimReason,

    /// Never empty: sentences without citations are omitted from results
    pub citations: Vec<CitationBundle>,
}

/// Event emitted by the streaming finder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum StreamEvent {
    /// A sentence finished; `index` is its position among searched candidates
    Result {
        index: usize,
        result: SentenceResult,
    },
    /// All searches have completed
    Done,
}
