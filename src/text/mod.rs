//! Text analysis: sentence segmentation, claim detection, and query building.
//!
//! - [`split_sentences`]: rule-based segmenter that ignores abbreviations and initials
//! - [`ClaimDetector`]: ordered rule table assigning a [`ClaimReason`] to uncited claims
//! - [`build_query`]: bounded search query from a flagged sentence
//! - [`analyze`]: the three steps together, yielding search [`Candidate`]s
//!
//! ```rust
//! use citation_finder::text::{analyze, ClaimReason};
//!
//! let candidates = analyze("Studies show that exercise reduces cardiovascular risk. The sky is blue.");
//! assert_eq!(candidates.len(), 1);
//! assert_eq!(candidates[0].reason, ClaimReason::StudiesClaim);
//! ```

mod detect;
mod query;
mod segment;

pub use detect::{citation_reason, needs_citation, ClaimDetector, ClaimReason, ClaimRule};
pub use query::{build_query, is_stop_word, MAX_QUERY_TERMS};
pub use segment::{split_sentences, MIN_SENTENCE_CHARS};

use serde::Serialize;

/// A flagged sentence with the query that will be searched for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub sentence: String,
    pub reason: ClaimReason,
    pub query: String,
}

/// Find the sentences worth searching, in source order, using the built-in rules
pub fn analyze(text: &str) -> Vec<Candidate> {
    analyze_with(text, ClaimDetector::standard())
}

/// Like [`analyze`] with a custom detector.
///
/// Sentences with no claim, or whose query comes out empty, are dropped.
pub fn analyze_with(text: &str, detector: &ClaimDetector) -> Vec<Candidate> {
    split_sentences(text)
        .into_iter()
        .filter_map(|sentence| {
            let reason = detector.classify(&sentence)?;
            let query = build_query(&sentence);
            if query.is_empty() {
                return None;
            }
            Some(Candidate {
                sentence,
                reason,
                query,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_keeps_source_order() {
        let text = "Studies show that exercise reduces cardiovascular risk. \
                    The sky is blue and the grass is green. \
                    Obesity is strongly correlated with diabetes in adults.";
        let candidates = analyze(text);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].sentence.starts_with("Studies show"));
        assert!(candidates[1].sentence.starts_with("Obesity"));
        assert_eq!(candidates[1].reason, ClaimReason::CorrelationClaim);
    }

    #[test]
    fn test_analyze_drops_cited_sentences() {
        let candidates = analyze("Studies show that exercise reduces cardiovascular risk [4].");
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_analyze_drops_empty_queries() {
        // Flagged by the percentage rule, but every word is too short or a stop word.
        let candidates = analyze("It was 40% and so it is for all of us.");
        assert!(candidates.is_empty());
    }
}
