//! Search query construction from a flagged sentence.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Maximum number of space-separated terms in a query
pub const MAX_QUERY_TERMS: usize = 8;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "could", "should", "may", "might", "can", "it", "its",
    "this", "that", "these", "those", "not", "also", "which", "who", "studies", "research",
    "show", "shows", "shown", "suggest", "suggests", "evidence", "data", "indicates", "indicate",
    "demonstrate", "demonstrates", "according", "generally", "commonly", "widely", "significant",
    "significantly", "however", "therefore", "furthermore", "moreover", "although", "because",
    "such", "their", "they", "them", "there", "both", "each", "than", "then", "when", "where",
    "while", "thus", "since", "after",
];

static PHRASES: OnceLock<Regex> = OnceLock::new();
static WORDS: OnceLock<Regex> = OnceLock::new();

fn phrases() -> &'static Regex {
    PHRASES.get_or_init(|| {
        Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+\b").expect("phrase pattern is valid")
    })
}

fn words() -> &'static Regex {
    WORDS.get_or_init(|| Regex::new(r"\b[a-zA-Z]{4,}\b").expect("word pattern is valid"))
}

/// Check whether a lowercase word is a stop word
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Extract key terms from a sentence for a search query.
///
/// Capitalized multi-word phrases ("Machine Learning") come first as likely
/// domain concepts, then remaining content words of four or more letters,
/// longest first. Terms are deduplicated case-insensitively and the result
/// holds at most [`MAX_QUERY_TERMS`] space-separated terms. An empty string
/// means the sentence has nothing worth searching for.
pub fn build_query(sentence: &str) -> String {
    let mut seen: HashSet<String> = HashSet::new();
    let mut terms: Vec<String> = Vec::new();

    for phrase in phrases().find_iter(sentence) {
        let lowered: Vec<String> = phrase
            .as_str()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        if lowered.iter().all(|w| is_stop_word(w)) {
            continue;
        }
        if lowered.iter().any(|w| seen.contains(w)) {
            continue;
        }
        // A phrase longer than the remaining room is cut, not skipped.
        let room = MAX_QUERY_TERMS.saturating_sub(terms.len());
        if room == 0 {
            break;
        }

        terms.extend(phrase.as_str().split_whitespace().take(room).map(str::to_string));
        seen.extend(lowered.into_iter().take(room));
    }

    let mut content: Vec<String> = Vec::new();
    for word in words().find_iter(sentence) {
        let lower = word.as_str().to_lowercase();
        if is_stop_word(&lower) || seen.contains(&lower) {
            continue;
        }
        seen.insert(lower.clone());
        content.push(lower);
    }
    // Stable sort keeps first-occurrence order among equal lengths.
    content.sort_by(|a, b| b.len().cmp(&a.len()));

    let room = MAX_QUERY_TERMS.saturating_sub(terms.len());
    terms.extend(content.into_iter().take(room));
    terms.join(" ")
}
