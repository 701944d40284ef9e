//! Rule-based sentence segmentation.

use regex::Regex;
use std::sync::OnceLock;

/// Fragments at or below this many characters are dropped
pub const MIN_SENTENCE_CHARS: usize = 20;

const MASK: char = '\u{0}';

static ABBREVIATIONS: OnceLock<Regex> = OnceLock::new();
static INITIALS: OnceLock<Regex> = OnceLock::new();
static BOUNDARY: OnceLock<Regex> = OnceLock::new();

fn abbreviations() -> &'static Regex {
    ABBREVIATIONS.get_or_init(|| {
        Regex::new(
            r"(?i)\b(Dr|Mr|Mrs|Ms|Prof|Sr|Jr|vs|etc|al|Fig|et|cf|vol|no|pp|ed|eds|rev|dept|univ|govt|corp|inc|ltd|approx|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\.",
        )
        .expect("abbreviation pattern is valid")
    })
}

fn initials() -> &'static Regex {
    INITIALS.get_or_init(|| Regex::new(r"\b([A-Z])\.").expect("initials pattern is valid"))
}

fn boundary() -> &'static Regex {
    // The trailing class is a single ASCII byte, which `split_sentences` relies on.
    BOUNDARY.get_or_init(|| Regex::new(r#"[.!?]\s+["'A-Z0-9]"#).expect("boundary pattern is valid"))
}

/// Split text into sentences, avoiding splits after abbreviations and initials.
///
/// A boundary is `.`, `!` or `?` followed by whitespace and then an uppercase
/// letter, digit, or quote. Trimmed fragments of 20 characters or fewer are
/// discarded.
pub fn split_sentences(text: &str) -> Vec<String> {
    let masked = abbreviations().replace_all(text, |caps: &regex::Captures| {
        format!("{}{}", &caps[1], MASK)
    });
    let masked = initials().replace_all(&masked, |caps: &regex::Captures| {
        format!("{}{}", &caps[1], MASK)
    });

    let mut parts = Vec::new();
    let mut start = 0;
    for m in boundary().find_iter(&masked) {
        parts.push(&masked[start..m.start() + 1]);
        start = m.end() - 1;
    }
    parts.push(&masked[start..]);

    parts
        .into_iter()
        .map(|part| part.replace(MASK, ".").trim().to_string())
        .filter(|part| part.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_split() {
        let parts = split_sentences("Climate change is a global problem. Temperatures are rising fast.");
        assert_eq!(
            parts,
            vec!["Climate change is a global problem.", "Temperatures are rising fast."]
        );
    }

    #[test]
    fn test_title_abbreviation_does_not_split() {
        let parts = split_sentences(
            "Dr. Smith found that climate change is significant. Temperatures are rising.",
        );
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("Dr. Smith"));
    }

    #[test]
    fn test_et_al_does_not_split() {
        let parts = split_sentences(
            "Jones et al. reported a 30% increase in mortality rates. These findings have broad implications for public health.",
        );
        assert_eq!(parts.len(), 2);
        assert!(parts[0].contains("et al. reported"));
    }

    #[test]
    fn test_vs_does_not_split() {
        let parts = split_sentences(
            "The study compared treatment A vs. treatment B in a clinical trial. Results were significant.",
        );
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_initials_do_not_split() {
        let parts = split_sentences("The theory proposed by J. R. Tolkien was reviewed at length.");
        assert_eq!(parts, vec!["The theory proposed by J. R. Tolkien was reviewed at length."]);
    }

    #[test]
    fn test_short_fragments_excluded() {
        let parts = split_sentences(
            "Hi. Studies show that increased physical activity significantly reduces cardiovascular risk.",
        );
        assert_eq!(parts.len(), 1);
        assert!(parts.iter().all(|p| p.chars().count() > MIN_SENTENCE_CHARS));
    }

    #[test]
    fn test_question_exclamation_and_quotes() {
        let parts = split_sentences(
            "Why does the climate keep warming? \"Greenhouse gases\" are the main driver! 2023 was the hottest year recorded.",
        );
        assert_eq!(parts.len(), 3);
        assert!(parts[1].starts_with('"'));
        assert!(parts[2].starts_with("2023"));
    }

    #[test]
    fn test_lowercase_after_period_does_not_split() {
        let parts = split_sentences("Values rose by approx. ten percent over the period. e.g. this one stays attached to the previous sentence.");
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t ").is_empty());
    }
}
