//! Terminal rendering for the command-line front end.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::models::{CitationBundle, SentenceResult};
use crate::text::Candidate;

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Warning,
    Info,
    Search,
}

/// Status icons for different outcomes.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
    }
}

/// Format a count with thousands separators.
pub fn format_number(n: u32) -> String {
    n.to_string()
        .chars()
        .rev()
        .collect::<Vec<_>>()
        .chunks(3)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
        .chars()
        .rev()
        .collect()
}

/// Truncate text to at most `max_chars` characters, ending in "..." when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if max_chars <= 3 {
        return "...".to_string();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", kept.trim_end())
}

/// Heading line for a run.
pub fn render_header(status: Status, message: &str) -> String {
    let icon = status_icon(status);
    match status {
        Status::Success => format!("{} {}", icon.green().bold(), message),
        Status::Warning => format!("{} {}", icon.yellow().bold(), message),
        Status::Info => format!("{} {}", icon.cyan().bold(), message),
        Status::Search => format!("{} {}", icon.yellow(), message),
    }
}

fn render_bundle(position: usize, bundle: &CitationBundle) -> String {
    let mut lines = vec![format!("  {}. {}", position, bundle.formatted)];

    let mut facts = Vec::new();
    if let Some(count) = bundle.citation_count {
        facts.push(format!("{} citations", format_number(count)));
    }
    if !bundle.doi.is_empty() {
        let mark = match bundle.doi_valid {
            Some(true) => "✓".green().to_string(),
            Some(false) => "✗".red().to_string(),
            None => "?".dimmed().to_string(),
        };
        facts.push(format!("doi:{} {}", bundle.doi, mark));
    }
    if !bundle.pdf_url.is_empty() {
        facts.push("open access".green().to_string());
    }
    if !facts.is_empty() {
        lines.push(format!("     {}", facts.join(" · ").dimmed()));
    }
    if !bundle.url.is_empty() {
        lines.push(format!("     {}", bundle.url.blue()));
    }
    lines.join("\n")
}

/// Render one sentence with its suggested citations.
pub fn render_result(index: usize, result: &SentenceResult) -> String {
    let mut lines = vec![
        format!(
            "{} {}",
            format!("[{}]", index + 1).bold().cyan(),
            truncate_with_ellipsis(&result.sentence, 160)
        ),
        format!(
            "    {} {}   {} {}",
            "reason:".dimmed(),
            result.reason.label().yellow(),
            "query:".dimmed(),
            result.query.italic()
        ),
    ];
    for (i, bundle) in result.citations.iter().enumerate() {
        lines.push(render_bundle(i + 1, bundle));
    }
    lines.join("\n")
}

/// Render a flagged sentence without search results.
pub fn render_candidate(index: usize, candidate: &Candidate) -> String {
    format!(
        "{} {}\n    {} {}   {} {}",
        format!("[{}]", index + 1).bold().cyan(),
        candidate.sentence,
        "reason:".dimmed(),
        candidate.reason.label().yellow(),
        "query:".dimmed(),
        candidate.query.italic()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ClaimReason;

    fn bundle() -> CitationBundle {
        CitationBundle {
            formatted: "Smith, J. (2019). Exercise and Heart Health *Circulation*.".to_string(),
            doi: "10.1/heart".to_string(),
            doi_valid: Some(true),
            url: "https://doi.org/10.1/heart".to_string(),
            citation_count: Some(12345),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Search), "🔍");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 3), "...");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1000000), "1,000,000");
        assert_eq!(format_number(123), "123");
    }

    #[test]
    fn test_render_result() {
        let result = SentenceResult {
            sentence: "Studies show that regular exercise reduces cardiovascular disease.".to_string(),
            query: "cardiovascular exercise".to_string(),
            reason: ClaimReason::StudiesClaim,
            citations: vec![bundle()],
        };
        let rendered = render_result(0, &result);
        assert!(rendered.contains("Studies show that regular exercise"));
        assert!(rendered.contains("Studies claim"));
        assert!(rendered.contains("Smith, J. (2019)"));
        assert!(rendered.contains("12,345 citations"));
        assert!(rendered.contains("https://doi.org/10.1/heart"));
    }

    #[test]
    fn test_render_candidate() {
        let candidate = Candidate {
            sentence: "Obesity is strongly correlated with diabetes in adults.".to_string(),
            reason: ClaimReason::CorrelationClaim,
            query: "obesity strongly correlated diabetes adults".to_string(),
        };
        let rendered = render_candidate(2, &candidate);
        assert!(rendered.contains("[3]"));
        assert!(rendered.contains("Correlation claim"));
    }
}
