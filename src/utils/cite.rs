//! Citation formatting in various styles.
//!
//! Supports APA, MLA, Chicago (author-date), IEEE, Harvard and Vancouver
//! narrative styles, plus BibTeX and RIS exports.
//!
//! The narrative styles share one author-list routine driven by a per-style
//! [`AuthorPolicy`]: how each name is written, how names are joined, and how
//! many authors are listed before truncating with "et al.".

use crate::models::Paper;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for a missing publication year
pub const NO_DATE: &str = "n.d.";

/// Placeholder for a missing title
pub const UNTITLED: &str = "Untitled";

/// Placeholder for an empty author list
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Citation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    /// APA 7th edition
    #[default]
    Apa,
    /// MLA 9th edition
    Mla,
    /// Chicago 17th edition (author-date)
    Chicago,
    /// IEEE
    Ieee,
    /// Harvard
    Harvard,
    /// Vancouver
    Vancouver,
    /// BibTeX
    Bibtex,
    /// RIS (Zotero, Mendeley, EndNote)
    Ris,
}

impl CitationStyle {
    /// Every supported style
    pub const ALL: [CitationStyle; 8] = [
        CitationStyle::Apa,
        CitationStyle::Mla,
        CitationStyle::Chicago,
        CitationStyle::Ieee,
        CitationStyle::Harvard,
        CitationStyle::Vancouver,
        CitationStyle::Bibtex,
        CitationStyle::Ris,
    ];

    /// Parse a style name case-insensitively; unknown names fall back to APA
    pub fn parse(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|style| style.id().eq_ignore_ascii_case(value.trim()))
            .unwrap_or_default()
    }

    /// Style identifier as accepted by [`CitationStyle::parse`]
    pub fn id(&self) -> &'static str {
        match self {
            CitationStyle::Apa => "apa",
            CitationStyle::Mla => "mla",
            CitationStyle::Chicago => "chicago",
            CitationStyle::Ieee => "ieee",
            CitationStyle::Harvard => "harvard",
            CitationStyle::Vancouver => "vancouver",
            CitationStyle::Bibtex => "bibtex",
            CitationStyle::Ris => "ris",
        }
    }

    /// Author-list policy for the narrative styles
    pub fn author_policy(&self) -> Option<AuthorPolicy> {
        let policy = match self {
            CitationStyle::Apa => APA_POLICY,
            CitationStyle::Mla => AuthorPolicy {
                first: NameForm::FamilyGiven,
                rest: NameForm::FamilyGiven,
                join: ListJoin::Comma,
                threshold: 1,
                overflow: Overflow::FirstOnly(", et al."),
            },
            CitationStyle::Chicago => AuthorPolicy {
                first: NameForm::FamilyGiven,
                rest: NameForm::GivenFamily,
                join: ListJoin::SerialAnd,
                threshold: 3,
                overflow: Overflow::FirstOnly(", et al."),
            },
            CitationStyle::Ieee => AuthorPolicy {
                first: NameForm::InitialsFamily,
                rest: NameForm::InitialsFamily,
                join: ListJoin::Comma,
                threshold: 3,
                overflow: Overflow::Leading(" et al."),
            },
            CitationStyle::Harvard => AuthorPolicy {
                first: NameForm::FamilyInitials { separator: "" },
                rest: NameForm::FamilyInitials { separator: "" },
                join: ListJoin::Comma,
                threshold: 3,
                overflow: Overflow::FirstOnly(" et al."),
            },
            CitationStyle::Vancouver => AuthorPolicy {
                first: NameForm::FamilyBareInitials,
                rest: NameForm::FamilyBareInitials,
                join: ListJoin::Comma,
                threshold: 6,
                overflow: Overflow::Leading(", et al."),
            },
            CitationStyle::Bibtex | CitationStyle::Ris => return None,
        };
        Some(policy)
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitationStyle::Apa => write!(f, "APA 7th"),
            CitationStyle::Mla => write!(f, "MLA 9th"),
            CitationStyle::Chicago => write!(f, "Chicago 17th"),
            CitationStyle::Ieee => write!(f, "IEEE"),
            CitationStyle::Harvard => write!(f, "Harvard"),
            CitationStyle::Vancouver => write!(f, "Vancouver"),
            CitationStyle::Bibtex => write!(f, "BibTeX"),
            CitationStyle::Ris => write!(f, "RIS"),
        }
    }
}

const APA_POLICY: AuthorPolicy = AuthorPolicy {
    first: NameForm::FamilyInitials { separator: " " },
    rest: NameForm::FamilyInitials { separator: " " },
    join: ListJoin::Ampersand,
    threshold: 6,
    overflow: Overflow::FirstOnly(", et al."),
};

/// How a single author name is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameForm {
    /// "Smith, John Michael"
    FamilyGiven,
    /// "John Michael Smith"
    GivenFamily,
    /// "Smith, J. M." (separator " ") or "Smith, J.M." (separator "")
    FamilyInitials { separator: &'static str },
    /// "J. M. Smith"
    InitialsFamily,
    /// "Smith JM"
    FamilyBareInitials,
}

/// How a multi-author list is joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListJoin {
    /// "A, B, & C"
    Ampersand,
    /// "A, B, and C"
    SerialAnd,
    /// "A, B, C"
    Comma,
}

/// What to write when there are more authors than the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// First author followed by the marker
    FirstOnly(&'static str),
    /// The first `threshold` authors followed by the marker
    Leading(&'static str),
}

/// Author-list formatting rules for one style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorPolicy {
    /// Form of the first author's name
    pub first: NameForm,
    /// Form of every later author's name
    pub rest: NameForm,
    pub join: ListJoin,
    /// Largest author count listed in full
    pub threshold: usize,
    pub overflow: Overflow,
}

impl AuthorPolicy {
    /// Format an author list
    pub fn format(&self, names: &[&str]) -> String {
        if names.is_empty() {
            return UNKNOWN_AUTHOR.to_string();
        }

        let render = |list: &[&str]| -> Vec<String> {
            list.iter()
                .enumerate()
                .map(|(i, name)| {
                    let form = if i == 0 { self.first } else { self.rest };
                    format_name(name, form)
                })
                .collect()
        };

        if names.len() <= self.threshold {
            return join_names(&render(names), self.join);
        }

        match self.overflow {
            Overflow::FirstOnly(marker) => format!("{}{}", format_name(names[0], self.first), marker),
            Overflow::Leading(marker) => {
                format!("{}{}", render(&names[..self.threshold]).join(", "), marker)
            }
        }
    }
}

/// Split a display name into given names and family name.
///
/// The last whitespace-separated token is the family name.
pub fn split_name(name: &str) -> (Vec<&str>, Option<&str>) {
    let mut parts: Vec<&str> = name.split_whitespace().collect();
    let family = parts.pop();
    (parts, family)
}

fn initials(given: &[&str]) -> Vec<char> {
    given.iter().filter_map(|p| p.chars().next()).collect()
}

fn format_name(name: &str, form: NameForm) -> String {
    let (given, family) = split_name(name);
    let Some(family) = family else {
        return name.trim().to_string();
    };
    if given.is_empty() {
        return family.to_string();
    }

    match form {
        NameForm::FamilyGiven => format!("{}, {}", family, given.join(" ")),
        NameForm::GivenFamily => format!("{} {}", given.join(" "), family),
        NameForm::FamilyInitials { separator } => {
            let initials: Vec<String> = initials(&given).iter().map(|c| format!("{}.", c)).collect();
            format!("{}, {}", family, initials.join(separator))
        }
        NameForm::InitialsFamily => {
            let initials: Vec<String> = initials(&given).iter().map(|c| format!("{}.", c)).collect();
            format!("{} {}", initials.join(" "), family)
        }
        NameForm::FamilyBareInitials => {
            let initials: String = initials(&given).into_iter().collect();
            format!("{} {}", family, initials)
        }
    }
}

fn join_names(names: &[String], join: ListJoin) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => match join {
            ListJoin::Ampersand => format!("{}, & {}", init.join(", "), last),
            ListJoin::SerialAnd => format!("{}, and {}", init.join(", "), last),
            ListJoin::Comma => names.join(", "),
        },
    }
}

/// Format a paper's author list in the given style
///
/// Export styles (BibTeX, RIS) have no narrative author list and use the APA form.
pub fn format_authors(paper: &Paper, style: CitationStyle) -> String {
    style
        .author_policy()
        .unwrap_or(APA_POLICY)
        .format(&paper.author_names())
}

fn year_label(paper: &Paper) -> String {
    paper
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| NO_DATE.to_string())
}

fn title_label(paper: &Paper) -> &str {
    paper.title().unwrap_or(UNTITLED)
}

/// Terminate with a period unless the text already ends in one ("et al.", "n.d.")
fn with_period(text: &str) -> String {
    if text.ends_with('.') {
        text.to_string()
    } else {
        format!("{}.", text)
    }
}

/// Format a paper citation in the specified style
pub fn format_citation(paper: &Paper, style: CitationStyle) -> String {
    match style {
        CitationStyle::Apa => format_apa(paper),
        CitationStyle::Mla => format_mla(paper),
        CitationStyle::Chicago => format_chicago(paper),
        CitationStyle::Ieee => format_ieee(paper),
        CitationStyle::Harvard => format_harvard(paper),
        CitationStyle::Vancouver => format_vancouver(paper),
        CitationStyle::Bibtex => format_bibtex(paper),
        CitationStyle::Ris => format_ris(paper),
    }
}

/// Format: Author, A. A., & Author, B. B. (Year). Title *Venue*.
fn format_apa(paper: &Paper) -> String {
    let authors = format_authors(paper, CitationStyle::Apa);
    let venue = paper.venue().map(|v| format!(" *{}*.", v)).unwrap_or_else(|| ".".to_string());
    format!("{} ({}). {}{}", authors, year_label(paper), title_label(paper), venue)
}

/// Format: Last, First, et al. "Title." *Venue*, Year.
fn format_mla(paper: &Paper) -> String {
    let authors = format_authors(paper, CitationStyle::Mla);
    let venue = paper.venue().map(|v| format!(" *{}*,", v)).unwrap_or_else(|| ",".to_string());
    format!(
        "{} \"{}.\"{} {}",
        with_period(&authors),
        title_label(paper),
        venue,
        with_period(&year_label(paper))
    )
}

/// Format: Last, First, and First Last. "Title." *Venue*. Year.
fn format_chicago(paper: &Paper) -> String {
    let authors = format_authors(paper, CitationStyle::Chicago);
    let venue = paper.venue().map(|v| format!(" *{}*.", v)).unwrap_or_else(|| ".".to_string());
    format!(
        "{} \"{}.\"{} {}",
        with_period(&authors),
        title_label(paper),
        venue,
        with_period(&year_label(paper))
    )
}

/// Format: F. Last, F. Last, "Title", *Venue*, Year.
fn format_ieee(paper: &Paper) -> String {
    let authors = format_authors(paper, CitationStyle::Ieee);
    let venue = paper.venue().map(|v| format!(", *{}*", v)).unwrap_or_default();
    format!(
        "{}, \"{}\"{}, {}",
        authors,
        title_label(paper),
        venue,
        with_period(&year_label(paper))
    )
}

/// Format: Last, F. (Year) 'Title', *Venue*.
fn format_harvard(paper: &Paper) -> String {
    let authors = format_authors(paper, CitationStyle::Harvard);
    let venue = paper.venue().map(|v| format!(", *{}*", v)).unwrap_or_default();
    format!("{} ({}) '{}'{}.", authors, year_label(paper), title_label(paper), venue)
}

/// Format: Last F, Last F. Title. Venue. Year.
fn format_vancouver(paper: &Paper) -> String {
    let authors = format_authors(paper, CitationStyle::Vancouver);
    let venue = paper.venue().map(|v| format!(". {}", v)).unwrap_or_default();
    format!(
        "{} {}{}. {}",
        with_period(&authors),
        title_label(paper),
        venue,
        with_period(&year_label(paper))
    )
}

/// Generate a BibTeX entry
/// Format: @article{key,
///   author  = {First Last and First Last},
///   title   = {Title},
///   year    = {Year},
///   journal = {Venue},
///   doi     = {DOI},
/// }
pub fn format_bibtex(paper: &Paper) -> String {
    let year = year_label(paper);
    let key_author = paper
        .authors
        .first()
        .and_then(|a| split_name(a.display_name()).1)
        .map(|family| family.to_lowercase())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("{}{}", key_author, year);

    let names: Vec<&str> = paper.author_names().into_iter().filter(|n| !n.is_empty()).collect();
    let authors = if names.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        names.join(" and ")
    };

    let mut lines = vec![
        format!("@article{{{},", key),
        format!("  author  = {{{}}},", authors),
        format!("  title   = {{{}}},", title_label(paper)),
        format!("  year    = {{{}}},", year),
    ];
    if let Some(venue) = paper.venue() {
        lines.push(format!("  journal = {{{}}},", venue));
    }
    if let Some(doi) = paper.doi() {
        lines.push(format!("  doi     = {{{}}},", doi));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

/// Generate an RIS entry, one tagged line per field, ending with `ER  - `
pub fn format_ris(paper: &Paper) -> String {
    let mut lines = vec!["TY  - JOUR".to_string()];
    for author in &paper.authors {
        let name = author.display_name().trim();
        match split_name(name) {
            (given, Some(family)) if !given.is_empty() => {
                lines.push(format!("AU  - {}, {}", family, given.join(" ")))
            }
            _ if !name.is_empty() => lines.push(format!("AU  - {}", name)),
            _ => {}
        }
    }
    lines.push(format!("TI  - {}", title_label(paper)));
    if let Some(venue) = paper.venue() {
        lines.push(format!("JO  - {}", venue));
    }
    if let Some(year) = paper.year {
        lines.push(format!("PY  - {}", year));
    }
    if let Some(doi) = paper.doi() {
        lines.push(format!("DO  - {}", doi));
    }
    if let Some(url) = paper.pdf_url().or_else(|| paper.url()) {
        lines.push(format!("UR  - {}", url));
    }
    lines.push("ER  - ".to_string());
    lines.join("\n")
}
