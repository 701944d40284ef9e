//! Paper record as returned by the paper-search provider.

use serde::{Deserialize, Serialize};

/// A single author entry; order within a paper is significant (first author is primary)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    /// Display name, usually "Given Family"
    #[serde(default)]
    pub name: Option<String>,
}

impl Author {
    /// Create an author from a display name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// The display name, or an empty string when the provider omitted it
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// External identifiers attached to a paper
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExternalIds {
    /// Digital Object Identifier
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,
}

/// Open-access PDF link
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpenAccessPdf {
    #[serde(default)]
    pub url: Option<String>,
}

/// A research paper from the search provider
///
/// Field names follow the provider's JSON so records deserialize without an
/// intermediate type. Every field besides the author list is optional because
/// the provider omits or nulls them freely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// Provider paper identifier
    #[serde(default)]
    pub paper_id: Option<String>,

    /// Paper title
    #[serde(default)]
    pub title: Option<String>,

    /// Authors in publication order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<Author>,

    /// Publication year
    #[serde(default)]
    pub year: Option<i32>,

    /// Journal or conference name
    #[serde(default)]
    pub venue: Option<String>,

    /// DOI and other identifiers
    #[serde(default)]
    pub external_ids: Option<ExternalIds>,

    /// Abstract text
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,

    /// Canonical landing page URL
    #[serde(default)]
    pub url: Option<String>,

    /// Open-access PDF, when one exists
    #[serde(default)]
    pub open_access_pdf: Option<OpenAccessPdf>,

    /// Number of citing papers
    #[serde(default)]
    pub citation_count: Option<u32>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Author>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Author>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Paper {
    /// The DOI, if present and non-empty
    pub fn doi(&self) -> Option<&str> {
        self.external_ids
            .as_ref()
            .and_then(|ids| ids.doi.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// The venue, if present and non-empty
    pub fn venue(&self) -> Option<&str> {
        self.venue.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// The title, if present and non-empty
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// The landing page URL, if present and non-empty
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    /// The open-access PDF URL, if one is exposed
    pub fn pdf_url(&self) -> Option<&str> {
        self.open_access_pdf
            .as_ref()
            .and_then(|p| p.url.as_deref())
            .filter(|u| !u.is_empty())
    }

    /// Check if paper has an open-access PDF
    pub fn is_open_access(&self) -> bool {
        self.pdf_url().is_some()
    }

    /// Citation count with missing treated as zero
    pub fn citations_or_zero(&self) -> u32 {
        self.citation_count.unwrap_or(0)
    }

    /// Returns the author names as a vector
    pub fn author_names(&self) -> Vec<&str> {
        self.authors.iter().map(Author::display_name).collect()
    }
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone, Default)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    /// Create a new builder with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            paper: Paper {
                title: Some(title.into()),
                ..Default::default()
            },
        }
    }

    /// Set the provider identifier
    pub fn paper_id(mut self, id: impl Into<String>) -> Self {
        self.paper.paper_id = Some(id.into());
        self
    }

    /// Append an author
    pub fn author(mut self, name: impl Into<String>) -> Self {
        self.paper.authors.push(Author::new(name));
        self
    }

    /// Set all authors at once
    pub fn authors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paper.authors = names.into_iter().map(Author::new).collect();
        self
    }

    /// Set publication year
    pub fn year(mut self, year: i32) -> Self {
        self.paper.year = Some(year);
        self
    }

    /// Set venue
    pub fn venue(mut self, venue: impl Into<String>) -> Self {
        self.paper.venue = Some(venue.into());
        self
    }

    /// Set DOI
    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.paper.external_ids = Some(ExternalIds {
            doi: Some(doi.into()),
        });
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.paper.abstract_text = Some(abstract_text.into());
        self
    }

    /// Set landing page URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.paper.url = Some(url.into());
        self
    }

    /// Set open-access PDF URL
    pub fn pdf_url(mut self, url: impl Into<String>) -> Self {
        self.paper.open_access_pdf = Some(OpenAccessPdf {
            url: Some(url.into()),
        });
        self
    }

    /// Set citation count
    pub fn citations(mut self, count: u32) -> Self {
        self.paper.citation_count = Some(count);
        self
    }

    /// Build the Paper
    pub fn build(self) -> Paper {
        self.paper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_builder() {
        let paper = PaperBuilder::new("Test Paper")
            .authors(["John Doe", "Jane Smith"])
            .doi("10.1234/test.1234")
            .pdf_url("https://example.com/paper.pdf")
            .citations(42)
            .build();

        assert_eq!(paper.title(), Some("Test Paper"));
        assert_eq!(paper.author_names(), vec!["John Doe", "Jane Smith"]);
        assert_eq!(paper.doi(), Some("10.1234/test.1234"));
        assert!(paper.is_open_access());
        assert_eq!(paper.citations_or_zero(), 42);
    }

    #[test]
    fn test_deserialize_provider_record() {
        let json = r#"{
            "paperId": "abc123",
            "title": "Exercise and the Heart",
            "authors": [{"authorId": "1", "name": "John Smith"}, {"name": "Jane Doe"}],
            "year": 2021,
            "venue": "Journal of Medicine",
            "externalIds": {"DOI": "10.1000/xyz", "CorpusId": 42},
            "abstract": null,
            "url": "https://www.semanticscholar.org/paper/abc123",
            "openAccessPdf": {"url": "https://example.org/p.pdf", "status": "GREEN"},
            "citationCount": 17
        }"#;

        let paper: Paper = serde_json::from_str(json).unwrap();
        assert_eq!(paper.paper_id.as_deref(), Some("abc123"));
        assert_eq!(paper.author_names(), vec!["John Smith", "Jane Doe"]);
        assert_eq!(paper.year, Some(2021));
        assert_eq!(paper.doi(), Some("10.1000/xyz"));
        assert_eq!(paper.pdf_url(), Some("https://example.org/p.pdf"));
        assert_eq!(paper.citation_count, Some(17));
        assert!(paper.abstract_text.is_none());
    }

    #[test]
    fn test_sparse_record_defaults() {
        let paper: Paper = serde_json::from_str(r#"{"authors": null, "venue": ""}"#).unwrap();
        assert!(paper.authors.is_empty());
        assert!(paper.title().is_none());
        assert!(paper.venue().is_none());
        assert!(paper.doi().is_none());
        assert!(!paper.is_open_access());
        assert_eq!(paper.citations_or_zero(), 0);
    }
}
