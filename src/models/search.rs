//! Search request models: provider queries, result filters, and the
//! citation request accepted by the finder.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::CitationStyle;

/// Default number of citations suggested per sentence
pub const DEFAULT_RESULTS_PER_SENTENCE: usize = 3;

/// Upper bound for citations suggested per sentence
pub const MAX_RESULTS_PER_SENTENCE: usize = 10;

/// Result ordering applied after the provider responds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Most-cited first (missing counts sort as zero)
    #[default]
    Citations,
    /// Keep the provider's relevance order
    Relevance,
}

impl SortBy {
    /// Parse a sort mode; anything unrecognised falls back to citations
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "relevance" => SortBy::Relevance,
            _ => SortBy::Citations,
        }
    }
}

/// Parameters sent to the paper-search provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query
    pub query: String,

    /// Maximum number of results to request
    pub limit: usize,

    /// Year range filter in "YYYY-YYYY" form
    pub year: Option<String>,

    /// Fields of study to restrict to
    pub fields_of_study: Vec<String>,
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_RESULTS_PER_SENTENCE,
            year: None,
            fields_of_study: Vec::new(),
        }
    }

    /// Set the result limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the year range
    pub fn year_range(mut self, start: i32, end: i32) -> Self {
        self.year = Some(format!("{}-{}", start, end));
        self
    }

    /// Set the fields of study
    pub fn fields_of_study(mut self, fields: Vec<String>) -> Self {
        self.fields_of_study = fields;
        self
    }
}

/// Everything that shapes a search result list besides the query text.
///
/// Together with the query string this is the search cache key, so every
/// field must take part in equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Inclusive publication year range
    pub year_range: Option<(i32, i32)>,

    /// Venue allow-list (case-insensitive substring match, soft)
    pub sources: Vec<String>,

    /// Number of results requested from the provider
    pub limit: usize,

    /// Keep only papers with an open-access PDF
    pub open_access_only: bool,

    /// Provider-side field-of-study restriction
    pub fields_of_study: Vec<String>,

    /// Citation-count floor (soft); zero disables it
    pub min_citation_count: u32,

    /// Result ordering
    pub sort_by: SortBy,
}

impl SearchFilters {
    /// Build the provider query for this filter set
    pub fn provider_query(&self, query: &str) -> SearchQuery {
        let mut search = SearchQuery::new(query)
            .limit(self.limit)
            .fields_of_study(self.fields_of_study.clone());
        if let Some((start, end)) = self.year_range {
            search = search.year_range(start, end);
        }
        search
    }
}

/// A request to find citations for a block of text.
///
/// Deserialization goes through the clamping builders, so out-of-range counts
/// are pulled into bounds rather than accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RequestFields")]
pub struct CitationRequest {
    /// Citation style for the `formatted` field
    pub format: CitationStyle,

    /// Inclusive publication year range
    pub year_range: Option<(i32, i32)>,

    /// Venue allow-list
    pub sources: Vec<String>,

    /// Citations to return per sentence, within 1..=10.
    ///
    /// Read it through [`CitationRequest::per_sentence`], which re-clamps
    /// values assigned directly.
    pub results_per_sentence: usize,

    /// Only suggest papers with an open-access PDF
    pub open_access_only: bool,

    /// Fields of study passed to the provider
    pub fields_of_study: Vec<String>,

    /// Minimum citation count (soft)
    pub min_citation_count: u32,

    /// Result ordering
    pub sort_by: SortBy,
}

impl Default for CitationRequest {
    fn default() -> Self {
        Self {
            format: CitationStyle::default(),
            year_range: None,
            sources: Vec::new(),
            results_per_sentence: DEFAULT_RESULTS_PER_SENTENCE,
            open_access_only: false,
            fields_of_study: Vec::new(),
            min_citation_count: 0,
            sort_by: SortBy::default(),
        }
    }
}

impl CitationRequest {
    /// Create a request with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the citation style
    pub fn format(mut self, format: CitationStyle) -> Self {
        self.format = format;
        self
    }

    /// Set the inclusive year range
    pub fn year_range(mut self, start: i32, end: i32) -> Self {
        self.year_range = Some((start, end));
        self
    }

    /// Set the venue allow-list; blank entries are dropped
    pub fn sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sources = clean_list(sources);
        self
    }

    /// Set citations per sentence, clamped to 1..=10
    pub fn results_per_sentence(mut self, count: i64) -> Self {
        self.results_per_sentence = count.clamp(1, MAX_RESULTS_PER_SENTENCE as i64) as usize;
        self
    }

    /// Restrict to open-access papers
    pub fn open_access_only(mut self, enabled: bool) -> Self {
        self.open_access_only = enabled;
        self
    }

    /// Set the fields of study; blank entries are dropped
    pub fn fields_of_study<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields_of_study = clean_list(fields);
        self
    }

    /// Set the citation floor, clamped at zero
    pub fn min_citation_count(mut self, count: i64) -> Self {
        self.min_citation_count = count.clamp(0, u32::MAX as i64) as u32;
        self
    }

    /// Set result ordering
    pub fn sort_by(mut self, sort: SortBy) -> Self {
        self.sort_by = sort;
        self
    }

    /// Citations per sentence, within 1..=10
    pub fn per_sentence(&self) -> usize {
        self.results_per_sentence.clamp(1, MAX_RESULTS_PER_SENTENCE)
    }

    /// Number of papers to ask the provider for.
    ///
    /// Open-access filtering happens after the provider responds, so we
    /// over-fetch to leave enough survivors.
    pub fn fetch_limit(&self) -> usize {
        if self.open_access_only {
            self.per_sentence() * 3
        } else {
            self.per_sentence()
        }
    }

    /// Filters for the search client
    pub fn search_filters(&self) -> SearchFilters {
        SearchFilters {
            year_range: self.year_range,
            sources: self.sources.clone(),
            limit: self.fetch_limit(),
            open_access_only: self.open_access_only,
            fields_of_study: self.fields_of_study.clone(),
            min_citation_count: self.min_citation_count,
            sort_by: self.sort_by,
        }
    }

    /// Build a request from loosely typed JSON, as posted by a web form.
    ///
    /// Malformed values fall back to defaults instead of failing: numbers may
    /// arrive as strings, list fields as comma-joined strings or arrays, and a
    /// year range is only applied when both bounds parse.
    pub fn from_json(value: &Value) -> Self {
        let mut request = Self::new();

        if let Some(format) = value.get("format").and_then(Value::as_str) {
            request.format = CitationStyle::parse(format);
        }

        let start = value.get("year_start").and_then(as_i64);
        let end = value.get("year_end").and_then(as_i64);
        if let (Some(start), Some(end)) = (start, end) {
            if let (Ok(start), Ok(end)) = (i32::try_from(start), i32::try_from(end)) {
                request.year_range = Some((start, end));
            }
        }

        if let Some(sources) = value.get("sources") {
            request.sources = as_list(sources);
        }
        if let Some(fields) = value.get("fields_of_study") {
            request.fields_of_study = as_list(fields);
        }

        request = match value.get("results_per_sentence").and_then(as_i64) {
            Some(count) => request.results_per_sentence(count),
            None => request,
        };
        request = match value.get("min_citation_count").and_then(as_i64) {
            Some(count) => request.min_citation_count(count),
            None => request,
        };

        request.open_access_only = value
            .get("open_access_only")
            .map(is_truthy)
            .unwrap_or(false);

        if let Some(sort) = value.get("sort_by").and_then(Value::as_str) {
            request.sort_by = SortBy::parse(sort);
        }

        request
    }
}

/// Wire shape of [`CitationRequest`]; counts are signed so negative input clamps
#[derive(Deserialize)]
#[serde(default)]
struct RequestFields {
    format: CitationStyle,
    year_range: Option<(i32, i32)>,
    sources: Vec<String>,
    results_per_sentence: i64,
    open_access_only: bool,
    fields_of_study: Vec<String>,
    min_citation_count: i64,
    sort_by: SortBy,
}

impl Default for RequestFields {
    fn default() -> Self {
        Self {
            format: CitationStyle::default(),
            year_range: None,
            sources: Vec::new(),
            results_per_sentence: DEFAULT_RESULTS_PER_SENTENCE as i64,
            open_access_only: false,
            fields_of_study: Vec::new(),
            min_citation_count: 0,
            sort_by: SortBy::default(),
        }
    }
}

impl From<RequestFields> for CitationRequest {
    fn from(fields: RequestFields) -> Self {
        let mut request = CitationRequest::new()
            .format(fields.format)
            .sources(fields.sources)
            .results_per_sentence(fields.results_per_sentence)
            .open_access_only(fields.open_access_only)
            .fields_of_study(fields.fields_of_study)
            .min_citation_count(fields.min_citation_count)
            .sort_by(fields.sort_by);
        request.year_range = fields.year_range;
        request
    }
}

fn clean_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => clean_list(s.split(',')),
        Value::Array(items) => clean_list(items.iter().filter_map(Value::as_str)),
        _ => Vec::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}
