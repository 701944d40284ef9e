//! Filtered, cached paper search on top of a [`Source`].
//!
//! [`SearchClient::search`] never fails: provider errors are retried when
//! transient, logged, and reported as an empty list so one bad query cannot
//! sink a whole document.

use std::sync::Arc;

use crate::models::{Paper, SearchFilters, SortBy};
use crate::sources::Source;
use crate::utils::{with_retry, FifoCache, RetryConfig, DEFAULT_SEARCH_CACHE_CAPACITY};

type CacheKey = (String, SearchFilters);

/// Search client owning the provider, the retry policy and the result cache
#[derive(Debug)]
pub struct SearchClient {
    source: Arc<dyn Source>,
    cache: FifoCache<CacheKey, Vec<Paper>>,
    retry: RetryConfig,
}

impl SearchClient {
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self {
            source,
            cache: FifoCache::new(DEFAULT_SEARCH_CACHE_CAPACITY),
            retry: RetryConfig::default(),
        }
    }

    /// Replace the result cache with one of the given capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = FifoCache::new(capacity);
        self
    }

    /// Set the retry policy for provider calls
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The underlying provider
    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }

    /// Search for papers, applying the filters in `filters`.
    ///
    /// Results are cached per (query, filters) after filtering, including
    /// empty lists. Provider failures are not cached, so a failed search is
    /// attempted again on the next call.
    pub async fn search(&self, query: &str, filters: &SearchFilters) -> Vec<Paper> {
        let key = (query.to_string(), filters.clone());
        if let Some(papers) = self.cache.get(&key) {
            tracing::debug!(query, "Search cache hit");
            return papers;
        }

        let provider_query = filters.provider_query(query);
        let source = &self.source;
        let fetched = with_retry(self.retry, || source.search(&provider_query)).await;

        let papers = match fetched {
            Ok(papers) => apply_filters(papers, filters),
            Err(e) => {
                tracing::warn!(query, source = source.id(), error = %e, "Search failed");
                return Vec::new();
            }
        };

        tracing::info!(query, count = papers.len(), "Search complete");
        self.cache.insert(key, papers.clone());
        papers
    }

    /// Number of cached result lists
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Forget every cached result list
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Post-process provider results, in order:
///
/// 1. open-access filter (hard)
/// 2. venue allow-list by case-insensitive substring (soft: ignored if nothing matches)
/// 3. stable sort by citation count, descending, when sorting by citations
/// 4. citation floor (soft: ignored if nothing qualifies)
pub fn apply_filters(mut papers: Vec<Paper>, filters: &SearchFilters) -> Vec<Paper> {
    if filters.open_access_only {
        papers.retain(Paper::is_open_access);
    }

    if !filters.sources.is_empty() {
        let wanted: Vec<String> = filters.sources.iter().map(|s| s.to_lowercase()).collect();
        let matching: Vec<Paper> = papers
            .iter()
            .filter(|p| {
                let venue = p.venue.as_deref().unwrap_or("").to_lowercase();
                wanted.iter().any(|w| venue.contains(w.as_str()))
            })
            .cloned()
            .collect();
        if !matching.is_empty() {
            papers = matching;
        }
    }

    if filters.sort_by == SortBy::Citations {
        papers.sort_by(|a, b| b.citations_or_zero().cmp(&a.citations_or_zero()));
    }

    if filters.min_citation_count > 0 {
        let floor = filters.min_citation_count;
        let qualifying: Vec<Paper> = papers
            .iter()
            .filter(|p| p.citations_or_zero() >= floor)
            .cloned()
            .collect();
        if !qualifying.is_empty() {
            papers = qualifying;
        }
    }

    papers
}
