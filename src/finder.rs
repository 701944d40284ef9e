//! Citation orchestration: from raw text to ordered citation suggestions.
//!
//! Flagged sentences are searched concurrently, gated by a semaphore. The
//! synchronous API buffers index-tagged results and replays them in source
//! order; the streaming API yields each result as its search completes.

use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::models::{CitationBundle, CitationRequest, Paper, SentenceResult, StreamEvent};
use crate::search::SearchClient;
use crate::sources::{DoiValidator, HttpDoiResolver, SemanticScholarSource, SourceError};
use crate::text::{analyze_with, Candidate, ClaimDetector};
use crate::utils::{format_bibtex, format_citation, format_ris, CitationStyle, HttpClient};

/// Default cap on concurrent searches per document
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Stream of per-sentence results, terminated by [`StreamEvent::Done`]
pub type CitationStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Errors rejected before any search is dispatched
#[derive(Debug, thiserror::Error)]
pub enum FinderError {
    #[error("No text provided")]
    EmptyText,
}

/// Finds citation candidates for the claims in a block of text
#[derive(Debug, Clone)]
pub struct CitationFinder {
    search: Arc<SearchClient>,
    doi: Option<Arc<DoiValidator>>,
    detector: Arc<ClaimDetector>,
    max_concurrent: usize,
}

impl CitationFinder {
    /// Create a finder; pass `None` for `doi` to skip DOI checks
    pub fn new(search: Arc<SearchClient>, doi: Option<Arc<DoiValidator>>) -> Self {
        Self {
            search,
            doi,
            detector: Arc::new(ClaimDetector::default()),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Build the production stack (Semantic Scholar + doi.org) from configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let source = SemanticScholarSource::new(HttpClient::with_timeout(config.search.timeout())?)
            .with_base_url(config.search.base_url.as_str())
            .with_api_key(config.api_keys.semantic_scholar.clone());

        let search = SearchClient::new(Arc::new(source))
            .with_cache_capacity(config.search.cache_capacity)
            .with_retry(config.search.retry_config());

        let doi = if config.doi.enabled {
            let resolver = HttpDoiResolver::new(HttpClient::with_timeout(config.doi.timeout())?)
                .with_base_url(config.doi.resolver_url.as_str());
            Some(Arc::new(DoiValidator::with_capacity(
                Arc::new(resolver),
                config.doi.cache_capacity,
            )))
        } else {
            None
        };

        Ok(Self::new(Arc::new(search), doi).with_max_concurrent(config.search.max_concurrent))
    }

    /// Cap the number of searches in flight (at least one)
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Use a custom claim detector
    pub fn with_detector(mut self, detector: ClaimDetector) -> Self {
        self.detector = Arc::new(detector);
        self
    }

    /// The search client shared by all tasks
    pub fn search_client(&self) -> &Arc<SearchClient> {
        &self.search
    }

    /// Flagged sentences and their queries, in source order
    pub fn candidates(&self, text: &str) -> Result<Vec<Candidate>, FinderError> {
        if text.trim().is_empty() {
            return Err(FinderError::EmptyText);
        }
        Ok(analyze_with(text, &self.detector))
    }

    /// Find citations for every flagged sentence, in source order.
    ///
    /// Sentences whose search produced nothing are omitted.
    pub async fn find_citations(
        &self,
        text: &str,
        request: &CitationRequest,
    ) -> Result<Vec<SentenceResult>, FinderError> {
        let candidates = self.candidates(text)?;
        let total = candidates.len();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut tasks = self.spawn_lookups(candidates, request);
        let mut ordered: Vec<(usize, SentenceResult)> = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Some(result))) => ordered.push((index, result)),
                Ok((_, None)) => {}
                Err(e) => tracing::error!(error = %e, "Citation task failed"),
            }
        }
        ordered.sort_by_key(|(index, _)| *index);

        tracing::info!(
            "Found citations for {} of {} flagged sentences",
            ordered.len(),
            total
        );
        Ok(ordered.into_iter().map(|(_, result)| result).collect())
    }

    /// Like [`find_citations`](Self::find_citations), but yield each result as
    /// soon as its search completes.
    ///
    /// Events carry the flagged-sentence index so callers can reassemble
    /// source order. The stream always ends with [`StreamEvent::Done`].
    pub fn stream_citations(
        &self,
        text: &str,
        request: &CitationRequest,
    ) -> Result<CitationStream, FinderError> {
        let candidates = self.candidates(text)?;
        let finder = self.clone();
        let request = request.clone();

        Ok(Box::pin(async_stream::stream! {
            if !candidates.is_empty() {
                let mut tasks = finder.spawn_lookups(candidates, &request);
                while let Some(joined) = tasks.join_next().await {
                    match joined {
                        Ok((index, Some(result))) => yield StreamEvent::Result { index, result },
                        Ok((_, None)) => {}
                        Err(e) => tracing::error!(error = %e, "Citation task failed"),
                    }
                }
            }
            yield StreamEvent::Done;
        }))
    }

    /// Forget cached searches and DOI answers
    pub fn clear_caches(&self) {
        self.search.clear_cache();
        if let Some(ref doi) = self.doi {
            doi.clear_cache();
        }
    }

    fn spawn_lookups(
        &self,
        candidates: Vec<Candidate>,
        request: &CitationRequest,
    ) -> JoinSet<(usize, Option<SentenceResult>)> {
        let permits = self.max_concurrent.min(candidates.len()).max(1);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut tasks = JoinSet::new();

        for (index, candidate) in candidates.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let search = Arc::clone(&self.search);
            let doi = self.doi.clone();
            let request = request.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, None);
                };
                let result = lookup(&search, doi.as_deref(), candidate, &request).await;
                (index, result)
            });
        }

        tasks
    }
}

async fn lookup(
    search: &SearchClient,
    doi: Option<&DoiValidator>,
    candidate: Candidate,
    request: &CitationRequest,
) -> Option<SentenceResult> {
    let filters = request.search_filters();
    let mut papers = search.search(&candidate.query, &filters).await;
    papers.truncate(request.per_sentence());

    let mut citations = Vec::with_capacity(papers.len());
    for paper in &papers {
        citations.push(build_bundle(paper, request.format, doi).await);
    }

    if citations.is_empty() {
        tracing::debug!(query = %candidate.query, "No citations found");
        return None;
    }

    Some(SentenceResult {
        sentence: candidate.sentence,
        query: candidate.query,
        reason: candidate.reason,
        citations,
    })
}

/// Assemble the citation bundle for one paper, checking its DOI when a validator is set
pub async fn build_bundle(
    paper: &Paper,
    style: CitationStyle,
    doi: Option<&DoiValidator>,
) -> CitationBundle {
    let paper_doi = paper.doi();
    let doi_valid = match (paper_doi, doi) {
        (Some(d), Some(validator)) => validator.validate(d).await,
        _ => None,
    };

    let url = match (paper.url(), paper_doi, doi) {
        (Some(url), _, _) => url.to_string(),
        (None, Some(d), Some(validator)) if doi_valid == Some(true) => validator.link(d),
        _ => String::new(),
    };

    CitationBundle {
        formatted: format_citation(paper, style),
        bibtex: format_bibtex(paper),
        ris: format_ris(paper),
        title: paper.title.clone().unwrap_or_default(),
        year: paper.year,
        venue: paper.venue.clone().unwrap_or_default(),
        doi: paper_doi.unwrap_or_default().to_string(),
        doi_valid,
        url,
        pdf_url: paper.pdf_url().unwrap_or_default().to_string(),
        citation_count: paper.citation_count,
        r#abstract: paper.abstract_text.clone().unwrap_or_default(),
    }
}
