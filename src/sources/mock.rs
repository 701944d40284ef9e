//! Test doubles for the search provider and the DOI resolver.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::models::{Paper, SearchQuery};
use crate::sources::{DoiResolver, Source, SourceError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mock source returning predefined papers.
///
/// Responses are looked up by exact query string, falling back to the default
/// list. Queued failures are returned first, one per call.
#[derive(Debug, Default)]
pub struct MockSource {
    default_papers: Mutex<Vec<Paper>>,
    responses: Mutex<HashMap<String, Vec<Paper>>>,
    delays: Mutex<HashMap<String, Duration>>,
    failures: Mutex<VecDeque<SourceError>>,
    always_fail: Mutex<Option<SourceError>>,
    queries: Mutex<Vec<SearchQuery>>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a mock source that returns no papers
    pub fn new() -> Self {
        Self::default()
    }

    /// Papers returned for any query without a specific response
    pub fn with_papers(self, papers: Vec<Paper>) -> Self {
        *lock(&self.default_papers) = papers;
        self
    }

    /// Papers returned for one exact query string
    pub fn with_response(self, query: impl Into<String>, papers: Vec<Paper>) -> Self {
        lock(&self.responses).insert(query.into(), papers);
        self
    }

    /// Delay the answer for one exact query string
    pub fn with_delay(self, query: impl Into<String>, delay: Duration) -> Self {
        lock(&self.delays).insert(query.into(), delay);
        self
    }

    /// Fail the next call with `error`; queued failures are consumed in order
    pub fn fail_next(self, error: SourceError) -> Self {
        lock(&self.failures).push_back(error);
        self
    }

    /// Fail every call with `error`
    pub fn fail_always(self, error: SourceError) -> Self {
        *lock(&self.always_fail) = Some(error);
        self
    }

    /// Number of search calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every query received, in arrival order
    pub fn queries(&self) -> Vec<SearchQuery> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.queries).push(query.clone());

        let delay = lock(&self.delays).get(&query.query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = lock(&self.failures).pop_front() {
            return Err(error);
        }
        if let Some(error) = lock(&self.always_fail).clone() {
            return Err(error);
        }

        let papers = lock(&self.responses)
            .get(&query.query)
            .cloned()
            .unwrap_or_else(|| lock(&self.default_papers).clone());

        Ok(papers.into_iter().take(query.limit).collect())
    }
}

/// A mock DOI resolver with fixed answers; unlisted DOIs fail as unreachable
#[derive(Debug, Default)]
pub struct MockResolver {
    answers: HashMap<String, bool>,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a DOI as resolving
    pub fn with_valid(mut self, doi: impl Into<String>) -> Self {
        self.answers.insert(doi.into(), true);
        self
    }

    /// Mark a DOI as answering with an error status
    pub fn with_invalid(mut self, doi: impl Into<String>) -> Self {
        self.answers.insert(doi.into(), false);
        self
    }

    /// Number of resolve calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DoiResolver for MockResolver {
    async fn resolve(&self, doi: &str) -> Result<bool, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(doi)
            .copied()
            .ok_or_else(|| SourceError::Network(format!("resolver unreachable for {}", doi)))
    }
}
