//! DOI validation against the doi.org resolver.

use async_trait::async_trait;
use std::sync::Arc;

use crate::sources::SourceError;
use crate::utils::{FifoCache, HttpClient, DEFAULT_DOI_CACHE_CAPACITY};

/// Default DOI resolver root
pub const DOI_RESOLVER_BASE: &str = "https://doi.org";

/// Checks whether a DOI resolves.
///
/// `Ok(true)` means the resolver answered below 400, `Ok(false)` means it
/// answered with an error status. Transport failures are errors so the caller
/// can treat them as "unknown" rather than "invalid".
#[async_trait]
pub trait DoiResolver: Send + Sync + std::fmt::Debug {
    async fn resolve(&self, doi: &str) -> Result<bool, SourceError>;

    /// Public link for a DOI on this resolver
    fn link(&self, doi: &str) -> String {
        format!("{}/{}", DOI_RESOLVER_BASE, doi)
    }
}

/// Resolver issuing `HEAD {base}/{doi}` and following redirects
#[derive(Debug, Clone)]
pub struct HttpDoiResolver {
    client: HttpClient,
    base_url: String,
}

impl HttpDoiResolver {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: DOI_RESOLVER_BASE.to_string(),
        }
    }

    /// Use a different resolver root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl DoiResolver for HttpDoiResolver {
    async fn resolve(&self, doi: &str) -> Result<bool, SourceError> {
        let url = self.link(doi);
        let response = self.client.client().head(&url).send().await?;
        Ok(response.status().as_u16() < 400)
    }

    fn link(&self, doi: &str) -> String {
        format!("{}/{}", self.base_url, doi)
    }
}

/// Caching front for a [`DoiResolver`].
///
/// Every answer is cached with FIFO eviction, including "unknown" after a
/// transport failure, so a DOI is checked at most once while it stays cached.
#[derive(Debug)]
pub struct DoiValidator {
    resolver: Arc<dyn DoiResolver>,
    cache: FifoCache<String, Option<bool>>,
}

impl DoiValidator {
    pub fn new(resolver: Arc<dyn DoiResolver>) -> Self {
        Self::with_capacity(resolver, DEFAULT_DOI_CACHE_CAPACITY)
    }

    pub fn with_capacity(resolver: Arc<dyn DoiResolver>, capacity: usize) -> Self {
        Self {
            resolver,
            cache: FifoCache::new(capacity),
        }
    }

    /// Validity of a DOI: `None` when it is empty or the resolver could not be reached
    pub async fn validate(&self, doi: &str) -> Option<bool> {
        let doi = doi.trim();
        if doi.is_empty() {
            return None;
        }

        let key = doi.to_string();
        if let Some(valid) = self.cache.get(&key) {
            tracing::debug!(doi, ?valid, "DOI cache hit");
            return valid;
        }

        let valid = match self.resolver.resolve(doi).await {
            Ok(valid) => Some(valid),
            Err(e) => {
                tracing::warn!(doi, error = %e, "DOI check failed");
                None
            }
        };
        self.cache.insert(key, valid);
        valid
    }

    /// Public link for a DOI on the configured resolver
    pub fn link(&self, doi: &str) -> String {
        self.resolver.link(doi.trim())
    }

    /// Number of cached DOI answers
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Forget every cached answer
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockResolver;
    use mockito::Server;
    use std::time::Duration;

    #[tokio::test]
    async fn test_validator_caches_definite_answers() {
        let resolver = Arc::new(
            MockResolver::new()
                .with_valid("10.1/good")
                .with_invalid("10.1/bad"),
        );
        let validator = DoiValidator::new(resolver.clone());

        assert_eq!(validator.validate("10.1/good").await, Some(true));
        assert_eq!(validator.validate("10.1/bad").await, Some(false));
        assert_eq!(validator.validate("10.1/good").await, Some(true));

        assert_eq!(resolver.call_count(), 2);
        assert_eq!(validator.cache_len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_resolver_is_unknown_and_cached() {
        let resolver = Arc::new(MockResolver::new());
        let validator = DoiValidator::new(resolver.clone());

        assert_eq!(validator.validate("10.1/unknown").await, None);
        assert_eq!(validator.validate("10.1/unknown").await, None);
        assert_eq!(resolver.call_count(), 1);
        assert_eq!(validator.cache_len(), 1);

        validator.clear_cache();
        assert_eq!(validator.validate("10.1/unknown").await, None);
        assert_eq!(resolver.call_count(), 2);
    }

    #[test]
    fn test_link_uses_resolver_root() {
        let client = HttpClient::with_timeout(Duration::from_secs(4)).unwrap();
        let resolver = HttpDoiResolver::new(client).with_base_url("https://resolver.example/");
        let validator = DoiValidator::new(Arc::new(resolver));
        assert_eq!(validator.link(" 10.1/x "), "https://resolver.example/10.1/x");

        let default = DoiValidator::new(Arc::new(MockResolver::new()));
        assert_eq!(default.link("10.1/x"), "https://doi.org/10.1/x");
    }

    #[tokio::test]
    async fn test_empty_doi_skips_resolver() {
        let resolver = Arc::new(MockResolver::new());
        let validator = DoiValidator::new(resolver.clone());
        assert_eq!(validator.validate("  ").await, None);
        assert_eq!(resolver.call_count(), 0);
    }

    #[tokio::test]
    async fn test_http_resolver_status_mapping() {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("HEAD", "/10.1000/found")
            .with_status(200)
            .create_async()
            .await;
        let _missing = server
            .mock("HEAD", "/10.1000/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::with_timeout(Duration::from_secs(4)).unwrap();
        let resolver = HttpDoiResolver::new(client).with_base_url(server.url());

        assert!(resolver.resolve("10.1000/found").await.unwrap());
        assert!(!resolver.resolve("10.1000/missing").await.unwrap());
    }
}
