//! Semantic Scholar paper search.

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Paper, SearchQuery};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Default Semantic Scholar graph API root
pub const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// Fields requested for every search hit
pub const SEARCH_FIELDS: &str =
    "title,authors,year,venue,externalIds,abstract,url,openAccessPdf,citationCount";

/// Semantic Scholar research source
///
/// Issues one request per call; retrying is left to the caller.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2SearchResponse {
    #[serde(default)]
    data: Option<Vec<Paper>>,
}

impl SemanticScholarSource {
    /// Create a source against the public API, picking up `SEMANTIC_SCHOLAR_API_KEY`
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: SEMANTIC_API_BASE.to_string(),
            api_key: std::env::var("SEMANTIC_SCHOLAR_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }

    /// Point the source at a different API root (e.g. a proxy or a test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set or clear the API key
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    /// The API root requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}/paper/search?query={}&limit={}&fields={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.limit,
            SEARCH_FIELDS
        );
        if let Some(ref year) = query.year {
            url.push_str(&format!("&year={}", urlencoding::encode(year)));
        }
        if !query.fields_of_study.is_empty() {
            url.push_str(&format!(
                "&fieldsOfStudy={}",
                urlencoding::encode(&query.fields_of_study.join(","))
            ));
        }
        url
    }

    fn add_api_key_if_present(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("x-api-key", key)
        } else {
            builder
        }
    }
}

#[async_trait]
impl Source for SemanticScholarSource {
    fn id(&self) -> &str {
        "semantic"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        if query.query.trim().is_empty() {
            return Err(SourceError::InvalidRequest("empty query".to_string()));
        }

        let url = self.search_url(query);
        tracing::debug!(query = %query.query, limit = query.limit, "Searching Semantic Scholar");

        let response = self
            .add_api_key_if_present(self.client.client().get(&url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::from_status(status));
        }

        let body = response.text().await?;
        let parsed: S2SearchResponse = serde_json::from_str(&body)?;
        let papers = parsed.data.unwrap_or_default();

        tracing::debug!(query = %query.query, count = papers.len(), "Semantic Scholar returned papers");
        Ok(papers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn source(base_url: &str) -> SemanticScholarSource {
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        SemanticScholarSource::new(client)
            .with_base_url(base_url)
            .with_api_key(None)
    }

    #[test]
    fn test_search_url_includes_filters() {
        let source = source("https://example.org/graph/v1/");
        let query = SearchQuery::new("machine learning")
            .limit(5)
            .year_range(2018, 2022)
            .fields_of_study(vec!["Medicine".to_string(), "Biology".to_string()]);

        let url = source.search_url(&query);
        assert!(url.starts_with("https://example.org/graph/v1/paper/search?"));
        assert!(url.contains("query=machine%20learning"));
        assert!(url.contains("limit=5"));
        assert!(url.contains(&format!("fields={}", SEARCH_FIELDS)));
        assert!(url.contains("year=2018-2022"));
        assert!(url.contains("fieldsOfStudy=Medicine%2CBiology"));
    }

    #[test]
    fn test_search_url_omits_unset_filters() {
        let url = source("https://example.org").search_url(&SearchQuery::new("sleep"));
        assert!(!url.contains("year="));
        assert!(!url.contains("fieldsOfStudy="));
    }

    #[tokio::test]
    async fn test_search_parses_data() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".to_string(), "exercise heart".to_string()),
                Matcher::UrlEncoded("limit".to_string(), "3".to_string()),
                Matcher::UrlEncoded("fields".to_string(), SEARCH_FIELDS.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "total": 1,
                    "data": [{
                        "paperId": "abc",
                        "title": "Exercise and the Heart",
                        "authors": [{"authorId": "1", "name": "Jane Smith"}],
                        "year": 2020,
                        "venue": "Cardiology",
                        "externalIds": {"DOI": "10.1/abc"},
                        "citationCount": 12
                    }]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let papers = source(&server.url())
            .search(&SearchQuery::new("exercise heart").limit(3))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title(), Some("Exercise and the Heart"));
        assert_eq!(papers[0].doi(), Some("10.1/abc"));
        assert_eq!(papers[0].citation_count, Some(12));
    }

    #[tokio::test]
    async fn test_search_sends_api_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .match_header("x-api-key", "secret")
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .expect(1)
            .create_async()
            .await;

        let papers = source(&server.url())
            .with_api_key(Some("secret".to_string()))
            .search(&SearchQuery::new("anything"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(papers.is_empty());
    }

    #[tokio::test]
    async fn test_missing_data_key_is_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"total": 0}"#)
            .create_async()
            .await;

        let papers = source(&server.url())
            .search(&SearchQuery::new("nothing here"))
            .await
            .unwrap();
        assert!(papers.is_empty());
    }

    #[tokio::test]
    async fn test_error_statuses_are_classified() {
        let mut server = Server::new_async().await;
        let _rate = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::UrlEncoded("query".to_string(), "busy".to_string()))
            .with_status(429)
            .create_async()
            .await;
        let _down = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::UrlEncoded("query".to_string(), "down".to_string()))
            .with_status(503)
            .create_async()
            .await;
        let _bad = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::UrlEncoded("query".to_string(), "bad".to_string()))
            .with_status(400)
            .create_async()
            .await;

        let source = source(&server.url());
        assert!(matches!(
            source.search(&SearchQuery::new("busy")).await,
            Err(SourceError::RateLimit)
        ));
        assert!(matches!(
            source.search(&SearchQuery::new("down")).await,
            Err(SourceError::Server(503))
        ));
        assert!(matches!(
            source.search(&SearchQuery::new("bad")).await,
            Err(SourceError::Api(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/paper/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let result = source(&server.url())
            .search(&SearchQuery::new("anything"))
            .await;
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let result = source("http://127.0.0.1:1").search(&SearchQuery::new("  ")).await;
        assert!(matches!(result, Err(SourceError::InvalidRequest(_))));
    }
}
