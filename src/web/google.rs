//! Google Custom Search provider.

use super::{SearchLink, SearchProvider};
use crate::config::WebSettings;
use crate::error::{Result, VettError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// API key and engine id for the Custom Search JSON API.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub api_key: String,
    pub engine_id: String,
}

/// Primary search provider.
pub struct GoogleSearch {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<GoogleCredentials>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
    #[serde(default)]
    title: String,
}

impl GoogleSearch {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        credentials: Option<GoogleCredentials>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            credentials,
        }
    }

    /// Read credentials from the environment variables named in `settings`.
    pub fn from_settings(client: reqwest::Client, settings: &WebSettings) -> Self {
        let credentials = match (
            std::env::var(&settings.google_api_key_env),
            std::env::var(&settings.google_engine_id_env),
        ) {
            (Ok(api_key), Ok(engine_id)) if !api_key.is_empty() && !engine_id.is_empty() => {
                Some(GoogleCredentials { api_key, engine_id })
            }
            _ => None,
        };
        Self::new(client, settings.google_endpoint.clone(), credentials)
    }

    async fn try_search(&self, query: &str, max_results: usize) -> Result<Vec<SearchLink>> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            VettError::ProviderUnavailable("Google API key or search engine id missing".into())
        })?;

        let num = max_results.clamp(1, 10).to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", credentials.api_key.as_str()),
                ("cx", credentials.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(without_key)?;

        let body: SearchResponse = response.json().await.map_err(without_key)?;
        Ok(body
            .items
            .into_iter()
            .take(max_results)
            .map(|item| SearchLink {
                url: item.link,
                title: item.title,
            })
            .collect())
    }
}

/// The request URL carries the API key, so it never reaches an error message.
fn without_key(e: reqwest::Error) -> VettError {
    VettError::ProviderUnavailable(format!("Google: {}", e.without_url()))
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    fn name(&self) -> &str {
        "google"
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchLink> {
        match self.try_search(query, max_results).await {
            Ok(links) => {
                debug!("Google returned {} links", links.len());
                links
            }
            Err(e) => {
                warn!("Google search failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn credentials() -> Option<GoogleCredentials> {
        Some(GoogleCredentials {
            api_key: "k".to_string(),
            engine_id: "cx".to_string(),
        })
    }

    #[tokio::test]
    async fn test_parses_items() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "photosynthesis".into()),
                Matcher::UrlEncoded("cx".into(), "cx".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items":[
                    {"link":"https://a.example/one","title":"One"},
                    {"link":"https://b.example/two","title":"Two"}
                ]}"#,
            )
            .create_async()
            .await;

        let google = GoogleSearch::new(
            reqwest::Client::new(),
            format!("{}/customsearch/v1", server.url()),
            credentials(),
        );
        let links = google.search("photosynthesis", 3).await;

        mock.assert_async().await;
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://a.example/one");
        assert_eq!(links[1].title, "Two");
    }

    #[tokio::test]
    async fn test_missing_credentials_yield_no_links() {
        let google = GoogleSearch::new(reqwest::Client::new(), "http://127.0.0.1:9", None);
        assert!(google.search("anything", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_outage_yields_no_links() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let google = GoogleSearch::new(
            reqwest::Client::new(),
            format!("{}/customsearch/v1", server.url()),
            credentials(),
        );
        assert!(google.search("anything", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_errors_do_not_reveal_api_key() {
        let secret = Some(GoogleCredentials {
            api_key: "SECRET_KEY_123".to_string(),
            engine_id: "cx".to_string(),
        });

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;
        let quota = GoogleSearch::new(
            reqwest::Client::new(),
            format!("{}/customsearch/v1", server.url()),
            secret.clone(),
        );
        let err = quota.try_search("q", 3).await.unwrap_err().to_string();
        assert!(err.contains("429"));
        assert!(!err.contains("SECRET_KEY_123"));

        let unreachable = GoogleSearch::new(reqwest::Client::new(), "http://127.0.0.1:9/v1", secret);
        let err = unreachable.try_search("q", 3).await.unwrap_err().to_string();
        assert!(!err.contains("SECRET_KEY_123"));
    }

    #[tokio::test]
    async fn test_response_without_items() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/customsearch/v1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"searchInformation":{"totalResults":"0"}}"#)
            .create_async()
            .await;

        let google = GoogleSearch::new(
            reqwest::Client::new(),
            format!("{}/customsearch/v1", server.url()),
            credentials(),
        );
        assert!(google.search("nothing", 3).await.is_empty());
    }
}
