//! Web retrieval for Vett.
//!
//! Searches an ordered chain of providers, then walks the returned links
//! until one yields enough readable text to use as context.

mod duckduckgo;
mod extract;
mod google;

pub use duckduckgo::DuckDuckGoSearch;
pub use extract::{extract_readable_text, truncate_chars};
pub use google::{GoogleCredentials, GoogleSearch};

use crate::config::WebSettings;
use crate::error::{Result, VettError};
use crate::knowledge::{ItemMetadata, NewKnowledge};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchLink {
    pub url: String,
    pub title: String,
}

/// Readable text fetched from a page.
#[derive(Debug, Clone)]
pub struct RetrievedPage {
    pub text: String,
    pub metadata: ItemMetadata,
}

impl From<RetrievedPage> for NewKnowledge {
    fn from(page: RetrievedPage) -> Self {
        NewKnowledge {
            text: page.text,
            metadata: page.metadata,
        }
    }
}

/// A web search backend.
///
/// Implementations never fail: missing credentials and outages are logged
/// and reported as an empty result list.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Up to `max_results` links for `query`.
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchLink>;
}

/// Finds and fetches the best page for a query.
pub struct WebRetriever {
    providers: Vec<Arc<dyn SearchProvider>>,
    client: reqwest::Client,
    max_results: usize,
    max_page_chars: usize,
    min_page_chars: usize,
    ignored_extensions: Vec<String>,
}

impl WebRetriever {
    /// Create a retriever over `providers`, tried in order.
    pub fn new(providers: Vec<Arc<dyn SearchProvider>>, settings: &WebSettings) -> Result<Self> {
        Ok(Self {
            providers,
            client: build_client(settings)?,
            max_results: settings.max_results,
            max_page_chars: settings.max_page_chars,
            min_page_chars: settings.min_page_chars,
            ignored_extensions: settings
                .ignored_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        })
    }

    /// Google first, DuckDuckGo as fallback.
    pub fn from_settings(settings: &WebSettings) -> Result<Self> {
        let client = build_client(settings)?;
        let providers: Vec<Arc<dyn SearchProvider>> = vec![
            Arc::new(GoogleSearch::from_settings(client.clone(), settings)),
            Arc::new(DuckDuckGoSearch::new(
                client,
                settings.duckduckgo_endpoint.clone(),
            )),
        ];
        Self::new(providers, settings)
    }

    /// Fetch the first usable page for `query`, or `None` if nothing qualifies.
    #[instrument(skip(self))]
    pub async fn fetch_best_result(&self, query: &str) -> Option<RetrievedPage> {
        let links = self.search_links(query).await;
        if links.is_empty() {
            info!("No search results for '{}'", query);
            return None;
        }

        for link in links {
            if self.is_ignored_link(&link.url) {
                debug!("Skipping non-HTML link {}", link.url);
                continue;
            }

            match self.fetch_page(&link.url).await {
                Ok(text) => {
                    info!("Using {} ({} chars)", link.url, text.chars().count());
                    return Some(RetrievedPage {
                        text,
                        metadata: ItemMetadata {
                            source: link.url,
                            title: link.title,
                        },
                    });
                }
                Err(e) => debug!("Skipping {}: {}", link.url, e),
            }
        }

        warn!("No search result for '{}' had enough readable text", query);
        None
    }

    /// Links from the first provider that returns any.
    async fn search_links(&self, query: &str) -> Vec<SearchLink> {
        for provider in &self.providers {
            let links = provider.search(query, self.max_results).await;
            if !links.is_empty() {
                debug!("{} supplied {} links", provider.name(), links.len());
                return links;
            }
        }
        Vec::new()
    }

    /// Readable text of `url`, if long enough.
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let text = extract_readable_text(&html, self.max_page_chars);
        let len = text.chars().count();
        if len <= self.min_page_chars {
            return Err(VettError::ContentTooShort {
                url: url.to_string(),
                len,
            });
        }
        Ok(text)
    }

    /// Whether the link's path ends in an ignored file extension.
    pub fn is_ignored_link(&self, link: &str) -> bool {
        let path = match Url::parse(link) {
            Ok(url) => url.path().to_lowercase(),
            Err(_) => link
                .split(['?', '#'])
                .next()
                .unwrap_or(link)
                .to_lowercase(),
        };

        self.ignored_extensions
            .iter()
            .any(|ext| path.ends_with(&format!(".{}", ext)))
    }
}

fn build_client(settings: &WebSettings) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.fetch_timeout_secs))
        .user_agent(settings.user_agent.clone())
        .danger_accept_invalid_certs(settings.accept_invalid_certs)
        .build()
        .map_err(VettError::from)
}
