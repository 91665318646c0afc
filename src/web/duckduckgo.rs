//! DuckDuckGo HTML search provider.
//!
//! Needs no credentials. Result links point at a DuckDuckGo redirect whose
//! `uddg` parameter carries the real target.

use super::{SearchLink, SearchProvider};
use crate::error::{Result, VettError};
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

/// Secondary search provider.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn try_search(&self, query: &str, max_results: usize) -> Result<Vec<SearchLink>> {
        let html = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| VettError::ProviderUnavailable(format!("DuckDuckGo: {}", e)))?
            .text()
            .await?;

        parse_results(&html, max_results)
    }
}

/// Pull result links out of a DuckDuckGo HTML results page.
fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchLink>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a.result__a")
        .map_err(|e| VettError::ProviderUnavailable(format!("selector: {}", e)))?;

    Ok(document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let url = resolve_href(href)?;
            let title = anchor.text().collect::<Vec<_>>().join(" ");
            Some(SearchLink {
                url,
                title: title.split_whitespace().collect::<Vec<_>>().join(" "),
            })
        })
        .take(max_results)
        .collect())
}

/// The real target of a result link, unwrapping the redirect when present.
fn resolve_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    if let Some((_, target)) = parsed.query_pairs().find(|(key, _)| key == "uddg") {
        return Some(target.into_owned());
    }

    matches!(parsed.scheme(), "http" | "https").then_some(absolute)
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchLink> {
        match self.try_search(query, max_results).await {
            Ok(links) => {
                debug!("DuckDuckGo returned {} links", links.len());
                links
            }
            Err(e) => {
                warn!("DuckDuckGo search failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="result">
            <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FPhotosynthesis&amp;rut=abc">
              <b>Photosynthesis</b> - Wikipedia
            </a>
          </div>
          <div class="result">
            <a class="result__a" href="https://www.nationalgeographic.org/photosynthesis">Photosynthesis | NatGeo</a>
          </div>
          <div class="result">
            <a class="result__a" href="/relative/ignored">Relative</a>
          </div>
        </body></html>"#;

    #[test]
    fn test_parse_results_decodes_redirects() {
        let links = parse_results(RESULTS_PAGE, 5).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://en.wikipedia.org/wiki/Photosynthesis");
        assert_eq!(links[0].title, "Photosynthesis - Wikipedia");
        assert_eq!(links[1].url, "https://www.nationalgeographic.org/photosynthesis");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let links = parse_results(RESULTS_PAGE, 1).unwrap();
        assert_eq!(links.len(), 1);
    }

    #[tokio::test]
    async fn test_search_against_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/html/")
            .match_query(Matcher::UrlEncoded("q".into(), "photosynthesis".into()))
            .with_status(200)
            .with_body(RESULTS_PAGE)
            .create_async()
            .await;

        let ddg = DuckDuckGoSearch::new(reqwest::Client::new(), format!("{}/html/", server.url()));
        let links = ddg.search("photosynthesis", 3).await;

        mock.assert_async().await;
        assert_eq!(links.len(), 2);
    }

    #[tokio::test]
    async fn test_blocked_request_yields_no_links() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/html/")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let ddg = DuckDuckGoSearch::new(reqwest::Client::new(), format!("{}/html/", server.url()));
        assert!(ddg.search("photosynthesis", 3).await.is_empty());
    }
}
