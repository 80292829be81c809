use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use up_core::{Error, Result, SearchProvider, SearchResult};
use url::Url;

use crate::extractor::normalize_whitespace;
use crate::fetcher::USER_AGENT;

const CONTAINER_SELECTORS: [&str; 3] = [
    "div.result",
    "article[data-testid=\"result\"]",
    "div[data-testid=\"result\"]",
];

const TITLE_SELECTORS: [&str; 3] = ["a[data-testid=\"result-title-a\"]", "a.result__a", "a[href]"];

const SNIPPET_SELECTOR: &str =
    "a.result__snippet, div.result__snippet, span.result__snippet, div[data-testid=\"result-snippet\"]";

/// Keyless search against DuckDuckGo's HTML endpoint.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Configuration(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        debug!("🦆 DuckDuckGo query: \"{}\"", query);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Rejected {
                status: status.as_u16(),
                body: format!("search page returned {}", status),
            });
        }
        let html = response.text().await?;
        Ok(parse_results(&html, limit))
    }
}

fn absolutize(href: &str) -> String {
    let trimmed = href.trim();
    if let Some(rest) = trimmed.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    if trimmed.starts_with("/l/") {
        return format!("https://duckduckgo.com{}", trimmed);
    }
    trimmed.to_string()
}

/// Unwraps `duckduckgo.com/l/?uddg=<target>` redirect links.
fn decode_redirect(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    if !host.ends_with("duckduckgo.com") || !parsed.path().starts_with("/l/") {
        return None;
    }
    let target = parsed
        .query_pairs()
        .find(|(k, _)| k == "uddg")
        .map(|(_, v)| v.trim().to_string())?;
    if !(target.starts_with("http://") || target.starts_with("https://")) {
        return None;
    }
    match Url::parse(&target) {
        Ok(mut dest) => {
            dest.set_fragment(None);
            Some(dest.to_string())
        }
        Err(_) => Some(target),
    }
}

pub(crate) fn normalize_href(href: &str) -> Option<String> {
    let absolute = absolutize(href);
    if let Some(decoded) = decode_redirect(&absolute) {
        return Some(decoded);
    }
    (absolute.starts_with("http://") || absolute.starts_with("https://")).then_some(absolute)
}

fn text_of(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn title_anchor<'a>(container: ElementRef<'a>) -> Option<ElementRef<'a>> {
    TITLE_SELECTORS.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        container
            .select(&selector)
            .next()
            .filter(|a| a.value().attr("href").is_some())
    })
}

/// Parses a result page in rank order, deduplicated by target URL.
pub fn parse_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let snippet_selector = Selector::parse(SNIPPET_SELECTOR).ok();
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for raw in CONTAINER_SELECTORS {
        let Ok(container_selector) = Selector::parse(raw) else {
            continue;
        };
        for container in document.select(&container_selector) {
            if out.len() >= limit {
                break;
            }
            let Some(anchor) = title_anchor(container) else {
                continue;
            };
            let Some(link) = anchor.value().attr("href").and_then(normalize_href) else {
                continue;
            };
            if !seen.insert(link.clone()) {
                continue;
            }
            let snippet = snippet_selector
                .as_ref()
                .and_then(|sel| container.select(sel).next())
                .map(text_of)
                .filter(|s| !s.is_empty());
            out.push(SearchResult {
                title: text_of(anchor),
                link,
                snippet,
            });
        }
        if !out.is_empty() {
            break;
        }
    }
    out
}
