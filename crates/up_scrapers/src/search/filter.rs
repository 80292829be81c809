//! Decides which search hits look like real articles worth scraping.

use lazy_static::lazy_static;
use regex::Regex;
use up_core::SearchResult;
use url::Url;

/// Links returned by discovery never exceed this many.
pub const MAX_REFERENCES: usize = 2;

const MIN_LINK_CHARS: usize = 20;

const BLOCKED_DOMAINS: [&str; 18] = [
    "youtube.com",
    "youtu.be",
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "linkedin.com",
    "pinterest.com",
    "reddit.com",
    "tiktok.com",
    "vimeo.com",
    "amazon.com",
    "ebay.com",
    "wikipedia.org",
    "google.com",
    "bing.com",
    "yahoo.com",
    "duckduckgo.com",
];

const BLOCKED_EXTENSIONS: [&str; 7] = [".pdf", ".doc", ".docx", ".xls", ".xlsx", ".zip", ".rar"];

const ARTICLE_PATH_MARKERS: [&str; 6] = ["/blog/", "/article/", "/post/", "/news/", "/story/", "/entry/"];

lazy_static! {
    static ref DATED_PATH: Regex = Regex::new(r"/\d{4}/\d{2}/").unwrap();
}

/// True when `host` is a blocked domain or one of its subdomains.
pub fn is_blocked_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    BLOCKED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

fn is_degenerate_anchor(link: &str) -> bool {
    let mut parts = link.split('#');
    match (parts.next(), parts.next()) {
        (Some(before), Some(after)) => before.is_empty() || before == after,
        _ => false,
    }
}

fn has_article_shape(url: &Url, lowered: &str) -> bool {
    let path = url.path().to_ascii_lowercase();
    if ARTICLE_PATH_MARKERS.iter().any(|m| lowered.contains(m)) || DATED_PATH.is_match(lowered) {
        return true;
    }
    if path.ends_with(".html") || path.ends_with(".htm") {
        return true;
    }
    path.split('/').filter(|segment| !segment.is_empty()).count() >= 2
}

/// Whether a single link passes every exclusion rule and looks like an article.
pub fn is_candidate_link(link: &str) -> bool {
    let lowered = link.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return false;
    }
    let Ok(url) = Url::parse(&lowered) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    if url.host_str().map_or(true, is_blocked_host) {
        return false;
    }
    let path = url.path();
    if BLOCKED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }
    if is_degenerate_anchor(&lowered) {
        return false;
    }
    if lowered.chars().count() < MIN_LINK_CHARS {
        return false;
    }
    has_article_shape(&url, &lowered)
}

/// Keeps the first [`MAX_REFERENCES`] qualifying results in provider order.
pub fn select_references(results: &[SearchResult]) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|r| is_candidate_link(&r.link))
        .take(MAX_REFERENCES)
        .cloned()
        .collect()
}
