//! Main-text extraction from arbitrary article pages.
//!
//! The selector order below is part of the contract: the same markup must
//! always produce the same text.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Minimum length a generic container must reach to be accepted.
pub const MIN_CONTAINER_CHARS: usize = 200;

const NOISE_SELECTOR: &str = "script, style, nav, header, footer, aside, .sidebar, .advertisement, .ads";

const ARTICLE_SELECTOR: &str = "article";

const CONTENT_SELECTORS: [&str; 8] = [
    "main",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-content",
    "#content",
    ".main-content",
    "[role=\"main\"]",
];

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n\s*\n").unwrap();
}

/// Collapses whitespace runs to single spaces, blank-line runs to a single
/// blank line, and trims.
pub fn normalize_whitespace(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    BLANK_LINES.replace_all(&collapsed, "\n\n").trim().to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next().map(element_text)
}

fn remove_noise(document: &mut Html) {
    let Ok(selector) = Selector::parse(NOISE_SELECTOR) else {
        return;
    };
    let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Best-effort main text of `markup`. Never fails; may return an empty string.
pub fn extract(markup: &str) -> String {
    let mut document = Html::parse_document(markup);
    remove_noise(&mut document);

    if let Some(text) = first_text(&document, ARTICLE_SELECTOR).filter(|t| !t.is_empty()) {
        return text;
    }

    for selector in CONTENT_SELECTORS {
        if let Some(text) = first_text(&document, selector) {
            if text.chars().count() > MIN_CONTAINER_CHARS {
                return text;
            }
        }
    }

    first_text(&document, "body").unwrap_or_else(|| element_text(document.root_element()))
}
