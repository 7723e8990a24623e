//! HTML to text and metadata
//!
//! The main content of a page is the largest of its first `article`, `main`,
//! `div` and `body` elements. Its text nodes are trimmed and joined by newlines.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

/// Metadata read from a page's head and markup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    /// Language the parser was configured with
    pub language: String,
    pub title: String,
    pub description: Option<String>,

    /// Raw `article:published_time` value, or the first `<time datetime>`
    pub published: Option<String>,

    /// Raw `article:modified_time` value, or the first `<time datetime>`
    pub modified: Option<String>,
    pub author: Option<String>,
}

/// Structured representation of a fetched page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub url: String,
    pub title: String,

    /// Text of the main content area
    pub text: String,

    /// Original HTML
    pub html: String,
    pub fetched_at: DateTime<Utc>,
    pub metadata: PageMetadata,
}

/// Parses raw HTML into text and metadata
#[derive(Debug, Clone)]
pub struct PageParser {
    language: String,
}

impl Default for PageParser {
    fn default() -> Self {
        Self::new("it")
    }
}

impl PageParser {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Parses `html` fetched from `url` at `fetched_at`
    pub fn parse(&self, url: &str, html: &str, fetched_at: DateTime<Utc>) -> ParsedPage {
        let document = Html::parse_document(html);

        let title = first_match(&document, "title")
            .map(|element| element.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let text = select_main_content(&document)
            .text()
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let metadata = PageMetadata {
            language: self.language.clone(),
            title: title.clone(),
            description: meta_content(&document, "name", "description"),
            published: find_datetime(&document, "article:published_time"),
            modified: find_datetime(&document, "article:modified_time"),
            author: meta_content(&document, "name", "author"),
        };

        ParsedPage {
            url: url.to_string(),
            title,
            text,
            html: html.to_string(),
            fetched_at,
            metadata,
        }
    }
}

fn first_match<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

/// Picks the candidate with the most text; the first one wins ties
fn select_main_content(document: &Html) -> ElementRef<'_> {
    let mut best: Option<(usize, ElementRef<'_>)> = None;

    for tag in ["article", "main", "div", "body"] {
        if let Some(node) = first_match(document, tag) {
            let length: usize = node.text().map(|chunk| chunk.chars().count()).sum();
            if best.map_or(true, |(best_length, _)| length > best_length) {
                best = Some((length, node));
            }
        }
    }

    best.map(|(_, node)| node)
        .unwrap_or_else(|| document.root_element())
}

/// Trimmed `content` of the first `<meta {attribute}="{value}">`
fn meta_content(document: &Html, attribute: &str, value: &str) -> Option<String> {
    let tag = first_match(document, &format!(r#"meta[{}="{}"]"#, attribute, value))?;
    tag.value()
        .attr("content")
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

fn find_datetime(document: &Html, property: &str) -> Option<String> {
    meta_content(document, "property", property).or_else(|| {
        first_match(document, "time")?
            .value()
            .attr("datetime")
            .map(str::trim)
            .filter(|datetime| !datetime.is_empty())
            .map(str::to_string)
    })
}
