use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::config::{ConfigError, TargetConfig};
use crate::record::{AuthorRef, NO_LINK, PublicationRecord, UNKNOWN_DATE};

/// Compiled selectors for one listing layout.
#[derive(Debug, Clone)]
struct Selectors {
    container: Selector,
    item: Selector,
    title: Selector,
    title_link: Selector,
    author: Selector,
    date: Selector,
}

/// Turns rendered listing markup into publication records.
///
/// Extraction never fails: optional fields fall back to sentinels and only a
/// record without a title is dropped.
#[derive(Debug, Clone)]
pub struct Extractor {
    selectors: Selectors,
    origin: Url,
}

impl Extractor {
    pub fn new(target: &TargetConfig) -> Result<Self, ConfigError> {
        let markers = &target.markers;
        let selectors = Selectors {
            container: markers.container.selector("container")?,
            item: markers.item.selector("item")?,
            title: markers.title.selector("title")?,
            title_link: Selector::parse("a").map_err(|e| ConfigError::Selector {
                marker: "title link".to_string(),
                reason: e.to_string(),
            })?,
            author: markers.author.selector("author")?,
            date: markers.date.selector("date")?,
        };

        let origin = Url::parse(&target.origin).map_err(|e| {
            ConfigError::Invalid(format!("target origin '{}': {e}", target.origin))
        })?;

        Ok(Self { selectors, origin })
    }

    /// Whether the markup contains the results container at all.
    pub fn has_container(&self, markup: &str) -> bool {
        Html::parse_document(markup)
            .select(&self.selectors.container)
            .next()
            .is_some()
    }

    pub fn extract(&self, markup: &str) -> Vec<PublicationRecord> {
        let document = Html::parse_document(markup);
        let mut records = Vec::with_capacity(64);

        for item in document.select(&self.selectors.item) {
            match self.extract_record(item) {
                Some(record) => records.push(record),
                None => debug!("Skipping listing item without a title"),
            }
        }
        records
    }

    fn extract_record(&self, item: ElementRef<'_>) -> Option<PublicationRecord> {
        let heading = item.select(&self.selectors.title).next()?;
        let title = clean_text(heading.text());
        if title.is_empty() {
            return None;
        }

        let link = heading
            .select(&self.selectors.title_link)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .and_then(|href| self.absolutize(href))
            .unwrap_or_else(|| NO_LINK.to_string());

        let authors = self.extract_authors(item);

        let date = item
            .select(&self.selectors.date)
            .next()
            .map(|span| clean_text(span.text()))
            .unwrap_or_else(|| UNKNOWN_DATE.to_string());

        Some(PublicationRecord {
            title,
            link,
            authors,
            date,
        })
    }

    fn extract_authors(&self, item: ElementRef<'_>) -> Vec<AuthorRef> {
        let mut authors = Vec::new();
        for anchor in item.select(&self.selectors.author) {
            let name = clean_text(anchor.text());
            if name.is_empty() {
                continue;
            }
            let href = anchor.value().attr("href").unwrap_or_default().trim();
            if href.is_empty() {
                debug!(author = %name, "Skipping author without profile link");
                continue;
            }
            let Some(profile_link) = self.absolutize(href) else {
                debug!(author = %name, href, "Skipping author with unresolvable profile link");
                continue;
            };
            authors.push(AuthorRef { name, profile_link });
        }
        authors
    }

    fn absolutize(&self, href: &str) -> Option<String> {
        self.origin.join(href).ok().map(String::from)
    }
}

/// Joins text nodes and collapses runs of whitespace to single spaces.
fn clean_text<'a>(text_iter: impl Iterator<Item = &'a str>) -> String {
    let joined: String = text_iter.collect();
    let mut buffer = String::with_capacity(joined.len());
    for word in joined.split_whitespace() {
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(word);
    }
    buffer
}
