use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

pub mod browser;
pub mod datascraper;

use crate::config::{ConfigError, FetchConfig, TargetConfig};
use crate::record::PublicationRecord;
use browser::BrowserFetcher;
use datascraper::Extractor;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("browser configuration rejected: {0}")]
    BrowserConfig(String),

    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: reqwest::StatusCode },

    #[error("failed to prepare browser profile: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// How the listing page gets rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// Headless Chrome with scrolling, so lazy-loaded entries appear.
    #[default]
    Browser,
    /// A single GET without scripts; only the server-rendered entries.
    Http,
}

pub enum Fetcher {
    Browser(BrowserFetcher),
    Http(HttpFetcher),
}

impl Fetcher {
    pub fn new(mode: FetchMode, fetch: &FetchConfig, target: &TargetConfig) -> Result<Self, FetchError> {
        let container = target.markers.container.css();
        Ok(match mode {
            FetchMode::Browser => Fetcher::Browser(BrowserFetcher::new(fetch, container)),
            FetchMode::Http => Fetcher::Http(HttpFetcher::new(fetch, Extractor::new(target)?)?),
        })
    }

    /// Returns the rendered markup, or `None` if the results container
    /// never showed up.
    pub async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        match self {
            Fetcher::Browser(fetcher) => fetcher.fetch(url).await,
            Fetcher::Http(fetcher) => fetcher.fetch(url).await,
        }
    }
}

pub struct HttpFetcher {
    client: Client,
    extractor: Extractor,
}

impl HttpFetcher {
    pub fn new(fetch: &FetchConfig, extractor: Extractor) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(fetch.user_agent.as_str())
            .timeout(fetch.wait_timeout())
            .build()?;

        Ok(Self { client, extractor })
    }

    pub async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await?;
        if !self.extractor.has_container(&body) {
            warn!(url, "Results container not present in static markup");
            return Ok(None);
        }
        Ok(Some(body))
    }
}

/// Fetches the configured listing page and extracts its publications.
///
/// A page whose results never appeared yields an empty list rather than an error.
pub async fn crawl(fetcher: &Fetcher, target: &TargetConfig) -> Result<Vec<PublicationRecord>, FetchError> {
    let extractor = Extractor::new(target)?;

    info!(url = %target.url, "Fetching publication listing");
    let markup = match fetcher.fetch(&target.url).await? {
        Some(markup) => markup,
        None => {
            warn!("Timeout: could not find research papers, continuing with no records");
            return Ok(Vec::new());
        }
    };

    let records = extractor.extract(&markup);
    info!(
        "Extracted {} publications from {} bytes of markup",
        records.len(),
        markup.len()
    );
    Ok(records)
}
