//! Runtime configuration for the crawl, index and search stages.
//!
//! Every value has a default matching the publication portal the tool was
//! written for; a JSON file may override any subset of them.

use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_URL: &str =
    "https://pureportal.coventry.ac.uk/en/organisations/fbl-school-of-economics-finance-and-accounting/publications/";
pub const DEFAULT_ORIGIN: &str = "https://pureportal.coventry.ac.uk";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_INDEX_DIR: &str = "index";
pub const DEFAULT_RESULT_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid selector for marker '{marker}': {reason}")]
    Selector { marker: String, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub fetch: FetchConfig,
    pub index: IndexConfig,
    pub search: SearchConfig,
}

impl Config {
    /// Loads a config file if one is given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.target.url)
            .map_err(|e| ConfigError::Invalid(format!("target url '{}': {e}", self.target.url)))?;
        Url::parse(&self.target.origin).map_err(|e| {
            ConfigError::Invalid(format!("target origin '{}': {e}", self.target.origin))
        })?;
        if self.search.limit == 0 {
            return Err(ConfigError::Invalid("search limit must be at least 1".into()));
        }
        if self.index.dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("index dir must not be empty".into()));
        }
        // Compile each marker once so a bad class name fails here, not mid-crawl.
        for (name, marker) in self.target.markers.named() {
            marker.selector(name)?;
        }
        Ok(())
    }
}

/// The page to crawl and the structural markers its markup is expected to carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub url: String,
    /// Prefixed to relative hrefs found on the page.
    pub origin: String,
    pub markers: Markers,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            markers: Markers::default(),
        }
    }
}

/// Matches elements by optional tag name plus one or more classes.
///
/// `class` may hold several whitespace-separated classes; an element must
/// carry all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMarker {
    #[serde(default)]
    pub tag: Option<String>,
    pub class: String,
}

impl ElementMarker {
    pub fn new(tag: Option<&str>, class: &str) -> Self {
        Self {
            tag: tag.map(str::to_string),
            class: class.to_string(),
        }
    }

    /// CSS form, e.g. `a.link.person`.
    pub fn css(&self) -> String {
        let mut css = self.tag.clone().unwrap_or_default();
        for class in self.class.split_whitespace() {
            css.push('.');
            css.push_str(class);
        }
        css
    }

    pub fn selector(&self, name: &str) -> Result<Selector, ConfigError> {
        if self.class.trim().is_empty() {
            return Err(ConfigError::Selector {
                marker: name.to_string(),
                reason: "class must not be empty".to_string(),
            });
        }
        Selector::parse(&self.css()).map_err(|e| ConfigError::Selector {
            marker: name.to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Present once the listing has rendered.
    pub container: ElementMarker,
    /// Wraps one publication.
    pub item: ElementMarker,
    /// Heading holding the title text and the publication anchor.
    pub title: ElementMarker,
    pub author: ElementMarker,
    pub date: ElementMarker,
}

impl Markers {
    pub fn named(&self) -> [(&'static str, &ElementMarker); 5] {
        [
            ("container", &self.container),
            ("item", &self.item),
            ("title", &self.title),
            ("author", &self.author),
            ("date", &self.date),
        ]
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            container: ElementMarker::new(None, "list-results"),
            item: ElementMarker::new(Some("li"), "list-result-item"),
            title: ElementMarker::new(Some("h3"), "title"),
            author: ElementMarker::new(Some("a"), "link person"),
            date: ElementMarker::new(Some("span"), "date"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// How long to wait for the results container before giving up.
    pub wait_timeout_secs: u64,
    pub scroll_count: u32,
    pub scroll_pause_millis: u64,
    pub user_agent: String,
    /// Browser binary to launch; auto-detected when unset.
    pub chrome_executable: Option<PathBuf>,
}

impl FetchConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_millis)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: 30,
            scroll_count: 15,
            scroll_pause_millis: 2_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_executable: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub dir: PathBuf,
    /// Memory budget handed to the tantivy writer, in bytes.
    pub writer_memory_bytes: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_INDEX_DIR),
            writer_memory_bytes: 50_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
        }
    }
}
