//! Headless Chrome rendering of the listing page.
//!
//! The listing is rendered client-side and lazily extends itself as the
//! viewport reaches the bottom, so a plain GET only sees the first batch.

use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::FetchError;
use crate::config::FetchConfig;

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct BrowserFetcher {
    container_css: String,
    wait_timeout: Duration,
    scroll_count: u32,
    scroll_pause: Duration,
    user_agent: String,
    chrome_executable: Option<PathBuf>,
}

impl BrowserFetcher {
    pub fn new(fetch: &FetchConfig, container_css: String) -> Self {
        Self {
            container_css,
            wait_timeout: fetch.wait_timeout(),
            scroll_count: fetch.scroll_count,
            scroll_pause: fetch.scroll_pause(),
            user_agent: fetch.user_agent.clone(),
            chrome_executable: fetch.chrome_executable.clone(),
        }
    }

    /// Launches a browser, renders `url` and always shuts the browser down
    /// before returning.
    pub async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        // Removed on drop, after the browser process has exited.
        let profile_dir = tempfile::Builder::new()
            .prefix("pubindex-chrome-")
            .tempdir()?;

        let mut builder = BrowserConfig::builder()
            .headless_mode(HeadlessMode::default())
            .user_data_dir(profile_dir.path())
            .request_timeout(self.wait_timeout)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", self.user_agent));
        if let Some(executable) = &self.chrome_executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(FetchError::BrowserConfig)?;

        info!("Launching headless browser");
        let (mut browser, mut handler) = Browser::launch(config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {:?}", e);
                }
            }
        });

        let rendered = self.render(&browser, url).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("Failed waiting for browser exit: {}", e);
        }
        handler_task.abort();
        drop(profile_dir);

        rendered
    }

    async fn render(&self, browser: &Browser, url: &str) -> Result<Option<String>, FetchError> {
        info!(url, "Navigating to listing");
        let page = browser.new_page(url).await?;

        if !self.wait_for_container(&page).await {
            warn!(
                selector = %self.container_css,
                "Results container did not appear within {:?}",
                self.wait_timeout
            );
            return Ok(None);
        }

        for step in 1..=self.scroll_count {
            page.evaluate(SCROLL_TO_BOTTOM).await?;
            debug!("Scrolled to bottom ({}/{})", step, self.scroll_count);
            tokio::time::sleep(self.scroll_pause).await;
        }

        let html = page.content().await?;
        debug!("Captured {} bytes of rendered markup", html.len());
        Ok(Some(html))
    }

    /// Polls the DOM until the results container exists or the wait expires.
    async fn wait_for_container(&self, page: &Page) -> bool {
        let start = Instant::now();
        loop {
            if page.find_element(self.container_css.as_str()).await.is_ok() {
                debug!("Results container found after {:?}", start.elapsed());
                return true;
            }
            if start.elapsed() >= self.wait_timeout {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
