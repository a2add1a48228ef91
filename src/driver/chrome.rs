//! Chrome DevTools implementation of the page driver

use crate::config::BrowserConfig;
use crate::driver::{DriverError, PageDriver, RenderedDocument};
use crate::ScrapeError;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

const SNAPSHOT_SCRIPT: &str = "document.documentElement.outerHTML";

/// One exclusively-owned Chrome session with a single working page
///
/// Acquire with [`ChromeDriver::launch`] and release with
/// [`ChromeDriver::close`]. Dropping an open session aborts the event loop
/// and lets chromiumoxide kill the child process.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeDriver {
    /// Launches Chrome and opens a blank working page
    ///
    /// # Arguments
    ///
    /// * `config` - Browser settings (headless mode, executable, request timeout)
    ///
    /// # Returns
    ///
    /// * `Ok(ChromeDriver)` - Session ready for navigation
    /// * `Err(ScrapeError::Browser)` - Chrome could not be started or connected
    pub async fn launch(config: &BrowserConfig) -> Result<Self, ScrapeError> {
        let mut builder = ChromeConfig::builder()
            .request_timeout(Duration::from_millis(config.request_timeout));
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }
        let chrome_config = builder.build().map_err(ScrapeError::Browser)?;

        tracing::debug!("Launching Chrome (headless: {})", config.headless);
        let (browser, mut events) = Browser::launch(chrome_config)
            .await
            .map_err(|e| ScrapeError::Browser(format!("failed to launch Chrome: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::warn!("Chrome event loop error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(ScrapeError::Browser(format!("failed to open page: {}", e)));
            }
        };

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Closes the browser and stops its event loop
    ///
    /// Errors are logged rather than returned so that closing never masks
    /// the outcome of the walk that used the session.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close Chrome cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed to reap Chrome process: {}", e);
        }
        self.handler.abort();
        tracing::debug!("Chrome session closed");
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

impl PageDriver for ChromeDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.page
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| DriverError::new(format!("navigation to {} failed: {}", url, e)))
    }

    async fn execute_script(&mut self, script: &str) -> Result<(), DriverError> {
        self.page
            .evaluate(script)
            .await
            .map(|_| ())
            .map_err(|e| DriverError::new(format!("script '{}' failed: {}", script, e)))
    }

    async fn snapshot(&mut self) -> Result<RenderedDocument, DriverError> {
        let html = self
            .page
            .evaluate(SNAPSHOT_SCRIPT)
            .await
            .map_err(|e| DriverError::new(format!("snapshot failed: {}", e)))?
            .into_value::<String>()
            .map_err(|e| DriverError::new(format!("snapshot was not a string: {}", e)))?;

        Ok(RenderedDocument::new(html))
    }
}
