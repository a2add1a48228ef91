//! Page driver adapter
//!
//! The walker only needs a handful of browser capabilities: load a URL, run
//! a page script, and take a snapshot of the rendered DOM. `PageDriver`
//! exposes exactly those. Implementations hold a single page whose state
//! every call mutates, so one driver serves one walker at a time.
//!
//! - `ChromeDriver`: a headless Chrome session over the DevTools protocol
//! - `ReplayDriver`: serves recorded pages from memory, for offline runs and tests

mod chrome;
mod replay;

pub use chrome::ChromeDriver;
pub use replay::ReplayDriver;

use thiserror::Error;

/// Any failure of the underlying browser: missing page, stale reference, timeout
///
/// The driver does not retry and does not classify; the walker decides what
/// a failure means at its current level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Snapshot of the page's rendered DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    html: String,
}

impl RenderedDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

/// Minimal browser capability the hierarchy walker drives
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Loads `url` into the session's page
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Runs a script in the current page
    async fn execute_script(&mut self, script: &str) -> Result<(), DriverError>;

    /// Captures the current DOM
    async fn snapshot(&mut self) -> Result<RenderedDocument, DriverError>;

    /// Runs a script and captures the DOM it leaves behind
    async fn execute(&mut self, script: &str) -> Result<RenderedDocument, DriverError> {
        self.execute_script(script).await?;
        self.snapshot().await
    }
}
