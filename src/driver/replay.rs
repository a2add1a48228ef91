//! In-memory page driver serving recorded HTML

use crate::driver::{DriverError, PageDriver, RenderedDocument};
use std::collections::{HashMap, VecDeque};

/// Serves recorded pages instead of a live browser
///
/// Pages are registered per URL and per script. A script can be given a
/// sequence of renders to imitate a page that settles over several looks:
/// each execution advances through the sequence and the last render repeats.
/// Navigation failures can be queued per URL to imitate a flaky network.
#[derive(Debug, Default)]
pub struct ReplayDriver {
    pages: HashMap<String, String>,
    renders: HashMap<String, VecDeque<String>>,
    navigation_failures: HashMap<String, u32>,
    current: Option<String>,
    navigations: Vec<String>,
    executions: Vec<String>,
}

impl ReplayDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the page served for `url`
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Registers the page left behind by executing `script`
    pub fn with_render(self, script: impl Into<String>, html: impl Into<String>) -> Self {
        self.with_renders(script, vec![html.into()])
    }

    /// Registers successive pages for repeated executions of `script`
    pub fn with_renders(mut self, script: impl Into<String>, renders: Vec<String>) -> Self {
        self.renders.insert(script.into(), renders.into());
        self
    }

    /// Makes the next `times` navigations to `url` fail
    pub fn failing_navigation(mut self, url: impl Into<String>, times: u32) -> Self {
        self.navigation_failures.insert(url.into(), times);
        self
    }

    /// URLs navigated to, in order
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Scripts executed, in order
    pub fn executions(&self) -> &[String] {
        &self.executions
    }

    /// Number of times `script` was executed
    pub fn execution_count(&self, script: &str) -> usize {
        self.executions.iter().filter(|s| s.as_str() == script).count()
    }
}

impl PageDriver for ReplayDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.navigations.push(url.to_string());

        if let Some(remaining) = self.navigation_failures.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DriverError::new(format!("timed out loading {}", url)));
            }
        }

        let html = self
            .pages
            .get(url)
            .ok_or_else(|| DriverError::new(format!("no recorded page for {}", url)))?;
        self.current = Some(html.clone());
        Ok(())
    }

    async fn execute_script(&mut self, script: &str) -> Result<(), DriverError> {
        self.executions.push(script.to_string());

        let renders = self
            .renders
            .get_mut(script)
            .ok_or_else(|| DriverError::new(format!("no recorded render for {}", script)))?;
        let html = if renders.len() > 1 {
            renders.pop_front()
        } else {
            renders.front().cloned()
        };
        if let Some(html) = html {
            self.current = Some(html);
        }
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<RenderedDocument, DriverError> {
        self.current
            .clone()
            .map(RenderedDocument::new)
            .ok_or_else(|| DriverError::new("no page loaded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_pages_by_url() {
        let mut driver = ReplayDriver::new().with_page("https://a.test/", "<p>a</p>");

        assert!(driver.snapshot().await.is_err());
        driver.navigate("https://a.test/").await.unwrap();
        assert_eq!(driver.snapshot().await.unwrap().html(), "<p>a</p>");
        assert!(driver.navigate("https://b.test/").await.is_err());
        assert_eq!(driver.navigations().len(), 2);
    }

    #[tokio::test]
    async fn test_render_sequence_repeats_last() {
        let mut driver = ReplayDriver::new().with_renders(
            "show()",
            vec!["<p>1</p>".to_string(), "<p>2</p>".to_string()],
        );

        assert_eq!(driver.execute("show()").await.unwrap().html(), "<p>1</p>");
        assert_eq!(driver.execute("show()").await.unwrap().html(), "<p>2</p>");
        assert_eq!(driver.execute("show()").await.unwrap().html(), "<p>2</p>");
        assert_eq!(driver.execution_count("show()"), 3);
    }

    #[tokio::test]
    async fn test_failing_navigation_recovers() {
        let mut driver = ReplayDriver::new()
            .with_page("https://a.test/", "<p>a</p>")
            .failing_navigation("https://a.test/", 2);

        assert!(driver.navigate("https://a.test/").await.is_err());
        assert!(driver.navigate("https://a.test/").await.is_err());
        assert!(driver.navigate("https://a.test/").await.is_ok());
    }
}
