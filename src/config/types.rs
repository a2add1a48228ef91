use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for hdb-flats
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the portal's known-good defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the portal lives
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Scheme and host every relative flat-type link is resolved against
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Path of the launch summary page
    #[serde(rename = "summary-path", default = "default_summary_path")]
    pub summary_path: String,
}

impl PortalConfig {
    /// Builds the summary page URL for a selection type
    ///
    /// The selection type is passed to the portal verbatim. An unknown mode
    /// simply yields an empty or mismatched tree.
    pub fn summary_url(&self, selection_type: &str) -> String {
        format!(
            "{}{}?sel={}",
            self.base_url.trim_end_matches('/'),
            self.summary_path,
            selection_type
        )
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            summary_path: default_summary_path(),
        }
    }
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Path to a Chrome/Chromium binary (auto-detected when absent)
    #[serde(default)]
    pub executable: Option<String>,

    /// Timeout for a single DevTools request (milliseconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            executable: None,
            request_timeout: default_request_timeout(),
        }
    }
}

/// Retry timing for steps that wait on client-side rendering
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Delay between attempts to enumerate a flat-type page's blocks (milliseconds)
    #[serde(rename = "link-delay", default = "default_link_delay")]
    pub link_delay: u64,

    /// Delay between attempts to render a block's units (milliseconds)
    #[serde(rename = "unit-delay", default = "default_unit_delay")]
    pub unit_delay: u64,

    /// Wait after executing a block script, before snapshotting (milliseconds)
    #[serde(rename = "render-settle", default = "default_render_settle")]
    pub render_settle: u64,

    /// Attempt cap per step; absent means retry until the page stabilises
    #[serde(rename = "max-attempts", default)]
    pub max_attempts: Option<u32>,
}

impl RetryConfig {
    pub fn link_delay(&self) -> Duration {
        Duration::from_millis(self.link_delay)
    }

    pub fn unit_delay(&self) -> Duration {
        Duration::from_millis(self.unit_delay)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.render_settle)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            link_delay: default_link_delay(),
            unit_delay: default_unit_delay(),
            render_settle: default_render_settle(),
            max_attempts: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory default-named exports are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_base_url() -> String {
    "https://services2.hdb.gov.sg".to_string()
}

fn default_summary_path() -> String {
    "/webapp/BP13AWFlatAvail/BP13SEstateSummary".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_link_delay() -> u64 {
    5_000
}

fn default_unit_delay() -> u64 {
    10_000
}

fn default_render_settle() -> u64 {
    10_000
}

fn default_output_directory() -> String {
    ".".to_string()
}
