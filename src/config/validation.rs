use crate::config::types::{BrowserConfig, Config, OutputConfig, PortalConfig, RetryConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_portal_config(&config.portal)?;
    validate_browser_config(&config.browser)?;
    validate_retry_config(&config.retry)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates portal location
fn validate_portal_config(config: &PortalConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if !config.summary_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "summary-path must start with '/', got '{}'",
            config.summary_path
        )));
    }

    Ok(())
}

/// Validates browser session settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.request_timeout < 1000 {
        return Err(ConfigError::Validation(format!(
            "request-timeout must be >= 1000ms, got {}ms",
            config.request_timeout
        )));
    }

    if let Some(executable) = &config.executable {
        if executable.trim().is_empty() {
            return Err(ConfigError::Validation(
                "executable cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates retry timing
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("link-delay", config.link_delay),
        ("unit-delay", config.unit_delay),
        ("render-settle", config.render_settle),
    ] {
        if value < 100 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 100ms, got {}ms",
                name, value
            )));
        }
    }

    if config.max_attempts == Some(0) {
        return Err(ConfigError::Validation(
            "max-attempts must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
