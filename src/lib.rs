//! hdb-flats: availability and pricing extraction for the HDB flat portal
//!
//! The portal only discloses units through a chain of script-driven views
//! (sales launch, town, flat type, block, unit). This crate drives a browser
//! session through that chain and flattens what it finds into one record per unit.

pub mod config;
pub mod crawler;
pub mod driver;
pub mod grammar;
pub mod models;
pub mod output;
pub mod prompt;
pub mod retry;
pub mod state;

use thiserror::Error;

/// Main error type for portal walks
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transient: the page was not navigable or not yet rendered
    #[error("Navigation failed at {state}: {message}")]
    Navigation { state: WalkState, message: String },

    /// Transient: a block rendered without any unit elements
    #[error("No units rendered at {state}: {message}")]
    EmptyRender { state: WalkState, message: String },

    /// Fatal: the page does not have the structure the extractors expect
    #[error("Page structure mismatch at {state}: {message}")]
    StructuralMismatch { state: WalkState, message: String },

    #[error("Gave up at {state} after {attempts} attempts: {last}")]
    RetriesExhausted {
        state: WalkState,
        attempts: u32,
        last: Box<ScrapeError>,
    },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition { from: WalkState, to: WalkState },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScrapeError {
    pub fn navigation(state: WalkState, message: impl Into<String>) -> Self {
        Self::Navigation {
            state,
            message: message.into(),
        }
    }

    pub fn empty_render(state: WalkState, message: impl Into<String>) -> Self {
        Self::EmptyRender {
            state,
            message: message.into(),
        }
    }

    pub fn structural(state: WalkState, message: impl Into<String>) -> Self {
        Self::StructuralMismatch {
            state,
            message: message.into(),
        }
    }

    /// Returns true for failures the retry envelope should absorb
    ///
    /// Only navigation hiccups and empty renders are transient. Structural
    /// mismatches mean the page changed shape and must abort the walk.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Navigation { .. } | Self::EmptyRender { .. })
    }

    /// Returns true if this error reports a page-structure mismatch
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::StructuralMismatch { .. })
    }

    /// The hierarchy level the error was raised at, if it is bound to one
    pub fn state(&self) -> Option<WalkState> {
        match self {
            Self::Navigation { state, .. }
            | Self::EmptyRender { state, .. }
            | Self::StructuralMismatch { state, .. }
            | Self::RetriesExhausted { state, .. } => Some(*state),
            Self::InvalidTransition { from, .. } => Some(*from),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for walk operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{get_available_flats, scrape, ScrapeRequest, Walker};
pub use models::{FlatTypeSummary, LaunchSummary, TownSummary, UnitRecord};
pub use state::WalkState;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ScrapeError::navigation(WalkState::AtFlatTypeLinks, "timeout").is_transient());
        assert!(ScrapeError::empty_render(WalkState::AtBlockLinks, "no units").is_transient());
        assert!(!ScrapeError::structural(WalkState::AtSummary, "no form").is_transient());
        assert!(!ScrapeError::Browser("launch failed".to_string()).is_transient());
    }

    #[test]
    fn test_error_names_failing_level() {
        let err = ScrapeError::structural(WalkState::AtBlockDetail, "missing Block label");
        assert_eq!(err.state(), Some(WalkState::AtBlockDetail));
        assert!(err.to_string().contains("block detail"));
        assert!(err.to_string().contains("missing Block label"));
    }

    #[test]
    fn test_exhausted_keeps_last_error() {
        let err = ScrapeError::RetriesExhausted {
            state: WalkState::AtBlockLinks,
            attempts: 3,
            last: Box::new(ScrapeError::empty_render(WalkState::AtBlockLinks, "0 units")),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("0 units"));
    }
}
