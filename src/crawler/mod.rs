//! Portal walking
//!
//! - `selection`: what the caller asked for and which links that selects
//! - `walker`: the hierarchy state machine driving a page session
//! - `steps`: the retryable page loads and block renders the walker runs
//! - `assembler`: folds the levels' context into one record per unit
//!
//! The two entry points below own a Chrome session for the duration of one
//! call and always close it, whether the walk succeeded or not.

mod assembler;
mod selection;
mod steps;
mod walker;

pub use assembler::assemble;
pub use selection::{
    find_launch, flat_type_choices, normalize_filter, select_links, town_choices, ScrapeRequest,
    ALL,
};
pub use walker::Walker;

use crate::config::Config;
use crate::driver::ChromeDriver;
use crate::models::{LaunchSummary, UnitRecord};
use crate::retry::TokioDelay;
use crate::Result;

/// Reads the launch → town → flat-type tree for a selection type
///
/// # Arguments
///
/// * `config` - Portal, browser and retry configuration
/// * `selection_type` - Portal mode, e.g. "BTO" or "SBF"
///
/// # Returns
///
/// * `Ok(Vec<LaunchSummary>)` - Launches in page order
/// * `Err(ScrapeError)` - The browser failed to start or the summary could not be read
pub async fn get_available_flats(config: &Config, selection_type: &str) -> Result<Vec<LaunchSummary>> {
    let mut driver = ChromeDriver::launch(&config.browser).await?;

    let outcome = {
        let mut walker = Walker::new(&mut driver, config, TokioDelay);
        match walker.available_flats(selection_type).await {
            Ok(launches) => walker.finish().map(|_| launches),
            Err(e) => Err(e),
        }
    };

    driver.close().await;
    outcome
}

/// Scrapes every unit the request selects
///
/// # Arguments
///
/// * `config` - Portal, browser and retry configuration
/// * `request` - Selection type, launch date and optional flat-type/town filters
///
/// # Returns
///
/// * `Ok(Vec<UnitRecord>)` - One record per unit, in walk order (empty if nothing matched)
/// * `Err(ScrapeError)` - A structural mismatch or exhausted retries aborted the walk
///
/// # Example
///
/// ```no_run
/// use hdb_flats::{scrape, Config, ScrapeRequest};
///
/// # async fn run() -> hdb_flats::Result<()> {
/// let request = ScrapeRequest::new("BTO", "Feb 2024")
///     .with_flat_type(Some("3"))
///     .with_town(Some("Yishun"));
/// let records = scrape(&Config::default(), &request).await?;
/// println!("{} units", records.len());
/// # Ok(())
/// # }
/// ```
pub async fn scrape(config: &Config, request: &ScrapeRequest) -> Result<Vec<UnitRecord>> {
    let mut driver = ChromeDriver::launch(&config.browser).await?;

    let outcome = Walker::new(&mut driver, config, TokioDelay)
        .scrape(request)
        .await;

    driver.close().await;
    outcome
}
