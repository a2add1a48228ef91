//! Page work the walker runs inside the retry envelope
//!
//! Each step redoes its navigation or script execution on every attempt,
//! so a retry never parses a page left over from the previous one.

use crate::driver::{DriverError, PageDriver, RenderedDocument};
use crate::grammar::{self, GrammarError};
use crate::models::{BlockLink, LaunchSummary, UnitFields};
use crate::retry::{Delay, Step};
use crate::{Result, ScrapeError, WalkState};
use std::time::Duration;
use url::Url;

/// Loads the launch summary and reads the launch tree
pub(crate) struct LoadSummary<'a> {
    pub url: &'a str,
    pub base_url: &'a Url,
}

impl<D: PageDriver> Step<D> for LoadSummary<'_> {
    type Output = Vec<LaunchSummary>;

    async fn attempt(&mut self, driver: &mut D, state: WalkState) -> Result<Self::Output> {
        let document = load(driver, self.url, state).await?;
        grammar::parse_available_flats(document.html(), self.base_url).map_err(|e| classify(state, e))
    }
}

/// Opens a flat-type page and lists its blocks
pub(crate) struct ListBlocks<'a> {
    pub url: &'a str,
}

impl<D: PageDriver> Step<D> for ListBlocks<'_> {
    type Output = Vec<BlockLink>;

    async fn attempt(&mut self, driver: &mut D, state: WalkState) -> Result<Self::Output> {
        let document = load(driver, self.url, state).await?;
        grammar::parse_block_links(document.html()).map_err(|e| classify(state, e))
    }
}

/// A block whose units have appeared
#[derive(Debug)]
pub(crate) struct RenderedBlock {
    pub document: RenderedDocument,
    pub units: Vec<UnitFields>,
}

/// Activates one block and waits for its units
///
/// The panel keeps showing the previous block until the script's render
/// lands. A snapshot naming `previous` is therefore treated as an empty
/// render and retried.
pub(crate) struct RenderBlock<'a, W> {
    pub block: &'a BlockLink,
    pub previous: Option<&'a str>,
    pub settle: Duration,
    pub delay: &'a W,
}

impl<D: PageDriver, W: Delay> Step<D> for RenderBlock<'_, W> {
    type Output = RenderedBlock;

    async fn attempt(&mut self, driver: &mut D, state: WalkState) -> Result<Self::Output> {
        driver
            .execute_script(self.block.script())
            .await
            .map_err(|e| driver_fault(state, e))?;
        self.delay.wait(self.settle).await;

        let document = driver.snapshot().await.map_err(|e| driver_fault(state, e))?;
        let render = grammar::parse_block_render(document.html()).map_err(|e| classify(state, e))?;

        if let (Some(shown), Some(previous)) = (render.shown_block.as_deref(), self.previous) {
            if shown.eq_ignore_ascii_case(previous) {
                return Err(ScrapeError::empty_render(
                    state,
                    format!("page still shows block {}", previous),
                ));
            }
        }

        Ok(RenderedBlock {
            document,
            units: render.units,
        })
    }
}

/// Navigates to a URL and snapshots it
async fn load<D: PageDriver>(driver: &mut D, url: &str, state: WalkState) -> Result<RenderedDocument> {
    driver.navigate(url).await.map_err(|e| driver_fault(state, e))?;
    driver.snapshot().await.map_err(|e| driver_fault(state, e))
}

/// Browser failures are always worth another attempt
fn driver_fault(state: WalkState, error: DriverError) -> ScrapeError {
    ScrapeError::navigation(state, error.to_string())
}

/// Maps an extraction failure onto the walk's error taxonomy
///
/// Missing content on a block render means the units have not appeared yet;
/// anywhere else it means the page itself has not loaded.
pub(crate) fn classify(state: WalkState, error: GrammarError) -> ScrapeError {
    match error {
        GrammarError::NotRendered(message) if state == WalkState::AtBlockLinks => {
            ScrapeError::empty_render(state, message)
        }
        GrammarError::NotRendered(message) => ScrapeError::navigation(state, message),
        GrammarError::Mismatch(message) => ScrapeError::structural(state, message),
    }
}
