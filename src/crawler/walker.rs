//! Hierarchy walker
//!
//! Drives one page session through the portal's levels:
//!
//! ```text
//! Idle → AtSummary → AtFlatTypeLinks → AtBlockLinks → AtBlockDetail → Done
//!                          ↑                 ↑______________|
//!                          |________________________________|
//! ```
//!
//! Every page load or script execution is a `Step` run inside the retry
//! envelope. Flat-type pages use the link policy; block renders use the unit
//! policy and wait for the page to settle before each snapshot.

use crate::config::{Config, PortalConfig};
use crate::crawler::assembler::assemble;
use crate::crawler::selection::{select_links, ScrapeRequest};
use crate::crawler::steps::{classify, ListBlocks, LoadSummary, RenderBlock};
use crate::driver::PageDriver;
use crate::grammar::{self, patterns, BlockPanel};
use crate::models::{FlatTypeContext, FlatTypeSummary, LaunchSummary, UnitRecord};
use crate::retry::{Delay, RetryEnvelope, RetryPolicy};
use crate::{ConfigError, Result, ScrapeError, WalkState};
use std::time::Duration;
use url::Url;

/// Walks the portal hierarchy over a borrowed page driver
///
/// A walker performs a single walk. Once it reaches `Done` (or fails) a new
/// walker is needed for the next one; the driver can be reused.
pub struct Walker<'d, D, W> {
    driver: &'d mut D,
    portal: PortalConfig,
    link_policy: RetryPolicy,
    unit_policy: RetryPolicy,
    render_settle: Duration,
    delay: W,
    state: WalkState,
}

impl<'d, D: PageDriver, W: Delay> Walker<'d, D, W> {
    /// Creates a walker in the `Idle` state
    ///
    /// # Arguments
    ///
    /// * `driver` - Page session the walker drives exclusively while it lives
    /// * `config` - Portal location and retry timings
    /// * `delay` - How waits are performed (`TokioDelay` live, `NoDelay` in tests)
    pub fn new(driver: &'d mut D, config: &Config, delay: W) -> Self {
        Self {
            driver,
            portal: config.portal.clone(),
            link_policy: RetryPolicy {
                delay: config.retry.link_delay(),
                max_attempts: config.retry.max_attempts,
            },
            unit_policy: RetryPolicy {
                delay: config.retry.unit_delay(),
                max_attempts: config.retry.max_attempts,
            },
            render_settle: config.retry.render_settle(),
            delay,
            state: WalkState::Idle,
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Loads and parses the launch summary for a selection type
    ///
    /// Loading is retried under the link policy. A summary page that loads
    /// but does not have the expected layout fails immediately.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<LaunchSummary>)` - Launch tree in page order (possibly empty)
    /// * `Err(ScrapeError)` - Structural mismatch, exhausted retries, or an illegal state
    pub async fn available_flats(&mut self, selection_type: &str) -> Result<Vec<LaunchSummary>> {
        self.transition(WalkState::AtSummary)?;

        let base_url = Url::parse(&self.portal.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.portal.base_url, e)))?;
        let url = self.portal.summary_url(selection_type);
        tracing::info!("Loading launch summary from {}", url);

        let mut step = LoadSummary {
            url: &url,
            base_url: &base_url,
        };
        let launches = RetryEnvelope::new(self.link_policy, &self.delay)
            .run(self.state, &mut *self.driver, &mut step)
            .await?;

        tracing::info!(
            "Found {} launches for selection type {}",
            launches.len(),
            selection_type
        );
        Ok(launches)
    }

    /// Walks every flat-type link the request selects and returns one record per unit
    ///
    /// An unknown or ambiguous launch date, or filters matching nothing,
    /// produce an empty result. Any structural mismatch or exhausted retry
    /// aborts the whole walk; no partial result is returned.
    pub async fn scrape(&mut self, request: &ScrapeRequest) -> Result<Vec<UnitRecord>> {
        tracing::info!(
            "Type: {}, Launch Date: {}, Flat Type: {} Room, Town: {}",
            request.selection_type,
            request.launch_date,
            request.flat_type_label(),
            request.town_label()
        );

        let launches = self.available_flats(&request.selection_type).await?;
        let links: Vec<FlatTypeSummary> = select_links(&launches, request)
            .into_iter()
            .cloned()
            .collect();

        let mut records = Vec::new();
        let total = links.len();
        for (index, link) in links.iter().enumerate() {
            let context = link.context();
            tracing::info!(
                "{} - {} Room: {} / {}",
                context.town,
                context.flat_type,
                index + 1,
                total
            );
            let found = self.walk_flat_type(link).await?;
            records.extend(found);
        }

        self.finish()?;
        tracing::info!("Collected {} units", records.len());
        Ok(records)
    }

    /// Marks the walk complete
    pub fn finish(&mut self) -> Result<()> {
        self.transition(WalkState::Done)
    }

    async fn walk_flat_type(&mut self, link: &FlatTypeSummary) -> Result<Vec<UnitRecord>> {
        self.transition(WalkState::AtFlatTypeLinks)?;
        let context = link.context();

        let mut step = ListBlocks { url: &link.link };
        let blocks = RetryEnvelope::new(self.link_policy, &self.delay)
            .run(self.state, &mut *self.driver, &mut step)
            .await?;
        tracing::debug!(
            "{} - {} Room has {} blocks",
            context.town,
            context.flat_type,
            blocks.len()
        );

        let mut records = Vec::new();
        let mut previous: Option<String> = None;
        let total = blocks.len();
        for (index, block) in blocks.iter().enumerate() {
            self.transition(WalkState::AtBlockLinks)?;

            let mut step = RenderBlock {
                block,
                previous: previous.as_deref(),
                settle: self.render_settle,
                delay: &self.delay,
            };
            let rendered = RetryEnvelope::new(self.unit_policy, &self.delay)
                .run(self.state, &mut *self.driver, &mut step)
                .await?;

            self.transition(WalkState::AtBlockDetail)?;
            let state = self.state;
            let panel = grammar::parse_block_panel(rendered.document.html())
                .map_err(|e| classify(state, e))?;
            check_displayed_context(context, &panel);

            for unit in rendered.units {
                let record = assemble(context, &panel.details, unit)?;
                tracing::info!(
                    "{} - {} - {} - {}: {} / {}",
                    record.town,
                    record.flat_type,
                    record.block_id,
                    record.unit,
                    index + 1,
                    total
                );
                records.push(record);
            }

            previous = Some(panel.details.block_id().to_string());
        }

        Ok(records)
    }

    fn transition(&mut self, next: WalkState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ScrapeError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("{} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Warns when a block page shows a different town or flat type than its link
fn check_displayed_context(context: &FlatTypeContext, panel: &BlockPanel) {
    if let Some(town) = &panel.displayed_town {
        if !town.eq_ignore_ascii_case(&context.town) {
            tracing::warn!(
                "Block {} shows town '{}' but was reached from a {} link",
                panel.details.block_id(),
                town,
                context.town
            );
        }
    }

    if let Some(flat) = &panel.displayed_flat {
        let rooms = patterns::room_count(flat);
        if rooms.as_deref() != Some(context.flat_type.as_str()) {
            tracing::warn!(
                "Block {} shows flat type '{}' but was reached from a {}-Room link",
                panel.details.block_id(),
                flat,
                context.flat_type
            );
        }
    }
}
