//! Block page extraction
//!
//! After a block's script runs, the page shows one `span.tooltip` per unit
//! (title: price and floor area) and a `#blockDetails` panel of alternating
//! label / value columns. The panel continues past the ethnic quota line
//! into unrelated content, so reading stops at the first `Malay-` entry.

use crate::grammar::{css, element_text, patterns, GrammarError};
use crate::models::{same_label, BlockDetails, UnitFields};
use scraper::{ElementRef, Html};

const UNIT_SELECTOR: &str = "span.tooltip";
const CURRENCY_MARKER: char = '$';
const DETAILS_SELECTOR: &str = "#blockDetails";
const DETAIL_COLUMN_SELECTOR: &str = "div.columns";
const DETAILS_SENTINEL: &str = "Malay-";

/// Fixed fields echoing the block's town and flat type
const TOWN_FIELD_SELECTOR: &str = "#Town";
const FLAT_FIELD_SELECTOR: &str = "#Flat";

/// Everything extracted from one rendered block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPage {
    /// Town shown on the page, for display and cross-checking only
    pub displayed_town: Option<String>,
    /// Flat type shown on the page, for display and cross-checking only
    pub displayed_flat: Option<String>,
    pub details: BlockDetails,
    pub units: Vec<UnitFields>,
}

/// What a block script left on the page, before the detail panel is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRender {
    pub units: Vec<UnitFields>,
    /// Block named by the detail panel, if the panel shows one yet
    pub shown_block: Option<String>,
}

/// The block's detail panel and the fixed town/flat fields around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPanel {
    pub displayed_town: Option<String>,
    pub displayed_flat: Option<String>,
    pub details: BlockDetails,
}

/// Parses a rendered block page
///
/// Combines [`parse_block_render`] and [`parse_block_panel`] over one snapshot.
pub fn parse_block_page(html: &str) -> Result<BlockPage, GrammarError> {
    let render = parse_block_render(html)?;
    let panel = parse_block_panel(html)?;

    Ok(BlockPage {
        displayed_town: panel.displayed_town,
        displayed_flat: panel.displayed_flat,
        details: panel.details,
        units: render.units,
    })
}

/// Reads the units a block render shows and which block the panel names
///
/// A page with no priced unit elements has not finished rendering and
/// yields `GrammarError::NotRendered`.
pub fn parse_block_render(html: &str) -> Result<BlockRender, GrammarError> {
    let document = Html::parse_document(html);

    let units = parse_units(&document)?;
    if units.is_empty() {
        return Err(GrammarError::NotRendered(
            "block shows no priced unit elements".to_string(),
        ));
    }

    Ok(BlockRender {
        units,
        shown_block: shown_block_id(&document)?,
    })
}

/// Reads the detail panel of a rendered block
pub fn parse_block_panel(html: &str) -> Result<BlockPanel, GrammarError> {
    let document = Html::parse_document(html);

    Ok(BlockPanel {
        details: parse_block_details(&document)?,
        displayed_town: read_field(&document, TOWN_FIELD_SELECTOR)?,
        displayed_flat: read_field(&document, FLAT_FIELD_SELECTOR)?,
    })
}

/// Reads every priced unit element
pub fn parse_units(document: &Html) -> Result<Vec<UnitFields>, GrammarError> {
    let unit_selector = css(UNIT_SELECTOR)?;

    document
        .select(&unit_selector)
        .filter(|el| {
            el.value()
                .attr("title")
                .is_some_and(|title| title.contains(CURRENCY_MARKER))
        })
        .map(parse_unit)
        .collect()
}

fn parse_unit(element: ElementRef<'_>) -> Result<UnitFields, GrammarError> {
    let title = element.value().attr("title").unwrap_or_default();

    let unit = element
        .value()
        .attr("data-selector")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| element_text(element));
    if unit.is_empty() {
        return Err(GrammarError::Mismatch(format!(
            "unit element with title '{}' has no identifier",
            title
        )));
    }

    let price = patterns::price(title).ok_or_else(|| {
        GrammarError::Mismatch(format!("unit {} has no price in '{}'", unit, title))
    })?;
    let size = patterns::size(title).ok_or_else(|| {
        GrammarError::Mismatch(format!("unit {} has no floor area in '{}'", unit, title))
    })?;

    Ok(UnitFields { unit, price, size })
}

/// Reads the block detail panel up to and including the `Malay-` quota entry
pub fn parse_block_details(document: &Html) -> Result<BlockDetails, GrammarError> {
    let panel_selector = css(DETAILS_SELECTOR)?;
    let panel = document.select(&panel_selector).next().ok_or_else(|| {
        GrammarError::Mismatch("block page has no #blockDetails panel".to_string())
    })?;

    let column_selector = css(DETAIL_COLUMN_SELECTOR)?;
    let mut texts = Vec::new();
    let mut reached_sentinel = false;

    for column in panel.select(&column_selector) {
        let text = element_text(column);
        let is_sentinel = text.contains(DETAILS_SENTINEL);
        texts.push(text);
        if is_sentinel {
            reached_sentinel = true;
            break;
        }
    }

    if !reached_sentinel {
        return Err(GrammarError::Mismatch(format!(
            "block details never reach a '{}' quota entry",
            DETAILS_SENTINEL
        )));
    }

    let mut pairs = texts.chunks_exact(2);
    let fields = pairs
        .by_ref()
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    if let [dangling] = pairs.remainder() {
        tracing::debug!("Dropping unpaired block detail entry '{}'", dangling);
    }

    BlockDetails::from_pairs(fields)
}

/// Value of the panel's `Block` entry, without requiring the rest of the panel
pub fn shown_block_id(document: &Html) -> Result<Option<String>, GrammarError> {
    let panel_selector = css(DETAILS_SELECTOR)?;
    let Some(panel) = document.select(&panel_selector).next() else {
        return Ok(None);
    };

    let column_selector = css(DETAIL_COLUMN_SELECTOR)?;
    let texts: Vec<String> = panel.select(&column_selector).map(element_text).collect();
    Ok(texts
        .chunks_exact(2)
        .find(|pair| same_label(&pair[0], BlockDetails::BLOCK_LABEL))
        .map(|pair| pair[1].clone())
        .filter(|value| !value.is_empty()))
}

fn read_field(document: &Html, selector: &str) -> Result<Option<String>, GrammarError> {
    let field_selector = css(selector)?;
    Ok(document.select(&field_selector).next().and_then(|field| {
        field
            .value()
            .attr("value")
            .map(|v| v.trim().to_string())
            .or_else(|| Some(element_text(field)))
            .filter(|v| !v.is_empty())
    }))
}
