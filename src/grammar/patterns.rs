//! Text and URL patterns
//!
//! Link parameters are pulled with `Key=(.+?)&` and percent-decoded. Unit
//! titles look like `$250,000<br/>____<br/>70 Sqm`; price and size are read
//! with independent patterns so a reordered title still parses.

use crate::grammar::GrammarError;
use crate::models::FlatTypeContext;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::LazyLock;

/// Quoted portal path inside a `javascript:` href
static FLAT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(/.+=.?)""#).expect("flat path pattern"));

static TOWN_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Town=(.+?)&").expect("town pattern"));

static FLAT_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Flat=(.+?)&").expect("flat pattern"));

/// Everything from the currency marker up to the first tag
static PRICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$[^<]*").expect("price pattern"));

/// A number followed by an area unit
static SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d[\d,.]*\s*(?:sqm|sq\.?\s?m|m²)").expect("size pattern")
});

/// Extracts the portal path from a flat-type row's href
///
/// The summary page wraps the real path in a script call, e.g.
/// `javascript:checkBeforeRedirect("/webapp/...&brandnew=")`.
pub fn flat_link_path(href: &str) -> Option<&str> {
    FLAT_PATH
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reads and percent-decodes the `Town` parameter of a flat-type link
pub fn town_param(link: &str) -> Option<String> {
    capture_decoded(&TOWN_PARAM, link)
}

/// Reads and percent-decodes the `Flat` parameter of a flat-type link
pub fn flat_param(link: &str) -> Option<String> {
    capture_decoded(&FLAT_PARAM, link)
}

fn capture_decoded(pattern: &Regex, link: &str) -> Option<String> {
    pattern
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| percent_decode_str(m.as_str()).decode_utf8_lossy().into_owned())
}

/// Derives the town / flat-type context every unit under a link inherits
pub fn link_context(link: &str) -> Result<FlatTypeContext, GrammarError> {
    let town = town_param(link).ok_or_else(|| {
        GrammarError::Mismatch(format!("link has no extractable Town= parameter: {}", link))
    })?;
    let flat = flat_param(link).ok_or_else(|| {
        GrammarError::Mismatch(format!("link has no extractable Flat= parameter: {}", link))
    })?;

    Ok(FlatTypeContext {
        town,
        flat_type: flat.strip_suffix("-Room").unwrap_or(&flat).to_string(),
    })
}

/// Price portion of a unit title: from `$` up to the first `<`
pub fn price(title: &str) -> Option<String> {
    PRICE
        .find(title)
        .map(|m| m.as_str().trim().to_string())
        .filter(|p| p.len() > 1)
}

/// Size portion of a unit title: a number up to and including its area unit
pub fn size(title: &str) -> Option<String> {
    let title = title.replace('\u{a0}', " ");
    SIZE.find(&title).map(|m| m.as_str().trim().to_string())
}

/// Leading room count of a flat-type label ("3-Room" → "3")
pub fn room_count(label: &str) -> Option<String> {
    let digits: String = label
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    (!digits.is_empty()).then_some(digits)
}
