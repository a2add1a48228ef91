//! Launch summary page extraction
//!
//! The summary page nests launches, towns and flat types purely by layout:
//!
//! ```text
//! form
//! └── div.row (third)
//!     └── div
//!         └── div            one per launch: h4 date, then one div per town
//!             └── div        h5 town name, table of flat-type rows
//! ```

use crate::grammar::{child_elements, css, element_text, has_class, patterns, GrammarError};
use crate::models::{FlatTypeSummary, LaunchSummary, TownSummary};
use scraper::{ElementRef, Html};
use url::Url;

/// Position of the launch row among the form's `div.row` children
const LAUNCH_ROW_INDEX: usize = 2;

/// Cells in a flat-type row: label, units, three quotas
const FLAT_TYPE_CELLS: usize = 5;

/// Parses the summary page into the launch → town → flat-type tree
///
/// # Arguments
///
/// * `html` - Snapshot of the summary page
/// * `base_url` - Portal origin the flat-type links are resolved against
///
/// # Returns
///
/// * `Ok(Vec<LaunchSummary>)` - Launches in page order (possibly empty)
/// * `Err(GrammarError::Mismatch)` - The page does not have the expected layout
///
/// # Example
///
/// ```no_run
/// use hdb_flats::grammar::parse_available_flats;
/// use url::Url;
///
/// let html = std::fs::read_to_string("summary.html").unwrap();
/// let base = Url::parse("https://services2.hdb.gov.sg").unwrap();
/// for launch in parse_available_flats(&html, &base).unwrap() {
///     println!("{}: {} towns", launch.launch_date, launch.towns.len());
/// }
/// ```
pub fn parse_available_flats(html: &str, base_url: &Url) -> Result<Vec<LaunchSummary>, GrammarError> {
    let document = Html::parse_document(html);

    let form_selector = css("form")?;
    let form = document
        .select(&form_selector)
        .next()
        .ok_or_else(|| GrammarError::Mismatch("summary page has no <form>".to_string()))?;

    let launch_row = child_elements(form, "div")
        .filter(|div| has_class(div, "row"))
        .nth(LAUNCH_ROW_INDEX)
        .ok_or_else(|| {
            GrammarError::Mismatch(format!(
                "summary form has fewer than {} div.row children",
                LAUNCH_ROW_INDEX + 1
            ))
        })?;

    let container = child_elements(launch_row, "div").next().ok_or_else(|| {
        GrammarError::Mismatch("launch row has no container div".to_string())
    })?;

    child_elements(container, "div")
        .map(|launch| parse_launch(launch, base_url))
        .collect()
}

fn parse_launch(launch: ElementRef<'_>, base_url: &Url) -> Result<LaunchSummary, GrammarError> {
    let heading = child_elements(launch, "h4")
        .next()
        .ok_or_else(|| GrammarError::Mismatch("launch has no <h4> date heading".to_string()))?;
    let launch_date = element_text(heading);

    let towns = child_elements(launch, "div")
        .map(|town| parse_town(town, base_url))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LaunchSummary { launch_date, towns })
}

fn parse_town(town: ElementRef<'_>, base_url: &Url) -> Result<TownSummary, GrammarError> {
    let heading_selector = css("h5")?;
    let name = town
        .select(&heading_selector)
        .next()
        .map(element_text)
        .ok_or_else(|| GrammarError::Mismatch("town has no <h5> name".to_string()))?;

    let row_selector = css("tbody tr")?;
    let mut flat_types = Vec::new();

    for row in town.select(&row_selector) {
        let cells: Vec<ElementRef<'_>> = child_elements(row, "td").collect();

        // Header rows carry no <td>; single-cell rows separate sections.
        if cells.len() <= 1 {
            continue;
        }

        if cells.len() < FLAT_TYPE_CELLS {
            return Err(GrammarError::Mismatch(format!(
                "flat-type row in {} has {} cells, expected {}",
                name,
                cells.len(),
                FLAT_TYPE_CELLS
            )));
        }

        flat_types.push(parse_flat_type_row(&cells, &name, base_url)?);
    }

    Ok(TownSummary {
        town: name,
        flat_types,
    })
}

fn parse_flat_type_row(
    cells: &[ElementRef<'_>],
    town: &str,
    base_url: &Url,
) -> Result<FlatTypeSummary, GrammarError> {
    let label = element_text(cells[0]);

    let anchor_selector = css("a[href]")?;
    let href = cells[0]
        .select(&anchor_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| {
            GrammarError::Mismatch(format!("flat-type '{}' in {} has no link", label, town))
        })?;
    let link = resolve_flat_link(href, base_url)?;

    let units_text = element_text(cells[1]);
    let units_available = units_text.replace(',', "").parse::<u32>().map_err(|_| {
        GrammarError::Mismatch(format!(
            "flat-type '{}' in {} has non-numeric unit count '{}'",
            label, town, units_text
        ))
    })?;

    FlatTypeSummary::new(
        label,
        link,
        units_available,
        element_text(cells[2]),
        element_text(cells[3]),
        element_text(cells[4]),
    )
}

/// Resolves a flat-type href to an absolute portal URL
///
/// Script-wrapped hrefs have their quoted path extracted first; anything
/// else that is not a bare script is joined to the base as-is.
fn resolve_flat_link(href: &str, base_url: &Url) -> Result<String, GrammarError> {
    let path = match patterns::flat_link_path(href) {
        Some(path) => path,
        None if !href.trim_start().starts_with("javascript:") => href.trim(),
        None => {
            return Err(GrammarError::Mismatch(format!(
                "flat-type href carries no portal path: {}",
                href
            )))
        }
    };

    base_url
        .join(path)
        .map(|url| url.to_string())
        .map_err(|e| GrammarError::Mismatch(format!("invalid flat-type link '{}': {}", path, e)))
}
