//! Flat-type page extraction
//!
//! A flat-type page lists its blocks as cells of one table. Each cell wraps a
//! `div` whose `onclick` script swaps the block's unit view into the page.

use crate::grammar::{css, GrammarError};
use crate::models::BlockLink;
use scraper::Html;

/// Enumerates block links in page order
///
/// A page whose block table has not been rendered yet yields
/// `GrammarError::NotRendered`. An empty table is a valid, empty result.
pub fn parse_block_links(html: &str) -> Result<Vec<BlockLink>, GrammarError> {
    let document = Html::parse_document(html);

    let table_selector = css("table")?;
    let table = document.select(&table_selector).next().ok_or_else(|| {
        GrammarError::NotRendered("flat-type page has no block table".to_string())
    })?;

    let cell_selector = css("td")?;
    let div_selector = css("div")?;
    let mut links = Vec::new();

    for cell in table.select(&cell_selector) {
        // Padding cells at the end of the grid have nothing inside.
        let Some(block) = cell.select(&div_selector).next() else {
            continue;
        };

        let script = block
            .value()
            .attr("onclick")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                GrammarError::Mismatch(format!(
                    "block cell '{}' has no onclick script",
                    block.text().collect::<String>().trim()
                ))
            })?;

        links.push(BlockLink::new(script));
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_in_page_order() {
        let html = r#"<html><body><table>
            <tr><td><div onclick="checkBlk('315A','N9')">315A</div></td>
                <td><div onclick="checkBlk('315B','N9')">315B</div></td></tr>
            <tr><td><div onclick="checkBlk('317C','N9')">317C</div></td><td></td></tr>
        </table></body></html>"#;

        let links = parse_block_links(html).unwrap();
        let scripts: Vec<&str> = links.iter().map(|l| l.script()).collect();
        assert_eq!(
            scripts,
            vec!["checkBlk('315A','N9')", "checkBlk('315B','N9')", "checkBlk('317C','N9')"]
        );
    }

    #[test]
    fn test_empty_table_is_valid() {
        let links = parse_block_links("<table><tr></tr></table>").unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_missing_table_is_not_rendered() {
        let result = parse_block_links("<html><body>Loading...</body></html>");
        assert!(matches!(result, Err(GrammarError::NotRendered(_))));
    }

    #[test]
    fn test_block_without_script_is_mismatch() {
        let result = parse_block_links("<table><tr><td><div>315A</div></td></tr></table>");
        assert!(matches!(result, Err(GrammarError::Mismatch(_))));
    }
}
