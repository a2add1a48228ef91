//! Selector grammar for the portal's page types
//!
//! Each page type has a fixed extraction rule:
//!
//! | Page | Rule |
//! |------|------|
//! | Summary | 3rd `div.row` under the form → first `div` → launches → towns → `tbody tr` flat-type rows |
//! | Flat type | every `td` of the block table holds a `div` whose `onclick` is the block's script |
//! | Block | `span.tooltip` elements whose title carries a price are units; `#blockDetails div.columns` label/value pairs up to the `Malay-` quota line |
//!
//! Extractors work on a page snapshot and never touch the browser. They
//! report two kinds of failure: the page is not rendered yet (worth another
//! look) or it does not have the expected shape (not worth one).

pub mod block;
pub mod flat_type;
pub mod patterns;
pub mod summary;

pub use block::{
    parse_block_page, parse_block_panel, parse_block_render, BlockPage, BlockPanel, BlockRender,
};
pub use flat_type::parse_block_links;
pub use summary::parse_available_flats;

use scraper::{ElementRef, Selector};
use thiserror::Error;

/// Extraction failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Expected content is absent, most likely because rendering has not finished
    #[error("not rendered: {0}")]
    NotRendered(String),

    /// Content is present but does not have the expected structure
    #[error("{0}")]
    Mismatch(String),
}

/// Parses a CSS selector used by the grammar
pub(crate) fn css(selector: &str) -> Result<Selector, GrammarError> {
    Selector::parse(selector)
        .map_err(|e| GrammarError::Mismatch(format!("bad selector '{}': {:?}", selector, e)))
}

/// Direct element children of `parent` with the given tag name
pub(crate) fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

pub(crate) fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Rendered text of an element with non-breaking spaces folded and edges trimmed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_child_elements_is_not_recursive() {
        let html = Html::parse_fragment(
            r#"<div id="root"><div class="a"><div class="nested"></div></div><span></span><div class="b"></div></div>"#,
        );
        let root_sel = css("#root").unwrap();
        let root = html.select(&root_sel).next().unwrap();

        let children: Vec<_> = child_elements(root, "div").collect();
        assert_eq!(children.len(), 2);
        assert!(has_class(&children[0], "a"));
        assert!(has_class(&children[1], "b"));
    }

    #[test]
    fn test_element_text_folds_nbsp() {
        let html = Html::parse_fragment("<p> 70&nbsp;Sqm </p>");
        let sel = css("p").unwrap();
        let p = html.select(&sel).next().unwrap();
        assert_eq!(element_text(p), "70 Sqm");
    }

    #[test]
    fn test_bad_selector_is_mismatch() {
        assert!(matches!(css("td[["), Err(GrammarError::Mismatch(_))));
    }
}
