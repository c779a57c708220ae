//! Explicit cell access for the `tablelist` tables the portal renders.
//!
//! Every lookup that the page layout guarantees goes through [`Row`], so a changed layout
//! surfaces as one descriptive error instead of a silently empty field.

use anyhow::Context;
use itertools::Itertools;
use scraper::{ElementRef, Selector};

#[derive(Clone, Debug)]
pub struct Row<'a> {
    tr: ElementRef<'a>,
    cells: Vec<ElementRef<'a>>,
}

impl<'a> Row<'a> {
    /// Every `td` below the row, nested ones included, in document order.
    pub fn descendants(tr: ElementRef<'a>) -> Self {
        let cells = tr.select(selector!("td")).collect_vec();
        Self { tr, cells }
    }

    /// Only the `td` elements that are direct children of the row.
    pub fn children(tr: ElementRef<'a>) -> Self {
        let cells = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "td")
            .collect_vec();
        Self { tr, cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, index: usize) -> anyhow::Result<ElementRef<'a>> {
        self.cells
            .get(index)
            .copied()
            .with_context(|| format!("Cell {index} not found in a row of {} cells", self.len()))
    }

    /// Untrimmed text of a cell.
    pub fn cell_raw_text(&self, index: usize) -> anyhow::Result<String> {
        Ok(self.cell(index)?.text().collect())
    }

    /// Trimmed text of a cell.
    pub fn cell_text(&self, index: usize) -> anyhow::Result<String> {
        Ok(self.cell_raw_text(index)?.trim().to_owned())
    }

    /// Like [`Row::cell_text`], but an absent cell reads as empty.
    pub fn cell_text_or_empty(&self, index: usize) -> String {
        self.cell_text(index).unwrap_or_default()
    }

    pub fn cell_attr(&self, index: usize, name: &str) -> Option<&'a str> {
        self.cells.get(index)?.value().attr(name)
    }

    pub fn cell_has_class(&self, index: usize, class: &str) -> bool {
        self.cells.get(index).is_some_and(|e| {
            e.value()
                .has_class(class, scraper::CaseSensitivity::CaseSensitive)
        })
    }

    /// First element below the row matching `selector`.
    pub fn find(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.tr.select(selector).next()
    }
}

/// The following element siblings of `e` that are table rows.
pub fn next_rows<'a>(e: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    e.next_siblings()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "tr")
}

/// Text of an element with all whitespace runs collapsed into single spaces.
pub fn squashed_text(e: ElementRef<'_>) -> String {
    e.text().flat_map(str::split_whitespace).join(" ")
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::Row;

    #[test]
    fn cell_access() {
        let html = Html::parse_document(
            r#"<table><tr><td nowrap="nowrap"> a </td><td class="x"><table><tr><td>inner</td></tr></table></td><td>c</td></tr></table>"#,
        );
        let tr = html.select(selector!("tr")).next().unwrap();

        let row = Row::descendants(tr);
        assert_eq!(row.len(), 4);
        assert_eq!(row.cell_text(0).unwrap(), "a");
        assert_eq!(row.cell_raw_text(0).unwrap(), " a ");
        assert_eq!(row.cell_text(2).unwrap(), "inner");
        assert_eq!(row.cell_attr(0, "nowrap"), Some("nowrap"));
        assert!(row.cell_has_class(1, "x"));
        assert!(row.cell(7).is_err());
        assert_eq!(row.cell_text_or_empty(7), "");

        let row = Row::children(tr);
        assert_eq!(row.len(), 3);
        assert_eq!(row.cell_text(2).unwrap(), "c");
    }
}
