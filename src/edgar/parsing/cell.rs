use super::dom::Node;
use super::text::{
    detect_underline, is_dash_sentinel, is_hidden, is_placeholder, remove_extra_spaces,
    remove_non_alphanumeric,
};

/// Inline shapes filings wrap cell text in, in the order they are tried.
const CELL_TEXT_SELECTORS: &[&str] = &["p", "span", "font", "b", "div > span"];

/// Snapshot of one visible table cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub text: String,
    pub footnote: String,
    pub colspan: usize,
    pub underlined: bool,
}

impl Cell {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            footnote: String::new(),
            colspan: 1,
            underlined: false,
        }
    }

    pub fn with_colspan(mut self, colspan: usize) -> Self {
        self.colspan = colspan.max(1);
        self
    }

    pub fn underlined(mut self) -> Self {
        self.underlined = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Snapshot of one `tr`, read once in document order so the scanners work
/// on plain values instead of re-querying the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn from_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Cell::new(t)).collect())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    pub fn has_underline(&self) -> bool {
        self.cells.iter().any(|c| c.underlined)
    }

    pub fn content_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn text_at(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(|c| c.text.as_str())
    }

    pub fn uses_colspan(&self) -> bool {
        self.cells.iter().any(|c| c.colspan > 1)
    }

    /// Grid column where each cell starts, accumulated over colspans.
    pub fn grid_offsets(&self) -> Vec<usize> {
        let mut offset = 0;
        self.cells
            .iter()
            .map(|c| {
                let start = offset;
                offset += c.colspan;
                start
            })
            .collect()
    }
}

fn normalized_text<N: Node>(node: &N) -> String {
    remove_extra_spaces(&node.text())
}

/// Applies the emptiness probe while keeping the two sentinels intact: a
/// lone "$" and a dash-only cell.
pub fn settle_cell_text(raw: &str) -> String {
    let text = remove_extra_spaces(raw);
    if is_placeholder(&text) {
        return "$".to_string();
    }
    if is_dash_sentinel(&text) {
        return text;
    }
    if remove_non_alphanumeric(&text).is_empty() {
        return String::new();
    }
    text
}

/// Visible text of a table cell. Tries paragraph, span, font, bold and
/// nested div+span wrappers in turn and falls back to the cell's own text.
pub fn extract_cell_text<N: Node>(cell: &N) -> String {
    for selector in CELL_TEXT_SELECTORS {
        if let Some(inner) = cell.query_one(selector) {
            let text = normalized_text(&inner);
            if !text.is_empty() {
                return settle_cell_text(&text);
            }
        }
    }
    settle_cell_text(&cell.text())
}

/// Text of the second occurrence of the first inline tag present in the
/// cell. The first occurrence is the value, the second a footnote marker.
pub fn extract_footnote<N: Node>(cell: &N) -> String {
    for selector in CELL_TEXT_SELECTORS {
        let hits = cell.query_all(selector);
        if hits.is_empty() {
            continue;
        }
        return hits
            .get(1)
            .map(normalized_text)
            .unwrap_or_default();
    }
    String::new()
}

/// Paragraph text, falling back to a nested `font`. `&nbsp;`-only
/// paragraphs come back empty.
pub fn paragraph_text<N: Node>(paragraph: &N) -> String {
    let text = normalized_text(paragraph);
    if !text.is_empty() {
        return text;
    }
    paragraph
        .query_one("font")
        .map(|font| normalized_text(&font))
        .unwrap_or_default()
}

fn cell_underlined<N: Node>(cell: &N) -> bool {
    let own = cell
        .attribute("style")
        .is_some_and(|style| detect_underline(&style));
    own || cell
        .query_all("[style]")
        .iter()
        .filter_map(|n| n.attribute("style"))
        .any(|style| detect_underline(&style))
}

/// Visible `td`/`th` children of a row; `display:none` cells are dropped so
/// indices line up with what the filer saw.
pub fn row_cells<N: Node>(row: &N) -> Vec<N> {
    row.children()
        .into_iter()
        .filter(|c| matches!(c.tag_name().as_str(), "td" | "th"))
        .filter(|c| !c.attribute("style").is_some_and(|s| is_hidden(&s)))
        .collect()
}

pub fn read_cell<N: Node>(cell: &N) -> Cell {
    let colspan = cell
        .attribute("colspan")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1);
    Cell {
        text: extract_cell_text(cell),
        footnote: extract_footnote(cell),
        colspan: colspan.max(1),
        underlined: cell_underlined(cell),
    }
}

pub fn read_row<N: Node>(row: &N) -> Row {
    Row::new(row_cells(row).iter().map(read_cell).collect())
}

/// Every row of a table, nested tables included, in document order.
pub fn read_rows<N: Node>(table: &N) -> Vec<Row> {
    table.query_all("tr").iter().map(read_row).collect()
}
