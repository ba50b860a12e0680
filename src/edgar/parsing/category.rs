use serde::Serialize;

use super::cell::Row;
use super::types::BoundarySignal;

/// Range of visual grid columns a header cell covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Colspan {
    pub offset: usize,
    pub width: usize,
}

impl Colspan {
    pub fn contains(&self, grid_column: usize) -> bool {
        grid_column >= self.offset && grid_column < self.offset + self.width
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub label: String,
    /// Position in the header row's visible cell list.
    pub column_index: usize,
    pub colspan: Colspan,
}

/// Column layout of one schedule table. Column indices are strictly
/// increasing; labels only change while the header is still being read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLayout {
    categories: Vec<Category>,
    cell_count: usize,
    uses_colspan: bool,
}

impl CategoryLayout {
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn labels(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.label.clone()).collect()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.categories.iter().map(|c| c.column_index).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn label_at(&self, i: usize) -> &str {
        &self.categories[i].label
    }

    pub fn index_at(&self, i: usize) -> usize {
        self.categories[i].column_index
    }

    /// Number of visible cells in the row the layout was built from.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    pub fn uses_colspan(&self) -> bool {
        self.uses_colspan
    }

    /// Folds a header continuation row into the labels, reading the same
    /// cell indices as the first header row. A label only grows when both
    /// the old and the new text are non-empty.
    pub(crate) fn merge_row(&mut self, row: &Row) {
        for category in &mut self.categories {
            let Some(next) = row.text_at(category.column_index) else {
                continue;
            };
            if category.label.is_empty() || next.is_empty() {
                continue;
            }
            category.label = format!("{} {}", category.label, next);
        }
    }
}

/// Builds a layout from one row: every non-empty cell becomes a category.
/// Returns `None` when the row has no text at all.
pub fn scan_row_for_categories(row: &Row) -> Option<CategoryLayout> {
    let offsets = row.grid_offsets();
    let categories: Vec<Category> = row
        .cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| !cell.text.is_empty())
        .map(|(index, cell)| Category {
            label: cell.text.clone(),
            column_index: index,
            colspan: Colspan {
                offset: offsets[index],
                width: cell.colspan,
            },
        })
        .collect();
    if categories.is_empty() {
        return None;
    }
    Some(CategoryLayout {
        categories,
        cell_count: row.cells.len(),
        uses_colspan: row.uses_colspan(),
    })
}

/// A header block and the row index where data begins.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderScan {
    pub layout: CategoryLayout,
    pub data_start: usize,
    pub signal: BoundarySignal,
}

#[derive(Debug)]
enum HeaderState {
    SeekingHeader,
    InHeader(CategoryLayout, usize),
}

/// Reads the header block starting at `start` using one boundary signal.
/// `None` means this signal never closed the header within
/// `max_header_rows` non-blank rows.
pub fn scan_header(
    rows: &[Row],
    start: usize,
    signal: BoundarySignal,
    max_header_rows: usize,
) -> Option<HeaderScan> {
    let mut state = HeaderState::SeekingHeader;
    for (i, row) in rows.iter().enumerate().skip(start) {
        state = match state {
            HeaderState::SeekingHeader => {
                if row.is_blank() {
                    HeaderState::SeekingHeader
                } else {
                    let layout = scan_row_for_categories(row)?;
                    let closed = match signal {
                        BoundarySignal::SingleRow => true,
                        BoundarySignal::Underline => row.has_underline(),
                        BoundarySignal::BlankRow => false,
                    };
                    if closed {
                        return Some(HeaderScan {
                            layout,
                            data_start: i + 1,
                            signal,
                        });
                    }
                    HeaderState::InHeader(layout, 1)
                }
            }
            HeaderState::InHeader(mut layout, seen) => match signal {
                BoundarySignal::BlankRow if row.is_blank() => {
                    return Some(HeaderScan {
                        layout,
                        data_start: i + 1,
                        signal,
                    });
                }
                _ => {
                    let mut seen = seen;
                    if !row.is_blank() {
                        if seen >= max_header_rows {
                            return None;
                        }
                        layout.merge_row(row);
                        seen += 1;
                    }
                    if signal == BoundarySignal::Underline && row.has_underline() {
                        return Some(HeaderScan {
                            layout,
                            data_start: i + 1,
                            signal,
                        });
                    }
                    HeaderState::InHeader(layout, seen)
                }
            },
        };
    }
    None
}

/// Tries the preferred signal, then the weaker ones after it.
pub fn find_header(
    rows: &[Row],
    start: usize,
    preferred: BoundarySignal,
    max_header_rows: usize,
) -> Option<HeaderScan> {
    preferred.fallback_chain().iter().find_map(|signal| {
        let scan = scan_header(rows, start, *signal, max_header_rows);
        if scan.is_none() {
            log::debug!("No header boundary found with {} signal", signal);
        }
        scan
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edgar::parsing::cell::Cell;

    fn underlined(texts: &[&str]) -> Row {
        Row::new(texts.iter().map(|t| Cell::new(t).underlined()).collect())
    }

    #[test]
    fn test_single_row_layout() {
        let row = Row::from_texts(&["Company", "", "Principal", "", "Fair Value"]);
        let layout = scan_row_for_categories(&row).unwrap();
        assert_eq!(layout.labels(), vec!["Company", "Principal", "Fair Value"]);
        assert_eq!(layout.indices(), vec![0, 2, 4]);
        assert_eq!(layout.cell_count(), 5);
        assert!(!layout.uses_colspan());
        assert!(scan_row_for_categories(&Row::from_texts(&["", ""])).is_none());
    }

    #[test]
    fn test_indices_strictly_increasing_with_colspans() {
        let row = Row::new(vec![
            Cell::new("Company").with_colspan(2),
            Cell::new(""),
            Cell::new("Cost").with_colspan(3),
            Cell::new("Fair Value").with_colspan(3),
        ]);
        let layout = scan_row_for_categories(&row).unwrap();
        assert_eq!(layout.indices().len(), layout.labels().len());
        assert!(layout.indices().windows(2).all(|w| w[0] < w[1]));
        let spans: Vec<_> = layout.categories().iter().map(|c| c.colspan).collect();
        assert_eq!(
            spans,
            vec![
                Colspan { offset: 0, width: 2 },
                Colspan { offset: 3, width: 3 },
                Colspan { offset: 6, width: 3 },
            ]
        );
        assert!(layout.uses_colspan());
    }

    #[test]
    fn test_underline_header_concatenates_rows() {
        let rows = vec![
            Row::from_texts(&["", "", ""]),
            Row::from_texts(&["Portfolio", "Principal", "Fair"]),
            Row::from_texts(&["", "", ""]),
            underlined(&["Company", "", "Value"]),
            Row::from_texts(&["Acme", "10", "9"]),
        ];
        let scan = scan_header(&rows, 0, BoundarySignal::Underline, 6).unwrap();
        assert_eq!(
            scan.layout.labels(),
            vec!["Portfolio Company", "Principal", "Fair Value"]
        );
        assert_eq!(scan.data_start, 4);
    }

    #[test]
    fn test_blank_row_boundary() {
        let rows = vec![
            Row::from_texts(&["Company", "Cost"]),
            Row::from_texts(&["Name", "Basis"]),
            Row::from_texts(&["", ""]),
            Row::from_texts(&["Acme", "10"]),
        ];
        let scan = scan_header(&rows, 0, BoundarySignal::BlankRow, 6).unwrap();
        assert_eq!(scan.layout.labels(), vec!["Company Name", "Cost Basis"]);
        assert_eq!(scan.data_start, 3);
    }

    #[test]
    fn test_fallback_to_single_row() {
        let rows = vec![
            Row::from_texts(&["Company", "Cost"]),
            Row::from_texts(&["Acme", "10"]),
            Row::from_texts(&["Beta", "20"]),
        ];
        assert!(scan_header(&rows, 0, BoundarySignal::Underline, 6).is_none());
        let scan = find_header(&rows, 0, BoundarySignal::Underline, 6).unwrap();
        assert_eq!(scan.signal, BoundarySignal::SingleRow);
        assert_eq!(scan.layout.labels(), vec!["Company", "Cost"]);
        assert_eq!(scan.data_start, 1);
    }

    #[test]
    fn test_header_guard_stops_runaway_merge() {
        let mut rows = vec![Row::from_texts(&["Company", "Cost"])];
        for _ in 0..10 {
            rows.push(Row::from_texts(&["Acme", "10"]));
        }
        rows.push(underlined(&["Total", "100"]));
        assert!(scan_header(&rows, 0, BoundarySignal::Underline, 6).is_none());
    }

    #[test]
    fn test_no_layout_when_table_is_blank() {
        let rows = vec![Row::from_texts(&["", ""]), Row::from_texts(&[""])];
        assert!(find_header(&rows, 0, BoundarySignal::Underline, 6).is_none());
    }
}
