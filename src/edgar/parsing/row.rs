use itertools::Itertools;
use log::{debug, warn};

use super::category::{find_header, CategoryLayout};
use super::cell::{Cell, Row};
use super::text::{is_placeholder, output_value, prepare_string_for_output};
use super::types::ScanProfile;
use crate::edgar::schedule::{RecordField, ScheduleRecord};

#[derive(Debug, Default, Clone)]
struct Slot {
    text: String,
    footnote: String,
}

/// Reads the value of every category from one data row, before note
/// detection and output formatting.
#[derive(Debug, Default)]
struct ScannedRow {
    slots: Vec<Slot>,
    repairs: usize,
}

/// Maps the two recognised total shapes. Any other row returns `None` and
/// goes through normal scanning.
pub fn scan_for_total(row: &Row, layout: &CategoryLayout) -> Option<ScheduleRecord> {
    let n = layout.len();
    let content: Vec<&Cell> = row.cells.iter().filter(|c| !c.is_empty()).collect();
    let targets: Vec<usize> = match content.len() {
        2 if n >= 2 => vec![n - 2, n - 1],
        3 if n >= 3 && is_subtotal_row(row) => vec![0, n - 2, n - 1],
        _ => return None,
    };
    let mut values = vec![String::new(); n];
    for (target, cell) in targets.into_iter().zip(content) {
        values[target] = output_value(&cell.text);
    }
    let fields = layout
        .categories()
        .iter()
        .zip(values)
        .map(|(category, value)| RecordField {
            category: category.label.clone(),
            value,
            footnote: String::new(),
        })
        .collect();
    Some(ScheduleRecord::Values { fields, repairs: 0 })
}

fn is_subtotal_row(row: &Row) -> bool {
    row.cells.iter().any(|c| {
        let lower = c.text.to_lowercase();
        lower.contains("total:") || lower.contains("subtotal:")
    })
}

/// Colspan layouts: every cell whose grid start falls in a category's span
/// belongs to that category.
fn scan_by_colspan(row: &Row, layout: &CategoryLayout) -> ScannedRow {
    let offsets = row.grid_offsets();
    let slots = layout
        .categories()
        .iter()
        .map(|category| {
            let owned: Vec<&Cell> = row
                .cells
                .iter()
                .zip(&offsets)
                .filter(|(_, offset)| category.colspan.contains(**offset))
                .map(|(cell, _)| cell)
                .collect();
            Slot {
                text: owned
                    .iter()
                    .map(|c| c.text.as_str())
                    .filter(|t| !t.is_empty())
                    .join(" "),
                footnote: owned
                    .iter()
                    .map(|c| c.footnote.as_str())
                    .filter(|t| !t.is_empty())
                    .join(" "),
            }
        })
        .collect();
    ScannedRow { slots, repairs: 0 }
}

/// Direct indexing with the cell-count repairs. Repairs only run while the
/// working row has more cells than the header row, so each one brings the
/// row closer to the header shape and the loop always ends.
fn scan_by_index(row: &Row, layout: &CategoryLayout) -> ScannedRow {
    let mut cells: Vec<&Cell> = row.cells.iter().collect();
    let mut scanned = ScannedRow::default();
    let mut i = 0;
    while i < layout.len() {
        let idx = layout.index_at(i);
        let Some(cell) = cells.get(idx).copied() else {
            scanned.slots.resize(layout.len(), Slot::default());
            break;
        };
        let misaligned = cells.len() > layout.cell_count();

        // "$" holds the place of a value sitting in the next cell.
        if misaligned && is_placeholder(&cell.text) {
            cells.remove(idx);
            scanned.repairs += 1;
            continue;
        }

        // A blank run where a value should be.
        if misaligned && cell.is_empty() && i > 1 && idx > 0 && cells[idx - 1].is_empty() {
            let next = cells.get(idx + 1).map(|c| c.text.as_str()).unwrap_or("");
            if is_placeholder(next) {
                cells.drain(idx - 1..=idx);
            } else {
                cells.remove(idx);
            }
            scanned.repairs += 1;
            continue;
        }

        scanned.slots.push(Slot {
            text: cell.text.clone(),
            footnote: cell.footnote.clone(),
        });
        i += 1;
    }
    scanned
}

/// Scans one non-blank, non-total data row into a record, or into a note
/// when only the first category holds text.
pub fn scan_row(row: &Row, layout: &CategoryLayout) -> ScheduleRecord {
    let scanned = if layout.uses_colspan() {
        scan_by_colspan(row, layout)
    } else {
        scan_by_index(row, layout)
    };

    let filled: Vec<usize> = scanned
        .slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| !slot.text.is_empty())
        .map(|(i, _)| i)
        .collect();
    if filled.len() < 2 && filled.first() == Some(&0) {
        return ScheduleRecord::note(&prepare_string_for_output(&scanned.slots[0].text));
    }

    if scanned.repairs > 1 {
        warn!(
            "Applied {} cell repairs to one row, values may be misaligned",
            scanned.repairs
        );
    }
    let fields = layout
        .categories()
        .iter()
        .zip(scanned.slots)
        .map(|(category, slot)| RecordField {
            category: category.label.clone(),
            value: output_value(&slot.text),
            footnote: prepare_string_for_output(&slot.footnote),
        })
        .collect();
    ScheduleRecord::Values {
        fields,
        repairs: scanned.repairs,
    }
}

/// Fills an empty first category from the last row that had one.
fn carry_forward(record: &mut ScheduleRecord, last_company: &mut Option<String>) {
    let ScheduleRecord::Values { fields, .. } = record else {
        return;
    };
    let Some(first) = fields.first_mut() else {
        return;
    };
    if first.value.is_empty() {
        if let Some(company) = last_company {
            first.value = company.clone();
        }
    } else {
        *last_company = Some(first.value.clone());
    }
}

/// Walks the data rows from `start` to the end of the table, in order.
pub fn scan_data_rows(
    rows: &[Row],
    layout: &CategoryLayout,
    start: usize,
    carry_company: bool,
) -> Vec<ScheduleRecord> {
    let mut records = Vec::new();
    let mut last_company: Option<String> = None;
    for row in rows.iter().skip(start) {
        if row.is_blank() {
            continue;
        }
        if let Some(total) = scan_for_total(row, layout) {
            records.push(total);
            continue;
        }
        let mut record = scan_row(row, layout);
        if carry_company {
            carry_forward(&mut record, &mut last_company);
        }
        records.push(record);
    }
    records
}

/// Header plus data rows of one table. `None` when no header layout could
/// be found, in which case the table is dropped.
pub fn scan_table(
    rows: &[Row],
    start: usize,
    profile: ScanProfile,
    max_header_rows: usize,
) -> Option<(CategoryLayout, Vec<ScheduleRecord>)> {
    let header = find_header(rows, start, profile.boundary, max_header_rows)?;
    debug!(
        "Header closed by {} at row {} with {} categories",
        header.signal,
        header.data_start,
        header.layout.len()
    );
    let records = scan_data_rows(rows, &header.layout, header.data_start, profile.carry_company);
    Some((header.layout, records))
}
