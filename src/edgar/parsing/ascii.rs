//! Fixed-width tables from filings that predate HTML.
//!
//! A page holds a title, then a `<TABLE>` block whose header is separated
//! from the data by a line of dash runs. Each dash run marks one column.

use chrono::NaiveDate;
use itertools::Itertools;
use log::debug;
use serde::Serialize;

use super::text::{output_value, parse_loose_date, prepare_string_for_output, remove_extra_spaces};
use crate::core::config::ExtractorConfig;
use crate::edgar::schedule::{RecordField, ScheduleOfInvestments, ScheduleRecord};

const MARKERS: &[&str] = &["<S>", "<C>", "<CAPTION>", "</CAPTION>", "<FN>", "</FN>"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsciiColumn {
    pub label: String,
    /// Character offset where the column starts.
    pub start: usize,
    /// Length of the dash run under the column.
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsciiCategoryLayout {
    pub columns: Vec<AsciiColumn>,
    pub header_underline_line_index: usize,
}

impl AsciiCategoryLayout {
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }
}

pub fn split_pages<'a>(text: &'a str, delimiter: &str) -> Vec<&'a str> {
    text.split(delimiter).collect()
}

fn decode(s: &str) -> String {
    remove_extra_spaces(&html_escape::decode_html_entities(s))
}

/// Title lines before the table start token and the last date among them.
/// `None` when the page has no table.
pub fn page_title(page: &str, table_start: &str) -> Option<(Vec<String>, Option<NaiveDate>)> {
    let (head, _) = page.split_once(table_start)?;
    let mut date = None;
    let lines: Vec<String> = head
        .lines()
        .map(decode)
        .filter(|line| !line.is_empty())
        .inspect(|line| {
            if let Some(found) = parse_loose_date(line) {
                date = Some(found);
            }
        })
        .collect();
    Some((lines, date))
}

/// Text between the table start and end tokens. A missing end token runs
/// the body to the end of the page.
pub fn table_body<'a>(page: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let (_, after) = page.split_once(start)?;
    Some(after.split_once(end).map_or(after, |(body, _)| body))
}

/// Marker-only, blank and rule lines carry no cell text.
fn is_filler(line: &str) -> bool {
    let mut rest = line.to_string();
    for marker in MARKERS {
        rest = rest.replace(marker, "");
    }
    let rest = rest.trim();
    rest.is_empty() || rest.chars().all(|c| c == '-' || c == '=' || c.is_whitespace())
}

pub fn find_underline(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|line| line.contains("---"))
}

/// A column starts where a dash follows a space (or at a leading dash) and
/// is as wide as its dash run.
pub fn column_boundaries(underline: &str) -> Vec<(usize, usize)> {
    let chars: Vec<char> = underline.chars().collect();
    let mut columns = Vec::new();
    for (i, c) in chars.iter().enumerate() {
        let opens = *c == '-' && (i == 0 || chars[i - 1] == ' ');
        if !opens {
            continue;
        }
        let width = chars[i..].iter().take_while(|c| **c == '-').count();
        columns.push((i, width));
    }
    columns
}

/// Character-indexed slice. The last column runs to the end of the line.
fn slice_column(line: &str, start: usize, width: Option<usize>) -> String {
    let chars = line.chars().skip(start);
    let raw: String = match width {
        Some(width) => chars.take(width).collect(),
        None => chars.collect(),
    };
    decode(&raw)
}

fn cell_values(line: &str, bounds: &[(usize, usize)]) -> Vec<String> {
    bounds
        .iter()
        .enumerate()
        .map(|(i, (start, width))| {
            let width = (i + 1 < bounds.len()).then_some(*width);
            slice_column(line, *start, width)
        })
        .collect()
}

/// Builds the layout from the underline and the header lines above it,
/// concatenating multi-line labels top-down per column.
pub fn scan_ascii_header(lines: &[&str], underline_index: usize) -> AsciiCategoryLayout {
    let bounds = column_boundaries(lines[underline_index]);
    let mut labels = vec![String::new(); bounds.len()];
    for line in lines[..underline_index].iter().filter(|l| !is_filler(l)) {
        for (label, text) in labels.iter_mut().zip(cell_values(line, &bounds)) {
            if text.is_empty() {
                continue;
            }
            if !label.is_empty() {
                label.push(' ');
            }
            label.push_str(&text);
        }
    }
    AsciiCategoryLayout {
        columns: bounds
            .into_iter()
            .zip(labels)
            .map(|((start, width), label)| AsciiColumn {
                label,
                start,
                width,
            })
            .collect(),
        header_underline_line_index: underline_index,
    }
}

fn scan_ascii_row(line: &str, layout: &AsciiCategoryLayout) -> ScheduleRecord {
    let bounds: Vec<(usize, usize)> = layout.columns.iter().map(|c| (c.start, c.width)).collect();
    let values = cell_values(line, &bounds);
    let filled = values.iter().positions(|v| !v.is_empty()).collect::<Vec<_>>();
    if filled.len() < 2 && filled.first() == Some(&0) {
        return ScheduleRecord::note(&prepare_string_for_output(&values[0]));
    }
    let fields = layout
        .columns
        .iter()
        .zip(values)
        .map(|(column, value)| RecordField {
            category: column.label.clone(),
            value: output_value(&value),
            footnote: String::new(),
        })
        .collect();
    ScheduleRecord::Values { fields, repairs: 0 }
}

/// Header layout and records of one table body. `None` without an
/// underline line.
pub fn parse_ascii_table(body: &str) -> Option<(AsciiCategoryLayout, Vec<ScheduleRecord>)> {
    let lines: Vec<&str> = body.lines().collect();
    let underline = find_underline(&lines)?;
    let layout = scan_ascii_header(&lines, underline);
    if layout.columns.is_empty() {
        return None;
    }
    let records = lines[underline + 1..]
        .iter()
        .filter(|line| !is_filler(line))
        .map(|line| scan_ascii_row(line, &layout))
        .collect();
    Some((layout, records))
}

/// Every schedule in a plain-text filing, one per qualifying page.
pub fn parse_ascii_document(text: &str, config: &ExtractorConfig) -> Vec<ScheduleOfInvestments> {
    let mut schedules = Vec::new();
    for (n, page) in split_pages(text, &config.page_delimiter).into_iter().enumerate() {
        let Some((title, date)) = page_title(page, &config.table_start) else {
            continue;
        };
        if !title.join(" ").to_lowercase().contains("schedule of") {
            continue;
        }
        let Some(body) = table_body(page, &config.table_start, &config.table_end) else {
            continue;
        };
        let Some((layout, records)) = parse_ascii_table(body) else {
            debug!("Page {} has a schedule title but no column underline", n);
            continue;
        };
        schedules.push(ScheduleOfInvestments::new(
            title,
            date,
            layout.labels(),
            records,
        ));
    }
    schedules
}
