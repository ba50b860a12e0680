use chrono::NaiveDate;
use log::debug;

use super::cell::{paragraph_text, read_rows};
use super::dom::Node;
use super::text::{is_page_break, parse_loose_date, remove_non_alphanumeric};
use super::types::{ContainerKind, LocatorKind, ScheduleLocation};
use crate::core::config::ExtractorConfig;
use crate::core::error::ExtractError;

const TITLE_PHRASES: &[&str] = &["schedule of investments", "schedule of portfolio investments"];

const TYPE_ONE_PATHS: &[&str] = &[
    "body > document > type > sequence > filename > description > text > div > table",
    "body > document > type > sequence > filename > description > text > div > div > table",
    "body > document > type > sequence > filename > description > text > table",
    "body > div > table",
    "body > table",
];

const TYPE_TWO_PATHS: &[&str] = &[
    "body > document > type > sequence > filename > description > text > div",
    "body > div",
];

/// Tags whose text reads as one line of a title.
const TEXT_TAGS: &[&str] = &["p", "font", "span", "b"];

/// What one strategy found. `containers_seen` counts candidates before title
/// validation, so a document with tables but no schedule titles is told apart
/// from a document the strategy could not read at all.
#[derive(Debug)]
pub struct LocatorOutcome<N: Node> {
    pub containers_seen: usize,
    pub locations: Vec<ScheduleLocation<N>>,
}

impl<N: Node> LocatorOutcome<N> {
    fn empty() -> Self {
        Self {
            containers_seen: 0,
            locations: Vec::new(),
        }
    }
}

/// Lowercased title names a schedule and is short enough not to be a stray
/// block of narrative text.
pub fn title_valid(title: &str, max_len: usize) -> bool {
    let lower = title.to_lowercase();
    !lower.is_empty()
        && lower.chars().count() < max_len
        && TITLE_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Title lines collected so far plus the last date seen in them.
#[derive(Debug, Default)]
struct TitleAccumulator {
    lines: Vec<String>,
    date: Option<NaiveDate>,
}

impl TitleAccumulator {
    fn push(&mut self, line: String) {
        if remove_non_alphanumeric(&line).is_empty() {
            return;
        }
        if let Some(date) = parse_loose_date(&line) {
            self.date = Some(date);
        }
        self.lines.push(line);
    }

    fn joined(&self) -> String {
        self.lines.join(" ")
    }

    fn reset(&mut self) {
        self.lines.clear();
        self.date = None;
    }
}

fn first_match<N: Node>(root: &N, paths: &[&str]) -> Vec<N> {
    for path in paths {
        let found = root.query_all(path);
        if !found.is_empty() {
            debug!("{} candidate container(s) at {}", found.len(), path);
            return found;
        }
    }
    Vec::new()
}

pub fn locate<N: Node>(
    kind: LocatorKind,
    root: &N,
    config: &ExtractorConfig,
) -> Result<LocatorOutcome<N>, ExtractError> {
    let max = config.title_max(kind);
    match kind {
        LocatorKind::TypeOne => Ok(locate_type_one(root, max)),
        LocatorKind::TypeTwo => Ok(locate_type_two(root, max)),
        LocatorKind::TypeThree => locate_type_three(root, max),
    }
}

/// Title rows are the single-cell rows at the top of the table. Filings
/// often open with a multi-cell spacer row, so a multi-cell row at index 0
/// is skipped; any later one ends the title.
fn type_one_title<N: Node>(table: &N) -> (TitleAccumulator, usize) {
    let rows = read_rows(table);
    let mut title = TitleAccumulator::default();
    let mut i = 0;
    while i < rows.len() {
        let row = &rows[i];
        if row.cells.len() > 1 {
            if !title.lines.is_empty() || i != 0 {
                break;
            }
        } else {
            for cell in &row.cells {
                title.push(cell.text.clone());
            }
        }
        i += 1;
    }
    (title, i)
}

pub fn locate_type_one<N: Node>(root: &N, max_title: usize) -> LocatorOutcome<N> {
    let tables = first_match(root, TYPE_ONE_PATHS);
    let mut outcome = LocatorOutcome {
        containers_seen: tables.len(),
        locations: Vec::new(),
    };
    for table in tables {
        let (title, header_end_row) = type_one_title(&table);
        if !title_valid(&title.joined(), max_title) {
            continue;
        }
        outcome.locations.push(ScheduleLocation {
            container: table,
            as_of: title.date,
            title: title.lines,
            kind: ContainerKind::Table,
            header_end_row,
            locator: LocatorKind::TypeOne,
        });
    }
    outcome
}

fn qualifies_as_type_two<N: Node>(container: &N) -> bool {
    container.query_all("p").len() >= 3 && container.query_one("div > table").is_some()
}

/// Paragraphs outside the table, stopping at the first one carrying a date.
fn type_two_title<N: Node>(container: &N) -> TitleAccumulator {
    let mut title = TitleAccumulator::default();
    for paragraph in container.query_all("p") {
        if paragraph.has_ancestor("table") {
            continue;
        }
        title.push(paragraph_text(&paragraph));
        if title.date.is_some() {
            break;
        }
    }
    title
}

pub fn locate_type_two<N: Node>(root: &N, max_title: usize) -> LocatorOutcome<N> {
    let containers: Vec<N> = first_match(root, TYPE_TWO_PATHS)
        .into_iter()
        .filter(qualifies_as_type_two)
        .collect();
    let mut outcome = LocatorOutcome {
        containers_seen: containers.len(),
        locations: Vec::new(),
    };
    for container in containers {
        let title = type_two_title(&container);
        if !title_valid(&title.joined(), max_title) {
            continue;
        }
        outcome.locations.push(ScheduleLocation {
            container,
            as_of: title.date,
            title: title.lines,
            kind: ContainerKind::Div,
            header_end_row: 0,
            locator: LocatorKind::TypeTwo,
        });
    }
    outcome
}

/// Follows single-element wrappers below `body` down to the element whose
/// children hold the document flow. Tables are never entered.
fn flow_root<N: Node>(body: &N) -> N {
    let mut node = *body;
    loop {
        let children = node.children();
        match children.as_slice() {
            [only] if only.tag_name() != "table" => node = *only,
            _ => return node,
        }
    }
}

struct FlowWalk<'c, N: Node> {
    max_title: usize,
    /// Also enter any other element that holds a table.
    deep: bool,
    title: TitleAccumulator,
    outcome: &'c mut LocatorOutcome<N>,
}

impl<N: Node> FlowWalk<'_, N> {
    fn walk(&mut self, node: &N) -> Result<(), ExtractError> {
        for child in node.children() {
            let tag = child.tag_name();
            if tag == "hr" {
                self.title.reset();
                continue;
            }
            if child.attribute("style").is_some_and(|s| is_page_break(&s)) {
                self.title.reset();
            }
            match tag.as_str() {
                "table" => self.table(child)?,
                "div" | "center" => {
                    if child.query_one("div").is_some() || child.query_one("table").is_some() {
                        self.walk(&child)?;
                    } else {
                        self.title.push(paragraph_text(&child));
                    }
                }
                t if TEXT_TAGS.contains(&t) => {
                    if self.deep && child.query_one("table").is_some() {
                        self.walk(&child)?;
                    } else {
                        self.title.push(paragraph_text(&child));
                    }
                }
                _ => {
                    if self.deep && child.query_one("table").is_some() {
                        self.walk(&child)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn table(&mut self, table: N) -> Result<(), ExtractError> {
        self.outcome.containers_seen += 1;
        let joined = self.title.joined();
        if title_valid(&joined, self.max_title) {
            let Some(as_of) = self.title.date else {
                return Err(ExtractError::MissingScheduleDate { title: joined });
            };
            self.outcome.locations.push(ScheduleLocation {
                container: table,
                title: std::mem::take(&mut self.title.lines),
                kind: ContainerKind::Table,
                as_of: Some(as_of),
                header_end_row: 0,
                locator: LocatorKind::TypeThree,
            });
        }
        self.title.reset();
        Ok(())
    }
}

fn walk_flow<N: Node>(
    root: &N,
    max_title: usize,
    deep: bool,
) -> Result<LocatorOutcome<N>, ExtractError> {
    let mut outcome = LocatorOutcome::empty();
    let mut walker = FlowWalk {
        max_title,
        deep,
        title: TitleAccumulator::default(),
        outcome: &mut outcome,
    };
    walker.walk(root)?;
    Ok(outcome)
}

/// Flat walk over the document flow. Tried on the innermost wrapper first;
/// when that finds nothing, `body` is walked again entering every element
/// that holds a table.
pub fn locate_type_three<N: Node>(
    root: &N,
    max_title: usize,
) -> Result<LocatorOutcome<N>, ExtractError> {
    let Some(body) = root.query_one("body") else {
        return Ok(LocatorOutcome::empty());
    };
    let inner = flow_root(&body);
    let outcome = walk_flow(&inner, max_title, false)?;
    if !outcome.locations.is_empty() {
        return Ok(outcome);
    }
    debug!("No schedules in innermost wrapper, walking body");
    let alternate = walk_flow(&body, max_title, true)?;
    Ok(LocatorOutcome {
        containers_seen: outcome.containers_seen.max(alternate.containers_seen),
        locations: alternate.locations,
    })
}
