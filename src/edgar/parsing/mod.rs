pub mod ascii;
pub mod category;
pub mod cell;
pub mod convert;
pub mod dom;
pub mod locate;
pub mod row;
pub mod text;
pub mod types;

#[cfg(test)]
mod tests;

use log::{debug, info, warn};
use scraper::Html;

use crate::core::config::ExtractorConfig;
use crate::core::error::ExtractError;
use crate::edgar::filing::{FileDate, TenQDoc};
use crate::edgar::schedule::ScheduleOfInvestments;
use dom::Node;

pub use ascii::parse_ascii_document;
pub use types::{BoundarySignal, ContainerKind, LocatorKind, ScanProfile, ScheduleLocation};

/// The two document families a filing can come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Html,
    PlainText,
}

impl DocumentFormat {
    /// Table markup anywhere means HTML; plain-text filings only carry
    /// `<TABLE>` blocks without rows or cells.
    pub fn detect(content: &str) -> Self {
        let lower = content.to_ascii_lowercase();
        if lower.contains("<td") || lower.contains("<tr") {
            DocumentFormat::Html
        } else {
            DocumentFormat::PlainText
        }
    }
}

/// Runs the locator strategies in configured order on a parsed tree and
/// returns the schedules of the first one that yields any. A schedule title
/// without a date stops only its own strategy; the error is returned when no
/// later strategy finds schedules either.
pub fn extract_from_root<N: Node>(
    root: &N,
    config: &ExtractorConfig,
) -> Result<Vec<ScheduleOfInvestments>, ExtractError> {
    let mut containers_seen = 0;
    let mut pending: Option<ExtractError> = None;
    for kind in &config.strategy_order {
        let outcome = match locate::locate(*kind, root, config) {
            Ok(outcome) => outcome,
            Err(err @ ExtractError::MissingScheduleDate { .. }) => {
                warn!("{} locator stopped: {}", kind, err);
                if pending.is_none() {
                    pending = Some(err);
                }
                continue;
            }
            Err(err) => return Err(err),
        };
        containers_seen += outcome.containers_seen;
        debug!(
            "{}: {} container(s), {} titled schedule(s)",
            kind,
            outcome.containers_seen,
            outcome.locations.len()
        );
        let schedules: Vec<ScheduleOfInvestments> = outcome
            .locations
            .into_iter()
            .filter_map(|location| convert::convert(location, config.max_header_rows))
            .collect();
        if !schedules.is_empty() {
            info!("Found {} schedule(s) with {} locator", schedules.len(), kind);
            return Ok(schedules);
        }
    }
    if let Some(err) = pending {
        return Err(err);
    }
    if containers_seen == 0 {
        return Err(ExtractError::NoScheduleContainers);
    }
    Ok(Vec::new())
}

/// Every schedule in a filing's raw content, HTML or plain text.
pub fn extract_schedules(
    content: &str,
    config: &ExtractorConfig,
) -> Result<Vec<ScheduleOfInvestments>, ExtractError> {
    match DocumentFormat::detect(content) {
        DocumentFormat::PlainText => {
            let schedules = parse_ascii_document(content, config);
            info!("Found {} plain-text schedule(s)", schedules.len());
            Ok(schedules)
        }
        DocumentFormat::Html => {
            let document = Html::parse_document(content);
            extract_from_root(&document.root_element(), config)
        }
    }
}

/// One filing's schedules wrapped with its source URL and filing date.
pub fn extract_filing(
    source_url: &str,
    filed_date: FileDate,
    content: &str,
    config: &ExtractorConfig,
) -> Result<TenQDoc, ExtractError> {
    let schedules = extract_schedules(content, config)?;
    Ok(TenQDoc::new(filed_date, schedules, source_url))
}
