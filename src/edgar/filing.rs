use chardet::detect;
use chrono::NaiveDate;
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use itertools::Itertools;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use super::parsing::text::parse_loose_date;
use super::schedule::ScheduleOfInvestments;
use crate::core::error::ExtractError;

pub const NO_SCHEDULES: &str = "NO SCHEDULES FOUND";

/// Filing date as given by the index. Kept verbatim when it does not parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileDate {
    Parsed(NaiveDate),
    Raw(String),
}

impl From<&str> for FileDate {
    fn from(s: &str) -> Self {
        match parse_loose_date(s) {
            Some(date) => FileDate::Parsed(date),
            None => FileDate::Raw(s.trim().to_string()),
        }
    }
}

impl fmt::Display for FileDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileDate::Parsed(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            FileDate::Raw(s) => write!(f, "{}", s),
        }
    }
}

/// One 10-Q filing and the schedules extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenQDoc {
    filed_date: FileDate,
    schedules: Vec<ScheduleOfInvestments>,
    source_url: String,
}

impl TenQDoc {
    pub fn new(filed_date: FileDate, schedules: Vec<ScheduleOfInvestments>, source_url: &str) -> Self {
        Self {
            filed_date,
            schedules,
            source_url: source_url.to_string(),
        }
    }

    pub fn filed_date(&self) -> &FileDate {
        &self.filed_date
    }

    pub fn schedules(&self) -> &[ScheduleOfInvestments] {
        &self.schedules
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn has_data(&self) -> bool {
        !self.schedules.is_empty()
    }

    pub fn to_csv(&self) -> String {
        let body = if self.schedules.is_empty() {
            NO_SCHEDULES.to_string()
        } else {
            self.schedules.iter().map(|s| s.to_csv()).join("\n\n\n")
        };
        format!(
            "{}\nFILE DATE - {}\n\n{}",
            self.source_url, self.filed_date, body
        )
    }
}

/// All filings of one entity (CIK).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilingCollection {
    entity_id: String,
    filings: Vec<TenQDoc>,
}

impl FilingCollection {
    pub fn new(entity_id: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            filings: Vec::new(),
        }
    }

    pub fn push(&mut self, filing: TenQDoc) {
        self.filings.push(filing);
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn filings(&self) -> &[TenQDoc] {
        &self.filings
    }

    pub fn has_data(&self) -> bool {
        self.filings.iter().any(TenQDoc::has_data)
    }

    pub fn to_csv(&self) -> String {
        self.filings.iter().map(TenQDoc::to_csv).join("\n\n\n\n")
    }
}

/// Reads a filing from disk, decoding it with the detected charset so
/// Latin-1 era documents come through intact.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<String, ExtractError> {
    let path = path.as_ref();
    log::debug!("Reading file: {}", path.display());
    let raw = fs::read(path)?;
    let charenc = detect(&raw).0;
    log::debug!("Detected character encoding: {}", charenc);

    let mut reader = DecodeReaderBytesBuilder::new()
        .encoding(Encoding::for_label(charenc.as_bytes()))
        .build(raw.as_slice());
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}
