use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::dom::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    /// The container is the schedule table itself.
    Table,
    /// A wrapping div; the table sits one level below as `div > table`.
    Div,
}

/// The three container discovery strategies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
#[strum(ascii_case_insensitive)]
pub enum LocatorKind {
    /// Title lives in single-cell rows at the top of the table.
    #[strum(serialize = "one", to_string = "type one")]
    TypeOne,
    /// Title in paragraphs next to the table inside a shared div.
    #[strum(serialize = "two", to_string = "type two")]
    TypeTwo,
    /// Title and table are siblings in the document flow.
    #[strum(serialize = "three", to_string = "type three")]
    TypeThree,
}

impl LocatorKind {
    pub fn profile(&self) -> ScanProfile {
        match self {
            LocatorKind::TypeOne => ScanProfile {
                boundary: BoundarySignal::SingleRow,
                carry_company: false,
            },
            LocatorKind::TypeTwo => ScanProfile {
                boundary: BoundarySignal::Underline,
                carry_company: false,
            },
            LocatorKind::TypeThree => ScanProfile {
                boundary: BoundarySignal::Underline,
                carry_company: true,
            },
        }
    }
}

/// How the header block is told apart from the data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum BoundarySignal {
    #[strum(to_string = "underline")]
    Underline,
    #[strum(to_string = "blank row")]
    BlankRow,
    /// The first non-blank row is the whole header.
    #[strum(to_string = "single row")]
    SingleRow,
}

impl BoundarySignal {
    /// This signal followed by the weaker ones to try if it finds nothing.
    pub fn fallback_chain(&self) -> &'static [BoundarySignal] {
        match self {
            BoundarySignal::Underline => &[
                BoundarySignal::Underline,
                BoundarySignal::BlankRow,
                BoundarySignal::SingleRow,
            ],
            BoundarySignal::BlankRow => &[BoundarySignal::BlankRow, BoundarySignal::SingleRow],
            BoundarySignal::SingleRow => &[BoundarySignal::SingleRow],
        }
    }
}

/// Per-strategy knobs for header and data scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProfile {
    pub boundary: BoundarySignal,
    /// Reuse the last seen category 0 value when a row leaves it empty.
    pub carry_company: bool,
}

/// A schedule candidate found by a locator. `container` borrows the parsed
/// document and is only valid while it is.
#[derive(Debug, Clone)]
pub struct ScheduleLocation<N: Node> {
    pub container: N,
    pub title: Vec<String>,
    pub kind: ContainerKind,
    pub as_of: Option<NaiveDate>,
    /// Index of the first table row after the title rows.
    pub header_end_row: usize,
    pub locator: LocatorKind,
}
