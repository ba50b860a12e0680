pub mod core;
pub mod edgar;

// Re-exports
pub use crate::core::config::ExtractorConfig;
pub use crate::core::error::ExtractError;
pub use crate::edgar::filing::{load_document, FileDate, FilingCollection, TenQDoc};
pub use crate::edgar::parsing::{extract_filing, extract_schedules, DocumentFormat};
pub use crate::edgar::schedule::{RecordField, ScheduleOfInvestments, ScheduleRecord};
