use thiserror::Error;

/// Conditions that end extraction for a whole filing. Table-level and
/// cell-level problems never surface here; they drop the table or leave
/// the value empty.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no schedule containers found")]
    NoScheduleContainers,

    #[error("schedule '{title}' has no as-of date")]
    MissingScheduleDate { title: String },

    #[error("failed to read filing: {0}")]
    Io(#[from] std::io::Error),
}
