use thiserror::Error;

/// Errors surfaced by the journal library.
///
/// Missing or insufficient data is never an error here; analysis functions return
/// `Option` or an explicit "insufficient" variant for that case.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A theme name that is not in the catalog
    #[error("Unknown dream theme: {0}")]
    UnknownTheme(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Date string that is not `YYYY-MM-DD`
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A stored record line that does not parse
    #[error("Malformed record on line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, JournalError>;
