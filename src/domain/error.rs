//! Domain error types.
//!
//! The analytics functions themselves are total and never return these; they
//! are raised by trade ingestion, configuration and the CLI.

/// Top-level error type for tradejournal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("invalid trade data at row {row}: {reason}")]
    TradeData { row: usize, reason: String },

    #[error("invalid {kind}: {value:?}")]
    Parse { kind: &'static str, value: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl JournalError {
    pub fn parse(kind: &'static str, value: impl Into<String>) -> Self {
        JournalError::Parse {
            kind,
            value: value.into(),
        }
    }

    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        JournalError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&JournalError> for std::process::ExitCode {
    fn from(err: &JournalError) -> Self {
        let code: u8 = match err {
            JournalError::Io(_) | JournalError::Json(_) => 1,
            JournalError::ConfigParse { .. }
            | JournalError::ConfigMissing { .. }
            | JournalError::ConfigInvalid { .. } => 2,
            JournalError::TradeData { .. } | JournalError::Csv(_) => 3,
            JournalError::Parse { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
