use thiserror::Error;

use crate::settings::ValidationError;

#[derive(Error, Debug)]
pub enum AccountancyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("The configuration file cannot be found: {0}")]
    ConfigNotFound(String),

    #[error("The configuration file cannot be parsed: {path}: {source}")]
    ConfigParse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Loading the configuration file {path} failed:\n{}", join_issues(.errors))]
    InvalidConfig {
        path: String,
        errors: Vec<ValidationError>,
    },

    #[error("Loading the QIF file {path} failed: {source}")]
    SourceRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Corrupted data: {0}")]
    CorruptedRecord(#[from] RecordError),
}

/// Why a record reaching its `^` terminator could not become a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record ending at line {line} has no amount")]
    MissingAmount { line: usize },

    #[error("record ending at line {line} has no description")]
    MissingDescription { line: usize },

    #[error("record ending at line {line} has an unparsable date: {raw}")]
    InvalidDate { line: usize, raw: String },
}

impl RecordError {
    pub fn line(&self) -> usize {
        match self {
            Self::MissingAmount { line }
            | Self::MissingDescription { line }
            | Self::InvalidDate { line, .. } => *line,
        }
    }
}

fn join_issues(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, AccountancyError>;
