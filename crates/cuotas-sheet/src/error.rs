//! Error types for cuotas-sheet

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error{}: {message}", .status.as_ref().map(|s| format!(" {}", s)).unwrap_or_default())]
    Http { status: Option<u16>, message: String },

    #[error("Row {row} is out of range (sheet has {rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("Column {column} is out of range")]
    ColumnOutOfRange { column: usize },

    #[error("The header row cannot be deleted")]
    HeaderRow,

    #[error("Unexpected header in column {column}: expected '{expected}', found '{found}'")]
    HeaderMismatch { column: usize, expected: String, found: String },

    #[error("No access token configured for the sheets backend")]
    MissingToken,

    #[error("Invalid response from store: {message}")]
    InvalidResponse { message: String },
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        StoreError::Http {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

impl StoreError {
    /// Whether the failure came from talking to a remote service
    pub fn is_remote(&self) -> bool {
        matches!(self, StoreError::Http { .. } | StoreError::InvalidResponse { .. } | StoreError::MissingToken)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message_includes_status() {
        let error = StoreError::Http { status: Some(403), message: "forbidden".to_string() };
        assert_eq!(error.to_string(), "HTTP error 403: forbidden");
        assert!(error.is_remote());

        let error = StoreError::Http { status: None, message: "connection refused".to_string() };
        assert_eq!(error.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn test_row_out_of_range_message() {
        let error = StoreError::RowOutOfRange { row: 9, rows: 3 };
        assert!(error.to_string().contains("Row 9"));
        assert!(!error.is_remote());
    }
}
