//! Error types for cuotas-core
//!
//! Every flow failure maps to a `CoreError`; `to_details` turns it into a
//! serializable payload with suggestions for the API layer.

use cuotas_sheet::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::RecordId;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The ledger store could not be read or written
    StoreError,
    /// Input failed validation
    ValidationError,
    /// The ledger has no purchases
    EmptyLedger,
    /// No purchase with the given ID
    RecordNotFound,
    /// Every installment is already paid
    AlreadyPaid,
    /// A destructive action was not confirmed
    ConfirmationRequired,
    /// The request named a purchase by its row position
    StaleRecord,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::StoreError => write!(f, "STORE_ERROR"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::EmptyLedger => write!(f, "EMPTY_LEDGER"),
            ErrorCode::RecordNotFound => write!(f, "RECORD_NOT_FOUND"),
            ErrorCode::AlreadyPaid => write!(f, "ALREADY_PAID"),
            ErrorCode::ConfirmationRequired => write!(f, "CONFIRMATION_REQUIRED"),
            ErrorCode::StaleRecord => write!(f, "STALE_RECORD"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub severity: ErrorSeverity,
    pub message: String,
    /// Individual problems, e.g. one entry per failed validation rule
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, severity: ErrorSeverity, message: String) -> Self {
        Self {
            code,
            severity,
            message,
            issues: vec![],
            suggestions: vec![],
        }
    }

    pub fn with_issue(mut self, issue: String) -> Self {
        self.issues.push(issue);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        for issue in &self.issues {
            write!(f, "\n  * {}", issue)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// A single failed validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    PaidExceedsCount,
    EmptyMerchant,
    EmptyDate,
    NegativeAmount,
    ZeroInstallments,
    DateOutOfRange,
}

impl ValidationIssue {
    /// User-facing message
    pub fn message(&self) -> &'static str {
        match self {
            ValidationIssue::PaidExceedsCount => {
                "Las cuotas pagadas no pueden superar la cantidad de cuotas."
            }
            ValidationIssue::EmptyMerchant => "El comercio no puede estar vacío.",
            ValidationIssue::EmptyDate => "La fecha de compra no puede estar vacía.",
            ValidationIssue::NegativeAmount => "El monto total debe ser un número mayor o igual a 0.",
            ValidationIssue::ZeroInstallments => "La cantidad de cuotas debe ser al menos 1.",
            ValidationIssue::DateOutOfRange => "La fecha de compra debe tener un año entre 1 y 9999.",
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Main error type for cuotas-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation failed: {}", join_issues(.issues))]
    Validation { issues: Vec<ValidationIssue> },

    #[error("No purchases recorded yet")]
    EmptyLedger,

    #[error("Purchase not found: {id}")]
    RecordNotFound { id: RecordId },

    #[error("All {count} installments of purchase {id} are already paid")]
    AlreadyPaid { id: RecordId, count: u32 },

    #[error("Deleting purchase {id} requires confirmation")]
    ConfirmationRequired { id: RecordId },

    #[error("Purchase {id} was selected from an outdated list")]
    StaleRecord { id: RecordId },
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues.iter().map(|i| i.message()).collect::<Vec<_>>().join(" ")
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Store(_) => ErrorCode::StoreError,
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::EmptyLedger => ErrorCode::EmptyLedger,
            CoreError::RecordNotFound { .. } => ErrorCode::RecordNotFound,
            CoreError::AlreadyPaid { .. } => ErrorCode::AlreadyPaid,
            CoreError::ConfirmationRequired { .. } => ErrorCode::ConfirmationRequired,
            CoreError::StaleRecord { .. } => ErrorCode::StaleRecord,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Store(_) => ErrorSeverity::Error,
            CoreError::Validation { .. } => ErrorSeverity::Warning,
            CoreError::EmptyLedger => ErrorSeverity::Info,
            CoreError::RecordNotFound { .. } => ErrorSeverity::Warning,
            CoreError::AlreadyPaid { .. } => ErrorSeverity::Info,
            CoreError::ConfirmationRequired { .. } => ErrorSeverity::Warning,
            CoreError::StaleRecord { .. } => ErrorSeverity::Warning,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.severity(), self.to_string());

        match self {
            CoreError::Store(error) => {
                if error.is_remote() {
                    details = details.with_suggestion(
                        "Check the spreadsheet ID, sheet name and access token in the configuration.".to_string(),
                    );
                } else {
                    details = details.with_suggestion(
                        "Check that the ledger file exists and is writable.".to_string(),
                    );
                }
            }
            CoreError::Validation { issues } => {
                for issue in issues {
                    details = details.with_issue(issue.message().to_string());
                }
            }
            CoreError::EmptyLedger => {
                details = details.with_suggestion("Add a purchase from /purchases/new first.".to_string());
            }
            CoreError::RecordNotFound { .. } => {
                details = details.with_suggestion(
                    "The purchase may have been deleted or edited elsewhere; reload the list.".to_string(),
                );
            }
            CoreError::ConfirmationRequired { .. } => {
                details = details.with_suggestion("Send confirm=yes to delete the purchase.".to_string());
            }
            CoreError::StaleRecord { .. } => {
                details = details.with_suggestion(
                    "Rows were added or removed since the list was loaded; reload it and pick the purchase again."
                        .to_string(),
                );
            }
            CoreError::AlreadyPaid { .. } => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_issue() {
        let error = CoreError::Validation {
            issues: vec![ValidationIssue::PaidExceedsCount, ValidationIssue::EmptyMerchant],
        };
        let details = error.to_details();
        assert_eq!(details.code, ErrorCode::ValidationError);
        assert_eq!(details.issues.len(), 2);
        assert!(error.to_string().contains("superar"));
        assert!(error.to_string().contains("comercio"));
    }

    #[test]
    fn test_error_codes_serialize_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::RecordNotFound).unwrap();
        assert_eq!(json, "\"RECORD_NOT_FOUND\"");
        assert_eq!(ErrorCode::AlreadyPaid.to_string(), "ALREADY_PAID");
        assert_eq!(ErrorCode::StaleRecord.to_string(), "STALE_RECORD");
    }

    #[test]
    fn test_stale_record_asks_for_a_reload() {
        let details = CoreError::StaleRecord { id: RecordId::positional(3) }.to_details();
        assert_eq!(details.code, ErrorCode::StaleRecord);
        assert_eq!(details.severity, ErrorSeverity::Warning);
        assert!(details.message.contains("row-3"));
        assert!(details.suggestions[0].contains("reload"));
    }

    #[test]
    fn test_store_error_suggestion_depends_on_backend_kind() {
        let remote = CoreError::from(StoreError::MissingToken).to_details();
        assert!(remote.suggestions[0].contains("access token"));

        let local = CoreError::from(StoreError::HeaderRow).to_details();
        assert!(local.suggestions[0].contains("ledger file"));
        assert_eq!(local.severity, ErrorSeverity::Error);
    }
}
