//! Error types for cuotas-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cuotas_core::{CoreError, ErrorCode, ErrorDetails, ErrorSeverity};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(error) => core_status(error),
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(error) => error.to_details(),
            ApiError::BadRequest { message } => {
                ErrorDetails::new(ErrorCode::ValidationError, ErrorSeverity::Warning, message.clone())
            }
        }
    }
}

/// HTTP status for a core failure
pub fn core_status(error: &CoreError) -> StatusCode {
    match error {
        CoreError::Store(_) => StatusCode::BAD_GATEWAY,
        CoreError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::EmptyLedger => StatusCode::NOT_FOUND,
        CoreError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::AlreadyPaid { .. } => StatusCode::CONFLICT,
        CoreError::ConfirmationRequired { .. } => StatusCode::BAD_REQUEST,
        CoreError::StaleRecord { .. } => StatusCode::CONFLICT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        (status, axum::Json(self.to_details())).into_response()
    }
}

/// Error rendered as an HTML banner, for pages and HTMX fragments
#[derive(Debug)]
pub struct HtmlError(pub ApiError);

impl From<ApiError> for HtmlError {
    fn from(error: ApiError) -> Self {
        HtmlError(error)
    }
}

impl From<CoreError> for HtmlError {
    fn from(error: CoreError) -> Self {
        HtmlError(ApiError::Core(error))
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            log::error!("{}", self.0);
        }
        (status, axum::response::Html(crate::error_banner(&self.0.to_details()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuotas_core::{RecordId, ValidationIssue};

    #[test]
    fn test_status_codes() {
        let not_found = ApiError::from(CoreError::RecordNotFound { id: RecordId::new("x") });
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let paid = ApiError::from(CoreError::AlreadyPaid { id: RecordId::new("x"), count: 3 });
        assert_eq!(paid.status_code(), StatusCode::CONFLICT);

        let stale = ApiError::from(CoreError::StaleRecord { id: RecordId::positional(3) });
        assert_eq!(stale.status_code(), StatusCode::CONFLICT);

        let invalid = ApiError::from(CoreError::Validation { issues: vec![ValidationIssue::EmptyDate] });
        assert_eq!(invalid.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let store = ApiError::from(CoreError::Store(cuotas_sheet::StoreError::MissingToken));
        assert_eq!(store.status_code(), StatusCode::BAD_GATEWAY);

        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
    }
}
