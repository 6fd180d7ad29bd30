//! # Catalog Errors
//!
//! Error type for book operations and its HTTP mapping.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::{InvalidRecordId, StoreError};

use super::normalizer::NormalizeError;

/// Result type for book operations
pub type BookResult<T> = Result<T, BookError>;

/// Book operation errors
#[derive(Debug, Error)]
pub enum BookError {
    // ==================
    // Validation (4xx)
    // ==================
    /// Request body missing fields or carrying bad values
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Query string value of the wrong type
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    /// Search text that does not compile as a pattern
    #[error("Invalid search filter: {0}")]
    InvalidFilter(String),

    // ==================
    // Not found (404)
    // ==================
    /// Identifier is not well-formed; reported like an absent record
    #[error("Book not found: {0}")]
    InvalidId(#[from] InvalidRecordId),

    #[error("Book not found: {0}")]
    NotFound(String),

    /// Search matched nothing
    #[error("No books match the search criteria")]
    NoMatches,

    /// Update touched nothing: absent record or every value already current
    #[error("Book not found or unchanged: {0}")]
    NotFoundOrUnchanged(String),

    // ==================
    // Server (5xx)
    // ==================
    /// Stored record breaks the record shape
    #[error("Corrupt record: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BookError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            BookError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,
            BookError::InvalidFilter(_) => StatusCode::BAD_REQUEST,

            BookError::InvalidId(_) => StatusCode::NOT_FOUND,
            BookError::NotFound(_) => StatusCode::NOT_FOUND,
            BookError::NoMatches => StatusCode::NOT_FOUND,
            BookError::NotFoundOrUnchanged(_) => StatusCode::NOT_FOUND,

            BookError::Store(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            BookError::Normalize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for BookError {
    fn from(rejection: JsonRejection) -> Self {
        BookError::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for BookError {
    fn from(rejection: QueryRejection) -> Self {
        BookError::InvalidQueryParam(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&BookError> for ErrorResponse {
    fn from(err: &BookError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for BookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
