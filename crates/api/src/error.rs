//! Service Errors and their HTTP mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use record_validator::ValidationErrors;
use serde::{Deserialize, Serialize};
use storage::StorageError;
use thiserror::Error;

/// Outcome of a failed service operation
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid student ID")]
    InvalidId,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    DuplicateEmail(&'static str),

    #[error("Student not found")]
    NotFound,

    #[error("Invalid request body")]
    BadRequest(String),

    /// Unexpected store failure; `context` names the operation
    #[error("{context}")]
    Internal {
        context: &'static str,
        #[source]
        source: StorageError,
    },
}

impl ServiceError {
    /// HTTP status for this outcome
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::Validation(_) | Self::DuplicateEmail(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::Validation(_) => "validation",
            Self::DuplicateEmail(_) => "duplicate_email",
            Self::NotFound => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Internal { .. } => "internal",
        }
    }

    /// Wrap a store failure with the operation it interrupted
    pub(crate) fn internal(context: &'static str) -> impl FnOnce(StorageError) -> Self {
        move |source| Self::Internal { context, source }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ServiceError> for ErrorBody {
    fn from(err: &ServiceError) -> Self {
        let error = match err {
            ServiceError::Internal { source, .. } => Some(source.to_string()),
            ServiceError::BadRequest(detail) => Some(detail.clone()),
            _ => None,
        };

        Self {
            success: false,
            message: err.to_string(),
            error,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::from(&self))).into_response()
    }
}
