//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CRUD actions
///
/// Failed ID validation and declined dispatches are not errors: the first is
/// answered with a flash message and a redirect, the second with
/// [`ActionOutcome::NotApplicable`](crate::action::ActionOutcome::NotApplicable).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Primary key detection was attempted without a bound model
    ///
    /// This is a programming error in the action wiring and is never retried.
    #[error("No model bound to action '{action}'; cannot detect primary key type")]
    MissingModel {
        /// The `handleAction` of the action that needed the model
        action: String,
    },

    /// A flash message type has no `text` configured
    #[error("Flash message '{flash_type}' has no text configured for action '{action}'")]
    MissingFlashText {
        /// The `handleAction` of the action
        action: String,
        /// The flash type that was requested (e.g. `invalidId`)
        flash_type: String,
    },

    /// No action is registered for the given name
    #[error("No CRUD action is mapped to '{0}'")]
    UnknownAction(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Error::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "CONFIG_ERROR",
                        "Service is misconfigured",
                    ),
                )
            }
            e @ (Error::MissingModel { .. } | Error::MissingFlashText { .. }) => {
                tracing::error!("CRUD action wiring error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "ACTION_MISCONFIGURED",
                        "Internal server error",
                    ),
                )
            }
            Error::UnknownAction(name) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::with_code(
                    StatusCode::NOT_FOUND,
                    "UNKNOWN_ACTION",
                    format!("Action '{}' is not available", name),
                ),
            ),
            Error::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ),
            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_code(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "Internal server error",
                    ),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
