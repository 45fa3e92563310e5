//! Dispatch outcomes and their HTTP rendering.
//!
//! # Responsibilities
//! - Name every way a dispatch can fail
//! - Map failures to status codes (400, 404, 500, 501)
//! - Render successes as `200` with a JSON body
//!
//! # Design Decisions
//! - Error bodies are plain text
//! - Handler failures are logged but rendered opaquely

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;

use crate::service::HandlerError;

/// Failures of the server dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No template matched the path, or the matching contract has another method.
    #[error("Not found")]
    NotFound,

    /// Unreadable body, malformed JSON, or input guard rejection.
    #[error("{0}")]
    BadRequest(String),

    /// No implementation bound, or no handler for the operation.
    #[error("Not implemented")]
    NotImplemented,

    /// The bound handler failed.
    #[error("Operation failed: {0}")]
    Handler(#[source] HandlerError),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NotFound => StatusCode::NOT_FOUND,
            DispatchError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DispatchError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            DispatchError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            DispatchError::Handler(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        (status, message).into_response()
    }
}

/// `200 OK` with the JSON-encoded result.
pub fn json_response(result: &Value) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        result.to_string(),
    )
        .into_response()
}
