//! Error types and HTTP mapping for the relay

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure of a single relayed request
#[derive(Error, Debug)]
pub enum RelayError {
    /// The geocoding service returned no match for the query
    #[error("{message}")]
    NotFound { message: String },

    /// An upstream call failed, returned a non-2xx status, or sent an unreadable body
    #[error("{message}")]
    UpstreamFailure { message: String },

    /// The inbound query string was missing or unusable
    #[error("{message}")]
    InvalidRequest { message: String },

    /// Anything else that went wrong while composing a response
    #[error("Error: {message}")]
    Unexpected { message: String },
}

impl RelayError {
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::UpstreamFailure {
            message: message.into(),
        }
    }

    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn unexpected<S: Into<String>>(message: S) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// HTTP status this error is reported with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::NotFound { .. } => StatusCode::NOT_FOUND,
            RelayError::InvalidRequest { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::UpstreamFailure { .. } | RelayError::Unexpected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
