//! Error handling for the EMSA backend and client.
//!
//! Server-side errors map to HTTP status codes with a `{"detail": ...}` body;
//! client-side errors wrap transport, decode, and API failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Application error type for the mock backend.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid bearer token, or bad credentials
    Unauthorized(String),
    /// Resource not found
    NotFound(String),
    /// Validation error (missing/empty fields, unknown references)
    Validation(String),
    /// Duplicate resource (e.g. mail already registered)
    Conflict(String),
    /// Upload exceeds the size limit
    PayloadTooLarge(String),
    /// Malformed request
    BadRequest(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message.
    pub fn detail(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::BadRequest(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status_code(), self.detail())
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge(
                "File size exceeds the allowed limit of 2MB".to_string(),
            );
        }
        tracing::error!("Multipart error: {:?}", err);
        AppError::BadRequest(format!("Multipart error: {}", err))
    }
}

/// Error response body, matching the canonical API contract.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            detail: self.detail().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Error type for the client library.
#[derive(Debug)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, ...)
    Http(reqwest::Error),
    /// The server answered with a non-success status
    Api { status: u16, detail: String },
    /// The response body did not match the canonical contract
    Decode(String),
    /// The durable session store could not be read or written
    Session(std::io::Error),
    /// An authenticated call was attempted without a session token
    NotLoggedIn,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(err) => write!(f, "HTTP error: {}", err),
            ClientError::Api { status, detail } => {
                write!(f, "API error {}: {}", status, detail)
            }
            ClientError::Decode(msg) => write!(f, "Decode error: {}", msg),
            ClientError::Session(err) => write!(f, "Session store error: {}", err),
            ClientError::NotLoggedIn => write!(f, "Not logged in"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Http(err)
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Session(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::PayloadTooLarge("x".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_client_error_display() {
        let err = ClientError::Api {
            status: 401,
            detail: "Invalid credentials".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: Invalid credentials");
    }
}
