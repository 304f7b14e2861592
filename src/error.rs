//! Error handling for the guardian control module

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, empty or wrong-typed attribute (fatal at startup)
    #[error("Config error: {0}")]
    Config(String),

    /// A named collaborator is absent from the dependency set
    #[error("{kind} '{name}' not found in dependencies. Available resources: {available:?}")]
    DependencyNotFound {
        kind: String,
        name: String,
        available: Vec<String>,
    },

    /// Camera/detector/servo/GPIO/audio call failed during a tick
    #[error("Hardware error on {device}: {message}")]
    Hardware { device: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a hardware call failure on a named device
    pub fn hardware(device: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Hardware {
            device: device.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Error::Config(_) => (StatusCode::BAD_REQUEST, "CONFIG_ERROR"),
            Error::DependencyNotFound { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DEPENDENCY_NOT_FOUND")
            }
            Error::Hardware { .. } => (StatusCode::BAD_GATEWAY, "HARDWARE_ERROR"),
            Error::Serialization(_) => (StatusCode::BAD_REQUEST, "SERIALIZATION_ERROR"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "HTTP_ERROR"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        let message = self.to_string();

        tracing::error!(
            status = %status,
            error_code = %error_code,
            message = %message,
            "Request error"
        );

        let body = Json(json!({
            "error_code": error_code,
            "message": message
        }));

        (status, body).into_response()
    }
}
