//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::source::SourceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (bad filter or parameter)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Record source error
    Source(SourceError),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Source(e) => match e {
                SourceError::SourceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                SourceError::SchemaMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                SourceError::ParseError { .. } => StatusCode::BAD_GATEWAY,
                SourceError::ConfigurationError { .. } | SourceError::IoError { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::BadRequest(msg) => ApiError::new("BAD_REQUEST", msg),
            AppError::Internal(msg) => ApiError::new("INTERNAL_ERROR", msg),
            AppError::Source(e) => {
                let code = match &e {
                    SourceError::SourceUnavailable { .. } => "SOURCE_UNAVAILABLE",
                    SourceError::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
                    SourceError::ParseError { .. } => "PARSE_ERROR",
                    SourceError::ConfigurationError { .. } => "CONFIGURATION_ERROR",
                    SourceError::IoError { .. } => "IO_ERROR",
                };
                let details = e.context().to_string();
                let message = match &e {
                    SourceError::SourceUnavailable { message, .. }
                    | SourceError::SchemaMismatch { message, .. }
                    | SourceError::ParseError { message, .. }
                    | SourceError::ConfigurationError { message, .. }
                    | SourceError::IoError { message, .. } => message.clone(),
                };
                ApiError::new(code, message).with_details(details)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::Source(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}
