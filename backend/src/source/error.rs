//! Error types for record source operations.
//!
//! Fetch failures are fatal for the load that raised them; nothing in the
//! crate retries them. Empty results are never errors.

use std::fmt;

/// Result type for record source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Structured context for source errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "fetch", "ingest")
    pub operation: Option<String>,
    /// The source involved (URL, file path, ...)
    pub source: Option<String>,
    /// Offending column, if any
    pub column: Option<String>,
    /// Offending row index, if any
    pub row: Option<usize>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref source) = self.source {
            parts.push(format!("source={}", source));
        }
        if let Some(ref column) = self.column {
            parts.push(format!("column={}", column));
        }
        if let Some(row) = self.row {
            parts.push(format!("row={}", row));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for record source operations
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source could not be reached or answered with a failure status.
    #[error("Source unavailable: {message} {context}")]
    SourceUnavailable {
        message: String,
        context: ErrorContext,
    },

    /// A required column is absent or a required value is null.
    #[error("Schema mismatch: {message} {context}")]
    SchemaMismatch {
        message: String,
        context: ErrorContext,
    },

    /// The payload could not be decoded.
    #[error("Parse error: {message} {context}")]
    ParseError {
        message: String,
        context: ErrorContext,
    },

    /// Configuration or initialization error.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// Local file access failed.
    #[error("I/O error: {message} {context}")]
    IoError {
        message: String,
        context: ErrorContext,
    },
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn unavailable_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            context,
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn schema_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
            context,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn parse_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ParseError {
            message: message.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn io_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::IoError {
            message: message.into(),
            context,
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::SourceUnavailable { context, .. }
            | Self::SchemaMismatch { context, .. }
            | Self::ParseError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::IoError { context, .. } => context,
        }
    }

    /// Add or update the source description in the error context.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        match &mut self {
            Self::SourceUnavailable { context, .. }
            | Self::SchemaMismatch { context, .. }
            | Self::ParseError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::IoError { context, .. } => {
                context.source = Some(source.into());
            }
        }
        self
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::parse_with_context(err.to_string(), ErrorContext::new("decode_json"))
    }
}

#[cfg(feature = "http-source")]
impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        let mut context = ErrorContext::new("http_fetch");
        if let Some(url) = err.url() {
            context = context.with_source(url.to_string());
        }
        if let Some(status) = err.status() {
            context = context.with_details(format!("status={}", status));
        }
        SourceError::unavailable_with_context(err.to_string(), context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("ingest")
            .with_column("Airline")
            .with_row(3);
        assert_eq!(ctx.to_string(), "[operation=ingest, column=Airline, row=3]");
    }

    #[test]
    fn test_error_display_includes_context() {
        let err = SourceError::schema_with_context(
            "missing column",
            ErrorContext::new("ingest").with_column("Origin"),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("Schema mismatch: missing column"));
        assert!(msg.contains("column=Origin"));
        assert!(err.is_schema_mismatch());
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_with_source() {
        let err = SourceError::unavailable("HTTP 503").with_source("http://example.test/flights");
        assert_eq!(
            err.context().source.as_deref(),
            Some("http://example.test/flights")
        );
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_from_serde_json() {
        let err: SourceError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, SourceError::ParseError { .. }));
    }
}
