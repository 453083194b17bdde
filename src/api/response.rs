//! Response types for the configuration API.
//!
//! This module defines the response bodies and the mapping from
//! [`ConfigError`] to HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::ValidationReport;
use crate::config::{AnalysisConfig, ConfigTheme, LoadedConfig};
use crate::error::ConfigError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates an invalid query string error response.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new("INVALID_QUERY", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<ConfigError> for ApiErrorResponse {
    fn from(error: ConfigError) -> Self {
        let message = error.to_string();
        match error {
            ConfigError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_NOT_FOUND", message, path),
            },
            ConfigError::Parse { path, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details("PARSE_ERROR", message, path),
            },
            ConfigError::MissingKey { key, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details("MISSING_KEY", message, key),
            },
            ConfigError::TypeMismatch { key, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details("TYPE_MISMATCH", message, key),
            },
            ConfigError::InvalidTemplate { key, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details("INVALID_TEMPLATE", message, key),
            },
            ConfigError::InvariantViolation { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("INVARIANT_VIOLATION", message),
            },
            ConfigError::UnknownConfig { name } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details("UNKNOWN_CONFIG", message, name),
            },
        }
    }
}

/// Body of a successful `/validate` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResponse {
    /// Unique identifier for this validation.
    pub validation_id: Uuid,
    /// When the validation was performed.
    pub timestamp: DateTime<Utc>,
    /// Version of the crate that validated the document.
    pub engine_version: String,
    /// Theme the document was validated against.
    pub theme: ConfigTheme,
    /// The validated configuration.
    pub config: AnalysisConfig,
    /// Consistency findings.
    pub report: ValidationReport,
    /// Validation duration in microseconds.
    pub duration_us: u64,
}

/// One entry of the `/configs` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSummary {
    /// Name of the configuration.
    pub name: String,
    /// Theme of the configuration.
    pub theme: ConfigTheme,
    /// The analysis routine the configuration drives.
    pub analysis_module: String,
    /// File the configuration was loaded from.
    pub path: String,
}

impl From<&LoadedConfig> for ConfigSummary {
    fn from(loaded: &LoadedConfig) -> Self {
        Self {
            name: loaded.name().to_string(),
            theme: loaded.theme(),
            analysis_module: loaded.config().analysis_module.clone(),
            path: loaded.path().to_string(),
        }
    }
}

/// Body of the `/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the service answers.
    pub status: String,
    /// Number of loaded configurations.
    pub configs: usize,
}
