//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ReservoirId;
use crate::persistence::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "invalid value for metric `filling`: \"n/a\"",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Step of an ingestion batch at which a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    /// Opening the batch transaction.
    Begin,
    /// Checking the record's own fields.
    Validate,
    /// Looking up or creating the reservoir.
    Resolve,
    /// Coercing the record's metrics.
    Coerce,
    /// Appending the status snapshot.
    Record,
    /// Committing the batch.
    Commit,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Begin => "begin",
            Self::Validate => "validate",
            Self::Resolve => "resolve",
            Self::Coerce => "coerce",
            Self::Record => "record",
            Self::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Not Found       | 404 Not Found              |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
///
/// [`GatewayError::IngestFailure`] carries the code and status of its cause.
/// A [`StoreError::ValueTooLong`] is client input, so it maps to 400 / 1003.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Reservoir does not exist or has no recorded status.
    #[error("no data found for reservoir {0}")]
    NotFound(ReservoirId),

    /// A metric value could not be read as a number.
    #[error("invalid value for metric `{field}`: {value}")]
    InvalidMetric {
        /// Metric key.
        field: String,
        /// Offending raw value, JSON-encoded.
        value: String,
    },

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A batch was rejected and rolled back.
    #[error("ingest failed at record {index} ({stage}): {cause}")]
    IngestFailure {
        /// Zero-based position of the failing record, or the batch length
        /// for failures outside any single record.
        index: usize,
        /// Step that failed.
        stage: IngestStage,
        /// Underlying error.
        #[source]
        cause: Box<GatewayError>,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Spreadsheet rendering failed.
    #[error("report error: {0}")]
    Report(String),
}

impl GatewayError {
    /// Wraps `cause` as a batch failure at `index` / `stage`.
    #[must_use]
    pub fn ingest(index: usize, stage: IngestStage, cause: impl Into<Self>) -> Self {
        Self::IngestFailure {
            index,
            stage,
            cause: Box::new(cause.into()),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidMetric { .. } => 1002,
            Self::Persistence(StoreError::ValueTooLong(_)) => 1003,
            Self::NotFound(_) => 2001,
            Self::Persistence(_) => 3001,
            Self::Report(_) => 3002,
            Self::IngestFailure { cause, .. } => cause.error_code(),
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidMetric { .. }
            | Self::Persistence(StoreError::ValueTooLong(_)) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IngestFailure { cause, .. } => cause.status_code(),
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::IngestFailure { index, stage, .. } => {
                Some(format!("record={index} stage={stage}"))
            }
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
