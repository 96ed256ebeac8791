//! Typed error handling for the platform.
//!
//! Every fallible operation surfaces one of five categories:
//!
//! - `NotFound`: a record does not exist for the current tenant
//! - `Validation`: the request payload or headers are malformed
//! - `Conflict`: the write collides with existing state
//! - `Business`: a domain rule rejected the operation (e.g. an illegal
//!   status transition)
//! - `Infrastructure`: the storage layer failed
//!
//! Each category maps to an HTTP status and renders as the standard JSON
//! envelope (`success`, `message`, `timestamp`, optional `details`).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The crate-wide error type.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// No record of the given type exists under the current tenant.
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: Uuid },

    /// The request payload or headers failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The write collides with existing state (duplicate id, concurrent
    /// transaction, already-resolved record).
    #[error("{message}")]
    Conflict { message: String },

    /// A domain rule rejected the operation.
    #[error("{message}")]
    Business { message: String },

    /// The storage backend failed.
    #[error("{message}")]
    Infrastructure { message: String },
}

impl PlatformError {
    pub fn not_found(resource: impl Into<String>, id: Uuid) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn business(message: impl Into<String>) -> Self {
        Self::Business {
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure {
            message: message.into(),
        }
    }

    /// HTTP status for this error category.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlatformError::NotFound { .. } => StatusCode::NOT_FOUND,
            PlatformError::Validation(_) => StatusCode::BAD_REQUEST,
            PlatformError::Conflict { .. } => StatusCode::CONFLICT,
            PlatformError::Business { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PlatformError::Infrastructure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable category name, used in logs and envelope details.
    pub fn category(&self) -> &'static str {
        match self {
            PlatformError::NotFound { .. } => "not_found",
            PlatformError::Validation(_) => "validation",
            PlatformError::Conflict { .. } => "conflict",
            PlatformError::Business { .. } => "business",
            PlatformError::Infrastructure { .. } => "infrastructure",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            PlatformError::NotFound { resource, id } => Some(serde_json::json!({
                "resource": resource,
                "id": id.to_string(),
            })),
            PlatformError::Validation(ValidationError::Fields(issues)) => {
                Some(serde_json::json!({ "fields": issues }))
            }
            PlatformError::Validation(ValidationError::Field { field, message }) => {
                Some(serde_json::json!({
                    "fields": [{ "field": field, "message": message }],
                }))
            }
            _ => None,
        }
    }

    /// Build the wire envelope for this error.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            message: self.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            details: self.details(),
        }
    }
}

/// The JSON envelope returned for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        if matches!(self, PlatformError::Infrastructure { .. }) {
            tracing::error!(error = %self, "storage failure surfaced to client");
        }
        let status = self.status_code();
        (status, Json(self.to_envelope())).into_response()
    }
}

// =============================================================================
// Validation errors
// =============================================================================

/// Input validation failures, returned to the caller with field details.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A single field failed.
    #[error("validation failed for field '{field}': {message}")]
    Field { field: String, message: String },

    /// Several fields failed at once.
    #[error("validation failed for {} field(s)", .0.len())]
    Fields(Vec<FieldIssue>),

    /// The body could not be parsed at all.
    #[error("invalid request body: {message}")]
    Body { message: String },

    /// The `X-Tenant-ID` header is missing or not a UUID.
    #[error("missing or invalid X-Tenant-ID header")]
    Tenant,

    /// A path or query identifier is not a UUID.
    #[error("invalid identifier '{value}'")]
    InvalidId { value: String },
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// One field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        PlatformError::Validation(ValidationError::Body {
            message: err.to_string(),
        })
    }
}

/// A specialized Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

// =============================================================================
// Tests
// =============================================================================
