//! Application error type and its HTTP representation.
//!
//! Every variant carries a human readable message plus a JSON `details`
//! object. Handlers return `Result<_, AppError>` and Axum renders the error as:
//!
//! ```json
//! { "error": { "code": "duplicate_slug", "message": "...", "details": {} } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Name of the partial unique index guarding active slugs.
pub const ACTIVE_SLUG_CONSTRAINT: &str = "splits_active_slug_key";

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Unknown or inactive split.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Another active split already owns the slug.
    #[error("{message}")]
    DuplicateSlug { message: String, details: Value },

    /// Malformed URL or wrong number of destinations.
    #[error("{message}")]
    InvalidDestination { message: String, details: Value },

    /// Negative or non-finite weight.
    #[error("{message}")]
    InvalidWeight { message: String, details: Value },

    /// Nothing with a positive weight to redirect to.
    #[error("{message}")]
    NoSelectableDestination { message: String, details: Value },

    /// Any other malformed input (name, slug, pagination, empty patch).
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Backing store unavailable or transaction failure.
    #[error("{message}")]
    Persistence { message: String, details: Value },
}

impl AppError {
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn duplicate_slug(slug: &str) -> Self {
        Self::DuplicateSlug {
            message: "Slug is already used by an active split".to_string(),
            details: json!({ "slug": slug }),
        }
    }

    pub fn invalid_destination(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidDestination {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_weight(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidWeight {
            message: message.into(),
            details,
        }
    }

    pub fn no_selectable_destination(details: Value) -> Self {
        Self::NoSelectableDestination {
            message: "No destination with a positive weight".to_string(),
            details,
        }
    }

    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn persistence(message: impl Into<String>, details: Value) -> Self {
        Self::Persistence {
            message: message.into(),
            details,
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, &str, &Value) {
        match self {
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::DuplicateSlug { message, details } => {
                (StatusCode::CONFLICT, "duplicate_slug", message, details)
            }
            AppError::InvalidDestination { message, details } => (
                StatusCode::BAD_REQUEST,
                "invalid_destination",
                message,
                details,
            ),
            AppError::InvalidWeight { message, details } => {
                (StatusCode::BAD_REQUEST, "invalid_weight", message, details)
            }
            AppError::NoSelectableDestination { message, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "no_selectable_destination",
                message,
                details,
            ),
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::Persistence { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "persistence_failure",
                message,
                details,
            ),
        }
    }

    /// HTTP status this error is rendered with.
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }

    /// Machine readable error code.
    pub fn code(&self) -> &'static str {
        self.parts().1
    }

    /// Converts the error into its serializable payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code, message, details) = self.parts();
        ErrorInfo {
            code,
            message: message.to_string(),
            details: details.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
            && db.constraint() == Some(ACTIVE_SLUG_CONSTRAINT)
        {
            return AppError::DuplicateSlug {
                message: "Slug is already used by an active split".to_string(),
                details: json!({ "constraint": ACTIVE_SLUG_CONSTRAINT }),
            };
        }

        tracing::error!(error = %e, "Database error");
        AppError::persistence("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();

        AppError::bad_request(
            "Request validation failed",
            json!({ "fields": fields, "reason": errors.to_string() }),
        )
    }
}
