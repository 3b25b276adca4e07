use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body returned to API clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g. "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional detail (validation field errors etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Error taxonomy for the service layer.
///
/// Validation failures, business-rule conflicts and network/database
/// failures are distinct variants so the HTTP layer can surface each one
/// differently instead of collapsing them into a single generic alert.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ValidationError(_) | ServiceError::InvalidStatus(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::DatabaseError(_)
            | ServiceError::EventError(_)
            | ServiceError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn category(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "Not Found",
            ServiceError::ValidationError(_) => "Validation Error",
            ServiceError::InvalidStatus(_) => "Invalid Status",
            ServiceError::Conflict(_) => "Conflict",
            ServiceError::DatabaseError(_)
            | ServiceError::EventError(_)
            | ServiceError::InternalError(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Never leak database error details to clients.
        let message = match &self {
            ServiceError::DatabaseError(err) => {
                tracing::error!(error = %err, "database error while handling request");
                "An internal error occurred".to_string()
            }
            ServiceError::InternalError(msg) => {
                tracing::error!(error = %msg, "internal error while handling request");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: self.category().to_string(),
            message,
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn validator_errors_become_validation_errors() {
        let err = Probe {
            name: String::new(),
        }
        .validate()
        .unwrap_err();
        assert_matches!(ServiceError::from(err), ServiceError::ValidationError(_));
    }

    #[test]
    fn conflict_maps_to_409() {
        let err = ServiceError::Conflict("store entry already exists".into());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_and_invalid_status_map_to_400() {
        assert_eq!(
            ServiceError::ValidationError("missing field".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidStatus("already completed".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn database_errors_are_not_leaked() {
        let err = ServiceError::DatabaseError(sea_orm::DbErr::Custom("secret dsn".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
