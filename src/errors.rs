use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON error envelope returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Shipment is already complete")]
    AlreadyComplete,

    #[error("Shipment no longer exists")]
    ShipmentGone,

    #[error("Shipment has no active items")]
    NoActiveItems,

    #[error("No quantities were entered")]
    NoQuantitiesEntered,

    #[error("Shipment is being edited by staff {holder}")]
    LockHeld { holder: i64, expires_at: String },

    #[error("Timed out waiting for the shipment row lock")]
    LockTimeout,

    #[error("Event error: {0}")]
    Event(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl ServiceError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        ServiceError::Database(error.into_db_err())
    }

    /// Returns the HTTP status code for this error. Single source of truth
    /// for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Event(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyComplete | Self::LockHeld { .. } => StatusCode::CONFLICT,
            Self::ShipmentGone => StatusCode::GONE,
            Self::NoActiveItems | Self::NoQuantitiesEntered => StatusCode::UNPROCESSABLE_ENTITY,
            Self::LockTimeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message suitable for HTTP responses. Internal failures return a
    /// generic retry hint; the real cause is logged, not returned.
    pub fn response_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Event(_) | Self::Internal(_) => {
                "Operation failed, please retry".to_string()
            }
            Self::LockTimeout => "Shipment is busy, please retry".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(err)).into_response()
    }
}

/// API error type for the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Service(service_error) => (
                service_error.status_code(),
                service_error.response_message(),
            ),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let err = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message,
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::AlreadyComplete.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ServiceError::ShipmentGone.status_code(), StatusCode::GONE);
        assert_eq!(
            ServiceError::NoActiveItems.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::NoQuantitiesEntered.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::LockTimeout.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::db_error("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_hidden() {
        assert_eq!(
            ServiceError::db_error("connection reset by peer").response_message(),
            "Operation failed, please retry"
        );
        assert_eq!(
            ServiceError::Internal("stack trace".into()).response_message(),
            "Operation failed, please retry"
        );

        // Business-rule rejections keep their real message.
        assert_eq!(
            ServiceError::AlreadyComplete.response_message(),
            "Shipment is already complete"
        );
        assert_eq!(
            ServiceError::Validation("Destination mismatch".into()).response_message(),
            "Validation error: Destination mismatch"
        );
    }

    #[test]
    fn lock_held_carries_holder() {
        let err = ServiceError::LockHeld {
            holder: 42,
            expires_at: "2024-03-01T10:00:00Z".into(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.response_message().contains("42"));
    }
}
