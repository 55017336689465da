use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::ResponseMeta;

/// Machine-readable error codes carried in the `error.code` field.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_PRODUCT_SLUG: &str = "INVALID_PRODUCT_SLUG";
    pub const PRODUCT_TITLE_TOO_SHORT: &str = "PRODUCT_TITLE_TOO_SHORT";
    pub const INVALID_CATEGORY_SLUG: &str = "INVALID_CATEGORY_SLUG";
    pub const CATEGORY_NAME_TOO_SHORT: &str = "CATEGORY_NAME_TOO_SHORT";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Error payload nested under `error`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    /// Human-readable error description
    #[schema(example = "Product with slug \"linen-shirt\" not found")]
    pub message: String,
}

/// Failure envelope returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": false,
    "error": {
        "code": "VALIDATION_ERROR",
        "message": "priceMin must be a non-negative decimal"
    },
    "meta": {
        "requestId": "req-abc123xyz",
        "timestamp": "2025-03-01T10:30:00.000Z"
    }
}))]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    InvalidProductSlug(String),

    #[error("{0}")]
    ProductTitleTooShort(String),

    #[error("{0}")]
    InvalidCategorySlug(String),

    #[error("{0}")]
    CategoryNameTooShort(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_)
            | Self::InvalidProductSlug(_)
            | Self::ProductTitleTooShort(_)
            | Self::InvalidCategorySlug(_)
            | Self::CategoryNameTooShort(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code reported in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => codes::NOT_FOUND,
            Self::ValidationError(_) => codes::VALIDATION_ERROR,
            Self::InvalidProductSlug(_) => codes::INVALID_PRODUCT_SLUG,
            Self::ProductTitleTooShort(_) => codes::PRODUCT_TITLE_TOO_SHORT,
            Self::InvalidCategorySlug(_) => codes::INVALID_CATEGORY_SLUG,
            Self::CategoryNameTooShort(_) => codes::CATEGORY_NAME_TOO_SHORT,
            Self::Conflict(_) => codes::CONFLICT,
            Self::Unauthorized(_) => codes::UNAUTHORIZED,
            Self::Forbidden(_) => codes::FORBIDDEN,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                codes::INTERNAL_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = ErrorResponse::new(self.code(), self.response_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::NotFound("missing".into()).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(!payload.success);
        assert_eq!(payload.error.code, "NOT_FOUND");
        assert_eq!(
            payload.meta.and_then(|m| m.request_id).as_deref(),
            Some("req-123")
        );
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidProductSlug("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::CategoryNameTooShort("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn codes_follow_variants() {
        assert_eq!(
            ServiceError::ProductTitleTooShort("x".into()).code(),
            "PRODUCT_TITLE_TOO_SHORT"
        );
        assert_eq!(
            ServiceError::InvalidCategorySlug("x".into()).code(),
            "INVALID_CATEGORY_SLUG"
        );
        assert_eq!(
            ServiceError::Other(anyhow::anyhow!("boom")).code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn service_error_response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("password=hunter2".into()))
                .response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::InternalError("stack".into()).response_message(),
            "Internal server error"
        );

        // User-facing errors carry the message verbatim
        assert_eq!(
            ServiceError::Conflict("Product with slug \"a\" already exists".into())
                .response_message(),
            "Product with slug \"a\" already exists"
        );
    }
}
