//! Error types for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use tessera_engine::{ProvisionError, ScanError, VerifyError};

/// HTTP-level error wrapping the engine taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Invalid request: {0}")]
    Validation(String),
}

/// JSON error response returned by API endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
}

impl ApiError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            // Verification failures: permanent, provider must not retry.
            ApiError::Verify(VerifyError::SignatureMismatch) => {
                (StatusCode::UNAUTHORIZED, "signature_mismatch")
            }
            ApiError::Verify(_) => (StatusCode::BAD_REQUEST, "verification_failed"),

            // Permanent pipeline failures: redelivery carries the same data.
            ApiError::Provision(ProvisionError::MissingMetadata { .. }) => {
                (StatusCode::BAD_REQUEST, "missing_metadata")
            }
            ApiError::Provision(ProvisionError::ProductNotFound { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "product_not_found")
            }
            ApiError::Provision(ProvisionError::InvalidProduct { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_product_configuration")
            }

            // Transient failures: 5xx triggers provider redelivery.
            ApiError::Provision(_) => (StatusCode::INTERNAL_SERVER_ERROR, "provisioning_failed"),
            ApiError::Scan(_) => (StatusCode::BAD_GATEWAY, "reconciliation_failed"),

            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed with transient error");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
