//! OpenAPI documentation generated from handler annotations.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

/// API documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tessera",
        description = "Entitlement provisioning and reconciliation service"
    ),
    paths(
        tessera_api::handlers::webhook::payment_webhook_handler,
        tessera_api::handlers::reconciliation::run_reconciliation_handler,
    ),
    components(schemas(
        tessera_api::models::WebhookAck,
        tessera_api::models::RunReconciliationRequest,
        tessera_api::error::ErrorResponse,
    ))
)]
pub struct ApiDoc;

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Route serving the OpenAPI document.
pub fn openapi_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_handler))
}
