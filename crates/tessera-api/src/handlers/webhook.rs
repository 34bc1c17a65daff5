//! Payment provider webhook handler.
//!
//! Receives the raw notification body plus the `signature` header, verifies
//! it over the exact bytes received, and runs the provisioning pipeline.
//! Returns 200 for processed, already-provisioned and irrelevant events so
//! the provider stops redelivering them.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::info;

use tessera_engine::ProvisionPath;

use crate::error::ApiResult;
use crate::models::WebhookAck;
use crate::router::ApiState;

/// Header carrying the HMAC signature of the body.
const SIGNATURE_HEADER: &str = "signature";

/// Handle a payment provider notification.
#[utoipa::path(
    post,
    path = "/webhooks/payments",
    tag = "Webhooks",
    responses(
        (status = 200, description = "Event processed, already provisioned, or irrelevant", body = WebhookAck),
        (status = 400, description = "Verification failed or required metadata missing"),
        (status = 401, description = "Signature mismatch"),
        (status = 422, description = "Product configuration defect"),
        (status = 500, description = "Transient store failure; provider will redeliver"),
    )
)]
pub async fn payment_webhook_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<WebhookAck>)> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let event = state.verifier.verify(&body, signature)?;

    let Some(transaction) = event.provisionable_transaction() else {
        info!(event_id = %event.id, kind = ?event.kind, "Ignoring non-provisionable event");
        return Ok((StatusCode::OK, Json(WebhookAck::IGNORED)));
    };

    let outcome = state
        .provisioner
        .provision(transaction, ProvisionPath::LiveWebhook)
        .await?;

    let ack = if outcome.was_created() {
        WebhookAck::PROVISIONED
    } else {
        WebhookAck::ALREADY_PROVISIONED
    };
    Ok((StatusCode::OK, Json(ack)))
}
