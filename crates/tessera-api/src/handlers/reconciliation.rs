//! On-demand reconciliation trigger.

use axum::extract::State;
use axum::Json;
use validator::Validate;

use tessera_engine::{ReconciliationReport, TimeWindow};

use crate::error::{ApiError, ApiResult};
use crate::models::RunReconciliationRequest;
use crate::router::ApiState;

/// Run a reconciliation scan over a rolling window.
///
/// Re-runnable at will: the scan has no side effect beyond filling gaps.
#[utoipa::path(
    post,
    path = "/reconciliation/run",
    tag = "Reconciliation",
    request_body = RunReconciliationRequest,
    responses(
        (status = 200, description = "Scan report"),
        (status = 400, description = "Invalid window"),
        (status = 502, description = "Payment provider listing failed"),
    )
)]
pub async fn run_reconciliation_handler(
    State(state): State<ApiState>,
    Json(request): Json<RunReconciliationRequest>,
) -> ApiResult<Json<ReconciliationReport>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let report = match request.window_days {
        Some(days) => state.scanner.scan(TimeWindow::last_days(days)).await?,
        None => state.scanner.scan_default_window().await?,
    };

    Ok(Json(report))
}
