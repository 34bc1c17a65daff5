//! Axum router setup for the tessera API.

use std::sync::Arc;

use axum::{routing::post, Router};

use tessera_engine::{Provisioner, ReconciliationScanner, WebhookVerifier};

use crate::handlers::{reconciliation, webhook};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub verifier: WebhookVerifier,
    pub provisioner: Arc<Provisioner>,
    pub scanner: Arc<ReconciliationScanner>,
}

impl ApiState {
    /// Create the API state from its collaborators.
    #[must_use]
    pub fn new(
        verifier: WebhookVerifier,
        provisioner: Arc<Provisioner>,
        scanner: Arc<ReconciliationScanner>,
    ) -> Self {
        Self {
            verifier,
            provisioner,
            scanner,
        }
    }
}

/// Creates the API router with all routes.
pub fn api_router(state: ApiState) -> Router {
    Router::new()
        .route("/webhooks/payments", post(webhook::payment_webhook_handler))
        .route(
            "/reconciliation/run",
            post(reconciliation::run_reconciliation_handler),
        )
        .with_state(state)
}
