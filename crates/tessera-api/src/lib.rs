//! HTTP surface for tessera.
//!
//! Exposes the payment webhook endpoint and the on-demand reconciliation
//! trigger. Status codes carry the error taxonomy: 4xx for permanent
//! verification/metadata failures (never retried), 422 for catalog
//! configuration defects, 5xx for transient store/provider failures so the
//! provider's redelivery (or a re-scan) retries them.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;

pub use error::ApiError;
pub use models::{RunReconciliationRequest, WebhookAck};
pub use router::{api_router, ApiState};
