//! Request/response DTOs for the HTTP surface.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Acknowledgement body for webhook deliveries. Status code is the
/// contract; the body is informational.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    /// What processing did: "provisioned", "already_provisioned" or
    /// "ignored".
    pub outcome: &'static str,
}

impl WebhookAck {
    pub const PROVISIONED: Self = Self {
        outcome: "provisioned",
    };
    pub const ALREADY_PROVISIONED: Self = Self {
        outcome: "already_provisioned",
    };
    pub const IGNORED: Self = Self { outcome: "ignored" };
}

/// Request body for the on-demand reconciliation trigger.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RunReconciliationRequest {
    /// Scan window in days, counting back from now. Falls back to the
    /// configured default when omitted.
    #[validate(range(min = 1, max = 365))]
    pub window_days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_days_range() {
        assert!(RunReconciliationRequest { window_days: None }.validate().is_ok());
        assert!(RunReconciliationRequest {
            window_days: Some(7)
        }
        .validate()
        .is_ok());
        assert!(RunReconciliationRequest {
            window_days: Some(0)
        }
        .validate()
        .is_err());
        assert!(RunReconciliationRequest {
            window_days: Some(400)
        }
        .validate()
        .is_err());
    }
}
