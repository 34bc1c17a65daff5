//! Error types for the provisioning engine.
//!
//! The taxonomy separates permanent failures (bad signature, catalog
//! defects, malformed metadata: retrying cannot help) from transient ones
//! (store and provider I/O: safe to retry via provider redelivery or a
//! re-scan). "Already provisioned" is deliberately not here: it is a success
//! outcome, not an error.

use tessera_core::ProductId;
use thiserror::Error;

/// Webhook verification failures. All permanent: the notification is
/// rejected and never retried automatically.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// No signature header was supplied.
    #[error("Missing webhook signature")]
    MissingSignature,

    /// The signature header does not have the expected `sha256=<hex>` form.
    #[error("Malformed webhook signature header")]
    MalformedSignature,

    /// The signature matches neither the current nor the previous secret.
    #[error("Webhook signature mismatch")]
    SignatureMismatch,

    /// The body is not a decodable payment event.
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Content store failures, as seen from the engine.
///
/// Store adapters map their backend errors into these variants; the engine
/// treats every one of them as transient.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or a connection could not be acquired.
    #[error("Content store unavailable: {0}")]
    Unavailable(String),

    /// A query or write failed inside the store.
    #[error("Content store query failed: {0}")]
    Query(String),
}

/// Payment provider API failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The request could not be sent or timed out.
    #[error("Payment provider request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("Payment provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider's response body could not be decoded.
    #[error("Payment provider response malformed: {0}")]
    Decode(String),
}

/// Failures of a single provisioning attempt.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A relevant transaction is missing metadata the pipeline requires.
    /// Permanent: redelivery carries the same metadata.
    #[error("Transaction {transaction_id} metadata missing required field `{field}`")]
    MissingMetadata {
        transaction_id: String,
        field: &'static str,
    },

    /// The referenced product does not exist (or belongs to another tenant).
    #[error("Product {product_id} not found")]
    ProductNotFound { product_id: ProductId },

    /// The product exists but its configuration cannot produce a valid
    /// entitlement. Permanent until the catalog is fixed; the offending
    /// field is named and never silently defaulted.
    #[error("Product {product_id} misconfigured: field `{field}` {reason}")]
    InvalidProduct {
        product_id: ProductId,
        field: &'static str,
        reason: String,
    },

    /// The user record could not be resolved or created. Transient.
    #[error("Identity resolution failed: {0}")]
    Identity(#[source] StoreError),

    /// The entitlement write failed for a reason other than a provenance
    /// duplicate. Transient.
    #[error("Entitlement write failed: {0}")]
    Persistence(#[source] StoreError),
}

impl ProvisionError {
    /// True for failures that may succeed on retry (provider redelivery or
    /// a later reconciliation scan) without any external change.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProvisionError::Identity(_) | ProvisionError::Persistence(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let identity = ProvisionError::Identity(StoreError::Unavailable("pool".into()));
        let persistence = ProvisionError::Persistence(StoreError::Query("insert".into()));
        assert!(identity.is_transient());
        assert!(persistence.is_transient());

        let missing = ProvisionError::MissingMetadata {
            transaction_id: "tx_1".into(),
            field: "product_id",
        };
        let not_found = ProvisionError::ProductNotFound {
            product_id: ProductId::new(),
        };
        assert!(!missing.is_transient());
        assert!(!not_found.is_transient());
    }

    #[test]
    fn test_invalid_product_names_field() {
        let err = ProvisionError::InvalidProduct {
            product_id: ProductId::new(),
            field: "valid_until",
            reason: "is in the past".into(),
        };
        assert!(err.to_string().contains("`valid_until`"));
    }
}
