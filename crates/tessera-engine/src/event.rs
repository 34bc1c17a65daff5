//! Typed payment provider events and transactions.
//!
//! The provider owns these records; tessera reads them from webhook
//! notifications and from the ledger listing API and never writes them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{ProductId, TenantId};

/// Payment status of an external transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
    Refunded,
}

/// Kind of an external transaction, supplied in its metadata.
///
/// Only pass purchases are relevant to entitlement provisioning; every other
/// kind is acknowledged and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    PassPurchase,
    BookingFee,
    Refund,
    /// Kinds this engine does not know about. Decoded, never processed.
    #[serde(other)]
    Other,
}

/// Free-form metadata attached to a transaction at creation time.
///
/// Every field is optional on the wire; which ones are required for
/// provisioning is decided by the pipeline, not the decoder, so a malformed
/// transaction still decodes and is reported with the missing field named.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionMetadata {
    pub product_id: Option<ProductId>,
    /// External identity reference of the purchasing user.
    pub user_ref: Option<String>,
    pub tenant_id: Option<TenantId>,
    pub kind: Option<TransactionKind>,
    /// Best-effort profile fields from the identity provider.
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// An immutable payment transaction owned by the external provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalTransaction {
    /// Stable checkout/session id, one per purchase. Used as the
    /// entitlement provenance key.
    pub id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
    /// When the payment completed. This, not "now", is the entitlement
    /// activation instant, so reconciliation run days later reproduces the
    /// original validity window.
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: TransactionMetadata,
}

impl ExternalTransaction {
    /// True when this transaction should produce an entitlement: a
    /// completed pass purchase.
    #[must_use]
    pub fn is_provisionable(&self) -> bool {
        self.status == PaymentStatus::Completed
            && self.metadata.kind == Some(TransactionKind::PassPurchase)
    }
}

/// Discriminator of a webhook notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "checkout.completed")]
    CheckoutCompleted,
    #[serde(rename = "checkout.expired")]
    CheckoutExpired,
    #[serde(rename = "refund.issued")]
    RefundIssued,
    /// Event kinds this engine does not handle. Acknowledged without
    /// processing so the provider stops redelivering them.
    #[serde(other)]
    Unknown,
}

/// A decoded, signature-verified webhook notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: String,
    pub kind: EventKind,
    pub created_at: DateTime<Utc>,
    /// The transaction the event describes. Absent on event kinds that do
    /// not carry one.
    pub transaction: Option<ExternalTransaction>,
}

impl PaymentEvent {
    /// Returns the transaction to provision from, if this event calls for
    /// provisioning at all.
    #[must_use]
    pub fn provisionable_transaction(&self) -> Option<&ExternalTransaction> {
        if self.kind != EventKind::CheckoutCompleted {
            return None;
        }
        self.transaction.as_ref().filter(|tx| tx.is_provisionable())
    }
}
