//! # Entitlement Provisioning Engine
//!
//! Core logic for provisioning pass/subscription entitlements from payment
//! provider notifications, and for reconciling gaps against the provider's
//! transaction ledger.
//!
//! This crate provides:
//! - Webhook signature verification and typed event decoding
//! - The provisioning pipeline (idempotency guard, identity resolution,
//!   product validation, expiry policy, entitlement write)
//! - The reconciliation scanner that diffs the external ledger against
//!   internal entitlements and fills gaps through the same pipeline
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌───────────────────────────────────────────────┐
//! │   Webhook    │───►│                 Provisioner                   │
//! │  (verified)  │    │  guard → identity → product → policy → write  │
//! └──────────────┘    └───────────────────▲───────────────────────────┘
//!                                         │
//! ┌──────────────┐    ┌───────────────────┴───┐
//! │   Payment    │───►│ Reconciliation Scanner│
//! │    ledger    │    │  (diff, fill gaps)    │
//! └──────────────┘    └───────────────────────┘
//! ```
//!
//! Both entry points converge on the same guarded write: the content store's
//! create-if-absent keyed by source transaction id is the final idempotency
//! authority, so at-least-once delivery and concurrent scans yield at most
//! one entitlement per payment.
//!
//! Collaborators (content store, payment ledger) are injected through the
//! [`ContentStore`] and [`PaymentLedger`] traits; this crate never holds
//! global clients and never mutates provider-owned records.

pub mod error;
pub mod event;
pub mod ledger;
pub mod model;
pub mod policy;
pub mod product;
pub mod provision;
pub mod reconcile;
pub mod store;
pub mod verify;

// Re-exports for convenience
pub use error::{LedgerError, ProvisionError, StoreError, VerifyError};
pub use event::{
    EventKind, ExternalTransaction, PaymentEvent, PaymentStatus, TransactionKind,
    TransactionMetadata,
};
pub use ledger::{PaymentLedger, TimeWindow};
pub use model::{
    Entitlement, EntitlementKind, Product, ProductCategory, ProvisionPath, User, UserRole,
};
pub use policy::{map_entitlement, ExpiryPolicy, UsageGrant};
pub use product::{resolve_product, validate_product, ValidatedProduct};
pub use provision::{ProvisionOutcome, Provisioner};
pub use reconcile::{GapFailure, ReconciliationReport, ReconciliationScanner, ScanConfig, ScanError};
pub use store::{ContentStore, InsertOutcome, NewEntitlement, NewUser};
pub use verify::{compute_signature, WebhookVerifier};
