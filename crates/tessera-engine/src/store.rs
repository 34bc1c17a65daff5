//! Content store seam.
//!
//! The engine never talks to a database directly; it goes through
//! [`ContentStore`], injected explicitly at construction. `tessera-db`
//! provides the PostgreSQL implementation; tests provide in-memory doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tessera_core::{ProductId, TenantId, UserId};

use crate::error::StoreError;
use crate::model::{
    Entitlement, EntitlementKind, Product, ProductCategory, ProvisionPath, User, UserRole,
};

/// Input for lazily creating a user record.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub tenant_id: TenantId,
    pub external_ref: String,
    pub display_name: String,
    pub email: String,
    pub role: UserRole,
}

/// Input for the single entitlement create operation.
#[derive(Debug, Clone)]
pub struct NewEntitlement {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_category: ProductCategory,
    pub kind: EntitlementKind,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remaining_uses: Option<i32>,
    pub price_paid_minor: i64,
    pub source_transaction_id: String,
    pub created_via: ProvisionPath,
}

/// Result of the create-if-absent entitlement write.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// The row was created; this caller won any race.
    Inserted(Entitlement),
    /// The store rejected the write because an entitlement with this
    /// source transaction id already exists. A success for idempotency
    /// purposes, not an error.
    DuplicateSource,
}

/// Read/write access to internal entities.
///
/// `create_entitlement` is the single correctness-critical operation: it
/// must be atomic with respect to the uniqueness of
/// `source_transaction_id`, reporting a duplicate as
/// [`InsertOutcome::DuplicateSource`] rather than an error. Everything else
/// is plain id-based lookup.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Find a user by their external identity reference within a tenant.
    async fn find_user_by_external_ref(
        &self,
        tenant_id: TenantId,
        external_ref: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Create a user record.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Find a product by id. Not tenant-filtered; the engine checks tenant
    /// ownership itself so a cross-tenant reference fails loudly.
    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Find the entitlement provisioned from a given source transaction.
    async fn find_entitlement_by_source(
        &self,
        source_transaction_id: &str,
    ) -> Result<Option<Entitlement>, StoreError>;

    /// Create an entitlement if none exists for its source transaction id.
    async fn create_entitlement(
        &self,
        entitlement: NewEntitlement,
    ) -> Result<InsertOutcome, StoreError>;
}
