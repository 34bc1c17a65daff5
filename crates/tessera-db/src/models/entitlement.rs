//! Entitlement row model.
//!
//! The unique index on `source_transaction_id` makes `insert_if_absent` the
//! final authority against duplicate provisioning.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tessera_core::{EntitlementId, ProductId, TenantId, UserId};
use tessera_engine::{Entitlement, EntitlementKind, ProductCategory, ProvisionPath};
use uuid::Uuid;

use crate::error::DbError;

/// An entitlement row as stored in PostgreSQL.
#[derive(Debug, Clone, FromRow)]
pub struct EntitlementRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_category: String,
    pub kind: String,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remaining_uses: Option<i32>,
    pub price_paid_minor: i64,
    pub active: bool,
    pub source_transaction_id: String,
    pub created_via: String,
    pub created_at: DateTime<Utc>,
}

/// Data required to create an entitlement.
#[derive(Debug, Clone)]
pub struct CreateEntitlement {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_category: String,
    pub kind: String,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remaining_uses: Option<i32>,
    pub price_paid_minor: i64,
    pub source_transaction_id: String,
    pub created_via: String,
}

impl EntitlementRow {
    /// Find the entitlement provisioned from a source transaction.
    pub async fn find_by_source(
        pool: &PgPool,
        source_transaction_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM entitlements
            WHERE source_transaction_id = $1
            ",
        )
        .bind(source_transaction_id)
        .fetch_optional(pool)
        .await
    }

    /// Insert an entitlement if none exists for its source transaction id.
    ///
    /// Returns `None` when the unique constraint rejected the write; the
    /// caller treats that as "already provisioned", never as an error.
    pub async fn insert_if_absent(
        pool: &PgPool,
        data: CreateEntitlement,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO entitlements (
                tenant_id, user_id, product_id, product_name, product_category,
                kind, activated_at, expires_at, remaining_uses, price_paid_minor,
                source_transaction_id, created_via
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (source_transaction_id) DO NOTHING
            RETURNING *
            ",
        )
        .bind(data.tenant_id)
        .bind(data.user_id)
        .bind(data.product_id)
        .bind(&data.product_name)
        .bind(&data.product_category)
        .bind(&data.kind)
        .bind(data.activated_at)
        .bind(data.expires_at)
        .bind(data.remaining_uses)
        .bind(data.price_paid_minor)
        .bind(&data.source_transaction_id)
        .bind(&data.created_via)
        .fetch_optional(pool)
        .await
    }

    /// Convert into the engine-level entity.
    pub fn into_domain(self) -> Result<Entitlement, DbError> {
        let product_category = ProductCategory::parse(&self.product_category).ok_or_else(|| {
            DbError::InvalidStoredValue(format!(
                "unknown product category `{}`",
                self.product_category
            ))
        })?;
        let kind = EntitlementKind::parse(&self.kind).ok_or_else(|| {
            DbError::InvalidStoredValue(format!("unknown entitlement kind `{}`", self.kind))
        })?;
        let created_via = ProvisionPath::parse(&self.created_via).ok_or_else(|| {
            DbError::InvalidStoredValue(format!("unknown provision path `{}`", self.created_via))
        })?;
        Ok(Entitlement {
            id: EntitlementId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            user_id: UserId::from_uuid(self.user_id),
            product_id: ProductId::from_uuid(self.product_id),
            product_name: self.product_name,
            product_category,
            kind,
            activated_at: self.activated_at,
            expires_at: self.expires_at,
            remaining_uses: self.remaining_uses,
            price_paid_minor: self.price_paid_minor,
            active: self.active,
            source_transaction_id: self.source_transaction_id,
            created_via,
            created_at: self.created_at,
        })
    }
}
