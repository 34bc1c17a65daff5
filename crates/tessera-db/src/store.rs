//! `ContentStore` implementation over PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use tessera_core::{ProductId, TenantId};
use tessera_engine::{
    ContentStore, Entitlement, InsertOutcome, NewEntitlement, NewUser, Product, StoreError, User,
};

use crate::error::DbError;
use crate::models::{CreateEntitlement, CreateUser, EntitlementRow, ProductRow, UserRow};

/// PostgreSQL-backed content store, injected into the engine as
/// `Arc<dyn ContentStore>`.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    /// Create a store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn store_error(err: DbError) -> StoreError {
    if err.is_connection_error() {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::Query(err.to_string())
    }
}

fn sqlx_error(err: sqlx::Error) -> StoreError {
    store_error(DbError::from_sqlx(err))
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn find_user_by_external_ref(
        &self,
        tenant_id: TenantId,
        external_ref: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = UserRow::find_by_external_ref(&self.pool, tenant_id.into_uuid(), external_ref)
            .await
            .map_err(sqlx_error)?;
        row.map(|r| r.into_domain().map_err(store_error)).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = UserRow::get_or_create(
            &self.pool,
            CreateUser {
                tenant_id: user.tenant_id.into_uuid(),
                external_ref: user.external_ref,
                display_name: user.display_name,
                email: user.email,
                role: user.role.as_str().to_string(),
            },
        )
        .await
        .map_err(sqlx_error)?;
        row.into_domain().map_err(store_error)
    }

    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = ProductRow::find_by_id(&self.pool, product_id.into_uuid())
            .await
            .map_err(sqlx_error)?;
        row.map(|r| r.into_domain().map_err(store_error)).transpose()
    }

    async fn find_entitlement_by_source(
        &self,
        source_transaction_id: &str,
    ) -> Result<Option<Entitlement>, StoreError> {
        let row = EntitlementRow::find_by_source(&self.pool, source_transaction_id)
            .await
            .map_err(sqlx_error)?;
        row.map(|r| r.into_domain().map_err(store_error)).transpose()
    }

    async fn create_entitlement(
        &self,
        entitlement: NewEntitlement,
    ) -> Result<InsertOutcome, StoreError> {
        let row = EntitlementRow::insert_if_absent(
            &self.pool,
            CreateEntitlement {
                tenant_id: entitlement.tenant_id.into_uuid(),
                user_id: entitlement.user_id.into_uuid(),
                product_id: entitlement.product_id.into_uuid(),
                product_name: entitlement.product_name,
                product_category: entitlement.product_category.as_str().to_string(),
                kind: entitlement.kind.as_str().to_string(),
                activated_at: entitlement.activated_at,
                expires_at: entitlement.expires_at,
                remaining_uses: entitlement.remaining_uses,
                price_paid_minor: entitlement.price_paid_minor,
                source_transaction_id: entitlement.source_transaction_id,
                created_via: entitlement.created_via.as_str().to_string(),
            },
        )
        .await
        .map_err(sqlx_error)?;

        match row {
            Some(created) => Ok(InsertOutcome::Inserted(
                created.into_domain().map_err(store_error)?,
            )),
            None => Ok(InsertOutcome::DuplicateSource),
        }
    }
}
