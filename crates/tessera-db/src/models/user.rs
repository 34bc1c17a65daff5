//! User row model.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tessera_core::{TenantId, UserId};
use tessera_engine::{User, UserRole};
use uuid::Uuid;

use crate::error::DbError;

/// A user row as stored in PostgreSQL.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub external_ref: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Data required to create a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub tenant_id: Uuid,
    pub external_ref: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
}

impl UserRow {
    /// Find a user by external identity reference within a tenant.
    pub async fn find_by_external_ref(
        pool: &PgPool,
        tenant_id: Uuid,
        external_ref: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM users
            WHERE tenant_id = $1 AND external_ref = $2
            ",
        )
        .bind(tenant_id)
        .bind(external_ref)
        .fetch_optional(pool)
        .await
    }

    /// Insert a new user, or return the existing one on conflict.
    ///
    /// Concurrent provisioning attempts may race on first purchase; the
    /// unique constraint on (tenant_id, external_ref) makes the race
    /// benign.
    pub async fn get_or_create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let maybe = sqlx::query_as::<_, Self>(
            r"
            INSERT INTO users (tenant_id, external_ref, display_name, email, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (tenant_id, external_ref) DO NOTHING
            RETURNING *
            ",
        )
        .bind(data.tenant_id)
        .bind(&data.external_ref)
        .bind(&data.display_name)
        .bind(&data.email)
        .bind(&data.role)
        .fetch_optional(pool)
        .await?;

        if let Some(user) = maybe {
            return Ok(user);
        }

        // Conflict occurred, fetch the existing row
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM users
            WHERE tenant_id = $1 AND external_ref = $2
            ",
        )
        .bind(data.tenant_id)
        .bind(&data.external_ref)
        .fetch_one(pool)
        .await
    }

    /// Convert into the engine-level entity.
    pub fn into_domain(self) -> Result<User, DbError> {
        let role = UserRole::parse(&self.role).ok_or_else(|| {
            DbError::InvalidStoredValue(format!("unknown user role `{}`", self.role))
        })?;
        Ok(User {
            id: UserId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            external_ref: self.external_ref,
            display_name: self.display_name,
            email: self.email,
            role,
            created_at: self.created_at,
        })
    }
}
