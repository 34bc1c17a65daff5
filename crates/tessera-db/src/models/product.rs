//! Product (pass) row model. Read-only to the provisioning engine.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tessera_core::{ProductId, TenantId};
use tessera_engine::{Product, ProductCategory};
use uuid::Uuid;

use crate::error::DbError;

/// A product row as stored in PostgreSQL.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub category: String,
    pub price_minor: i64,
    pub usage_budget: Option<i32>,
    pub valid_until: Option<DateTime<Utc>>,
    pub valid_for_days: Option<i64>,
    pub active: bool,
}

impl ProductRow {
    /// Find a product by id.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Convert into the engine-level entity.
    pub fn into_domain(self) -> Result<Product, DbError> {
        let category = ProductCategory::parse(&self.category).ok_or_else(|| {
            DbError::InvalidStoredValue(format!("unknown product category `{}`", self.category))
        })?;
        Ok(Product {
            id: ProductId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            name: self.name,
            category,
            price_minor: self.price_minor,
            usage_budget: self.usage_budget,
            valid_until: self.valid_until,
            valid_for_days: self.valid_for_days,
            active: self.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_domain_parses_category() {
        let row = ProductRow {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Clip card 10".to_string(),
            category: "multi-pass".to_string(),
            price_minor: 14900,
            usage_budget: Some(10),
            valid_until: None,
            valid_for_days: Some(90),
            active: true,
        };
        let product = row.into_domain().unwrap();
        assert_eq!(product.category, ProductCategory::MultiPass);
    }

    #[test]
    fn test_into_domain_rejects_unknown_category() {
        let row = ProductRow {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Mystery".to_string(),
            category: "gift-card".to_string(),
            price_minor: 900,
            usage_budget: None,
            valid_until: None,
            valid_for_days: None,
            active: true,
        };
        assert!(row.into_domain().is_err());
    }
}
