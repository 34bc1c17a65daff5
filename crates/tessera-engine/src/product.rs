//! Product resolution and validation.
//!
//! Every provisioning attempt validates the purchased product *before* any
//! write. The most common catalog defect, a fixed expiry date that has
//! already passed (which would silently produce an immediately-expired
//! entitlement), is a hard configuration error here.

use chrono::{DateTime, Utc};
use tessera_core::{belongs_to, ProductId, TenantId};

use crate::error::ProvisionError;
use crate::model::{Product, ProductCategory};
use crate::policy::{ExpiryPolicy, UsageGrant};
use crate::store::ContentStore;

/// A product that passed validation, with its policy and usage grant in
/// canonical form. Only validated products reach the expiry engine and the
/// type mapper.
#[derive(Debug, Clone)]
pub struct ValidatedProduct {
    pub product: Product,
    pub policy: ExpiryPolicy,
    pub grant: UsageGrant,
}

/// Load a product by id, check tenant ownership, and validate it.
///
/// A product that does not exist, or that belongs to a different tenant
/// than the transaction, is `ProductNotFound`. Cross-tenant references
/// must never resolve.
pub async fn resolve_product(
    store: &dyn ContentStore,
    tenant_id: TenantId,
    product_id: ProductId,
    now: DateTime<Utc>,
) -> Result<ValidatedProduct, ProvisionError> {
    let product = store
        .find_product(product_id)
        .await
        .map_err(ProvisionError::Persistence)?
        .ok_or(ProvisionError::ProductNotFound { product_id })?;

    if !belongs_to(&product, tenant_id) {
        return Err(ProvisionError::ProductNotFound { product_id });
    }

    validate_product(product, now)
}

/// Validate a product's configuration against the rules in the catalog
/// contract.
///
/// Rules:
/// - an inactive product cannot be provisioned;
/// - `multi` and `multi-pass` categories require a positive usage budget;
/// - the validity policy must be a fixed *future* expiry instant or a
///   positive relative duration; when both are configured the fixed
///   instant wins.
///
/// # Errors
///
/// `InvalidProduct` naming the offending field; never silently defaulted.
pub fn validate_product(
    product: Product,
    now: DateTime<Utc>,
) -> Result<ValidatedProduct, ProvisionError> {
    let product_id = product.id;
    let invalid = move |field: &'static str, reason: &str| ProvisionError::InvalidProduct {
        product_id,
        field,
        reason: reason.to_string(),
    };

    if !product.active {
        return Err(invalid("active", "product is inactive"));
    }

    let grant = match product.category {
        // A single pass is always exactly one use, whatever the catalog says.
        ProductCategory::Single => UsageGrant::Limited(1),
        ProductCategory::Unlimited => UsageGrant::Unlimited,
        ProductCategory::Multi | ProductCategory::MultiPass => match product.usage_budget {
            Some(budget) if budget > 0 => UsageGrant::Limited(budget),
            Some(_) => return Err(invalid("usage_budget", "must be a positive integer")),
            None => {
                return Err(invalid(
                    "usage_budget",
                    "is required for this product category",
                ))
            }
        },
    };

    let policy = match (product.valid_until, product.valid_for_days) {
        (Some(instant), _) => {
            if instant <= now {
                return Err(invalid("valid_until", "is in the past"));
            }
            ExpiryPolicy::FixedInstant(instant)
        }
        (None, Some(days)) => {
            if days <= 0 {
                return Err(invalid("valid_for_days", "must be a positive duration"));
            }
            ExpiryPolicy::RelativeDays(days)
        }
        (None, None) => return Err(invalid("validity", "no expiry policy configured")),
    };

    Ok(ValidatedProduct {
        product,
        policy,
        grant,
    })
}
