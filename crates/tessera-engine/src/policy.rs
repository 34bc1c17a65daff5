//! Expiry policy engine and entitlement type mapping.
//!
//! Both are pure: no clock reads, no store access. The activation instant
//! always comes from the transaction's completion timestamp so that a
//! reconciliation run hours or days later reproduces the original window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{EntitlementKind, ProductCategory};
use crate::product::ValidatedProduct;

/// A product's validated validity policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryPolicy {
    /// The entitlement expires at this fixed instant, verbatim.
    FixedInstant(DateTime<Utc>),
    /// The entitlement expires this many days after activation.
    RelativeDays(i64),
}

impl ExpiryPolicy {
    /// Compute the expiry instant for an entitlement activated at
    /// `activation`.
    #[must_use]
    pub fn expiry_at(&self, activation: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ExpiryPolicy::FixedInstant(instant) => *instant,
            ExpiryPolicy::RelativeDays(days) => activation + Duration::days(*days),
        }
    }
}

/// A product's validated usage allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageGrant {
    /// A fixed number of uses, always positive.
    Limited(i32),
    /// No usage counter.
    Unlimited,
}

impl UsageGrant {
    /// Initial value of the entitlement's remaining-usage counter.
    #[must_use]
    pub fn initial_remaining(&self) -> Option<i32> {
        match self {
            UsageGrant::Limited(uses) => Some(*uses),
            UsageGrant::Unlimited => None,
        }
    }
}

/// Map a validated product to the entitlement kind and initial
/// remaining-usage value.
///
/// | category   | kind       | initial usage  |
/// |------------|------------|----------------|
/// | single     | single     | 1              |
/// | multi-pass | multi-pass | usage budget   |
/// | multi      | clip-card  | usage budget   |
/// | unlimited  | monthly    | none           |
///
/// Unknown categories cannot reach this function: the category enum is
/// closed and validation rejects unusable configurations first.
#[must_use]
pub fn map_entitlement(product: &ValidatedProduct) -> (EntitlementKind, Option<i32>) {
    let kind = match product.product.category {
        ProductCategory::Single => EntitlementKind::Single,
        ProductCategory::MultiPass => EntitlementKind::MultiPass,
        ProductCategory::Multi => EntitlementKind::ClipCard,
        ProductCategory::Unlimited => EntitlementKind::Monthly,
    };
    (kind, product.grant.initial_remaining())
}
