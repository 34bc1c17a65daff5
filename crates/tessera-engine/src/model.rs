//! Internal entities: users, catalog products, and provisioned entitlements.
//!
//! Products and users are read (and users lazily created) by the
//! provisioning pipeline; entitlements are the pipeline's only output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{EntitlementId, ProductId, TenantId, TenantScoped, UserId};

/// Role assigned to internal user records.
///
/// Users created lazily during provisioning always get [`UserRole::Member`];
/// elevated roles are granted by out-of-scope admin flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    Instructor,
    Admin,
}

impl UserRole {
    /// String form as stored in the content store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Instructor => "instructor",
            UserRole::Admin => "admin",
        }
    }

    /// Parse the stored string form. `None` for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(UserRole::Member),
            "instructor" => Some(UserRole::Instructor),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An internal user record.
///
/// `external_ref` is the identity-provider reference attached to payment
/// transactions; it is unique within a tenant. Display name and email are
/// best-effort and may be empty; incomplete profile data never blocks
/// provisioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub external_ref: String,
    pub display_name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl TenantScoped for User {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Catalog category of a product (pass).
///
/// A closed set: unknown category strings fail at decode time instead of
/// leaking into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductCategory {
    Single,
    Multi,
    MultiPass,
    Unlimited,
}

impl ProductCategory {
    /// True when the category requires a usage budget on the product.
    #[must_use]
    pub fn requires_usage_budget(&self) -> bool {
        matches!(self, ProductCategory::Multi | ProductCategory::MultiPass)
    }

    /// String form as stored in the content store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Single => "single",
            ProductCategory::Multi => "multi",
            ProductCategory::MultiPass => "multi-pass",
            ProductCategory::Unlimited => "unlimited",
        }
    }

    /// Parse the stored string form. `None` for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" => Some(ProductCategory::Single),
            "multi" => Some(ProductCategory::Multi),
            "multi-pass" => Some(ProductCategory::MultiPass),
            "unlimited" => Some(ProductCategory::Unlimited),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog product ("pass"). Read-only to the provisioning engine.
///
/// The validity policy is either a fixed absolute expiry (`valid_until`) or
/// a relative duration from activation (`valid_for_days`). Products with
/// neither, or with a fixed expiry already in the past, are configuration
/// errors and are rejected before any write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub tenant_id: TenantId,
    pub name: String,
    pub category: ProductCategory,
    pub price_minor: i64,
    pub usage_budget: Option<i32>,
    pub valid_until: Option<DateTime<Utc>>,
    pub valid_for_days: Option<i64>,
    pub active: bool,
}

impl TenantScoped for Product {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Internal entitlement kind, mapped from the product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntitlementKind {
    Single,
    MultiPass,
    ClipCard,
    Monthly,
}

impl EntitlementKind {
    /// String form as stored in the content store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementKind::Single => "single",
            EntitlementKind::MultiPass => "multi-pass",
            EntitlementKind::ClipCard => "clip-card",
            EntitlementKind::Monthly => "monthly",
        }
    }

    /// Parse the stored string form. `None` for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" => Some(EntitlementKind::Single),
            "multi-pass" => Some(EntitlementKind::MultiPass),
            "clip-card" => Some(EntitlementKind::ClipCard),
            "monthly" => Some(EntitlementKind::Monthly),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntitlementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Code path that created an entitlement, recorded as provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionPath {
    LiveWebhook,
    Reconciliation,
}

impl ProvisionPath {
    /// String form as stored in the content store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionPath::LiveWebhook => "live-webhook",
            ProvisionPath::Reconciliation => "reconciliation",
        }
    }

    /// Parse the stored string form. `None` for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "live-webhook" => Some(ProvisionPath::LiveWebhook),
            "reconciliation" => Some(ProvisionPath::Reconciliation),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProvisionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provisioned entitlement ("subscription").
///
/// Invariant: at most one entitlement exists per distinct
/// `source_transaction_id`. Created exactly once by the provisioning writer;
/// usage consumption and expiry mutate it through out-of-scope flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: EntitlementId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Denormalized product name at provisioning time.
    pub product_name: String,
    /// Denormalized product category at provisioning time.
    pub product_category: ProductCategory,
    pub kind: EntitlementKind,
    pub activated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Remaining usage counter. `None` means unlimited.
    pub remaining_uses: Option<i32>,
    pub price_paid_minor: i64,
    pub active: bool,
    /// Provenance: the external transaction that paid for this entitlement.
    pub source_transaction_id: String,
    /// Provenance: which code path created the record.
    pub created_via: ProvisionPath,
    pub created_at: DateTime<Utc>,
}

impl TenantScoped for Entitlement {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}
