//! The provisioning pipeline.
//!
//! One entry point, [`Provisioner::provision`], shared by the live webhook
//! path and the reconciliation scanner. The pipeline is: idempotency guard,
//! identity resolution, product resolution/validation, expiry computation,
//! type mapping, guarded write.
//!
//! Correctness under at-least-once delivery rests on two layers: the guard's
//! read-before-write fast path, and the store's create-if-absent keyed by
//! source transaction id. The second is the final arbiter: a write rejected
//! as a duplicate means another caller won the race, and that is a success.

use std::sync::Arc;

use chrono::Utc;
use tessera_core::TenantId;
use tracing::{info, warn};

use crate::error::ProvisionError;
use crate::event::ExternalTransaction;
use crate::model::{Entitlement, ProvisionPath, User, UserRole};
use crate::policy::map_entitlement;
use crate::product::resolve_product;
use crate::store::{ContentStore, InsertOutcome, NewEntitlement, NewUser};

/// Outcome of a provisioning attempt. Both variants are success: the
/// entitlement exists either way.
#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
    /// This attempt created the entitlement.
    Created(Entitlement),
    /// An entitlement for this transaction already existed (earlier
    /// delivery, concurrent attempt, or a previous reconciliation run).
    AlreadyProvisioned(Entitlement),
}

impl ProvisionOutcome {
    /// The entitlement, whichever path produced it.
    #[must_use]
    pub fn entitlement(&self) -> &Entitlement {
        match self {
            ProvisionOutcome::Created(e) | ProvisionOutcome::AlreadyProvisioned(e) => e,
        }
    }

    /// True when this attempt performed the create.
    #[must_use]
    pub fn was_created(&self) -> bool {
        matches!(self, ProvisionOutcome::Created(_))
    }
}

/// Provisions entitlements from payment transactions.
///
/// Holds only the injected content store; stateless otherwise, so a single
/// instance is shared between the webhook handlers and the scanner.
#[derive(Clone)]
pub struct Provisioner {
    store: Arc<dyn ContentStore>,
}

impl Provisioner {
    /// Create a provisioner over the given content store.
    #[must_use]
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Provision an entitlement from a completed pass-purchase transaction.
    ///
    /// Idempotent: calling this any number of times, concurrently or not,
    /// yields at most one entitlement for the transaction.
    ///
    /// # Errors
    ///
    /// Permanent: [`ProvisionError::MissingMetadata`],
    /// [`ProvisionError::ProductNotFound`],
    /// [`ProvisionError::InvalidProduct`]. Transient:
    /// [`ProvisionError::Identity`], [`ProvisionError::Persistence`].
    pub async fn provision(
        &self,
        transaction: &ExternalTransaction,
        via: ProvisionPath,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        // Fast path: already provisioned by an earlier delivery or scan.
        if let Some(existing) = self
            .store
            .find_entitlement_by_source(&transaction.id)
            .await
            .map_err(ProvisionError::Persistence)?
        {
            return Ok(ProvisionOutcome::AlreadyProvisioned(existing));
        }

        let tenant_id = self.require_tenant(transaction)?;
        let product_id =
            transaction
                .metadata
                .product_id
                .ok_or_else(|| ProvisionError::MissingMetadata {
                    transaction_id: transaction.id.clone(),
                    field: "product_id",
                })?;

        let user = self.resolve_user(tenant_id, transaction).await?;

        // Validate the product before any write; catalog defects must halt
        // provisioning with the offending field named.
        let validated = resolve_product(self.store.as_ref(), tenant_id, product_id, Utc::now())
            .await?;

        let (kind, remaining_uses) = map_entitlement(&validated);
        let activated_at = transaction.completed_at;
        let expires_at = validated.policy.expiry_at(activated_at);

        let new_entitlement = NewEntitlement {
            tenant_id,
            user_id: user.id,
            product_id: validated.product.id,
            product_name: validated.product.name.clone(),
            product_category: validated.product.category,
            kind,
            activated_at,
            expires_at,
            remaining_uses,
            price_paid_minor: transaction.amount_minor,
            source_transaction_id: transaction.id.clone(),
            created_via: via,
        };

        match self
            .store
            .create_entitlement(new_entitlement)
            .await
            .map_err(ProvisionError::Persistence)?
        {
            InsertOutcome::Inserted(entitlement) => {
                info!(
                    tenant_id = %tenant_id,
                    user_id = %user.id,
                    entitlement_id = %entitlement.id,
                    transaction_id = %transaction.id,
                    kind = %entitlement.kind,
                    via = %via,
                    "Provisioned entitlement"
                );
                Ok(ProvisionOutcome::Created(entitlement))
            }
            InsertOutcome::DuplicateSource => {
                // A concurrent caller won the race between our guard check
                // and our write. Re-read and report success.
                let existing = self
                    .store
                    .find_entitlement_by_source(&transaction.id)
                    .await
                    .map_err(ProvisionError::Persistence)?
                    .ok_or_else(|| {
                        ProvisionError::Persistence(crate::error::StoreError::Query(format!(
                            "duplicate source {} reported but no entitlement found",
                            transaction.id
                        )))
                    })?;
                Ok(ProvisionOutcome::AlreadyProvisioned(existing))
            }
        }
    }

    /// Resolve the internal user for a transaction, creating one lazily.
    ///
    /// Missing display name or email never blocks provisioning; they are
    /// stored empty and can be completed by out-of-scope profile flows.
    async fn resolve_user(
        &self,
        tenant_id: TenantId,
        transaction: &ExternalTransaction,
    ) -> Result<User, ProvisionError> {
        let external_ref =
            transaction
                .metadata
                .user_ref
                .as_deref()
                .ok_or_else(|| ProvisionError::MissingMetadata {
                    transaction_id: transaction.id.clone(),
                    field: "user_ref",
                })?;

        if let Some(user) = self
            .store
            .find_user_by_external_ref(tenant_id, external_ref)
            .await
            .map_err(ProvisionError::Identity)?
        {
            return Ok(user);
        }

        let display_name = transaction
            .metadata
            .display_name
            .clone()
            .unwrap_or_default();
        let email = transaction.metadata.email.clone().unwrap_or_default();
        if display_name.is_empty() || email.is_empty() {
            warn!(
                tenant_id = %tenant_id,
                transaction_id = %transaction.id,
                "Creating user with incomplete profile data"
            );
        }

        let user = self
            .store
            .create_user(NewUser {
                tenant_id,
                external_ref: external_ref.to_string(),
                display_name,
                email,
                role: UserRole::Member,
            })
            .await
            .map_err(ProvisionError::Identity)?;

        info!(
            tenant_id = %tenant_id,
            user_id = %user.id,
            "Created user from transaction metadata"
        );
        Ok(user)
    }

    fn require_tenant(
        &self,
        transaction: &ExternalTransaction,
    ) -> Result<TenantId, ProvisionError> {
        transaction
            .metadata
            .tenant_id
            .ok_or_else(|| ProvisionError::MissingMetadata {
                transaction_id: transaction.id.clone(),
                field: "tenant_id",
            })
    }
}
