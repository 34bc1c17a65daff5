//! Multi-Tenant Traits
//!
//! Every entity tessera reads or writes belongs to exactly one tenant.
//! [`TenantScoped`] marks an entity as tenant-scoped so isolation checks can
//! be written once, generically, instead of per entity.

use crate::ids::TenantId;

/// Trait for entities that belong to a specific tenant.
///
/// Object-safe: usable as `&dyn TenantScoped`.
///
/// # Example
///
/// ```
/// use tessera_core::{TenantId, TenantScoped};
///
/// struct Pass {
///     tenant_id: TenantId,
///     name: String,
/// }
///
/// impl TenantScoped for Pass {
///     fn tenant_id(&self) -> TenantId {
///         self.tenant_id
///     }
/// }
/// ```
pub trait TenantScoped {
    /// Returns the tenant ID associated with this entity.
    fn tenant_id(&self) -> TenantId;
}

/// True when the entity belongs to the expected tenant.
///
/// Cross-tenant references in transaction metadata must never resolve, so
/// callers loading an entity by bare ID check it against the transaction's
/// tenant with this helper.
pub fn belongs_to<T: TenantScoped>(entity: &T, tenant: TenantId) -> bool {
    entity.tenant_id() == tenant
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestEntity {
        tenant_id: TenantId,
    }

    impl TenantScoped for TestEntity {
        fn tenant_id(&self) -> TenantId {
            self.tenant_id
        }
    }

    #[test]
    fn test_belongs_to_same_tenant() {
        let tenant = TenantId::new();
        let entity = TestEntity { tenant_id: tenant };
        assert!(belongs_to(&entity, tenant));
    }

    #[test]
    fn test_belongs_to_other_tenant() {
        let entity = TestEntity {
            tenant_id: TenantId::new(),
        };
        assert!(!belongs_to(&entity, TenantId::new()));
    }

    #[test]
    fn test_trait_is_object_safe() {
        let tenant = TenantId::new();
        let entity = TestEntity { tenant_id: tenant };
        let dyn_entity: &dyn TenantScoped = &entity;
        assert_eq!(dyn_entity.tenant_id(), tenant);
    }
}
