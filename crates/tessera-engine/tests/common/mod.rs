//! Shared in-memory test doubles for the content store and payment ledger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tessera_core::{EntitlementId, ProductId, TenantId, UserId};
use tessera_engine::{
    ContentStore, Entitlement, ExternalTransaction, InsertOutcome, LedgerError, NewEntitlement,
    NewUser, PaymentLedger, PaymentStatus, Product, ProductCategory, StoreError, TimeWindow,
    TransactionKind, TransactionMetadata, User,
};

/// In-memory content store. The entitlements lock is held across the
/// duplicate check and the insert, mirroring the database's uniqueness
/// constraint on source transaction id.
#[derive(Default)]
pub struct MemoryStore {
    pub users: Mutex<Vec<User>>,
    pub products: Mutex<Vec<Product>>,
    pub entitlements: Mutex<Vec<Entitlement>>,
    /// When set, entitlement writes fail with a store error.
    pub fail_entitlement_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(self, product: Product) -> Self {
        self.products.lock().unwrap().push(product);
        self
    }

    pub fn entitlement_count(&self) -> usize {
        self.entitlements.lock().unwrap().len()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find_user_by_external_ref(
        &self,
        tenant_id: TenantId,
        external_ref: &str,
    ) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.tenant_id == tenant_id && u.external_ref == external_ref)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let created = User {
            id: UserId::new(),
            tenant_id: user.tenant_id,
            external_ref: user.external_ref,
            display_name: user.display_name,
            email: user.email,
            role: user.role,
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.lock().unwrap();
        Ok(products.iter().find(|p| p.id == product_id).cloned())
    }

    async fn find_entitlement_by_source(
        &self,
        source_transaction_id: &str,
    ) -> Result<Option<Entitlement>, StoreError> {
        let entitlements = self.entitlements.lock().unwrap();
        Ok(entitlements
            .iter()
            .find(|e| e.source_transaction_id == source_transaction_id)
            .cloned())
    }

    async fn create_entitlement(
        &self,
        entitlement: NewEntitlement,
    ) -> Result<InsertOutcome, StoreError> {
        if self.fail_entitlement_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }

        let mut entitlements = self.entitlements.lock().unwrap();
        if entitlements
            .iter()
            .any(|e| e.source_transaction_id == entitlement.source_transaction_id)
        {
            return Ok(InsertOutcome::DuplicateSource);
        }

        let created = Entitlement {
            id: EntitlementId::new(),
            tenant_id: entitlement.tenant_id,
            user_id: entitlement.user_id,
            product_id: entitlement.product_id,
            product_name: entitlement.product_name,
            product_category: entitlement.product_category,
            kind: entitlement.kind,
            activated_at: entitlement.activated_at,
            expires_at: entitlement.expires_at,
            remaining_uses: entitlement.remaining_uses,
            price_paid_minor: entitlement.price_paid_minor,
            active: true,
            source_transaction_id: entitlement.source_transaction_id,
            created_via: entitlement.created_via,
            created_at: Utc::now(),
        };
        entitlements.push(created.clone());
        Ok(InsertOutcome::Inserted(created))
    }
}

/// In-memory payment ledger backed by a fixed transaction list.
#[derive(Default)]
pub struct MemoryLedger {
    pub transactions: Vec<ExternalTransaction>,
}

impl MemoryLedger {
    pub fn new(transactions: Vec<ExternalTransaction>) -> Self {
        Self { transactions }
    }
}

#[async_trait]
impl PaymentLedger for MemoryLedger {
    async fn list_completed_transactions(
        &self,
        window: TimeWindow,
    ) -> Result<Vec<ExternalTransaction>, LedgerError> {
        Ok(self
            .transactions
            .iter()
            .filter(|tx| tx.status == PaymentStatus::Completed && window.contains(tx.completed_at))
            .cloned()
            .collect())
    }

    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<ExternalTransaction>, LedgerError> {
        Ok(self
            .transactions
            .iter()
            .find(|tx| tx.id == transaction_id)
            .cloned())
    }
}

/// A completed pass-purchase transaction with full metadata.
pub fn pass_purchase(
    id: &str,
    tenant_id: TenantId,
    product_id: ProductId,
    user_ref: &str,
    completed_at: DateTime<Utc>,
) -> ExternalTransaction {
    ExternalTransaction {
        id: id.to_string(),
        amount_minor: 14900,
        currency: "EUR".to_string(),
        status: PaymentStatus::Completed,
        completed_at,
        metadata: TransactionMetadata {
            product_id: Some(product_id),
            user_ref: Some(user_ref.to_string()),
            tenant_id: Some(tenant_id),
            kind: Some(TransactionKind::PassPurchase),
            display_name: Some("Test Member".to_string()),
            email: Some("member@example.com".to_string()),
        },
    }
}

/// An active product with a relative validity policy.
pub fn relative_product(
    tenant_id: TenantId,
    category: ProductCategory,
    usage_budget: Option<i32>,
    valid_for_days: i64,
) -> Product {
    Product {
        id: ProductId::new(),
        tenant_id,
        name: "Clip card 10".to_string(),
        category,
        price_minor: 14900,
        usage_budget,
        valid_until: None,
        valid_for_days: Some(valid_for_days),
        active: true,
    }
}

pub fn jan_first_2025() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}
