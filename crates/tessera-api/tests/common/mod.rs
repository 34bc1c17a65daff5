//! In-memory collaborators for driving the router in tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tessera_core::{EntitlementId, ProductId, TenantId, UserId};
use tessera_engine::{
    ContentStore, Entitlement, ExternalTransaction, InsertOutcome, LedgerError, NewEntitlement,
    NewUser, PaymentLedger, PaymentStatus, Product, ProductCategory, Provisioner,
    ReconciliationScanner, StoreError, TimeWindow, TransactionKind, TransactionMetadata, User,
    WebhookVerifier,
};

use tessera_api::{api_router, ApiState};

pub const TEST_SECRET: &str = "whsec_api_test";

/// Minimal in-memory content store with the same uniqueness semantics as
/// the real one.
#[derive(Default)]
pub struct TestStore {
    pub users: Mutex<Vec<User>>,
    pub products: Mutex<Vec<Product>>,
    pub entitlements: Mutex<Vec<Entitlement>>,
    pub fail_writes: AtomicBool,
}

impl TestStore {
    pub fn entitlement_count(&self) -> usize {
        self.entitlements.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentStore for TestStore {
    async fn find_user_by_external_ref(
        &self,
        tenant_id: TenantId,
        external_ref: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
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
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == product_id)
            .cloned())
    }

    async fn find_entitlement_by_source(
        &self,
        source_transaction_id: &str,
    ) -> Result<Option<Entitlement>, StoreError> {
        Ok(self
            .entitlements
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.source_transaction_id == source_transaction_id)
            .cloned())
    }

    async fn create_entitlement(
        &self,
        entitlement: NewEntitlement,
    ) -> Result<InsertOutcome, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
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

/// Ledger double backed by a fixed list.
#[derive(Default)]
pub struct TestLedger {
    pub transactions: Vec<ExternalTransaction>,
}

#[async_trait]
impl PaymentLedger for TestLedger {
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

/// Build a router over the given store and ledger with the test secret.
pub fn test_router(store: Arc<TestStore>, ledger: Arc<TestLedger>) -> axum::Router {
    let provisioner = Arc::new(Provisioner::new(store));
    let scanner = Arc::new(ReconciliationScanner::new(ledger, provisioner.clone()));
    let state = ApiState::new(WebhookVerifier::new(TEST_SECRET), provisioner, scanner);
    api_router(state)
}

/// A clip-card product valid for 90 days.
pub fn clip_card_product(tenant_id: TenantId) -> Product {
    Product {
        id: ProductId::new(),
        tenant_id,
        name: "Clip card 10".to_string(),
        category: ProductCategory::Multi,
        price_minor: 14900,
        usage_budget: Some(10),
        valid_until: None,
        valid_for_days: Some(90),
        active: true,
    }
}

/// A completed pass-purchase transaction.
pub fn pass_purchase(
    id: &str,
    tenant_id: TenantId,
    product_id: ProductId,
) -> ExternalTransaction {
    ExternalTransaction {
        id: id.to_string(),
        amount_minor: 14900,
        currency: "EUR".to_string(),
        status: PaymentStatus::Completed,
        completed_at: Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap(),
        metadata: TransactionMetadata {
            product_id: Some(product_id),
            user_ref: Some("ext-user-1".to_string()),
            tenant_id: Some(tenant_id),
            kind: Some(TransactionKind::PassPurchase),
            display_name: Some("Test Member".to_string()),
            email: Some("member@example.com".to_string()),
        },
    }
}
