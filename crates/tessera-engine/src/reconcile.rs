//! Reconciliation scanner.
//!
//! Lists externally-completed transactions over a time window, diffs them
//! against internal entitlements, and fills any gap through the same
//! provisioning pipeline the live webhook uses. Per-item failures are
//! recorded, never fatal; the scan as a whole is idempotent and can be
//! re-run indefinitely.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::LedgerError;
use crate::ledger::{PaymentLedger, TimeWindow};
use crate::model::ProvisionPath;
use crate::provision::Provisioner;

/// Scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Default window size in days for scheduled scans.
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

fn default_window_days() -> i64 {
    7
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

/// A transaction that should have produced an entitlement but did not,
/// with the reason provisioning failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapFailure {
    pub transaction_id: String,
    pub reason: String,
    /// True when a later scan may succeed without external change.
    pub transient: bool,
}

/// Ephemeral result of one reconciliation scan. Logged, not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub window: TimeWindow,
    /// Transactions returned by the ledger listing.
    pub examined: usize,
    /// Transactions skipped as irrelevant to provisioning.
    pub skipped_irrelevant: usize,
    /// Gaps already filled by an earlier delivery or scan.
    pub already_provisioned: usize,
    /// Entitlements created by this scan.
    pub created: usize,
    /// Per-gap failures, isolated so one bad product cannot block the rest.
    pub failures: Vec<GapFailure>,
    /// True when the scan was cancelled before covering the whole window.
    pub cancelled: bool,
}

impl ReconciliationReport {
    fn new(window: TimeWindow) -> Self {
        Self {
            window,
            examined: 0,
            skipped_irrelevant: 0,
            already_provisioned: 0,
            created: 0,
            failures: Vec::new(),
            cancelled: false,
        }
    }

    /// Number of gaps discovered by this scan, filled or not.
    #[must_use]
    pub fn gaps_found(&self) -> usize {
        self.created + self.failures.len()
    }
}

/// Errors that abort a scan entirely.
///
/// Only the ledger listing can do that; everything after it is per-item.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Reconciliation listing failed: {0}")]
    Ledger(#[from] LedgerError),
}

/// Scans the payment ledger for gaps and fills them.
///
/// Safe to run concurrently with live webhook traffic: both paths converge
/// on the store's guarded create, so a race on the same transaction yields
/// one entitlement and one `already_provisioned` count.
pub struct ReconciliationScanner {
    ledger: Arc<dyn PaymentLedger>,
    provisioner: Arc<Provisioner>,
    config: ScanConfig,
    shutdown: Arc<AtomicBool>,
}

impl ReconciliationScanner {
    /// Create a scanner over the given ledger and provisioner.
    #[must_use]
    pub fn new(ledger: Arc<dyn PaymentLedger>, provisioner: Arc<Provisioner>) -> Self {
        Self {
            ledger,
            provisioner,
            config: ScanConfig::default(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(
        ledger: Arc<dyn PaymentLedger>,
        provisioner: Arc<Provisioner>,
        config: ScanConfig,
    ) -> Self {
        Self {
            ledger,
            provisioner,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for cancelling an in-flight scan. Partial progress is safe:
    /// every filled gap is independently idempotent, and the next scan
    /// resumes the remainder.
    #[must_use]
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Scan the default rolling window from config.
    pub async fn scan_default_window(&self) -> Result<ReconciliationReport, ScanError> {
        self.scan(TimeWindow::last_days(self.config.window_days))
            .await
    }

    /// Scan an explicit window: list completed transactions, filter to
    /// provisioning-relevant ones, and run the pipeline for each gap.
    pub async fn scan(&self, window: TimeWindow) -> Result<ReconciliationReport, ScanError> {
        info!(window = %window, "Starting reconciliation scan");

        let transactions = self.ledger.list_completed_transactions(window).await?;
        let mut report = ReconciliationReport::new(window);
        report.examined = transactions.len();

        for transaction in &transactions {
            if self.shutdown.load(Ordering::Relaxed) {
                warn!(
                    window = %window,
                    examined = report.examined,
                    "Reconciliation scan cancelled mid-window"
                );
                report.cancelled = true;
                break;
            }

            if !transaction.is_provisionable() {
                report.skipped_irrelevant += 1;
                continue;
            }

            match self
                .provisioner
                .provision(transaction, ProvisionPath::Reconciliation)
                .await
            {
                Ok(outcome) if outcome.was_created() => {
                    report.created += 1;
                }
                Ok(_) => {
                    report.already_provisioned += 1;
                }
                Err(err) => {
                    // Isolate the failure: one bad product definition must
                    // not block provisioning for other customers.
                    warn!(
                        transaction_id = %transaction.id,
                        error = %err,
                        transient = err.is_transient(),
                        "Reconciliation gap could not be filled"
                    );
                    report.failures.push(GapFailure {
                        transaction_id: transaction.id.clone(),
                        reason: err.to_string(),
                        transient: err.is_transient(),
                    });
                }
            }
        }

        info!(
            window = %window,
            examined = report.examined,
            skipped = report.skipped_irrelevant,
            already_provisioned = report.already_provisioned,
            created = report.created,
            failed = report.failures.len(),
            cancelled = report.cancelled,
            "Reconciliation scan finished"
        );
        Ok(report)
    }
}
