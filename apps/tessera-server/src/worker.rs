//! Scheduled reconciliation worker.
//!
//! Runs the scanner on a fixed interval over the configured rolling window.
//! The live webhook path and on-demand runs stay independent of it; all
//! paths converge on the same guarded write, so overlap is harmless.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};

use tessera_engine::ReconciliationScanner;

/// Periodic reconciliation worker.
pub struct ReconciliationWorker {
    scanner: Arc<ReconciliationScanner>,
    period: Duration,
    shutdown: Arc<AtomicBool>,
}

impl ReconciliationWorker {
    /// Create a worker scanning every `period`.
    #[must_use]
    pub fn new(scanner: Arc<ReconciliationScanner>, period: Duration) -> Self {
        let shutdown = scanner.shutdown_handle();
        Self {
            scanner,
            period,
            shutdown,
        }
    }

    /// Handle for stopping the worker (and cancelling an in-flight scan).
    #[must_use]
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run until shutdown is requested.
    pub async fn run(&self) {
        info!(period_secs = self.period.as_secs(), "Starting reconciliation worker");
        let mut ticker = interval(self.period);
        // The first tick fires immediately; skip it so startup does not
        // race the migration-fresh pool.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if self.shutdown.load(Ordering::Relaxed) {
                info!("Reconciliation worker stopping");
                break;
            }

            match self.scanner.scan_default_window().await {
                Ok(report) => {
                    info!(
                        examined = report.examined,
                        created = report.created,
                        failed = report.failures.len(),
                        cancelled = report.cancelled,
                        "Scheduled reconciliation finished"
                    );
                }
                Err(e) => {
                    // Listing failed; the next tick retries.
                    error!(error = %e, "Scheduled reconciliation failed");
                }
            }
        }
    }
}
