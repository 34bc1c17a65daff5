//! Payment ledger seam.
//!
//! Read-only access to the provider's transaction records, used by the
//! reconciliation scanner. The engine never writes to the provider.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::event::ExternalTransaction;

/// Half-open time window `[from, to)` over transaction completion times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// Window covering the last `days` days, ending now.
    #[must_use]
    pub fn last_days(days: i64) -> Self {
        let to = Utc::now();
        Self {
            from: to - Duration::days(days),
            to,
        }
    }

    /// True when `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && instant < self.to
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.from.to_rfc3339(),
            self.to.to_rfc3339()
        )
    }
}

/// Read-only listing/lookup of externally-completed payment transactions.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// List all transactions with completed payment status whose completion
    /// time falls inside the window.
    async fn list_completed_transactions(
        &self,
        window: TimeWindow,
    ) -> Result<Vec<ExternalTransaction>, LedgerError>;

    /// Read a single transaction by id.
    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<ExternalTransaction>, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_is_half_open() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 1, 8, 0, 0, 0).unwrap();
        let window = TimeWindow { from, to };

        assert!(window.contains(from));
        assert!(!window.contains(to));
        assert!(window.contains(Utc.with_ymd_and_hms(2025, 1, 4, 12, 0, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn test_last_days_span() {
        let window = TimeWindow::last_days(7);
        assert_eq!(window.to - window.from, Duration::days(7));
    }
}
