//! Payment provider ledger client.
//!
//! Read-only reqwest client for the provider's transaction API,
//! implementing the engine's [`tessera_engine::PaymentLedger`] seam. Used
//! by the reconciliation scanner; tessera never writes to the provider.

pub mod client;

pub use client::RestLedgerClient;
