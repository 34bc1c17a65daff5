//! PostgreSQL content store for tessera.
//!
//! Row models live in [`models`] as `FromRow` structs with static query
//! methods; [`store::PgContentStore`] adapts them to the engine's
//! [`tessera_engine::ContentStore`] seam. The `entitlements` table carries a
//! unique index on `source_transaction_id`, the final authority for the
//! at-most-one-entitlement-per-payment invariant.

pub mod error;
pub mod migrations;
pub mod models;
pub mod store;

pub use error::DbError;
pub use migrations::run_migrations;
pub use store::PgContentStore;
