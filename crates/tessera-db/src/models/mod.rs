//! Row models for the tessera content store.
//!
//! Each model is a `FromRow` struct with static query methods taking a
//! `&PgPool`, plus a conversion into its engine-level entity.

pub mod entitlement;
pub mod product;
pub mod user;

pub use entitlement::{CreateEntitlement, EntitlementRow};
pub use product::ProductRow;
pub use user::{CreateUser, UserRow};
