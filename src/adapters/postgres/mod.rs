//! PostgreSQL adapters - Database implementations for store ports.
//!
//! - `PostgresMembershipStore` - Membership aggregate persistence

mod membership_store;

pub use membership_store::PostgresMembershipStore;
