//! In-memory adapters for testing and development.
//!
//! - `InMemoryMembershipStore` - Map-backed membership persistence

mod membership_store;

pub use membership_store::InMemoryMembershipStore;
