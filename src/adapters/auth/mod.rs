//! Authentication adapters.
//!
//! - `TrustedAuthProvider` - Pass-through resolution for deployments
//!   where auth terminates upstream

mod trusted;

pub use trusted::TrustedAuthProvider;
