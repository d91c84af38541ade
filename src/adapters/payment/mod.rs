//! Payment gateway adapters.
//!
//! - `MockPaymentGateway` - Configurable in-process gateway with call
//!   tracking and error injection

mod mock_gateway;

pub use mock_gateway::{MethodCall, MockPaymentGateway};
