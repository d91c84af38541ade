//! Membership Manager - Recurring-billing membership lifecycle.
//!
//! This crate tracks each client's membership under a service operator
//! through plan configuration, plan delivery, payment method capture, and
//! cancellation, with billing cycles anchored to a monthly billing day.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
