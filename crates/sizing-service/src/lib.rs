//! Sizing service library
//!
//! Router, configuration and health tracking of the `okdcalc-service`
//! binary, exposed so integration tests can drive the router directly.

pub mod api;
pub mod config;
pub mod health;
