//! Gatekeeper Backend Library
//!
//! Exposes the auth, config, and middleware modules for the binary and
//! the integration tests.

pub mod auth;
pub mod config;
pub mod middleware;
