//! Infrastructure implementations for the CribOps bridge.
//!
//! Concrete backends for the traits defined in bridge-core: the
//! reqwest-backed platform client, binding-store implementations, and the
//! TOML configuration loader.

pub mod config;
pub mod platform;
pub mod store;
