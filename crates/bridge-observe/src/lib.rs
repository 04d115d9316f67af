//! Observability setup for the CribOps bridge.

pub mod tracing_setup;
