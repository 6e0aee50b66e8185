//! kairos-mock - stand-in KairosDB backends for metrics-proxy routing tests
//!
//! A mock backend impersonates the minimal KairosDB query API, records every
//! inbound request byte-for-byte and answers with deterministic fixtures that
//! embed the serving instance's identity. The fleet module brings up several
//! such backends as separate processes and blocks until each one is healthy.
pub mod api;
pub mod capture;
pub mod config;
pub mod fleet;
pub mod types;
