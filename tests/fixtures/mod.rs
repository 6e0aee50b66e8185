// Shared test fixtures and utilities for integration tests
//
// This module provides:
// - KairosDB query payload fixtures (payloads.rs)
// - Test helper functions for driving the mock router (helpers.rs)

pub mod helpers;
pub mod payloads;
