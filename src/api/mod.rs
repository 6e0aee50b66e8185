//! HTTP surface of the mock backend
pub mod debug;
pub mod v1;
