//! Request capture store
//!
//! Explicitly owned capture log of a mock backend instance. Constructed at
//! process start, injected into the request handling layer and cleared only
//! through the debug reset operation, so tests can exercise it without any
//! HTTP transport attached.
use crate::types::CapturedRequest;
use std::sync::{Arc, RwLock};

/// Insertion-ordered log of captured requests.
///
/// Appends are serialized against each other and against readers; entries are
/// immutable once appended, so readers only ever take a short snapshot lock.
#[derive(Clone, Default)]
pub struct CaptureStore {
    entries: Arc<RwLock<Vec<CapturedRequest>>>,
}

impl CaptureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record, preserving arrival order
    pub fn append(&self, record: CapturedRequest) {
        self.entries
            .write()
            .expect("capture store lock poisoned")
            .push(record);
    }

    /// Clone of the full ordered log; does not drain
    pub fn snapshot(&self) -> Vec<CapturedRequest> {
        self.entries
            .read()
            .expect("capture store lock poisoned")
            .clone()
    }

    /// Drop all records; idempotent
    pub fn clear(&self) {
        self.entries
            .write()
            .expect("capture store lock poisoned")
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("capture store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
