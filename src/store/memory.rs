//! In-memory activation store.
//!
//! Useful for hosts that keep settings somewhere other than a file, and for
//! exercising the gate without touching disk.

use crate::store::record::ActivationRecord;
use crate::store::ActivationStore;
use crate::GateError;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};

/// Activation store holding the settings document in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RefCell<Map<String, Value>>,
    failing_saves: Cell<u32>,
    saves: Cell<u32>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a settings document.
    pub fn with_document(document: Map<String, Value>) -> Self {
        Self {
            document: RefCell::new(document),
            ..Self::default()
        }
    }

    /// Snapshot of the current settings document.
    pub fn document(&self) -> Map<String, Value> {
        self.document.borrow().clone()
    }

    /// Make the next `count` saves fail with `StoreIO`.
    pub fn fail_next_saves(&self, count: u32) {
        self.failing_saves.set(count);
    }

    /// Number of save attempts so far, failed ones included.
    pub fn save_attempts(&self) -> u32 {
        self.saves.get()
    }
}

impl ActivationStore for MemoryStore {
    fn load(&self) -> Result<ActivationRecord, GateError> {
        ActivationRecord::from_document(&self.document.borrow())
    }

    fn save(&self, record: &ActivationRecord) -> Result<(), GateError> {
        self.saves.set(self.saves.get() + 1);

        let failing = self.failing_saves.get();
        if failing > 0 {
            self.failing_saves.set(failing - 1);
            return Err(GateError::StoreIO("simulated write failure".to_string()));
        }

        record.write_into(&mut self.document.borrow_mut());
        Ok(())
    }
}
