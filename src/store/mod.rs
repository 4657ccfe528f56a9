//! Durable activation state.
//!
//! The store is the only place the gate performs I/O. Everything else in
//! the verification path is pure.

pub mod file;
pub mod memory;
pub mod record;

use crate::GateError;
use record::ActivationRecord;

/// Persistence boundary for activation state.
pub trait ActivationStore {
    /// Read the current activation record. Missing state is an empty record.
    fn load(&self) -> Result<ActivationRecord, GateError>;

    /// Persist the activation record without disturbing unrelated settings.
    fn save(&self, record: &ActivationRecord) -> Result<(), GateError>;
}

impl<S: ActivationStore + ?Sized> ActivationStore for &S {
    fn load(&self) -> Result<ActivationRecord, GateError> {
        (**self).load()
    }

    fn save(&self, record: &ActivationRecord) -> Result<(), GateError> {
        (**self).save(record)
    }
}
