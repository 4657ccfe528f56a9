//! # Gatekey
//!
//! **Offline license keys and startup activation for desktop applications.**
//!
//! Gatekey issues self-contained license keys signed with HMAC-SHA256,
//! verifies them without any network access, runs a time-boxed trial, and
//! provides the startup gate that keeps the application locked until a
//! valid license or trial is active.
//!
//! ## Features
//!
//! - **Tamper-evident keys**: `base64url(json).base64url(hmac)`, checked in constant time
//! - **Strict expiry**: date-only comparison, key valid through its expiry day
//! - **Trial clock**: 7-day window from a write-once installation stamp
//! - **Atomic persistence**: settings written via temp file + rename, unrelated keys kept
//! - **Fail-closed**: a missing stamp or unreadable state never grants access
//!
//! ## Quickstart
//!
//! ```no_run
//! use gatekey::{ActivationGate, FileStore, GateConfig, Notice, PromptResponse, Prompter};
//!
//! struct Console;
//!
//! impl Prompter for Console {
//!     fn prompt(&mut self, reason: Option<&gatekey::LicenseError>) -> PromptResponse {
//!         // Show a dialog here; this sketch just gives up.
//!         let _ = reason;
//!         PromptResponse::Quit
//!     }
//!
//!     fn notify(&mut self, notice: &Notice) {
//!         eprintln!("{}", notice);
//!     }
//! }
//!
//! fn main() -> Result<(), gatekey::GateError> {
//!     let config = GateConfig::new("stockroom", "hard-coded-secret", "stockroom");
//!     let store = FileStore::new(config.store_namespace)?;
//!     let mut gate = ActivationGate::new(config, store)?;
//!
//!     // Exits the process with status 0 if the user quits.
//!     let info = gate.run_or_exit(&mut Console)?;
//!     println!("{}", info);
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! The HMAC secret ships inside the application, so anyone who extracts it
//! can mint keys. Gatekey protects against casual key tampering and
//! trial resets, not against a determined attacker with the binary.
//! Client-side licensing can always be bypassed by binary patching.

#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Wire format
pub mod protocol;

// Crypto layer
pub mod crypto;

// Date-window policies
pub mod policy;

// Persistence
pub mod store;

// Startup gate (main public API)
pub mod gate;

// Offline issuer tooling
pub mod issuer;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::GateConfig;
pub use crypto::pipeline::{issue, verify_key};
pub use errors::{DecodeError, GateError, IssueError, LicenseError};
pub use gate::{
    ActivationGate, GateOutcome, GateState, LicenseInfo, LicenseKind, Notice, PromptResponse,
    Prompter,
};
pub use policy::trial::{trial_status, TrialStatus};
pub use protocol::models::{LicenseKey, LicensePayload, LicenseSource, TRIAL_MARKER};
pub use store::file::FileStore;
pub use store::memory::MemoryStore;
pub use store::record::ActivationRecord;
pub use store::ActivationStore;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
