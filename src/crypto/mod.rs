//! Cryptographic primitives for signing and verifying license keys.

pub mod digest;
pub mod pipeline;
pub mod signing;
