//! License key wire format.

pub mod codec;
pub mod models;
