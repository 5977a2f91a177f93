//! Diagnostics for the CQF resolution engine
//!
//! This crate provides the shared error code table used by the model, terminology,
//! retrieve and library crates, together with warning diagnostics for degraded
//! (best-effort) results and the mapping from error codes to the status classes a
//! REST boundary reports.

mod diagnostic;
mod error_code;

pub use diagnostic::*;
pub use error_code::*;
