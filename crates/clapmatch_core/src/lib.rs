//! Clapmatch core - audio offset detection.
//!
//! This crate contains the full alignment engine with zero UI
//! dependencies. It can be used by the CLI front end or embedded in a
//! timeline editor.

pub mod alignment;
pub mod config;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
