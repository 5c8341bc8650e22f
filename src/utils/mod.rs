//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants, display formatting and telemetry used across the crate.

pub mod constants;
pub mod format;
pub mod telemetry;

pub use constants::*;
pub use format::*;
pub use telemetry::*;
