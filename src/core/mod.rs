//! Core Module - Transaction Interpretation Engine
//!
//! Normalizer, protocol attribution, economic classification and risk
//! scoring. Everything in here is synchronous and side-effect free.

pub mod analyzer;
pub mod classifier;
pub mod normalizer;
pub mod protocols;
pub mod risk_score;

pub use analyzer::*;
pub use classifier::*;
pub use normalizer::*;
pub use protocols::*;
pub use risk_score::*;
