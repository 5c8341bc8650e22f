//! txlens Library
//!
//! Turns a raw Sui transaction record into a readable, risk-annotated
//! explanation:
//! - Normalization of status, fee, sender, object deltas and move calls
//! - Protocol attribution by package prefix and module keyword
//! - Economic classification of fee-adjusted balance changes
//! - Additive heuristic risk scoring with evidence
//!
//! The engine is pure: fetching records and resolving names happen elsewhere.

pub mod api;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::analyzer::{analyze, TransactionAnalyzer};
pub use crate::core::protocols::{ProtocolRegistry, ProtocolSet};
pub use crate::core::risk_score::{RiskRule, RiskScore, RiskScorer};
pub use models::config::{AnalyzerConfig, Network, ServerConfig};
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use models::types::{parse_transaction_json, ParsedResult, RawTransaction, RiskLevel, TxStatus};
pub use utils::telemetry::{TelemetryCollector, TelemetryStats};
