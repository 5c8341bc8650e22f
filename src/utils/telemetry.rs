//! Telemetry Module for txlens
//!
//! Anonymous counters about analyzed transactions: how many, how risky,
//! which protocols they touched, how long interpretation took.
//!
//! Privacy-first: no senders or digests are stored

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::models::types::{ParsedResult, RiskLevel};

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryStats {
    /// Total transactions analyzed
    pub total_analyzed: u64,
    pub low_risk: u64,
    pub medium_risk: u64,
    pub high_risk: u64,
    /// Calls into deny-listed packages
    pub deny_list_hits: u64,
    /// Transactions touching each protocol
    pub protocols: HashMap<String, u64>,
    /// Average interpretation latency (microseconds)
    pub avg_latency_us: f64,
    /// Period start (RFC 3339)
    pub period_start: String,
    /// Period end (RFC 3339)
    pub period_end: String,
}

impl TelemetryStats {
    /// One-line summary for logs and shutdown output
    pub fn summary_line(&self) -> String {
        format!(
            "analyzed={} low={} medium={} high={} deny_list_hits={} avg_latency={:.1}us",
            self.total_analyzed,
            self.low_risk,
            self.medium_risk,
            self.high_risk,
            self.deny_list_hits,
            self.avg_latency_us
        )
    }
}

/// Main telemetry collector
pub struct TelemetryCollector {
    total_analyzed: AtomicU64,
    low_risk: AtomicU64,
    medium_risk: AtomicU64,
    high_risk: AtomicU64,
    deny_list_hits: AtomicU64,
    total_latency_us: AtomicU64,
    protocol_counts: RwLock<HashMap<String, u64>>,
    session_start: String,
    export_dir: PathBuf,
}

impl TelemetryCollector {
    /// Create new collector exporting to ./telemetry
    pub fn new() -> Self {
        Self::with_export_dir(PathBuf::from("./telemetry"))
    }

    pub fn with_export_dir(export_dir: PathBuf) -> Self {
        Self {
            total_analyzed: AtomicU64::new(0),
            low_risk: AtomicU64::new(0),
            medium_risk: AtomicU64::new(0),
            high_risk: AtomicU64::new(0),
            deny_list_hits: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            protocol_counts: RwLock::new(HashMap::new()),
            session_start: Utc::now().to_rfc3339(),
            export_dir,
        }
    }

    /// Record one finished analysis
    pub fn record_analysis(&self, result: &ParsedResult, latency_us: u64) {
        self.total_analyzed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);

        let tier = match result.risk_level {
            RiskLevel::Low => &self.low_risk,
            RiskLevel::Medium => &self.medium_risk,
            RiskLevel::High => &self.high_risk,
        };
        tier.fetch_add(1, Ordering::Relaxed);

        if result.deny_listed_calls > 0 {
            self.deny_list_hits
                .fetch_add(result.deny_listed_calls as u64, Ordering::Relaxed);
        }

        if result.protocols.is_empty() {
            return;
        }
        if let Ok(mut counts) = self.protocol_counts.write() {
            for name in &result.protocols {
                *counts.entry(name.clone()).or_insert(0) += 1;
            }
        }
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let total_analyzed = self.total_analyzed.load(Ordering::Relaxed);
        let total_latency = self.total_latency_us.load(Ordering::Relaxed);

        let avg_latency_us = if total_analyzed > 0 {
            total_latency as f64 / total_analyzed as f64
        } else {
            0.0
        };

        TelemetryStats {
            total_analyzed,
            low_risk: self.low_risk.load(Ordering::Relaxed),
            medium_risk: self.medium_risk.load(Ordering::Relaxed),
            high_risk: self.high_risk.load(Ordering::Relaxed),
            deny_list_hits: self.deny_list_hits.load(Ordering::Relaxed),
            protocols: self
                .protocol_counts
                .read()
                .map(|c| c.clone())
                .unwrap_or_default(),
            avg_latency_us,
            period_start: self.session_start.clone(),
            period_end: Utc::now().to_rfc3339(),
        }
    }

    /// Export current stats to a timestamped JSON file
    pub fn export_stats_json(&self) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(&self.export_dir)?;

        let stats = self.get_stats();
        let filename = format!("stats_{}.json", Utc::now().format("%Y%m%d_%H%M%S"));
        let path = self.export_dir.join(filename);

        let json = serde_json::to_string_pretty(&stats)?;
        fs::write(&path, json)?;

        Ok(path)
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzer::analyze;
    use crate::models::types::RawTransaction;
    use serde_json::json;

    #[test]
    fn test_counters_by_tier() {
        let telemetry = TelemetryCollector::with_export_dir(std::env::temp_dir());
        let quiet = analyze(&RawTransaction::default(), None);

        let risky_raw: RawTransaction = serde_json::from_value(json!({
            "transaction": { "data": { "sender": "0xabc", "transaction": {
                "kind": "ProgrammableTransaction",
                "transactions": [
                    { "MoveCall": { "package": "0xdee9", "module": "clob_v2", "function": "swap" } },
                    { "MoveCall": { "package": "0xphishing_package_id_here", "module": "m", "function": "f" } }
                ]
            }}}
        }))
        .unwrap();
        let risky = analyze(&risky_raw, None);

        telemetry.record_analysis(&quiet, 10);
        telemetry.record_analysis(&risky, 30);

        let stats = telemetry.get_stats();
        assert_eq!(stats.total_analyzed, 2);
        assert_eq!(stats.low_risk, 1);
        assert_eq!(stats.high_risk, 1);
        assert_eq!(stats.deny_list_hits, 1);
        assert_eq!(stats.protocols.get("DeepBook"), Some(&1));
        assert_eq!(stats.protocols.len(), 1);
        assert!((stats.avg_latency_us - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deny_hits_do_not_depend_on_evidence_text() {
        let telemetry = TelemetryCollector::with_export_dir(std::env::temp_dir());
        let raw: RawTransaction = serde_json::from_value(json!({
            "transaction": { "data": { "sender": "0xabc", "transaction": {
                "kind": "ProgrammableTransaction",
                "transactions": [
                    { "MoveCall": { "package": "0xphishing_package_id_here", "module": "m", "function": "f" } },
                    { "MoveCall": { "package": "0xphishing_package_id_here", "module": "m", "function": "g" } }
                ]
            }}}
        }))
        .unwrap();

        let mut result = analyze(&raw, None);
        assert_eq!(result.deny_listed_calls, 2);
        // reworded evidence must not change the count
        result.security_insights = vec!["custom wording".to_string()];
        telemetry.record_analysis(&result, 5);

        assert_eq!(telemetry.get_stats().deny_list_hits, 2);
    }

    #[test]
    fn test_export_json() {
        let dir = std::env::temp_dir().join("txlens_telemetry_test");
        let telemetry = TelemetryCollector::with_export_dir(dir);
        let path = telemetry.export_stats_json().unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"totalAnalyzed\""));
        assert!(written.contains("\"denyListHits\""));
        let _ = std::fs::remove_file(path);
    }
}
