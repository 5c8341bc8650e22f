//! Core analyzer module
//! Runs the four interpretation stages over one record:
//! normalize → {attribute protocols, classify economics} → score risk

use lazy_static::lazy_static;
use tracing::debug;

use crate::core::classifier::{adjust_for_fee, bucket, classify};
use crate::core::normalizer::{normalize, NormalizedTransaction};
use crate::core::protocols::ProtocolSet;
use crate::core::risk_score::{deny_listed_hits, RiskFacts, RiskScorer};
use crate::models::config::AnalyzerConfig;
use crate::models::types::{ParsedResult, RawTransaction};
use crate::utils::format::{format_timestamp_ms, truncate_address};

lazy_static! {
    /// Process-wide analyzer built from the compiled-in tables
    static ref DEFAULT_ANALYZER: TransactionAnalyzer = TransactionAnalyzer::default();
}

/// Interpret one transaction with the default tables and thresholds
pub fn analyze(raw: &RawTransaction, sender_name: Option<&str>) -> ParsedResult {
    DEFAULT_ANALYZER.analyze(raw, sender_name)
}

/// Stateless interpreter; holds only read-only configuration, so one instance
/// can serve any number of callers concurrently.
#[derive(Debug, Clone, Default)]
pub struct TransactionAnalyzer {
    config: AnalyzerConfig,
    scorer: RiskScorer,
}

impl TransactionAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            scorer: RiskScorer::default(),
        }
    }

    /// Replace the rule table
    pub fn with_scorer(mut self, scorer: RiskScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn analyze(&self, raw: &RawTransaction, sender_name: Option<&str>) -> ParsedResult {
        // whitespace-only names count as unresolved
        let sender_name = sender_name.filter(|n| !n.trim().is_empty());
        let facts = normalize(raw);

        let protocols = self.config.registry.attribute(&facts.move_calls);

        let adjusted = adjust_for_fee(&facts.sender, facts.fee_base_units, &raw.balance_changes);
        let buckets = bucket(&adjusted, &self.config);
        let action = classify(&buckets);

        let risk_facts = RiskFacts {
            sent_count: buckets.sent.len(),
            received_count: buckets.received.len(),
            move_calls: &facts.move_calls,
            protocols: &protocols,
            config: &self.config,
        };
        let risk = self.scorer.score(&risk_facts);
        let deny_listed_calls = deny_listed_hits(&risk_facts);

        let mut parts = vec![opening_sentence(&facts, sender_name)];
        if let Some(action) = &action {
            parts.push(action.sentence());
        }
        if let Some(sentence) = protocol_sentence(&protocols, facts.move_calls.len()) {
            parts.push(sentence);
        }
        if let Some(sentence) = object_sentence(&facts) {
            parts.push(sentence);
        }
        let summary = parts.join(" ");

        debug!(
            digest = %raw.digest,
            score = risk.total,
            tier = risk.level.as_str(),
            protocols = protocols.len(),
            "Transaction analyzed"
        );

        let NormalizedTransaction {
            status,
            fee_display,
            sender,
            objects,
            move_calls,
            ..
        } = facts;

        ParsedResult {
            digest: raw.digest.clone(),
            status,
            timestamp: raw.timestamp_ms.and_then(format_timestamp_ms),
            gas_used: fee_display,
            sender,
            sender_name: sender_name.map(String::from),
            summary,
            risk_level: risk.level,
            risk_score: risk.total,
            security_insights: risk.evidence,
            protocols: protocols.iter().map(String::from).collect(),
            deny_listed_calls,
            objects,
            move_calls,
            flows: buckets.to_flows(),
        }
    }
}

// ============================================
// Summary fragments
// ============================================

fn opening_sentence(facts: &NormalizedTransaction, sender_name: Option<&str>) -> String {
    let display = sender_name
        .map(String::from)
        .unwrap_or_else(|| truncate_address(&facts.sender));
    format!("{} {} performed a transaction.", display, facts.status.adverb())
}

fn protocol_sentence(protocols: &ProtocolSet, call_count: usize) -> Option<String> {
    if !protocols.is_empty() {
        Some(format!("Interacted with {} protocol(s).", protocols.joined()))
    } else if call_count > 0 {
        Some(format!(
            "Interacted with {} smart contract function(s).",
            call_count
        ))
    } else {
        None
    }
}

fn object_sentence(facts: &NormalizedTransaction) -> Option<String> {
    let created = facts.objects.created.len();
    let mutated = facts.objects.mutated.len();
    if created > 0 || mutated > 0 {
        Some(format!(
            "{} new objects created and {} updated.",
            created, mutated
        ))
    } else {
        None
    }
}
