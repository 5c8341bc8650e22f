//! Risk Scoring Module
//!
//! Additive heuristic rules over the normalized facts of one transaction.
//! Each rule is an independent entry in an ordered table: a hit counter, a
//! weight and an evidence message. A rule may hit more than once (one
//! deny-listed package per call), and every hit adds its weight and message.
//!
//! Tiers:
//! - 0-29: Low
//! - 30-69: Medium
//! - 70+: High

use serde::{Deserialize, Serialize};

use crate::core::protocols::ProtocolSet;
use crate::models::config::AnalyzerConfig;
use crate::models::types::{MoveCall, RiskLevel};
use crate::utils::constants::{
    COMPLEXITY_MESSAGE, COMPLEXITY_WEIGHT, DENY_LISTED_MESSAGE, DENY_LISTED_WEIGHT,
    DRAIN_MESSAGE, DRAIN_WEIGHT, HIGH_RISK_SCORE, MEDIUM_RISK_SCORE,
    UNVERIFIED_PROTOCOL_MESSAGE, UNVERIFIED_PROTOCOL_WEIGHT,
};

/// Everything the rules are allowed to look at
#[derive(Debug, Clone, Copy)]
pub struct RiskFacts<'a> {
    pub sent_count: usize,
    pub received_count: usize,
    pub move_calls: &'a [MoveCall],
    pub protocols: &'a ProtocolSet,
    pub config: &'a AnalyzerConfig,
}

/// One heuristic: how many times it fires, and what each firing is worth
#[derive(Clone, Copy)]
pub struct RiskRule {
    pub name: &'static str,
    pub weight: u32,
    pub message: &'static str,
    pub hits: fn(&RiskFacts<'_>) -> usize,
}

impl std::fmt::Debug for RiskRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskRule")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

/// Multiple assets leave, nothing comes back
fn draining_hits(facts: &RiskFacts<'_>) -> usize {
    let fires = facts.sent_count > facts.config.drain_min_outflows && facts.received_count == 0;
    fires as usize
}

fn complexity_hits(facts: &RiskFacts<'_>) -> usize {
    (facts.move_calls.len() > facts.config.complexity_max_calls) as usize
}

/// Contract calls, none of them to a known protocol
fn unverified_protocol_hits(facts: &RiskFacts<'_>) -> usize {
    (facts.protocols.is_empty() && !facts.move_calls.is_empty()) as usize
}

/// One hit per call into a deny-listed package (uncapped)
pub fn deny_listed_hits(facts: &RiskFacts<'_>) -> usize {
    facts
        .move_calls
        .iter()
        .filter(|call| facts.config.is_deny_listed(&call.package))
        .count()
}

/// Built-in rules, in evidence order
pub const DEFAULT_RULES: [RiskRule; 4] = [
    RiskRule {
        name: "outflow_draining",
        weight: DRAIN_WEIGHT,
        message: DRAIN_MESSAGE,
        hits: draining_hits,
    },
    RiskRule {
        name: "high_complexity",
        weight: COMPLEXITY_WEIGHT,
        message: COMPLEXITY_MESSAGE,
        hits: complexity_hits,
    },
    RiskRule {
        name: "unverified_protocol",
        weight: UNVERIFIED_PROTOCOL_WEIGHT,
        message: UNVERIFIED_PROTOCOL_MESSAGE,
        hits: unverified_protocol_hits,
    },
    RiskRule {
        name: "deny_listed_package",
        weight: DENY_LISTED_WEIGHT,
        message: DENY_LISTED_MESSAGE,
        hits: deny_listed_hits,
    },
];

/// Score, tier and the evidence that produced them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub total: u32,
    pub level: RiskLevel,
    pub evidence: Vec<String>,
}

impl RiskScore {
    pub fn tier(score: u32) -> RiskLevel {
        if score >= HIGH_RISK_SCORE {
            RiskLevel::High
        } else if score >= MEDIUM_RISK_SCORE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Evaluates a rule table against facts
#[derive(Debug, Clone)]
pub struct RiskScorer {
    rules: Vec<RiskRule>,
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl RiskScorer {
    /// Append a rule; it runs after the existing ones
    pub fn with_rule(mut self, rule: RiskRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[RiskRule] {
        &self.rules
    }

    pub fn score(&self, facts: &RiskFacts<'_>) -> RiskScore {
        let mut total: u32 = 0;
        let mut evidence = Vec::new();

        for rule in &self.rules {
            let hits = (rule.hits)(facts);
            for _ in 0..hits {
                total = total.saturating_add(rule.weight);
                evidence.push(rule.message.to_string());
            }
        }

        RiskScore {
            total,
            level: RiskScore::tier(total),
            evidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(package: &str) -> MoveCall {
        MoveCall {
            package: package.to_string(),
            module: "m".to_string(),
            function: "f".to_string(),
        }
    }

    fn score(sent: usize, received: usize, calls: &[MoveCall], protocols: &ProtocolSet) -> RiskScore {
        let config = AnalyzerConfig::default();
        let facts = RiskFacts {
            sent_count: sent,
            received_count: received,
            move_calls: calls,
            protocols,
            config: &config,
        };
        RiskScorer::default().score(&facts)
    }

    fn known() -> ProtocolSet {
        let mut set = ProtocolSet::default();
        set.insert("Cetus");
        set
    }

    #[test]
    fn test_quiet_transaction() {
        let s = score(1, 0, &[], &ProtocolSet::default());
        assert_eq!(s.total, 0);
        assert_eq!(s.level, RiskLevel::Low);
        assert!(s.evidence.is_empty());
    }

    #[test]
    fn test_draining_boundary() {
        assert_eq!(score(2, 0, &[], &ProtocolSet::default()).total, 0);
        assert_eq!(score(3, 1, &[], &ProtocolSet::default()).total, 0);

        let s = score(3, 0, &[], &ProtocolSet::default());
        assert_eq!(s.total, 60);
        assert_eq!(s.level, RiskLevel::Medium);
        assert_eq!(s.evidence, vec![DRAIN_MESSAGE.to_string()]);
    }

    #[test]
    fn test_complexity_boundary() {
        let five: Vec<MoveCall> = (0..5).map(|_| call("0x1")).collect();
        let six: Vec<MoveCall> = (0..6).map(|_| call("0x1")).collect();
        assert_eq!(score(0, 0, &five, &known()).total, 0);
        assert_eq!(score(0, 0, &six, &known()).total, 20);
    }

    #[test]
    fn test_unverified_protocol() {
        let calls = vec![call("0x1")];
        assert_eq!(score(0, 0, &calls, &ProtocolSet::default()).total, 10);
        assert_eq!(score(0, 0, &calls, &known()).total, 0);
    }

    #[test]
    fn test_each_deny_listed_call_adds_100() {
        let bad = "0xphishing_package_id_here";
        let mut calls = vec![call("0xdee9")];
        let mut previous = score(0, 0, &calls, &known()).total;
        for n in 1..=3 {
            calls.push(call(bad));
            let s = score(0, 0, &calls, &known());
            assert_eq!(s.total, previous + 100);
            assert_eq!(s.evidence.len(), n);
            previous = s.total;
        }
        assert_eq!(score(0, 0, &calls, &known()).level, RiskLevel::High);
    }

    #[test]
    fn test_rules_are_additive_and_ordered() {
        let mut calls: Vec<MoveCall> = (0..6).map(|_| call("0x1")).collect();
        calls.push(call("0xphishing_package_id_here"));
        let s = score(3, 0, &calls, &ProtocolSet::default());
        assert_eq!(s.total, 60 + 20 + 10 + 100);
        assert_eq!(
            s.evidence,
            vec![
                DRAIN_MESSAGE.to_string(),
                COMPLEXITY_MESSAGE.to_string(),
                UNVERIFIED_PROTOCOL_MESSAGE.to_string(),
                DENY_LISTED_MESSAGE.to_string(),
            ]
        );
    }

    #[test]
    fn test_tiers() {
        assert_eq!(RiskScore::tier(0), RiskLevel::Low);
        assert_eq!(RiskScore::tier(29), RiskLevel::Low);
        assert_eq!(RiskScore::tier(30), RiskLevel::Medium);
        assert_eq!(RiskScore::tier(69), RiskLevel::Medium);
        assert_eq!(RiskScore::tier(70), RiskLevel::High);
    }

    #[test]
    fn test_custom_rule_appends() {
        fn always(_: &RiskFacts<'_>) -> usize {
            1
        }
        let scorer = RiskScorer::default().with_rule(RiskRule {
            name: "always",
            weight: 35,
            message: "always fires",
            hits: always,
        });
        let config = AnalyzerConfig::default();
        let protocols = ProtocolSet::default();
        let facts = RiskFacts {
            sent_count: 0,
            received_count: 0,
            move_calls: &[],
            protocols: &protocols,
            config: &config,
        };
        let s = scorer.score(&facts);
        assert_eq!(s.total, 35);
        assert_eq!(s.level, RiskLevel::Medium);
        assert_eq!(scorer.rules().len(), 5);
    }
}
