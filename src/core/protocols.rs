//! Protocol Attributor
//!
//! Two independent detection channels over the same protocol directory:
//! package-id prefixes (ordered, first match wins per call) and lowercase
//! keywords found anywhere in the module name. A call may hit both channels;
//! the result still names each protocol once.

use crate::models::types::MoveCall;
use crate::utils::constants::{PROTOCOL_KEYWORDS, PROTOCOL_PREFIXES};

/// Directory of known protocols
#[derive(Debug, Clone)]
pub struct ProtocolRegistry {
    /// (package prefix, protocol name), in priority order
    prefixes: Vec<(String, String)>,
    /// (lowercase module keyword, protocol name)
    keywords: Vec<(String, String)>,
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self {
            prefixes: PROTOCOL_PREFIXES
                .iter()
                .map(|p| (p.prefix.to_string(), p.name.to_string()))
                .collect(),
            keywords: PROTOCOL_KEYWORDS
                .iter()
                .map(|k| (k.keyword.to_string(), k.name.to_string()))
                .collect(),
        }
    }
}

impl ProtocolRegistry {
    /// Registry with no entries
    pub fn empty() -> Self {
        Self {
            prefixes: Vec::new(),
            keywords: Vec::new(),
        }
    }

    /// Append a package prefix (lowest priority so far)
    pub fn with_prefix(mut self, prefix: impl Into<String>, name: impl Into<String>) -> Self {
        self.prefixes.push((prefix.into(), name.into()));
        self
    }

    /// Append a module keyword; stored lowercase
    pub fn with_keyword(mut self, keyword: impl Into<String>, name: impl Into<String>) -> Self {
        self.keywords
            .push((keyword.into().to_lowercase(), name.into()));
        self
    }

    /// Prefix channel
    pub fn match_package(&self, package: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(prefix, _)| package.starts_with(prefix.as_str()))
            .map(|(_, name)| name.as_str())
    }

    /// Keyword channel: every keyword contained in the module name
    pub fn match_module<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.keywords
            .iter()
            .filter(move |(keyword, _)| module.contains(keyword.as_str()))
            .map(|(_, name)| name.as_str())
    }

    /// Distinct protocols touched by the calls, in first-seen order
    pub fn attribute(&self, calls: &[MoveCall]) -> ProtocolSet {
        let mut found = ProtocolSet::default();
        for call in calls {
            if let Some(name) = self.match_package(&call.package) {
                found.insert(name);
            }
            for name in self.match_module(&call.module) {
                found.insert(name);
            }
        }
        found
    }
}

/// Insertion-ordered set of protocol names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolSet {
    names: Vec<String>,
}

impl ProtocolSet {
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// "A, B, C"
    pub fn joined(&self) -> String {
        self.names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(package: &str, module: &str) -> MoveCall {
        MoveCall {
            package: package.to_string(),
            module: module.to_string(),
            function: "f".to_string(),
        }
    }

    #[test]
    fn test_prefix_match() {
        let registry = ProtocolRegistry::default();
        assert_eq!(registry.match_package("0xdee9"), Some("DeepBook"));
        assert_eq!(registry.match_package("0x1eabed72c53feb3805120a081dc15963c204dc8d091542592abaf7a35689b2fb"), Some("Cetus"));
        assert_eq!(registry.match_package("0x2"), None);
    }

    #[test]
    fn test_first_prefix_wins() {
        let registry = ProtocolRegistry::empty()
            .with_prefix("0xab", "First")
            .with_prefix("0xabc", "Second");
        assert_eq!(registry.match_package("0xabcdef"), Some("First"));
    }

    #[test]
    fn test_keyword_channel_is_independent() {
        let registry = ProtocolRegistry::default();
        // Unknown package, module mentions kriya
        let found = registry.attribute(&[call("0x99", "kriya_spot_dex")]);
        assert_eq!(found.joined(), "Kriya");

        // Prefix and keyword both hit on one call
        let found = registry.attribute(&[call("0xdee9", "scallop_router")]);
        assert_eq!(found.joined(), "DeepBook, Scallop");
    }

    #[test]
    fn test_keywords_are_case_sensitive_lowercase() {
        let registry = ProtocolRegistry::default();
        assert!(registry.attribute(&[call("0x99", "CETUS")]).is_empty());
        assert_eq!(registry.attribute(&[call("0x99", "pool_cetus")]).joined(), "Cetus");
    }

    #[test]
    fn test_duplicates_collapse() {
        let registry = ProtocolRegistry::default();
        let found = registry.attribute(&[
            call("0x1ee0f96aaa", "pool"),
            call("0x714a63bbb", "router"),
            call("0x99", "cetus_clmm"),
        ]);
        assert_eq!(found.len(), 1);
        assert!(found.contains("Cetus"));
    }

    #[test]
    fn test_unrecognized_calls_contribute_nothing() {
        let registry = ProtocolRegistry::default();
        assert!(registry.attribute(&[call("0x2", "coin"), call("0x3", "sui_system")]).is_empty());
        assert!(ProtocolRegistry::empty().attribute(&[call("0xdee9", "cetus")]).is_empty());
    }
}
