//! Constants Module - Single Source of Truth
//!
//! Every threshold, weight, coin identifier and protocol table used by the
//! interpretation engine is defined here. Other modules read these through
//! `AnalyzerConfig` so they can be tuned without touching the rules.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// COIN CONSTANTS
// ============================================

/// Native coin type as reported in balance changes
pub const NATIVE_COIN_TYPE: &str = "0x2::sui::SUI";

/// Zero-padded form of the native coin type (some nodes report this one)
pub const NATIVE_COIN_TYPE_LONG: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI";

/// Decimal places of base units (1 SUI = 10^9 MIST)
pub const BASE_UNIT_DECIMALS: u32 = 9;

/// Namespace delimiter inside coin-type identifiers
pub const COIN_TYPE_DELIMITER: &str = "::";

/// Sentinel for a successful execution status
pub const STATUS_SUCCESS: &str = "success";

/// Transaction kind that carries a command list
pub const PROGRAMMABLE_KIND: &str = "ProgrammableTransaction";

/// Placeholder when the sender is absent
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Characters of the sender shown before the ellipsis
pub const SENDER_PREFIX_CHARS: usize = 6;

// ============================================
// CLASSIFIER THRESHOLDS (tunable, see AnalyzerConfig)
// ============================================

/// Movements at or below this magnitude (base units) are dust
pub const DUST_THRESHOLD: i128 = 1_000;

/// Native-coin outflows strictly inside ±this (after fee correction) are noise
pub const NATIVE_NOISE_THRESHOLD: i128 = 10_000;

// ============================================
// RISK RULE PARAMETERS (tunable, see AnalyzerConfig)
// ============================================

/// Draining fires when more than this many assets leave with nothing received
pub const DRAIN_MIN_OUTFLOWS: usize = 2;

/// Complexity fires when more than this many move calls are present
pub const COMPLEXITY_MAX_CALLS: usize = 5;

pub const DRAIN_WEIGHT: u32 = 60;
pub const COMPLEXITY_WEIGHT: u32 = 20;
pub const UNVERIFIED_PROTOCOL_WEIGHT: u32 = 10;
pub const DENY_LISTED_WEIGHT: u32 = 100;

/// Score at or above which a transaction is high risk
pub const HIGH_RISK_SCORE: u32 = 70;

/// Score at or above which a transaction is medium risk
pub const MEDIUM_RISK_SCORE: u32 = 30;

pub const DRAIN_MESSAGE: &str =
    "Unusual asset outflow: Multiple assets being sent without matching receipts.";
pub const COMPLEXITY_MESSAGE: &str =
    "High complexity: Programmable transaction with many sequential commands.";
pub const UNVERIFIED_PROTOCOL_MESSAGE: &str =
    "Non-standard protocol: Interacting with smart contracts not in the verified directory.";
pub const DENY_LISTED_MESSAGE: &str =
    "CRITICAL: Interaction with a known malicious package/address.";

/// Shown by presentation layers when the evidence list is empty
pub const NO_RISK_MESSAGE: &str = "No significant security risks detected.";

// ============================================
// PROTOCOL DIRECTORY
// ============================================

/// Known protocol package prefix
#[derive(Debug, Clone, Copy)]
pub struct ProtocolPrefix {
    pub prefix: &'static str,
    pub name: &'static str,
}

/// Known protocol keyword inside module names (lowercase)
#[derive(Debug, Clone, Copy)]
pub struct ProtocolKeyword {
    pub keyword: &'static str,
    pub name: &'static str,
}

/// Package-id prefixes, checked in order (first match wins)
pub const PROTOCOL_PREFIXES: [ProtocolPrefix; 9] = [
    ProtocolPrefix { prefix: "0x1ee0f96", name: "Cetus" },
    ProtocolPrefix { prefix: "0x714a63", name: "Cetus" },
    ProtocolPrefix { prefix: "0x1eabed7", name: "Cetus" },
    ProtocolPrefix { prefix: "0xbc3afb2", name: "Scallop" },
    ProtocolPrefix { prefix: "0xbb45dcd", name: "Scallop" },
    ProtocolPrefix { prefix: "0xdee9", name: "DeepBook" },
    ProtocolPrefix { prefix: "0x2c26c6", name: "Aftermath" },
    ProtocolPrefix { prefix: "0x5ad425", name: "BlueMove" },
    ProtocolPrefix { prefix: "0x3c2e68", name: "Turbos" },
];

/// Module-name keywords, all checked for every call
pub const PROTOCOL_KEYWORDS: [ProtocolKeyword; 3] = [
    ProtocolKeyword { keyword: "cetus", name: "Cetus" },
    ProtocolKeyword { keyword: "scallop", name: "Scallop" },
    ProtocolKeyword { keyword: "kriya", name: "Kriya" },
];

/// Package ids of known malicious deployments
pub const DENY_LISTED_PACKAGES: [&str; 1] = ["0xphishing_package_id_here"];

// ============================================
// NETWORKS
// ============================================

pub const NETWORK_MAINNET: &str = "mainnet";
pub const NETWORK_TESTNET: &str = "testnet";
pub const NETWORK_DEVNET: &str = "devnet";

/// Get fullnode RPC URL for a network name
pub fn get_fullnode_url(network: &str) -> Option<&'static str> {
    match network {
        NETWORK_MAINNET => Some("https://fullnode.mainnet.sui.io:443"),
        NETWORK_TESTNET => Some("https://fullnode.testnet.sui.io:443"),
        NETWORK_DEVNET => Some("https://fullnode.devnet.sui.io:443"),
        _ => None,
    }
}

/// Get explorer base URL for a network name
pub fn get_explorer_url(network: &str) -> &'static str {
    match network {
        NETWORK_TESTNET => "https://suiscan.xyz/testnet",
        NETWORK_DEVNET => "https://suiscan.xyz/devnet",
        _ => "https://suiscan.xyz/mainnet",
    }
}

// ============================================
// INPUT VALIDATION
// ============================================

/// Base58 alphabet used by transaction digests
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Check digest format (Base58, 32-44 characters)
pub fn is_valid_digest(digest: &str) -> bool {
    (32..=44).contains(&digest.len()) && digest.chars().all(|c| BASE58_ALPHABET.contains(c))
}

/// Check address / package id format (0x-prefixed hex, at most 32 bytes)
pub fn is_valid_address(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    if body.is_empty() || body.len() > 64 {
        return false;
    }
    // Short ids like 0x2 are legal; left-pad to whole bytes before decoding
    let padded = if body.len() % 2 == 1 {
        format!("0{}", body)
    } else {
        body.to_string()
    };
    hex::decode(padded).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_validation() {
        assert!(is_valid_digest("5Wc8Qh8kPz1x5pS9d2YxHq2bFvLRcJ3f8Cq6wWkz7u4N"));
        assert!(!is_valid_digest("short"));
        // 0, O, I and l are not Base58
        assert!(!is_valid_digest("0Wc8Qh8kPz1x5pS9d2YxHq2bFvLRcJ3f8Cq6wWkz7u4N"));
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address("0x2"));
        assert!(is_valid_address("0xdee9"));
        assert!(is_valid_address(
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        ));
        assert!(!is_valid_address("dee9"));
        assert!(!is_valid_address("0x"));
        assert!(!is_valid_address("0xphishing"));
    }

    #[test]
    fn test_network_urls() {
        assert!(get_fullnode_url(NETWORK_MAINNET).is_some());
        assert!(get_fullnode_url("localnet").is_none());
        assert_eq!(get_explorer_url("unknown"), "https://suiscan.xyz/mainnet");
    }
}
