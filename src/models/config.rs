//! Configuration module for txlens
//!
//! Uses constants from utils/constants.rs; environment variables only
//! override them. Nothing here is mutated after startup.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::core::protocols::ProtocolRegistry;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    get_explorer_url, get_fullnode_url, COMPLEXITY_MAX_CALLS, DENY_LISTED_PACKAGES,
    DRAIN_MIN_OUTFLOWS, DUST_THRESHOLD, NATIVE_NOISE_THRESHOLD, NETWORK_DEVNET, NETWORK_MAINNET,
    NETWORK_TESTNET,
};

/// Read and parse an environment variable; bad values are logged and ignored
fn env_override<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("⚠️ {}", AppError::invalid_config(key, &raw));
            None
        }
    }
}

/// Comma-separated list from an environment variable
fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// ============================================
// Analyzer configuration
// ============================================

/// Tunable parameters and read-only tables of the interpretation engine
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Movements with |amount| <= this are dust (base units)
    pub dust_threshold: i128,
    /// Native outflows strictly inside ±this after fee correction are noise
    pub native_noise_threshold: i128,
    /// Draining fires when sent count exceeds this with nothing received
    pub drain_min_outflows: usize,
    /// Complexity fires when move-call count exceeds this
    pub complexity_max_calls: usize,
    /// Known protocol directory
    pub registry: ProtocolRegistry,
    /// Package ids of known malicious deployments
    pub deny_list: HashSet<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            dust_threshold: DUST_THRESHOLD,
            native_noise_threshold: NATIVE_NOISE_THRESHOLD,
            drain_min_outflows: DRAIN_MIN_OUTFLOWS,
            complexity_max_calls: COMPLEXITY_MAX_CALLS,
            registry: ProtocolRegistry::default(),
            deny_list: DENY_LISTED_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl AnalyzerConfig {
    /// Defaults plus `TXLENS_*` environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_override("TXLENS_DUST_THRESHOLD") {
            config.dust_threshold = v;
        }
        if let Some(v) = env_override("TXLENS_NATIVE_NOISE_THRESHOLD") {
            config.native_noise_threshold = v;
        }
        if let Some(v) = env_override("TXLENS_DRAIN_MIN_OUTFLOWS") {
            config.drain_min_outflows = v;
        }
        if let Some(v) = env_override("TXLENS_COMPLEXITY_MAX_CALLS") {
            config.complexity_max_calls = v;
        }

        let extra = env_list("TXLENS_DENY_LIST");
        if !extra.is_empty() {
            info!("🚫 {} extra deny-listed package(s) configured", extra.len());
            config.deny_list.extend(extra);
        }

        config.with_protocol_entries(
            &env_list("TXLENS_PROTOCOL_PREFIXES"),
            &env_list("TXLENS_PROTOCOL_KEYWORDS"),
        )
    }

    /// Extend the registry with `match=Name` entries; malformed ones are logged and skipped
    pub fn with_protocol_entries(mut self, prefixes: &[String], keywords: &[String]) -> Self {
        let mut registry = std::mem::take(&mut self.registry);
        for (prefix, name) in prefixes.iter().filter_map(|e| protocol_entry("TXLENS_PROTOCOL_PREFIXES", e)) {
            registry = registry.with_prefix(prefix, name);
        }
        for (keyword, name) in keywords.iter().filter_map(|e| protocol_entry("TXLENS_PROTOCOL_KEYWORDS", e)) {
            registry = registry.with_keyword(keyword, name);
        }
        self.registry = registry;
        self
    }

    /// Check if a package id is deny-listed
    #[inline]
    pub fn is_deny_listed(&self, package: &str) -> bool {
        self.deny_list.contains(package)
    }
}

fn protocol_entry<'a>(key: &str, entry: &'a str) -> Option<(&'a str, &'a str)> {
    match entry.split_once('=') {
        Some((pattern, name)) if !pattern.trim().is_empty() && !name.trim().is_empty() => {
            Some((pattern.trim(), name.trim()))
        }
        _ => {
            warn!("⚠️ {}", AppError::invalid_config(key, entry));
            None
        }
    }
}

// ============================================
// Networks
// ============================================

/// Supported Sui networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Devnet,
}

impl Network {
    /// Get network from its name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            NETWORK_MAINNET => Some(Self::Mainnet),
            NETWORK_TESTNET => Some(Self::Testnet),
            NETWORK_DEVNET => Some(Self::Devnet),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => NETWORK_MAINNET,
            Self::Testnet => NETWORK_TESTNET,
            Self::Devnet => NETWORK_DEVNET,
        }
    }

    /// Fullnode JSON-RPC endpoint (delegates to constants)
    pub fn fullnode_url(&self) -> &'static str {
        get_fullnode_url(self.name()).unwrap_or("https://fullnode.mainnet.sui.io:443")
    }

    /// Explorer link for a transaction digest
    pub fn explorer_tx_url(&self, digest: &str) -> String {
        format!("{}/tx/{}", get_explorer_url(self.name()), digest)
    }
}

impl FromStr for Network {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Self::from_name(s).ok_or_else(|| AppError::unsupported_network(s))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `TXLENS_NETWORK`, falling back to mainnet
pub fn network_from_env() -> Network {
    env_override::<Network>("TXLENS_NETWORK").unwrap_or_default()
}

// ============================================
// API server configuration
// ============================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Network the submitted records are expected to come from
    pub network: Network,
    /// In-flight request cap
    pub max_concurrent_requests: usize,
    /// Accepted API keys; empty means the API is open
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            network: Network::Mainnet,
            max_concurrent_requests: 256,
            api_keys: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Railway-style `PORT` wins over `TXLENS_PORT`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("TXLENS_HOST").unwrap_or(defaults.host),
            port: env_override("PORT")
                .or_else(|| env_override("TXLENS_PORT"))
                .unwrap_or(defaults.port),
            network: network_from_env(),
            max_concurrent_requests: env_override("TXLENS_MAX_CONCURRENT")
                .unwrap_or(defaults.max_concurrent_requests),
            api_keys: env_list("TXLENS_API_KEYS"),
        }
    }
}
