//! Centralized Error Handling Module
//!
//! Every failure around the engine carries a unique error code so it can be
//! traced in logs and mapped to an HTTP status. The engine itself never fails.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - LEDGER_xxx: failures reported by the fullnode that produced the record
//! - INPUT_xxx: records rejected before analysis
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Ledger Errors (1xx)
    // ============================================
    /// Node has no transaction for the digest
    LedgerNotFound,
    /// Node rejected the digest format
    LedgerInvalidParams,
    /// Any other node or transport failure
    LedgerError,

    // ============================================
    // Input Errors (2xx)
    // ============================================
    /// Digest is not Base58 / wrong length
    InputInvalidDigest,
    /// Sender is not a hex address
    InputInvalidAddress,
    /// Record could not be parsed
    InputMalformed,

    // ============================================
    // API Errors (3xx)
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Unauthorized (invalid API key)
    ApiUnauthorized,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors (4xx)
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Unknown network name
    ConfigUnsupportedNetwork,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // Ledger Errors
            Self::LedgerNotFound => "LEDGER_NOT_FOUND",
            Self::LedgerInvalidParams => "LEDGER_INVALID_PARAMS",
            Self::LedgerError => "LEDGER_ERROR",

            // Input Errors
            Self::InputInvalidDigest => "INPUT_INVALID_DIGEST",
            Self::InputInvalidAddress => "INPUT_INVALID_ADDRESS",
            Self::InputMalformed => "INPUT_MALFORMED",

            // API Errors
            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiUnauthorized => "API_UNAUTHORIZED",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            // Configuration Errors
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigUnsupportedNetwork => "CFG_UNSUPPORTED_NETWORK",

            // Generic
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest
            | Self::InputInvalidDigest
            | Self::InputInvalidAddress
            | Self::InputMalformed
            | Self::LedgerInvalidParams
            | Self::ConfigInvalidValue
            | Self::ConfigUnsupportedNetwork => 400,
            Self::ApiUnauthorized => 401,
            Self::LedgerNotFound => 404,
            Self::ApiRateLimited => 429,
            Self::LedgerError => 502,
            _ => 500,
        }
    }

    /// Check if retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LedgerError | Self::ApiRateLimited)
    }
}

// ============================================
// Ledger failure translation
// ============================================

pub const MSG_LEDGER_NOT_FOUND: &str = "Transaction not found. The digest might be incorrect, or the transaction may be on a different network (like Testnet).";
pub const MSG_LEDGER_INVALID_PARAMS: &str = "The transaction digest format is invalid. Please double-check for typos or missing characters.";
pub const MSG_LEDGER_UNEXPECTED: &str =
    "An unexpected error occurred while fetching the transaction.";

/// JSON-RPC "invalid params" code
const RPC_INVALID_PARAMS: i64 = -32602;

impl AppError {
    /// Translate a fullnode failure into a user-facing error
    pub fn from_ledger_failure(message: &str, rpc_code: Option<i64>) -> Self {
        let lowered = message.to_lowercase();

        if lowered.contains("could not find") {
            Self::new(ErrorCode::LedgerNotFound, MSG_LEDGER_NOT_FOUND)
        } else if rpc_code == Some(RPC_INVALID_PARAMS)
            || lowered.contains("invalidparams")
            || lowered.contains("invalid format")
        {
            Self::new(ErrorCode::LedgerInvalidParams, MSG_LEDGER_INVALID_PARAMS)
        } else if !message.trim().is_empty() {
            Self::new(ErrorCode::LedgerError, message.trim())
        } else {
            Self::new(ErrorCode::LedgerError, MSG_LEDGER_UNEXPECTED)
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Digest failed Base58 / length validation
    pub fn invalid_digest(digest: &str) -> Self {
        Self::new(
            ErrorCode::InputInvalidDigest,
            format!(
                "Invalid digest '{}'. Sui digests are 32-44 characters in Base58.",
                digest
            ),
        )
    }

    /// Sender failed hex address validation
    pub fn invalid_address(address: &str) -> Self {
        Self::new(
            ErrorCode::InputInvalidAddress,
            format!("Invalid address '{}'", address),
        )
    }

    /// Unknown network name
    pub fn unsupported_network(name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigUnsupportedNetwork,
            format!("Unsupported network: {} (expected mainnet, testnet or devnet)", name),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {}", key, value),
        )
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        let message = format!("Malformed transaction record: {}", err);
        Self::with_source(ErrorCode::InputMalformed, message, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::invalid_digest("xyz");
        assert_eq!(err.code, ErrorCode::InputInvalidDigest);
        assert_eq!(err.code_str(), "INPUT_INVALID_DIGEST");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::LedgerError.is_retryable());
        assert!(ErrorCode::ApiRateLimited.is_retryable());
        assert!(!ErrorCode::LedgerNotFound.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ApiBadRequest.http_status(), 400);
        assert_eq!(ErrorCode::LedgerNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::LedgerError.http_status(), 502);
        assert_eq!(ErrorCode::Unknown.http_status(), 500);
    }

    #[test]
    fn test_ledger_failure_translation() {
        let err = AppError::from_ledger_failure("Could not find the referenced transaction [..]", Some(-32000));
        assert_eq!(err.code, ErrorCode::LedgerNotFound);
        assert_eq!(err.message, MSG_LEDGER_NOT_FOUND);

        let err = AppError::from_ledger_failure("anything", Some(-32602));
        assert_eq!(err.code, ErrorCode::LedgerInvalidParams);

        let err = AppError::from_ledger_failure("Deserialize error: invalid format", None);
        assert_eq!(err.code, ErrorCode::LedgerInvalidParams);

        let err = AppError::from_ledger_failure("connection reset", None);
        assert_eq!(err.code, ErrorCode::LedgerError);
        assert_eq!(err.message, "connection reset");

        let err = AppError::from_ledger_failure("  ", None);
        assert_eq!(err.message, MSG_LEDGER_UNEXPECTED);
    }
}
