//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::models::errors::AppError;
use crate::models::types::{ParsedResult, RawTransaction};
use crate::utils::constants::NO_RISK_MESSAGE;
use crate::utils::telemetry::TelemetryStats;

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            code: "UNAUTHORIZED".to_string(),
            message: "Invalid or missing API key".to_string(),
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: err.code.is_retryable().then(|| "retryable".to_string()),
        }
    }
}

// ============================================
// Analysis
// ============================================

/// Analyze a transaction already fetched by the caller
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub transaction: RawTransaction,
    #[serde(default)]
    pub sender_name: Option<String>,
}

/// Analyze a saved `sui_getTransactionBlock` response (result or error)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest {
    pub response: serde_json::Value,
    #[serde(default)]
    pub sender_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    #[serde(flatten)]
    pub result: ParsedResult,
    /// Evidence for display; the default message when nothing fired
    pub display_insights: Vec<String>,
    pub explorer_url: String,
}

impl AnalysisData {
    pub fn new(result: ParsedResult, explorer_url: String) -> Self {
        let display_insights = if result.security_insights.is_empty() {
            vec![NO_RISK_MESSAGE.to_string()]
        } else {
            result.security_insights.clone()
        };
        Self {
            result,
            display_insights,
            explorer_url,
        }
    }
}

// ============================================
// Batch Analysis
// ============================================

#[derive(Debug, Deserialize)]
pub struct BatchAnalysisRequest {
    pub transactions: Vec<AnalyzeRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnalysisData {
    pub total_requested: usize,
    pub total_processed: usize,
    pub total_low: usize,
    pub total_medium: usize,
    pub total_high: usize,
    pub results: Vec<BatchItemResult>,
    pub processing_time_ms: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub digest: String,
    pub status: String, // "success" | "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

// ============================================
// Stats / Telemetry
// ============================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    #[serde(flatten)]
    pub stats: TelemetryStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub network: String,
    /// JSON-RPC endpoint records are expected to come from
    pub fullnode_url: String,
    pub uptime_seconds: u64,
}
