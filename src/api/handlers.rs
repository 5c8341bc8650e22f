//! API Request Handlers

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::middleware::RateLimiter;
use super::types::*;
use crate::core::analyzer::TransactionAnalyzer;
use crate::models::config::Network;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{ParsedResult, RawTransaction, RiskLevel, RpcEnvelope};
use crate::utils::constants::{is_valid_address, is_valid_digest, UNKNOWN_SENDER};
use crate::utils::telemetry::TelemetryCollector;

/// Max records per batch request
pub const MAX_BATCH_SIZE: usize = 100;

type HandlerError = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub analyzer: TransactionAnalyzer,
    pub telemetry: Arc<TelemetryCollector>,
    pub network: Network,
    /// Accepted API keys; empty means open
    pub api_keys: HashSet<String>,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        analyzer: TransactionAnalyzer,
        telemetry: Arc<TelemetryCollector>,
        network: Network,
    ) -> Self {
        Self {
            analyzer,
            telemetry,
            network,
            api_keys: HashSet::new(),
            rate_limiter: Arc::new(RateLimiter::default()),
            start_time: Instant::now(),
        }
    }

    pub fn with_api_keys(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.api_keys = keys.into_iter().collect();
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = limiter;
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Run the engine and record telemetry
    fn run(&self, raw: &RawTransaction, sender_name: Option<&str>) -> ParsedResult {
        let start = Instant::now();
        let result = self.analyzer.analyze(raw, sender_name);

        self.telemetry
            .record_analysis(&result, start.elapsed().as_micros() as u64);

        if result.risk_level == RiskLevel::High {
            warn!(
                digest = %result.digest,
                score = result.risk_score,
                "🚨 High-risk transaction analyzed"
            );
        }
        result
    }
}

/// Reject records whose digest or sender is malformed
pub fn validate_transaction(raw: &RawTransaction) -> AppResult<()> {
    if !raw.digest.is_empty() && !is_valid_digest(&raw.digest) {
        return Err(AppError::invalid_digest(&raw.digest));
    }

    let sender = raw
        .transaction
        .as_ref()
        .and_then(|t| t.data.sender.as_deref());
    if let Some(sender) = sender {
        if sender != UNKNOWN_SENDER && !is_valid_address(sender) {
            return Err(AppError::invalid_address(sender));
        }
    }
    Ok(())
}

fn error_response(err: &AppError, start: Instant) -> HandlerError {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(
            ApiError::from(err),
            start.elapsed().as_secs_f64() * 1000.0,
        )),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        network: state.network.name().to_string(),
        fullnode_url: state.network.fullnode_url().to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}

// ============================================
// Transaction Analysis
// ============================================

pub async fn analyze_transaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalysisData>>, HandlerError> {
    let start = Instant::now();

    validate_transaction(&req.transaction).map_err(|e| {
        warn!("⚠️ Rejected record: {}", e);
        error_response(&e, start)
    })?;

    let result = state.run(&req.transaction, req.sender_name.as_deref());
    let explorer_url = state.network.explorer_tx_url(&result.digest);

    Ok(Json(ApiResponse::success(
        AnalysisData::new(result, explorer_url),
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

/// Explain a saved JSON-RPC response, translating node failures
pub async fn explain_response(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExplainRequest>,
) -> Result<Json<ApiResponse<AnalysisData>>, HandlerError> {
    let start = Instant::now();

    let raw = serde_json::from_value::<RpcEnvelope>(req.response)
        .map_err(AppError::from)
        .and_then(RpcEnvelope::into_transaction)
        .and_then(|raw| validate_transaction(&raw).map(|_| raw))
        .map_err(|e| {
            info!(code = e.code_str(), "📭 Explain request failed: {}", e.message);
            error_response(&e, start)
        })?;

    let result = state.run(&raw, req.sender_name.as_deref());
    let explorer_url = state.network.explorer_tx_url(&result.digest);

    Ok(Json(ApiResponse::success(
        AnalysisData::new(result, explorer_url),
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

// ============================================
// Batch Analysis
// ============================================

pub async fn batch_analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchAnalysisRequest>,
) -> Result<Json<ApiResponse<BatchAnalysisData>>, HandlerError> {
    let start = Instant::now();

    if req.transactions.is_empty() {
        return Err(error_response(
            &AppError::bad_request("No transactions provided"),
            start,
        ));
    }
    if req.transactions.len() > MAX_BATCH_SIZE {
        return Err(error_response(
            &AppError::bad_request(format!(
                "Maximum {} transactions per batch",
                MAX_BATCH_SIZE
            )),
            start,
        ));
    }

    info!("📦 Batch analysis: {} transactions", req.transactions.len());

    let results: Vec<BatchItemResult> = req
        .transactions
        .iter()
        .map(|item| match validate_transaction(&item.transaction) {
            Ok(()) => {
                let result = state.run(&item.transaction, item.sender_name.as_deref());
                BatchItemResult {
                    digest: result.digest,
                    status: "success".to_string(),
                    summary: Some(result.summary),
                    risk_score: Some(result.risk_score),
                    risk_level: Some(result.risk_level.as_str().to_string()),
                    error: None,
                }
            }
            Err(e) => BatchItemResult {
                digest: item.transaction.digest.clone(),
                status: "error".to_string(),
                summary: None,
                risk_score: None,
                risk_level: None,
                error: Some(ApiError::from(&e)),
            },
        })
        .collect();

    let count_level = |level: RiskLevel| {
        results
            .iter()
            .filter(|r| r.risk_level.as_deref() == Some(level.as_str()))
            .count()
    };

    let data = BatchAnalysisData {
        total_requested: req.transactions.len(),
        total_processed: results.iter().filter(|r| r.status == "success").count(),
        total_low: count_level(RiskLevel::Low),
        total_medium: count_level(RiskLevel::Medium),
        total_high: count_level(RiskLevel::High),
        results,
        processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    };

    Ok(Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    )))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        stats: state.telemetry.get_stats(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(
        data,
        start.elapsed().as_secs_f64() * 1000.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawTransaction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_validation_accepts_missing_fields() {
        assert!(validate_transaction(&RawTransaction::default()).is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_digest() {
        let err = validate_transaction(&raw(json!({ "digest": "not-a-digest" }))).unwrap_err();
        assert_eq!(err.code_str(), "INPUT_INVALID_DIGEST");
    }

    #[test]
    fn test_validation_rejects_bad_sender() {
        let tx = raw(json!({ "transaction": { "data": { "sender": "alice" } } }));
        let err = validate_transaction(&tx).unwrap_err();
        assert_eq!(err.code.http_status(), 400);

        let tx = raw(json!({ "transaction": { "data": { "sender": "0xABC" } } }));
        assert!(validate_transaction(&tx).is_ok());
    }
}
