//! txlens API Server
//!
//! REST API that explains already-fetched Sui transactions
//!
//! Usage:
//!   cargo run --bin txlens_api
//!
//! Environment:
//!   PORT / TXLENS_PORT     - Server port (default: 8080)
//!   TXLENS_HOST            - Server host (default: 0.0.0.0)
//!   TXLENS_NETWORK         - mainnet | testnet | devnet (default: mainnet)
//!   TXLENS_API_KEYS        - Comma-separated accepted keys (default: open)
//!   TXLENS_MAX_CONCURRENT  - In-flight request cap (default: 256)
//!   RUST_LOG               - Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use txlens::api::middleware::RateLimiter;
use txlens::api::{create_router_with_limit, start_cleanup_task, AppState};
use txlens::utils::constants::APP_VERSION;
use txlens::{AnalyzerConfig, ServerConfig, TelemetryCollector, TransactionAnalyzer};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let server = ServerConfig::from_env();
    let analyzer = TransactionAnalyzer::new(AnalyzerConfig::from_env());
    info!(
        "⚙️ Thresholds: dust={} native_noise={} drain>{} calls>{} deny_list={}",
        analyzer.config().dust_threshold,
        analyzer.config().native_noise_threshold,
        analyzer.config().drain_min_outflows,
        analyzer.config().complexity_max_calls,
        analyzer.config().deny_list.len()
    );

    // Initialize telemetry
    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    if server.api_keys.is_empty() {
        warn!("🔓 TXLENS_API_KEYS not set, API is open (rate limited)");
    }

    let rate_limiter = Arc::new(RateLimiter::default());
    let state = Arc::new(
        AppState::new(analyzer, telemetry, server.network)
            .with_api_keys(server.api_keys.iter().cloned())
            .with_rate_limiter(rate_limiter.clone()),
    );

    // Start background cleanup task for rate limiter
    start_cleanup_task(rate_limiter);
    info!("🧹 Background cleanup task started");

    let app = create_router_with_limit(state, server.max_concurrent_requests);

    let addr: SocketAddr = format!("{}:{}", server.host, server.port).parse()?;

    info!("🚀 txlens API starting on http://{} ({})", addr, server.network);
    info!("🌐 Expecting records from {}", server.network.fullnode_url());
    info!("");
    info!("Endpoints:");
    info!("  POST /v1/analyze          - Explain a transaction block");
    info!("  POST /v1/explain          - Explain a saved JSON-RPC response");
    info!("  POST /v1/analyze/batch    - Batch analysis (up to 100 transactions)");
    info!("  GET  /v1/stats            - Analysis statistics");
    info!("  GET  /v1/health           - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // Graceful shutdown sequence
    info!("🛑 Shutdown signal received, cleaning up...");

    let stats = telemetry_for_shutdown.get_stats();
    info!("📊 Final telemetry: {}", stats.summary_line());

    match telemetry_for_shutdown.export_stats_json() {
        Ok(path) => info!("   ✅ Stats exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }

    info!("👋 txlens API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════╗
    ║                                              ║
    ║   t x l e n s                                ║
    ║   Sui transaction interpreter   v{:<10}  ║
    ║   plain-language summaries with risk scores  ║
    ║                                              ║
    ╚══════════════════════════════════════════════╝
    "#,
        APP_VERSION
    );
}
