//! txlens - Sui transaction interpreter
//!
//! Explains a saved transaction record in plain language with a heuristic
//! risk score.
//!
//! Usage:
//!   txlens <file.json> [--name <display name>] [--json]
//!
//! The file holds a `sui_getTransactionBlock` JSON-RPC response or a bare
//! transaction block. Error responses are translated into readable messages.

use clap::Parser;
use eyre::{bail, Result, WrapErr};
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use txlens::models::config::network_from_env;
use txlens::utils::constants::NO_RISK_MESSAGE;
use txlens::{parse_transaction_json, AnalyzerConfig, ParsedResult, TransactionAnalyzer};

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
#[clap(name = env!("CARGO_BIN_NAME"), version)]
struct CliArgs {
    /// Saved JSON-RPC response or bare transaction block
    path: PathBuf,
    /// Display name for the sender (e.g. a resolved SuiNS name)
    #[clap(long)]
    name: Option<String>,
    /// Print the parsed result as JSON
    #[clap(long)]
    json: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = CliArgs::parse();

    let input = std::fs::read_to_string(&args.path)
        .wrap_err_with(|| format!("failed to read {}", args.path.display()))?;

    let raw = match parse_transaction_json(&input) {
        Ok(raw) => raw,
        Err(e) => {
            error!(code = e.code_str(), "❌ {}", e.message);
            bail!("{}", e.message);
        }
    };
    debug!(digest = %raw.digest, "Loaded transaction record");

    let analyzer = TransactionAnalyzer::new(AnalyzerConfig::from_env());
    let result = analyzer.analyze(&raw, args.name.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    Ok(())
}

fn print_report(result: &ParsedResult) {
    let network = network_from_env();

    println!();
    println!("📜 {}", result.summary);
    println!();
    println!(
        "{} Risk: {} (score {})",
        result.risk_level.emoji(),
        result.risk_level.as_str().to_uppercase(),
        result.risk_score
    );
    if result.security_insights.is_empty() {
        println!("   • {}", NO_RISK_MESSAGE);
    } else {
        for insight in &result.security_insights {
            println!("   • {}", insight);
        }
    }
    println!();
    println!("   Status:     {}", result.status.as_str());
    println!("   Gas fee:    {} SUI", result.gas_used);
    println!("   Sender:     {}", result.sender);
    if let Some(timestamp) = &result.timestamp {
        println!("   Time:       {}", timestamp);
    }
    println!(
        "   Objects:    {} created, {} mutated, {} deleted",
        result.objects.created.len(),
        result.objects.mutated.len(),
        result.objects.deleted.len()
    );
    for call in &result.move_calls {
        println!("   Call:       {}::{}::{}", call.package, call.module, call.function);
    }
    if !result.digest.is_empty() {
        println!("   Explorer:   {}", network.explorer_tx_url(&result.digest));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let args = CliArgs::try_parse_from(["txlens", "tx.json", "--name=alice.sui", "--json"]).unwrap();
        assert_eq!(args.path, PathBuf::from("tx.json"));
        assert_eq!(args.name.as_deref(), Some("alice.sui"));
        assert!(args.json);

        let args = CliArgs::try_parse_from(["txlens", "--name", "bob", "tx.json"]).unwrap();
        assert_eq!(args.name.as_deref(), Some("bob"));
        assert!(!args.json);
    }

    #[test]
    fn test_cli_rejects_bad_input() {
        assert!(CliArgs::try_parse_from(["txlens"]).is_err());
        assert!(CliArgs::try_parse_from(["txlens", "a.json", "b.json"]).is_err());
        assert!(CliArgs::try_parse_from(["txlens", "a.json", "-x"]).is_err());
    }
}
