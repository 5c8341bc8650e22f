//! Economic Classifier
//!
//! Turns raw balance changes into fee-adjusted "sent" / "received" buckets and
//! a one-sentence description of the dominant economic action.
//!
//! The sender's native-coin outflow reported by the node already includes the
//! gas it paid, so it is corrected by adding the fee back before bucketing.

use crate::models::config::AnalyzerConfig;
use crate::models::types::{AssetFlow, AssetFlows, BalanceChange};
use crate::utils::constants::{NATIVE_COIN_TYPE, NATIVE_COIN_TYPE_LONG};
use crate::utils::format::{coin_symbol, format_base_units};

/// Case-insensitive native coin check (short and zero-padded forms)
pub fn is_native_coin(coin_type: &str) -> bool {
    coin_type.eq_ignore_ascii_case(NATIVE_COIN_TYPE)
        || coin_type.eq_ignore_ascii_case(NATIVE_COIN_TYPE_LONG)
}

/// Balance change after fee correction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustedChange {
    pub owner: Option<String>,
    pub coin_type: String,
    pub amount: i128,
}

impl AdjustedChange {
    pub fn symbol(&self) -> &str {
        coin_symbol(&self.coin_type)
    }

    fn to_flow(&self) -> AssetFlow {
        AssetFlow {
            owner: self.owner.clone(),
            coin_type: self.coin_type.clone(),
            symbol: self.symbol().to_string(),
            amount: self.amount,
            amount_display: format_base_units(self.amount.saturating_abs(), 4),
        }
    }
}

/// Add the fee back to the sender's native-coin outflows; everything else
/// passes through untouched.
pub fn adjust_for_fee(sender: &str, fee_base_units: i128, changes: &[BalanceChange]) -> Vec<AdjustedChange> {
    changes
        .iter()
        .map(|bc| {
            let paid_gas = is_native_coin(&bc.coin_type) && bc.owner.is_address(sender);
            let amount = if paid_gas && bc.amount < 0 {
                bc.amount.saturating_add(fee_base_units)
            } else {
                bc.amount
            };
            AdjustedChange {
                owner: bc.owner.address().map(String::from),
                coin_type: bc.coin_type.clone(),
                amount,
            }
        })
        .collect()
}

/// Fee-adjusted changes split by direction, dust removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    pub sent: Vec<AdjustedChange>,
    pub received: Vec<AdjustedChange>,
}

impl Buckets {
    pub fn to_flows(&self) -> AssetFlows {
        AssetFlows {
            sent: self.sent.iter().map(AdjustedChange::to_flow).collect(),
            received: self.received.iter().map(AdjustedChange::to_flow).collect(),
        }
    }
}

pub fn bucket(adjusted: &[AdjustedChange], config: &AnalyzerConfig) -> Buckets {
    let dust = config.dust_threshold;
    let noise = config.native_noise_threshold;

    let sent = adjusted
        .iter()
        .filter(|c| {
            // Near-zero net native movement after fee correction is noise
            if is_native_coin(&c.coin_type) && c.amount > -noise && c.amount < noise {
                return false;
            }
            c.amount < -dust
        })
        .cloned()
        .collect();

    let received = adjusted
        .iter()
        .filter(|c| c.amount > dust)
        .cloned()
        .collect();

    Buckets { sent, received }
}

/// Dominant economic action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EconomicAction {
    /// First sent entry traded for first received entry
    Swap {
        sent_symbol: String,
        sent_amount: i128,
        received_symbol: String,
        received_amount: i128,
    },
    /// One symbol, summed magnitude
    Sent { symbol: String, total: i128 },
    /// Several symbols
    SentMany { kinds: usize },
    Received { symbol: String, total: i128 },
    ReceivedMany { kinds: usize },
}

impl EconomicAction {
    pub fn sentence(&self) -> String {
        match self {
            EconomicAction::Swap {
                sent_symbol,
                sent_amount,
                received_symbol,
                received_amount,
            } => format!(
                "This appears to be a swap of {} {} for {} {}.",
                format_base_units(*sent_amount, 2),
                sent_symbol,
                format_base_units(*received_amount, 2),
                received_symbol
            ),
            EconomicAction::Sent { symbol, total } => {
                format!("Sent {} {}.", format_base_units(*total, 4), symbol)
            }
            EconomicAction::SentMany { kinds } => format!("Sent {} types of assets.", kinds),
            EconomicAction::Received { symbol, total } => {
                format!("Received {} {}.", format_base_units(*total, 4), symbol)
            }
            EconomicAction::ReceivedMany { kinds } => {
                format!("Received {} types of assets.", kinds)
            }
        }
    }
}

/// Distinct symbols in first-seen order
fn distinct_symbols(changes: &[AdjustedChange]) -> Vec<&str> {
    let mut symbols: Vec<&str> = Vec::new();
    for change in changes {
        let symbol = change.symbol();
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

/// Saturates at `i128::MAX` rather than wrapping
fn summed_magnitude(changes: &[AdjustedChange]) -> i128 {
    changes
        .iter()
        .fold(0i128, |acc, c| acc.saturating_add(c.amount.saturating_abs()))
}

/// Swap beats one-sided movement; nothing when both buckets are empty
pub fn classify(buckets: &Buckets) -> Option<EconomicAction> {
    match (buckets.sent.first(), buckets.received.first()) {
        (Some(sent), Some(received)) => Some(EconomicAction::Swap {
            sent_symbol: sent.symbol().to_string(),
            sent_amount: sent.amount.saturating_abs(),
            received_symbol: received.symbol().to_string(),
            received_amount: received.amount.saturating_abs(),
        }),
        (Some(_), None) => {
            let symbols = distinct_symbols(&buckets.sent);
            Some(match symbols.as_slice() {
                [symbol] => EconomicAction::Sent {
                    symbol: symbol.to_string(),
                    total: summed_magnitude(&buckets.sent),
                },
                _ => EconomicAction::SentMany {
                    kinds: symbols.len(),
                },
            })
        }
        (None, Some(_)) => {
            let symbols = distinct_symbols(&buckets.received);
            Some(match symbols.as_slice() {
                [symbol] => EconomicAction::Received {
                    symbol: symbol.to_string(),
                    total: summed_magnitude(&buckets.received),
                },
                _ => EconomicAction::ReceivedMany {
                    kinds: symbols.len(),
                },
            })
        }
        (None, None) => None,
    }
}
