//! Type definitions for txlens
//! Raw ledger records as returned by a Sui fullnode, and the parsed result

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::errors::{AppError, AppResult};

// ============================================
// Raw transaction (input)
// ============================================

/// Fetched transaction block, shaped like `SuiTransactionBlockResponse`.
/// Every field is optional on the wire; missing pieces get neutral defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default)]
    pub digest: String,
    #[serde(default)]
    pub transaction: Option<TransactionEnvelope>,
    #[serde(default)]
    pub effects: Option<TransactionEffects>,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
    #[serde(default)]
    pub balance_changes: Vec<BalanceChange>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub timestamp_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    #[serde(default)]
    pub data: TransactionData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionData {
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub transaction: Option<TransactionKind>,
}

/// Transaction kind plus its command list (only programmable ones carry commands)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionKind {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub transactions: Vec<Command>,
}

/// One command of a programmable transaction. Only `MoveCall` matters here;
/// other command kinds (TransferObjects, SplitCoins, ...) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "MoveCall", default, skip_serializing_if = "Option::is_none")]
    pub move_call: Option<MoveCall>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    #[serde(default)]
    pub status: ExecutionStatus,
    #[serde(default)]
    pub gas_used: Option<GasCostSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fee components in base units (the node encodes them as decimal strings)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    #[serde(default, deserialize_with = "de_amount")]
    pub computation_cost: i128,
    #[serde(default, deserialize_with = "de_amount")]
    pub storage_cost: i128,
    #[serde(default, deserialize_with = "de_amount")]
    pub storage_rebate: i128,
}

/// One object-change event; exactly one tag per event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectChange {
    #[serde(rename_all = "camelCase")]
    Created { object_id: String },
    #[serde(rename_all = "camelCase")]
    Mutated { object_id: String },
    #[serde(rename_all = "camelCase")]
    Deleted { object_id: String },
    /// published, transferred, wrapped, ...
    #[serde(other)]
    Other,
}

/// Balance owner: either a bare address or an ownership-kind tag
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Owner {
    Bare(String),
    Tagged(TaggedOwner),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaggedOwner {
    #[serde(rename = "AddressOwner", default, skip_serializing_if = "Option::is_none")]
    pub address_owner: Option<String>,
    #[serde(rename = "ObjectOwner", default, skip_serializing_if = "Option::is_none")]
    pub object_owner: Option<String>,
}

impl Owner {
    /// Owner address when the owner is an account (bare or AddressOwner)
    pub fn address(&self) -> Option<&str> {
        match self {
            Owner::Bare(address) => Some(address),
            Owner::Tagged(tagged) => tagged.address_owner.as_deref(),
        }
    }

    /// Case-insensitive check against an account address
    pub fn is_address(&self, address: &str) -> bool {
        self.address()
            .map(|a| a.eq_ignore_ascii_case(address))
            .unwrap_or(false)
    }
}

/// Signed balance movement of one coin type for one owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChange {
    pub owner: Owner,
    pub coin_type: String,
    /// Negative = outflow from owner
    #[serde(deserialize_with = "de_amount")]
    pub amount: i128,
}

/// One invoked on-chain entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
}

// ============================================
// JSON-RPC envelope
// ============================================

/// Saved `sui_getTransactionBlock` response
#[derive(Debug, Clone, Deserialize)]
pub struct RpcEnvelope {
    #[serde(default)]
    pub result: Option<RawTransaction>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

impl RpcEnvelope {
    /// Unwrap the transaction or translate the node's failure
    pub fn into_transaction(self) -> AppResult<RawTransaction> {
        if let Some(error) = self.error {
            return Err(AppError::from_ledger_failure(&error.message, error.code));
        }
        self.result
            .ok_or_else(|| AppError::from_ledger_failure("", None))
    }
}

/// Parse either a JSON-RPC envelope or a bare transaction
pub fn parse_transaction_json(input: &str) -> AppResult<RawTransaction> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let is_envelope = value.get("jsonrpc").is_some()
        || value.get("result").is_some()
        || value.get("error").is_some();

    if is_envelope {
        let envelope: RpcEnvelope = serde_json::from_value(value)?;
        envelope.into_transaction()
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

// ============================================
// Parsed result (output)
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failure,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Success => "success",
            TxStatus::Failure => "failure",
        }
    }

    /// Adverb used in the summary
    pub fn adverb(&self) -> &'static str {
        match self {
            TxStatus::Success => "successfully",
            TxStatus::Failure => "unsuccessfully",
        }
    }
}

/// Coarse risk tier for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Low => "✅",
            RiskLevel::Medium => "🟠",
            RiskLevel::High => "🔴",
        }
    }
}

/// Created / mutated / deleted object ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDeltas {
    pub created: Vec<String>,
    pub mutated: Vec<String>,
    pub deleted: Vec<String>,
}

/// A fee-adjusted movement that survived the dust filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFlow {
    pub owner: Option<String>,
    pub coin_type: String,
    pub symbol: String,
    pub amount: i128,
    pub amount_display: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFlows {
    pub sent: Vec<AssetFlow>,
    pub received: Vec<AssetFlow>,
}

/// Engine output: one readable, risk-annotated view of a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResult {
    pub digest: String,
    pub status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Fee in SUI, 4 decimals
    pub gas_used: String,
    pub sender: String,
    pub sender_name: Option<String>,
    pub summary: String,
    pub risk_level: RiskLevel,
    pub risk_score: u32,
    /// Evidence in rule order; empty when no rule fired
    pub security_insights: Vec<String>,
    /// Attributed protocol names, first-seen order
    #[serde(default)]
    pub protocols: Vec<String>,
    /// Calls into deny-listed packages
    #[serde(default)]
    pub deny_listed_calls: usize,
    pub objects: ObjectDeltas,
    pub move_calls: Vec<MoveCall>,
    pub flows: AssetFlows,
}

// ============================================
// Serde helpers
// ============================================

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Str(String),
}

/// Amounts arrive as decimal strings (sometimes plain numbers)
fn de_amount<'de, D>(deserializer: D) -> Result<i128, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(n) => Ok(n as i128),
        NumberOrString::Str(s) => s.trim().parse::<i128>().map_err(serde::de::Error::custom),
    }
}

fn de_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Int(n)) => Ok(Some(n)),
        Some(NumberOrString::Str(s)) => s.trim().parse::<i64>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_deserialize_node_shape() {
        let raw: RawTransaction = serde_json::from_value(json!({
            "digest": "5Wc8Qh8kPz1x5pS9d2YxHq2bFvLRcJ3f8Cq6wWkz7u4N",
            "timestampMs": "1700000000000",
            "transaction": { "data": {
                "sender": "0xabc",
                "transaction": { "kind": "ProgrammableTransaction", "transactions": [
                    { "SplitCoins": ["GasCoin", [{ "Input": 0 }]] },
                    { "MoveCall": { "package": "0xdee9", "module": "clob_v2", "function": "swap", "arguments": [] } }
                ]}
            }},
            "effects": {
                "status": { "status": "success" },
                "gasUsed": { "computationCost": "750000", "storageCost": "2000000", "storageRebate": "1000000", "nonRefundableStorageFee": "9880" }
            },
            "objectChanges": [
                { "type": "created", "objectId": "0x1", "version": "3" },
                { "type": "published", "packageId": "0x9", "modules": [] }
            ],
            "balanceChanges": [
                { "owner": { "AddressOwner": "0xabc" }, "coinType": "0x2::sui::SUI", "amount": "-1750000" },
                { "owner": "0xdef", "coinType": "0x2::sui::SUI", "amount": 42 }
            ]
        }))
        .unwrap();

        assert_eq!(raw.timestamp_ms, Some(1_700_000_000_000));
        let gas = raw.effects.as_ref().unwrap().gas_used.as_ref().unwrap();
        assert_eq!(gas.computation_cost, 750_000);
        assert_eq!(raw.object_changes.len(), 2);
        assert!(matches!(raw.object_changes[1], ObjectChange::Other));
        assert_eq!(raw.balance_changes[0].amount, -1_750_000);
        assert!(raw.balance_changes[0].owner.is_address("0xABC"));
        assert!(raw.balance_changes[1].owner.is_address("0xdef"));

        let kind = raw.transaction.unwrap().data.transaction.unwrap();
        assert!(kind.transactions[0].move_call.is_none());
        assert_eq!(kind.transactions[1].move_call.as_ref().unwrap().module, "clob_v2");
    }

    #[test]
    fn test_shared_owner_has_no_address() {
        let owner: Owner = serde_json::from_value(json!({
            "Shared": { "initial_shared_version": 1 }
        }))
        .unwrap();
        assert!(owner.address().is_none());
        assert!(!owner.is_address("0xabc"));
    }

    #[test]
    fn test_rpc_error_envelope() {
        let err = parse_transaction_json(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"Invalid params"}}"#,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::LedgerInvalidParams);

        let err = parse_transaction_json(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"Could not find the referenced transaction"}}"#,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::LedgerNotFound);
    }

    #[test]
    fn test_bare_and_wrapped_transactions() {
        let bare = parse_transaction_json(r#"{"digest":"abc"}"#).unwrap();
        assert_eq!(bare.digest, "abc");

        let wrapped =
            parse_transaction_json(r#"{"jsonrpc":"2.0","id":1,"result":{"digest":"xyz"}}"#).unwrap();
        assert_eq!(wrapped.digest, "xyz");
    }

    #[test]
    fn test_malformed_amount_is_rejected() {
        let parsed: Result<BalanceChange, _> = serde_json::from_value(json!({
            "owner": "0xabc", "coinType": "0x2::sui::SUI", "amount": "12abc"
        }));
        assert!(parsed.is_err());
    }
}
