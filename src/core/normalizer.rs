//! Normalizer - canonical fields of a raw transaction record
//!
//! Pure projection, no errors. Missing pieces of the record fall back to
//! neutral values.

use crate::models::types::{MoveCall, ObjectChange, ObjectDeltas, RawTransaction, TxStatus};
use crate::utils::constants::{PROGRAMMABLE_KIND, STATUS_SUCCESS, UNKNOWN_SENDER};
use crate::utils::format::format_base_units;

/// Canonical facts extracted from one record
#[derive(Debug, Clone)]
pub struct NormalizedTransaction {
    pub status: TxStatus,
    /// computation + storage - rebate, in base units
    pub fee_base_units: i128,
    /// Fee in SUI, 4 decimals
    pub fee_display: String,
    pub sender: String,
    pub objects: ObjectDeltas,
    pub move_calls: Vec<MoveCall>,
}

pub fn normalize(raw: &RawTransaction) -> NormalizedTransaction {
    let fee_base_units = fee_base_units(raw);

    NormalizedTransaction {
        status: status(raw),
        fee_base_units,
        fee_display: format_base_units(fee_base_units, 4),
        sender: sender(raw),
        objects: object_deltas(raw),
        move_calls: move_calls(raw),
    }
}

fn status(raw: &RawTransaction) -> TxStatus {
    match raw.effects.as_ref() {
        Some(effects) if effects.status.status == STATUS_SUCCESS => TxStatus::Success,
        _ => TxStatus::Failure,
    }
}

/// Absent gas summary means a zero-fee record
pub fn fee_base_units(raw: &RawTransaction) -> i128 {
    raw.effects
        .as_ref()
        .and_then(|e| e.gas_used.as_ref())
        .map(|gas| gas.computation_cost + gas.storage_cost - gas.storage_rebate)
        .unwrap_or(0)
}

fn sender(raw: &RawTransaction) -> String {
    raw.transaction
        .as_ref()
        .and_then(|t| t.data.sender.as_deref())
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SENDER)
        .to_string()
}

fn object_deltas(raw: &RawTransaction) -> ObjectDeltas {
    let mut deltas = ObjectDeltas::default();
    for change in &raw.object_changes {
        match change {
            ObjectChange::Created { object_id } => deltas.created.push(object_id.clone()),
            ObjectChange::Mutated { object_id } => deltas.mutated.push(object_id.clone()),
            ObjectChange::Deleted { object_id } => deltas.deleted.push(object_id.clone()),
            ObjectChange::Other => {}
        }
    }
    deltas
}

/// Only programmable transactions carry move calls; source order is kept
fn move_calls(raw: &RawTransaction) -> Vec<MoveCall> {
    raw.transaction
        .as_ref()
        .and_then(|t| t.data.transaction.as_ref())
        .filter(|kind| kind.kind == PROGRAMMABLE_KIND)
        .map(|kind| {
            kind.transactions
                .iter()
                .filter_map(|cmd| cmd.move_call.clone())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawTransaction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_record_defaults() {
        let n = normalize(&RawTransaction::default());
        assert_eq!(n.status, TxStatus::Failure);
        assert_eq!(n.fee_base_units, 0);
        assert_eq!(n.fee_display, "0.0000");
        assert_eq!(n.sender, "Unknown");
        assert_eq!(n.objects, ObjectDeltas::default());
        assert!(n.move_calls.is_empty());
    }

    #[test]
    fn test_fee_and_status() {
        let n = normalize(&raw(json!({
            "effects": {
                "status": { "status": "success" },
                "gasUsed": { "computationCost": "1000000", "storageCost": "2976000", "storageRebate": "978120" }
            }
        })));
        assert_eq!(n.status, TxStatus::Success);
        assert_eq!(n.fee_base_units, 2_997_880);
        assert_eq!(n.fee_display, "0.0030");
    }

    #[test]
    fn test_failure_status() {
        let n = normalize(&raw(json!({
            "effects": { "status": { "status": "failure", "error": "InsufficientGas" } }
        })));
        assert_eq!(n.status, TxStatus::Failure);
    }

    #[test]
    fn test_object_buckets() {
        let n = normalize(&raw(json!({
            "objectChanges": [
                { "type": "created", "objectId": "0xa" },
                { "type": "mutated", "objectId": "0xb" },
                { "type": "mutated", "objectId": "0xc" },
                { "type": "deleted", "objectId": "0xd" },
                { "type": "transferred", "objectId": "0xe" }
            ]
        })));
        assert_eq!(n.objects.created, vec!["0xa"]);
        assert_eq!(n.objects.mutated, vec!["0xb", "0xc"]);
        assert_eq!(n.objects.deleted, vec!["0xd"]);
    }

    #[test]
    fn test_move_calls_only_for_programmable() {
        let commands = json!([
            { "MoveCall": { "package": "0x1", "module": "a", "function": "f" } },
            { "TransferObjects": [[], "x"] },
            { "MoveCall": { "package": "0x2", "module": "b", "function": "g" } }
        ]);

        let n = normalize(&raw(json!({
            "transaction": { "data": { "sender": "0xabc", "transaction": {
                "kind": "ProgrammableTransaction", "transactions": commands.clone()
            }}}
        })));
        assert_eq!(n.sender, "0xabc");
        assert_eq!(n.move_calls.len(), 2);
        assert_eq!(n.move_calls[0].package, "0x1");
        assert_eq!(n.move_calls[1].function, "g");

        let n = normalize(&raw(json!({
            "transaction": { "data": { "sender": "0xabc", "transaction": {
                "kind": "ConsensusCommitPrologue", "transactions": commands
            }}}
        })));
        assert!(n.move_calls.is_empty());
    }
}
