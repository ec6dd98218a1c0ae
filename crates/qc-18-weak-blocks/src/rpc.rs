//! # Weak Block RPC Views
//!
//! JSON responses for the node's weak block query commands.
//!
//! | Method | Description |
//! |--------|-------------|
//! | `weakstats` | Store counters and longest chain height |
//! | `weakchaintips` | `[hash, height]` pairs in arrival order |
//! | `weaktiptxcount` | Transactions in the longest tip, `-1` if none |
//! | `weakconfirmations` | Weak block confirmations of a txid |
//!
//! Hashes are rendered in display (byte-reversed) hex.

use crate::domain::WeakStats;
use crate::ports::inbound::WeakBlockApi;
use serde::Serialize;
use serde_json::{json, Value};
use shared_types::{hash_from_hex, hash_to_hex};

/// Error code for malformed parameters.
pub const RPC_INVALID_PARAMETER: i32 = -8;

/// Response body of `weakstats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeakStatsView {
    pub numknownweakblocks: usize,
    pub numknownweakblocktransactions: usize,
    pub numweakchaintips: usize,
    pub maxweakchainheight: i64,
}

impl From<WeakStats> for WeakStatsView {
    fn from(stats: WeakStats) -> Self {
        Self {
            numknownweakblocks: stats.known_weakblocks,
            numknownweakblocktransactions: stats.known_transactions,
            numweakchaintips: stats.chain_tips,
            maxweakchainheight: stats.max_height,
        }
    }
}

/// JSON handler wrapping a `WeakBlockApi` implementation.
pub struct WeakBlockRpcHandler<S: WeakBlockApi> {
    service: S,
}

impl<S: WeakBlockApi> WeakBlockRpcHandler<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Dispatch a method by name. Unknown methods yield an error object.
    pub fn handle(&self, method: &str, params: &[Value]) -> Value {
        match method {
            "weakstats" => self.handle_weakstats(),
            "weakchaintips" => self.handle_weakchaintips(),
            "weaktiptxcount" => self.handle_weaktiptxcount(),
            "weakconfirmations" => match params.first().and_then(Value::as_str) {
                Some(txid) => self.handle_weakconfirmations(txid),
                None => error(RPC_INVALID_PARAMETER, "weakconfirmations \"txid\""),
            },
            other => error(-32601, &format!("Method not found: {}", other)),
        }
    }

    pub fn stats_view(&self) -> WeakStatsView {
        self.service.weak_stats_summary().into()
    }

    pub fn handle_weakstats(&self) -> Value {
        json!({ "result": self.stats_view() })
    }

    pub fn handle_weakchaintips(&self) -> Value {
        let tips: Vec<Value> = self
            .service
            .weak_chain_tips()
            .iter()
            .map(|tip| json!([hash_to_hex(&tip.hash), tip.weight]))
            .collect();
        json!({ "result": tips })
    }

    pub fn handle_weaktiptxcount(&self) -> Value {
        json!({ "result": self.service.weak_tip_tx_count() })
    }

    /// `txid_hex` is in display order.
    pub fn handle_weakconfirmations(&self, txid_hex: &str) -> Value {
        match hash_from_hex(txid_hex) {
            Some(txid) => json!({ "result": self.service.weak_confirmations(&txid) }),
            None => error(
                RPC_INVALID_PARAMETER,
                "parameter 1 must be a 64 character hexadecimal string",
            ),
        }
    }
}

fn error(code: i32, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}
