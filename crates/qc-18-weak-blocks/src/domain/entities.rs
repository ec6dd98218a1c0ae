//! # Core Domain Entities
//!
//! - [`WeakBlock`]: one accepted node of the weak block DAG
//! - [`ChainTip`]: a node without children, with its weight
//! - [`WeakStats`]: aggregate counters for monitoring
//!
//! A weak block does not own its full transaction list. It owns its
//! coinbase and the transactions it appended beyond its underlying block;
//! everything in between is read through the underlying chain.

use shared_types::{BlockHeader, Hash, TxId};
use std::sync::Arc;

/// A node of the weak block DAG.
///
/// Immutable once accepted. Cloning is cheap: the appended transaction
/// segment is shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeakBlock {
    pub(crate) hash: Hash,
    pub(crate) header: BlockHeader,
    pub(crate) underlying: Option<Hash>,
    pub(crate) coinbase: TxId,
    pub(crate) appended: Arc<[TxId]>,
    /// Number of non-coinbase transactions (inherited prefix + appended).
    pub(crate) body_len: usize,
    pub(crate) weight: u64,
    pub(crate) arrival: u64,
    pub(crate) received_at: u64,
}

impl WeakBlock {
    /// Block hash (the node identity).
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Block header as received.
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Hash of the underlying weak block, `None` for a root.
    pub fn underlying(&self) -> Option<Hash> {
        self.underlying
    }

    pub fn is_root(&self) -> bool {
        self.underlying.is_none()
    }

    /// Coinbase transaction id.
    pub fn coinbase(&self) -> TxId {
        self.coinbase
    }

    /// Transactions this block introduced beyond its underlying block.
    pub fn appended(&self) -> &[TxId] {
        &self.appended
    }

    /// Full transaction count including the coinbase.
    pub fn tx_count(&self) -> usize {
        self.body_len + 1
    }

    /// Accumulated transaction count from the root down to this block.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Store-wide arrival sequence number (0-based).
    pub fn arrival(&self) -> u64 {
        self.arrival
    }

    /// Timestamp from the time source when the block was accepted.
    pub fn received_at(&self) -> u64 {
        self.received_at
    }
}

/// A weak chain tip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainTip {
    pub hash: Hash,
    pub weight: u64,
}

/// Aggregate weak block statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeakStats {
    pub known_weakblocks: usize,
    pub known_transactions: usize,
    pub chain_tips: usize,
    /// Weight of the longest tip, `-1` when the store is empty.
    pub max_height: i64,
}
