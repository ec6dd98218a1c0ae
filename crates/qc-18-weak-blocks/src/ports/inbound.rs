//! Inbound ports (API) for the Weak Blocks subsystem.
//!
//! Handles passed to queries are owned snapshots. A handle for a purged
//! node behaves like a null handle.

use crate::domain::{ChainTip, WeakBlock, WeakStats};
use shared_types::{Block, Hash, TxId};

/// Primary API for weak block tracking.
///
/// Mutations are serialized; queries may run concurrently with each other.
pub trait WeakBlockApi: Send + Sync {
    /// Validate and store a candidate weak block.
    ///
    /// Returns true iff a new node was created. Rejections leave the
    /// store unchanged.
    fn store_weakblock(&self, block: &Block) -> bool;

    /// Look up a weak block by hash. `None` for unknown or null hashes.
    fn get_weakblock(&self, hash: &Hash) -> Option<WeakBlock>;

    fn is_known_weakblock(&self, hash: &Hash) -> bool;

    /// Reassemble the full block for a node.
    fn block_for_weak(&self, wb: Option<&WeakBlock>) -> Option<Block>;

    /// The node's hash, or the all-zero hash for a null handle.
    fn hash_for_weak(&self, wb: Option<&WeakBlock>) -> Hash;

    /// The node's underlying block. `None` for roots and null handles.
    fn underlying_weak(&self, wb: Option<&WeakBlock>) -> Option<WeakBlock>;

    /// True iff `ancestor` is `wb` or one of its transitive underlying blocks.
    fn weak_extends(&self, wb: Option<&WeakBlock>, ancestor: Option<&WeakBlock>) -> bool;

    /// The node's weight, or `-1` for null and unknown handles.
    fn weak_height(&self, wb: Option<&WeakBlock>) -> i64;

    fn num_known_weakblocks(&self) -> usize;

    /// Distinct transactions across all stored weak blocks.
    fn num_known_weakblock_transactions(&self) -> usize;

    /// Nodes without children, in arrival order, with their weights.
    fn weak_chain_tips(&self) -> Vec<ChainTip>;

    /// Heaviest node; the earliest arrival wins among equal weights.
    fn get_weak_longest_chain_tip(&self) -> Option<WeakBlock>;

    /// Full transaction count of the longest tip, `-1` if there is none.
    fn weak_tip_tx_count(&self) -> i64;

    /// Number of stored weak blocks containing `txid`.
    fn weak_confirmations(&self, txid: &TxId) -> usize;

    /// Every node with its full transaction count, in arrival order.
    fn weak_stats(&self) -> Vec<(Hash, usize)>;

    /// Store counters and longest tip weight, read from one snapshot.
    fn weak_stats_summary(&self) -> WeakStats;

    /// The most recent weak block `block` could declare as underlying.
    fn builds_on_weak(&self, block: &Block) -> Option<WeakBlock>;

    /// Remove nodes older than `max_age` arrivals. `0` removes everything.
    ///
    /// Returns the number of removed nodes.
    fn purge_old_weakblocks(&self, max_age: u64) -> usize;

    /// Remove nodes received strictly before `cutoff` (seconds since epoch).
    fn purge_weakblocks_received_before(&self, cutoff: u64) -> usize;

    /// Drop every weak block and all shared transaction storage.
    fn reset_weakblocks(&self);

    /// Verify every structural invariant. Panics on violation.
    fn weakblocks_consistency_check(&self);

    /// Verify that the store is empty. Panics otherwise.
    fn weakblocks_empty_check(&self);
}
