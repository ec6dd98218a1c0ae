//! # Weak Block DAG Store
//!
//! Index-based forest of weak blocks:
//!
//! - `nodes`: hash -> node, each node naming only its underlying hash
//! - `children`: reverse index maintained on insert and purge
//! - `arrivals`: arrival sequence -> hash, for chronological views
//! - `txs`: shared transaction storage
//!
//! The store is synchronous and single-owner. Thread safety is the
//! service's job.

use super::arena::TxArena;
use super::claim::{corroborate, extract_claim};
use super::selector::LongestChainSelector;
use super::{ChainTip, WeakBlock, WeakStats};
use crate::events::{WeakBlockError, WeakBlockResult};
use shared_types::{is_null_hash, Block, Hash, Transaction, TxId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Outcome of a purge pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Nodes removed.
    pub removed: usize,
    /// Matching nodes kept because a surviving node still builds on them.
    pub deferred: usize,
    /// Transaction records freed.
    pub freed_transactions: usize,
}

#[derive(Debug, Default)]
pub struct WeakBlockStore {
    pub(crate) nodes: HashMap<Hash, WeakBlock>,
    pub(crate) children: HashMap<Hash, Vec<Hash>>,
    pub(crate) arrivals: BTreeMap<u64, Hash>,
    pub(crate) next_arrival: u64,
    pub(crate) txs: TxArena,
    pub(crate) selector: LongestChainSelector,
}

impl WeakBlockStore {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            children: HashMap::new(),
            arrivals: BTreeMap::new(),
            next_arrival: 0,
            txs: TxArena::new(),
            selector: LongestChainSelector::new(),
        }
    }

    // =========================================================================
    // INSERT
    // =========================================================================

    /// Validate and store a candidate weak block.
    ///
    /// On error nothing is mutated.
    pub fn insert(&mut self, block: &Block, received_at: u64) -> WeakBlockResult<&WeakBlock> {
        let hash = block.hash();
        if self.nodes.contains_key(&hash) {
            return Err(WeakBlockError::Duplicate(hash));
        }
        if block.transactions.is_empty() {
            return Err(WeakBlockError::EmptyBlock);
        }

        let txids: Vec<TxId> = block.transactions.iter().map(Transaction::txid).collect();

        let (underlying, prefix_len, base_weight) = match extract_claim(block) {
            None => (None, 0, 0),
            Some(claimed) => {
                let parent = self
                    .nodes
                    .get(&claimed)
                    .ok_or(WeakBlockError::UnknownUnderlying(claimed))?;
                corroborate(&claimed, &self.body_of(parent), &txids)?;
                (Some(claimed), parent.body_len, parent.weight)
            }
        };

        // Coinbase plus everything beyond the inherited prefix.
        let own = txids.len() - prefix_len;
        let appended_range = 1 + prefix_len..txids.len();

        let node = WeakBlock {
            hash,
            header: block.header,
            underlying,
            coinbase: txids[0],
            appended: Arc::from(&txids[appended_range.clone()]),
            body_len: txids.len() - 1,
            weight: base_weight + own as u64,
            arrival: self.next_arrival,
            received_at,
        };

        self.txs.retain(txids[0], &block.transactions[0]);
        for i in appended_range {
            self.txs.retain(txids[i], &block.transactions[i]);
        }
        for txid in &txids {
            self.txs.confirm(txid);
        }

        if let Some(parent) = underlying {
            self.children.entry(parent).or_default().push(hash);
        }
        self.arrivals.insert(node.arrival, hash);
        self.next_arrival += 1;
        self.selector.offer(&node);

        let stored = self.nodes.entry(hash).or_insert(node);
        Ok(&*stored)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Look up a weak block. The null hash is never found.
    pub fn get(&self, hash: &Hash) -> Option<&WeakBlock> {
        if is_null_hash(hash) {
            return None;
        }
        self.nodes.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.get(hash).is_some()
    }

    /// Resolve a possibly stale handle to the stored node.
    fn resolve(&self, wb: &WeakBlock) -> Option<&WeakBlock> {
        self.nodes.get(&wb.hash)
    }

    /// The underlying node of `wb`, `None` for roots and unknown nodes.
    pub fn underlying_of(&self, wb: &WeakBlock) -> Option<&WeakBlock> {
        let node = self.resolve(wb)?;
        node.underlying.and_then(|h| self.nodes.get(&h))
    }

    /// Iterate `wb` and its ancestors, nearest first.
    ///
    /// Bounded by the node count so a corrupted parent relation cannot
    /// loop forever.
    pub(crate) fn lineage<'a>(&'a self, wb: &'a WeakBlock) -> impl Iterator<Item = &'a WeakBlock> {
        let limit = self.nodes.len() + 1;
        std::iter::successors(Some(wb), move |n| {
            n.underlying.and_then(|h| self.nodes.get(&h))
        })
        .take(limit)
    }

    /// True iff `ancestor` is `wb` itself or lies on its underlying chain.
    pub fn extends(&self, wb: &WeakBlock, ancestor: &WeakBlock) -> bool {
        let Some(start) = self.resolve(wb) else {
            return false;
        };
        if !self.nodes.contains_key(&ancestor.hash) {
            return false;
        }
        self.lineage(start).any(|n| n.hash == ancestor.hash)
    }

    /// Weight of a stored node, `-1` for unknown nodes.
    pub fn height(&self, wb: &WeakBlock) -> i64 {
        self.resolve(wb).map_or(-1, |n| n.weight as i64)
    }

    /// Non-coinbase txids of `wb`, inherited prefix first.
    pub(crate) fn body_of(&self, wb: &WeakBlock) -> Vec<TxId> {
        let segments: Vec<&[TxId]> = self.lineage(wb).map(|n| n.appended()).collect();
        let mut body = Vec::with_capacity(wb.body_len);
        for segment in segments.into_iter().rev() {
            body.extend_from_slice(segment);
        }
        body
    }

    /// Full txid list of `wb`, coinbase first.
    pub fn txids_of(&self, wb: &WeakBlock) -> Vec<TxId> {
        let mut ids = Vec::with_capacity(wb.tx_count());
        ids.push(wb.coinbase);
        ids.extend(self.body_of(wb));
        ids
    }

    /// Reassemble the full block for a stored node.
    pub fn block_for(&self, wb: &WeakBlock) -> Option<Block> {
        let node = self.resolve(wb)?;
        let transactions = self
            .txids_of(node)
            .iter()
            .map(|id| self.txs.get(id).cloned())
            .collect::<Option<Vec<_>>>()?;
        Some(Block::new(node.header, transactions))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct transactions held.
    pub fn transaction_count(&self) -> usize {
        self.txs.len()
    }

    /// Number of stored weak blocks containing `txid`.
    pub fn confirmations(&self, txid: &TxId) -> usize {
        self.txs.confirmations(txid)
    }

    /// Nodes in arrival order.
    pub fn iter_chronological(&self) -> impl Iterator<Item = &WeakBlock> {
        self.arrivals.values().filter_map(|h| self.nodes.get(h))
    }

    pub(crate) fn has_children(&self, hash: &Hash) -> bool {
        self.children.get(hash).is_some_and(|c| !c.is_empty())
    }

    /// Nodes without children, in arrival order.
    pub fn chain_tips(&self) -> Vec<ChainTip> {
        self.iter_chronological()
            .filter(|n| !self.has_children(&n.hash))
            .map(|n| ChainTip {
                hash: n.hash,
                weight: n.weight,
            })
            .collect()
    }

    /// Heaviest tip, earliest arrival among equals.
    pub fn longest_tip(&self) -> Option<&WeakBlock> {
        self.selector.best().and_then(|h| self.nodes.get(&h))
    }

    /// Every node with its full transaction count, in arrival order.
    pub fn arrival_sizes(&self) -> Vec<(Hash, usize)> {
        self.iter_chronological()
            .map(|n| (n.hash, n.tx_count()))
            .collect()
    }

    pub fn stats(&self) -> WeakStats {
        WeakStats {
            known_weakblocks: self.len(),
            known_transactions: self.transaction_count(),
            chain_tips: self.chain_tips().len(),
            max_height: self.longest_tip().map_or(-1, |n| n.weight as i64),
        }
    }

    /// The most recently stored weak block that `block` could declare as its
    /// underlying block.
    ///
    /// Only the latest arrival is considered. If `block` itself is already
    /// stored, the node that arrived just before it is tried instead, so a
    /// block never stacks onto itself or onto a later copy of its own
    /// transaction set.
    pub fn builds_on(&self, block: &Block) -> Option<&WeakBlock> {
        if block.transactions.len() < 2 {
            return None;
        }
        let hash = block.hash();
        let candidate = match self.nodes.get(&hash) {
            Some(own) => self.arrivals.range(..own.arrival).next_back(),
            None => self.arrivals.iter().next_back(),
        };
        let underlying = self.nodes.get(candidate?.1)?;
        if underlying.hash == hash {
            return None;
        }

        let txids: Vec<TxId> = block.transactions.iter().map(Transaction::txid).collect();
        corroborate(&underlying.hash, &self.body_of(underlying), &txids).ok()?;
        Some(underlying)
    }

    // =========================================================================
    // PURGE
    // =========================================================================

    /// Remove every node matching `predicate` that no surviving node builds
    /// on. Matching nodes with surviving descendants stay until a later pass.
    pub fn purge_where<F>(&mut self, predicate: F) -> PurgeOutcome
    where
        F: Fn(&WeakBlock) -> bool,
    {
        let mut candidates: Vec<(u64, Hash)> = self
            .nodes
            .values()
            .filter(|n| predicate(*n))
            .map(|n| (n.arrival, n.hash))
            .collect();
        // Children always arrive after their underlying block, so newest
        // first visits descendants before ancestors.
        candidates.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        let mut outcome = PurgeOutcome::default();
        let mut lost_best = false;
        for (_, hash) in candidates {
            if self.has_children(&hash) {
                outcome.deferred += 1;
                continue;
            }
            if let Some(freed) = self.remove_leaf(&hash) {
                outcome.removed += 1;
                outcome.freed_transactions += freed;
                lost_best |= self.selector.invalidate(&hash);
            }
        }

        if lost_best {
            self.selector.recompute(self.nodes.values());
        }
        outcome
    }

    /// Purge nodes whose age in arrivals exceeds `max_age`.
    ///
    /// Age counts the arrivals since (and including) the node's own, so it
    /// is at least 1 and `max_age == 0` purges everything.
    pub fn purge_old(&mut self, max_age: u64) -> PurgeOutcome {
        let now = self.next_arrival;
        self.purge_where(|n| now - n.arrival > max_age)
    }

    /// Purge nodes received strictly before `cutoff` (time source units).
    pub fn purge_received_before(&mut self, cutoff: u64) -> PurgeOutcome {
        self.purge_where(|n| n.received_at < cutoff)
    }

    /// Remove a childless node. Returns the number of freed tx records.
    fn remove_leaf(&mut self, hash: &Hash) -> Option<usize> {
        let full = {
            let node = self.nodes.get(hash)?;
            self.txids_of(node)
        };
        let node = self.nodes.remove(hash)?;

        for txid in &full {
            self.txs.unconfirm(txid);
        }
        let mut freed = usize::from(self.txs.release(&node.coinbase));
        for txid in node.appended.iter() {
            freed += usize::from(self.txs.release(txid));
        }

        if let Some(parent) = node.underlying {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|c| c != hash);
                if siblings.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
        self.children.remove(hash);
        self.arrivals.remove(&node.arrival);
        Some(freed)
    }

    /// Drop everything. The arrival counter keeps running.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.children.clear();
        self.arrivals.clear();
        self.txs.clear();
        self.selector.clear();
    }
}
