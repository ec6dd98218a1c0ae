//! # Weak Block Store Invariants
//!
//! A full diagnostic pass over the store. Every check recomputes the
//! expected state from the node set alone and compares it with the
//! incrementally maintained indexes.
//!
//! Not for the hot path: cost is linear in the total size of all
//! materialized transaction lists.

use super::selector::TipKey;
use super::store::WeakBlockStore;
use shared_types::{Hash, TxId};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A broken structural invariant. Always indicates a bug in the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyViolation {
    #[error("Node stored under {key:?} has hash {node:?}")]
    KeyMismatch { key: Hash, node: Hash },

    #[error("Node {node:?} names unknown underlying {underlying:?}")]
    DanglingUnderlying { node: Hash, underlying: Hash },

    #[error("Underlying chain of {node:?} does not terminate at a root")]
    Cycle { node: Hash },

    #[error("Node {node:?} arrived before its underlying block")]
    ArrivalBeforeUnderlying { node: Hash },

    #[error("Node {node:?} has weight {actual}, expected {expected}")]
    WeightMismatch {
        node: Hash,
        expected: u64,
        actual: u64,
    },

    #[error("Node {node:?} has body length {actual}, expected {expected}")]
    BodyLengthMismatch {
        node: Hash,
        expected: usize,
        actual: usize,
    },

    #[error("Child index of {parent:?} is wrong")]
    ChildIndexMismatch { parent: Hash },

    #[error("Tip set does not match the nodes without children")]
    TipSetMismatch,

    #[error("Arrival index entry {arrival} is inconsistent with the node set")]
    ArrivalIndexMismatch { arrival: u64 },

    #[error("Arrival counter {next} is not past every recorded arrival")]
    ArrivalCounterBehind { next: u64 },

    #[error("Transaction {txid:?} is referenced but not stored")]
    MissingTransaction { txid: TxId },

    #[error("Stored transaction {txid:?} hashes to a different id")]
    TxIdMismatch { txid: TxId },

    #[error("Transaction {txid:?} has {actual} owners, expected {expected}")]
    RefCountMismatch {
        txid: TxId,
        expected: usize,
        actual: usize,
    },

    #[error("Transaction {txid:?} has {actual} confirmations, expected {expected}")]
    ConfirmationMismatch {
        txid: TxId,
        expected: usize,
        actual: usize,
    },

    #[error("Longest tip is {actual:?}, expected {expected:?}")]
    LongestTipMismatch {
        expected: Option<Hash>,
        actual: Option<Hash>,
    },

    #[error("Store is not empty: {what}")]
    NotEmpty { what: &'static str },
}

impl WeakBlockStore {
    /// Verify every structural invariant.
    pub fn check_consistency(&self) -> Result<(), ConsistencyViolation> {
        self.check_forest()?;
        self.check_weights()?;
        self.check_children()?;
        self.check_arrivals()?;
        self.check_transactions()?;
        self.check_longest_tip()
    }

    /// Verify that every index is empty.
    pub fn check_empty(&self) -> Result<(), ConsistencyViolation> {
        let checks = [
            (self.nodes.is_empty(), "nodes"),
            (self.children.is_empty(), "children"),
            (self.arrivals.is_empty(), "arrivals"),
            (self.txs.is_empty(), "transactions"),
            (self.selector.best().is_none(), "longest tip"),
        ];
        for (empty, what) in checks {
            if !empty {
                return Err(ConsistencyViolation::NotEmpty { what });
            }
        }
        Ok(())
    }

    fn check_forest(&self) -> Result<(), ConsistencyViolation> {
        for (key, node) in &self.nodes {
            if *key != node.hash {
                return Err(ConsistencyViolation::KeyMismatch {
                    key: *key,
                    node: node.hash,
                });
            }
            if let Some(underlying) = node.underlying {
                let parent = self.nodes.get(&underlying).ok_or(
                    ConsistencyViolation::DanglingUnderlying {
                        node: node.hash,
                        underlying,
                    },
                )?;
                if parent.arrival >= node.arrival {
                    return Err(ConsistencyViolation::ArrivalBeforeUnderlying { node: node.hash });
                }
            }
            let ends_at_root = self
                .lineage(node)
                .last()
                .is_some_and(|n| n.underlying.is_none());
            if !ends_at_root {
                return Err(ConsistencyViolation::Cycle { node: node.hash });
            }
        }
        Ok(())
    }

    fn check_weights(&self) -> Result<(), ConsistencyViolation> {
        for node in self.nodes.values() {
            let (base_weight, base_len) = node
                .underlying
                .and_then(|h| self.nodes.get(&h))
                .map_or((0, 0), |p| (p.weight, p.body_len));

            let expected = base_weight + 1 + node.appended.len() as u64;
            if node.weight != expected {
                return Err(ConsistencyViolation::WeightMismatch {
                    node: node.hash,
                    expected,
                    actual: node.weight,
                });
            }
            let expected = base_len + node.appended.len();
            if node.body_len != expected {
                return Err(ConsistencyViolation::BodyLengthMismatch {
                    node: node.hash,
                    expected,
                    actual: node.body_len,
                });
            }
        }
        Ok(())
    }

    fn check_children(&self) -> Result<(), ConsistencyViolation> {
        let mut expected: HashMap<Hash, HashSet<Hash>> = HashMap::new();
        for node in self.nodes.values() {
            if let Some(parent) = node.underlying {
                expected.entry(parent).or_default().insert(node.hash);
            }
        }

        for (parent, kids) in &self.children {
            let unique: HashSet<Hash> = kids.iter().copied().collect();
            let matches = unique.len() == kids.len()
                && expected.get(parent).is_some_and(|e| *e == unique);
            if !matches {
                return Err(ConsistencyViolation::ChildIndexMismatch { parent: *parent });
            }
        }
        if let Some(parent) = expected.keys().find(|p| !self.children.contains_key(*p)) {
            return Err(ConsistencyViolation::ChildIndexMismatch { parent: *parent });
        }

        let tips: HashSet<Hash> = self.chain_tips().iter().map(|t| t.hash).collect();
        let leaves: HashSet<Hash> = self
            .nodes
            .keys()
            .filter(|h| !expected.contains_key(*h))
            .copied()
            .collect();
        if tips != leaves {
            return Err(ConsistencyViolation::TipSetMismatch);
        }
        Ok(())
    }

    fn check_arrivals(&self) -> Result<(), ConsistencyViolation> {
        for (arrival, hash) in &self.arrivals {
            let consistent = self.nodes.get(hash).is_some_and(|n| n.arrival == *arrival);
            if !consistent {
                return Err(ConsistencyViolation::ArrivalIndexMismatch { arrival: *arrival });
            }
        }
        if self.arrivals.len() != self.nodes.len() {
            let arrival = self.arrivals.keys().next_back().copied().unwrap_or_default();
            return Err(ConsistencyViolation::ArrivalIndexMismatch { arrival });
        }
        if let Some(last) = self.arrivals.keys().next_back() {
            if *last >= self.next_arrival {
                return Err(ConsistencyViolation::ArrivalCounterBehind {
                    next: self.next_arrival,
                });
            }
        }
        Ok(())
    }

    fn check_transactions(&self) -> Result<(), ConsistencyViolation> {
        let mut refs: HashMap<TxId, usize> = HashMap::new();
        let mut confirmations: HashMap<TxId, usize> = HashMap::new();
        for node in self.nodes.values() {
            for txid in std::iter::once(&node.coinbase).chain(node.appended.iter()) {
                *refs.entry(*txid).or_default() += 1;
            }
            for txid in self.txids_of(node) {
                *confirmations.entry(txid).or_default() += 1;
            }
        }

        for (txid, expected) in &refs {
            let record = self
                .txs
                .record(txid)
                .ok_or(ConsistencyViolation::MissingTransaction { txid: *txid })?;
            if record.refs != *expected {
                return Err(ConsistencyViolation::RefCountMismatch {
                    txid: *txid,
                    expected: *expected,
                    actual: record.refs,
                });
            }
        }

        for (txid, record) in self.txs.records() {
            if record.tx.txid() != *txid {
                return Err(ConsistencyViolation::TxIdMismatch { txid: *txid });
            }
            if !refs.contains_key(txid) {
                return Err(ConsistencyViolation::RefCountMismatch {
                    txid: *txid,
                    expected: 0,
                    actual: record.refs,
                });
            }
            let expected = confirmations.get(txid).copied().unwrap_or_default();
            if record.confirmations != expected {
                return Err(ConsistencyViolation::ConfirmationMismatch {
                    txid: *txid,
                    expected,
                    actual: record.confirmations,
                });
            }
        }
        Ok(())
    }

    fn check_longest_tip(&self) -> Result<(), ConsistencyViolation> {
        let expected = self
            .nodes
            .values()
            .map(TipKey::of)
            .fold(None, |best: Option<TipKey>, k| match best {
                Some(b) if !k.beats(&b) => Some(b),
                _ => Some(k),
            })
            .map(|k| k.hash);
        let actual = self.selector.best();
        if expected != actual {
            return Err(ConsistencyViolation::LongestTipMismatch { expected, actual });
        }
        Ok(())
    }
}
