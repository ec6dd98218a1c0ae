//! Shared transaction storage.
//!
//! Every distinct transaction appearing in a stored weak block is kept
//! exactly once, keyed by txid. Two counters are kept per record:
//!
//! - `refs`: how many nodes own the txid in their own segment (coinbase or
//!   appended). The record is dropped when this reaches zero.
//! - `confirmations`: how many nodes contain the txid anywhere in their
//!   full transaction list.

use shared_types::{Transaction, TxId};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub(crate) struct TxRecord {
    pub(crate) tx: Transaction,
    pub(crate) refs: usize,
    pub(crate) confirmations: usize,
}

#[derive(Debug, Default)]
pub(crate) struct TxArena {
    records: HashMap<TxId, TxRecord>,
}

impl TxArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Take an ownership reference on `txid`, inserting the transaction if
    /// it is not stored yet.
    pub(crate) fn retain(&mut self, txid: TxId, tx: &Transaction) {
        self.records
            .entry(txid)
            .or_insert_with(|| TxRecord {
                tx: tx.clone(),
                refs: 0,
                confirmations: 0,
            })
            .refs += 1;
    }

    /// Drop an ownership reference. Returns true if the record was freed.
    pub(crate) fn release(&mut self, txid: &TxId) -> bool {
        let Some(record) = self.records.get_mut(txid) else {
            return false;
        };
        record.refs = record.refs.saturating_sub(1);
        if record.refs == 0 {
            self.records.remove(txid);
            true
        } else {
            false
        }
    }

    pub(crate) fn confirm(&mut self, txid: &TxId) {
        if let Some(record) = self.records.get_mut(txid) {
            record.confirmations += 1;
        }
    }

    pub(crate) fn unconfirm(&mut self, txid: &TxId) {
        if let Some(record) = self.records.get_mut(txid) {
            record.confirmations = record.confirmations.saturating_sub(1);
        }
    }

    pub(crate) fn get(&self, txid: &TxId) -> Option<&Transaction> {
        self.records.get(txid).map(|r| &r.tx)
    }

    pub(crate) fn record(&self, txid: &TxId) -> Option<&TxRecord> {
        self.records.get(txid)
    }

    pub(crate) fn confirmations(&self, txid: &TxId) -> usize {
        self.records.get(txid).map_or(0, |r| r.confirmations)
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = (&TxId, &TxRecord)> {
        self.records.iter()
    }

    /// Number of distinct stored transactions.
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    #[cfg(test)]
    pub(crate) fn record_mut(&mut self, txid: &TxId) -> Option<&mut TxRecord> {
        self.records.get_mut(txid)
    }
}
