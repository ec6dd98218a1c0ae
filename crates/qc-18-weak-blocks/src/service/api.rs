//! # Weak Block API Implementation

use super::*;
use crate::domain::ChainTip;
use crate::ports::inbound::WeakBlockApi;
use shared_types::{TxId, NULL_HASH};

impl<TS: TimeSource> WeakBlockApi for WeakBlockService<TS> {
    fn store_weakblock(&self, block: &Block) -> bool {
        match self.try_store_weakblock(block) {
            Ok(_) => true,
            Err(WeakBlockError::Disabled) => false,
            Err(e) => {
                tracing::debug!(
                    "[qc-18] Rejected weak block {}: {}",
                    short_hash(&block.hash()),
                    e
                );
                false
            }
        }
    }

    fn get_weakblock(&self, hash: &Hash) -> Option<WeakBlock> {
        self.store.read().get(hash).cloned()
    }

    fn is_known_weakblock(&self, hash: &Hash) -> bool {
        self.store.read().contains(hash)
    }

    fn block_for_weak(&self, wb: Option<&WeakBlock>) -> Option<Block> {
        self.store.read().block_for(wb?)
    }

    fn hash_for_weak(&self, wb: Option<&WeakBlock>) -> Hash {
        wb.map_or(NULL_HASH, WeakBlock::hash)
    }

    fn underlying_weak(&self, wb: Option<&WeakBlock>) -> Option<WeakBlock> {
        self.store.read().underlying_of(wb?).cloned()
    }

    fn weak_extends(&self, wb: Option<&WeakBlock>, ancestor: Option<&WeakBlock>) -> bool {
        match (wb, ancestor) {
            (Some(wb), Some(ancestor)) => self.store.read().extends(wb, ancestor),
            _ => false,
        }
    }

    fn weak_height(&self, wb: Option<&WeakBlock>) -> i64 {
        wb.map_or(-1, |wb| self.store.read().height(wb))
    }

    fn num_known_weakblocks(&self) -> usize {
        self.store.read().len()
    }

    fn num_known_weakblock_transactions(&self) -> usize {
        self.store.read().transaction_count()
    }

    fn weak_chain_tips(&self) -> Vec<ChainTip> {
        self.store.read().chain_tips()
    }

    fn get_weak_longest_chain_tip(&self) -> Option<WeakBlock> {
        self.store.read().longest_tip().cloned()
    }

    fn weak_tip_tx_count(&self) -> i64 {
        self.store
            .read()
            .longest_tip()
            .map_or(-1, |tip| tip.tx_count() as i64)
    }

    fn weak_confirmations(&self, txid: &TxId) -> usize {
        self.store.read().confirmations(txid)
    }

    fn weak_stats(&self) -> Vec<(Hash, usize)> {
        self.store.read().arrival_sizes()
    }

    fn weak_stats_summary(&self) -> WeakStats {
        self.store.read().stats()
    }

    fn builds_on_weak(&self, block: &Block) -> Option<WeakBlock> {
        let store = self.store.read();
        let found = store.builds_on(block).cloned();
        tracing::debug!(
            "[qc-18] Block {} builds on weak block: {}",
            short_hash(&block.hash()),
            found
                .as_ref()
                .map_or_else(|| "none".to_string(), |wb| short_hash(&wb.hash()))
        );
        found
    }

    fn purge_old_weakblocks(&self, max_age: u64) -> usize {
        let mut store = self.store.write();
        let outcome = store.purge_old(max_age);
        Self::log_purge(&store, &outcome);
        outcome.removed
    }

    fn purge_weakblocks_received_before(&self, cutoff: u64) -> usize {
        let mut store = self.store.write();
        let outcome = store.purge_received_before(cutoff);
        Self::log_purge(&store, &outcome);
        outcome.removed
    }

    fn reset_weakblocks(&self) {
        self.store.write().reset();
        tracing::info!("[qc-18] Weak block store reset");
    }

    fn weakblocks_consistency_check(&self) {
        if let Err(violation) = self.store.read().check_consistency() {
            tracing::error!("[qc-18] Weak block store is inconsistent: {}", violation);
            panic!("weak block store is inconsistent: {violation}");
        }
    }

    fn weakblocks_empty_check(&self) {
        if let Err(violation) = self.store.read().check_empty() {
            tracing::error!("[qc-18] Weak block store is not empty: {}", violation);
            panic!("weak block store is not empty: {violation}");
        }
    }
}
