//! # Weak Block Service
//!
//! Thread-safe facade over the weak block DAG store.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `WeakBlockApi` on top of `WeakBlockStore`
//! 2. Serializes mutations behind a single `RwLock`; queries share the read lock
//! 3. Stamps accepted blocks with the injected `TimeSource`
//! 4. Turns consistency violations into panics

mod api;

use crate::adapters::SystemTimeSource;
use crate::config::{ConfigError, WeakBlocksConfig};
use crate::domain::{ConsistencyViolation, PurgeOutcome, WeakBlock, WeakBlockStore, WeakStats};
use crate::events::{WeakBlockError, WeakBlockResult};
use crate::ports::outbound::TimeSource;
use parking_lot::RwLock;
use shared_types::{hash_to_hex, Block, Hash};

/// Abbreviated display hash for log lines.
pub(crate) fn short_hash(hash: &Hash) -> String {
    let mut hex = hash_to_hex(hash);
    hex.truncate(16);
    hex
}

/// The Weak Block Service.
pub struct WeakBlockService<TS: TimeSource> {
    pub(crate) store: RwLock<WeakBlockStore>,
    pub(crate) config: WeakBlocksConfig,
    pub(crate) time_source: TS,
}

impl WeakBlockService<SystemTimeSource> {
    /// Create a service stamping blocks with the system clock.
    pub fn with_system_time(config: WeakBlocksConfig) -> Result<Self, ConfigError> {
        Self::new(config, SystemTimeSource)
    }
}

impl<TS: TimeSource> WeakBlockService<TS> {
    /// Create a new service. Fails if the configuration is inconsistent.
    pub fn new(config: WeakBlocksConfig, time_source: TS) -> Result<Self, ConfigError> {
        config.validate()?;
        if !config.enabled {
            tracing::warn!("[qc-18] Weak blocks are disabled, candidates will be ignored");
        }
        Ok(Self {
            store: RwLock::new(WeakBlockStore::new()),
            config,
            time_source,
        })
    }

    pub fn config(&self) -> &WeakBlocksConfig {
        &self.config
    }

    /// Store a candidate and report why it was rejected.
    pub fn try_store_weakblock(&self, block: &Block) -> WeakBlockResult<WeakBlock> {
        if !self.config.enabled {
            tracing::warn!(
                "[qc-18] Ignoring weak block {}: weak blocks are disabled",
                short_hash(&block.hash())
            );
            return Err(WeakBlockError::Disabled);
        }

        let received_at = self.time_source.now();
        let mut store = self.store.write();
        let stored = store.insert(block, received_at)?.clone();
        tracing::debug!(
            "[qc-18] Tracking weak block {} of {} transactions (weight {}, {} blocks, {} txs known)",
            short_hash(&stored.hash()),
            stored.tx_count(),
            stored.weight(),
            store.len(),
            store.transaction_count()
        );

        if store.longest_tip().map(WeakBlock::hash) == Some(stored.hash()) {
            tracing::info!(
                "[qc-18] New longest weak chain tip {} at weight {}",
                short_hash(&stored.hash()),
                stored.weight()
            );
        }
        Ok(stored)
    }

    /// Purge every node matching `predicate` that no surviving node builds on.
    pub fn purge_where<F>(&self, predicate: F) -> PurgeOutcome
    where
        F: Fn(&WeakBlock) -> bool,
    {
        let mut store = self.store.write();
        let outcome = store.purge_where(predicate);
        Self::log_purge(&store, &outcome);
        outcome
    }

    fn log_purge(store: &WeakBlockStore, outcome: &PurgeOutcome) {
        if outcome.removed == 0 && outcome.deferred == 0 {
            return;
        }
        tracing::info!(
            "[qc-18] Purged {} weak blocks ({} deferred, {} txs freed), {} blocks and {} txs remain",
            outcome.removed,
            outcome.deferred,
            outcome.freed_transactions,
            store.len(),
            store.transaction_count()
        );
        match store.longest_tip() {
            Some(tip) => tracing::info!(
                "[qc-18] Longest weak chain tip is {} at weight {}",
                short_hash(&tip.hash()),
                tip.weight()
            ),
            None => tracing::info!("[qc-18] No weak chain tip left"),
        }
    }

    /// Non-fatal variant of `weakblocks_consistency_check`.
    pub fn check_consistency(&self) -> Result<(), ConsistencyViolation> {
        self.store.read().check_consistency()
    }
}
