//! # Weak Blocks (qc-18)
//!
//! In-memory store of weak blocks: candidate blocks below full difficulty
//! that peers exchange to pre-propagate the transaction set of the next
//! block. Each weak block may declare another, previously seen weak block
//! as its underlying block and reuse that block's transactions, so a chain
//! of near-identical candidates is stored as a sequence of deltas.
//!
//! ## Extension Claims
//!
//! A weak block declares its underlying block in the first output script of
//! its coinbase:
//!
//! ```text
//! OP_RETURN | push 34 | "WB" | underlying hash (32 bytes, internal order)
//! ```
//!
//! A claim is only accepted when the underlying block is known and the
//! candidate's transactions start with the underlying block's transactions
//! (coinbase excluded), in order.
//!
//! ## Store Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Forest | Every underlying chain terminates at a root |
//! | Unique | A hash is stored at most once; re-insertion is a no-op failure |
//! | Weight | `weight(child) = weight(underlying) + 1 + appended txs` |
//! | Tips | Tips are exactly the nodes without children |
//! | Shared storage | Each distinct transaction is held once |
//! | Atomic | A rejected candidate leaves the store unchanged |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - DAG store, claim decoding, consistency checker
//! - `ports/` - `WeakBlockApi` (inbound), `TimeSource` (outbound)
//! - `adapters/` - system clock
//! - `service/` - thread-safe `WeakBlockService`
//! - `rpc` - JSON views (feature `rpc`)
//!
//! ## Usage
//!
//! ```ignore
//! use qc_18_weak_blocks::{WeakBlockApi, WeakBlockService, WeakBlocksConfig};
//!
//! let service = WeakBlockService::with_system_time(WeakBlocksConfig::from_env()?)?;
//! if service.store_weakblock(&block) {
//!     let tip = service.get_weak_longest_chain_tip();
//! }
//! service.purge_old_weakblocks(100);
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;
#[cfg(feature = "rpc")]
pub mod rpc;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

pub use adapters::SystemTimeSource;
pub use config::{ConfigError, WeakBlocksConfig};
pub use domain::{
    extension_claim_script, extract_claim, ChainTip, ConsistencyViolation, PurgeOutcome,
    WeakBlock, WeakBlockStore, WeakStats,
};
pub use events::{WeakBlockError, WeakBlockResult};
pub use ports::{TimeSource, Timestamp, WeakBlockApi};
#[cfg(feature = "rpc")]
pub use rpc::{WeakBlockRpcHandler, WeakStatsView};
pub use service::WeakBlockService;
