//! # Domain Layer for Weak Blocks
//!
//! Pure, synchronous weak block DAG logic. No I/O, no locking, no clock.
//!
//! ## Contents
//!
//! - **entities**: `WeakBlock`, `ChainTip`, `WeakStats`
//! - **claim**: extension claim encoding and prefix corroboration
//! - **store**: the DAG store (insert, queries, purge)
//! - **invariants**: full structural consistency checker
//!
//! Transaction storage (`arena`) and longest tip tracking (`selector`) are
//! internal to the store.

mod arena;
mod claim;
mod entities;
mod invariants;
mod selector;
mod store;

pub use claim::*;
pub use entities::*;
pub use invariants::ConsistencyViolation;
pub use store::{PurgeOutcome, WeakBlockStore};
