//! Error types for the Weak Blocks subsystem.

use shared_types::Hash;
use thiserror::Error;

/// Reasons a candidate weak block is not stored.
///
/// All of these are triggered by external input and leave the store
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeakBlockError {
    #[error("Weak blocks are disabled")]
    Disabled,

    #[error("Block has no transactions")]
    EmptyBlock,

    #[error("Weak block already known: {0:?}")]
    Duplicate(Hash),

    #[error("Claimed underlying weak block is unknown: {0:?}")]
    UnknownUnderlying(Hash),

    #[error("Block has {have} transactions, extending {underlying:?} needs at least {need}")]
    TooShort {
        underlying: Hash,
        have: usize,
        need: usize,
    },

    #[error("Transaction at position {position} does not match underlying {underlying:?}")]
    PrefixMismatch { underlying: Hash, position: usize },
}

/// Result type for weak block operations.
pub type WeakBlockResult<T> = Result<T, WeakBlockError>;
