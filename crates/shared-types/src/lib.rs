//! # Shared Types Crate
//!
//! Chain primitives shared across subsystems: hashes, block headers,
//! transactions and blocks.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Cross-subsystem primitives are defined here.
//! - **Opaque Identity**: Consumers treat `Block::hash()` as the block's
//!   identifier and never re-validate proof-of-work.

pub mod entities;

pub use entities::*;
