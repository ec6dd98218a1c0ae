//! # Core Domain Entities
//!
//! Proof-of-work chain primitives consumed by the node subsystems.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash`, `TxId`, display/internal byte-order helpers
//! - **Chain**: `BlockHeader`, `Transaction` (`TxIn`, `TxOut`), `Block`
//!
//! Identities are double SHA-256 over a fixed little-endian field encoding.
//! Hashes are kept in internal byte order; the human-readable hex form is
//! byte-reversed, matching the usual block explorer convention.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte hash in internal byte order.
pub type Hash = [u8; 32];

/// Transaction identifier.
pub type TxId = Hash;

/// The all-zero hash, used as the "null" identifier.
pub const NULL_HASH: Hash = [0u8; 32];

/// Double SHA-256.
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Render a hash in display order (byte-reversed hex).
pub fn hash_to_hex(hash: &Hash) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Parse a display-order hex string into an internal-order hash.
///
/// Returns `None` unless the input is exactly 64 hex characters.
pub fn hash_from_hex(s: &str) -> Option<Hash> {
    let bytes = hex::decode(s).ok()?;
    let mut hash: Hash = bytes.try_into().ok()?;
    hash.reverse();
    Some(hash)
}

/// Returns true for the all-zero hash.
pub fn is_null_hash(hash: &Hash) -> bool {
    hash == &NULL_HASH
}

// =============================================================================
// CLUSTER B: THE CHAIN
// =============================================================================

/// The header of a proof-of-work block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Block format version.
    pub version: i32,
    /// Hash of the previous block in the strong chain.
    pub prev_block_hash: Hash,
    /// Merkle root committing to the transaction list.
    pub merkle_root: Hash,
    /// Unix timestamp in seconds.
    pub timestamp: u32,
    /// Compact difficulty target.
    pub bits: u32,
    /// Miner nonce.
    pub nonce: u32,
}

impl BlockHeader {
    /// Double SHA-256 of the 80-byte header encoding.
    pub fn hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(80);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.prev_block_hash);
        buf.extend_from_slice(&self.merkle_root);
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.bits.to_le_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        double_sha256(&buf)
    }
}

/// Reference to an output of an earlier transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct OutPoint {
    pub txid: TxId,
    pub vout: u32,
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TxIn {
    pub prev_out: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

/// A transaction output with its raw locking script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TxOut {
    /// Amount in base units.
    pub value: u64,
    /// Raw output script bytes.
    pub script_pubkey: Vec<u8>,
}

/// A UTXO-style transaction.
///
/// The first transaction of a block is its coinbase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    /// Compute the transaction id.
    pub fn txid(&self) -> TxId {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_le_bytes());
        write_len(&mut buf, self.inputs.len());
        for input in &self.inputs {
            buf.extend_from_slice(&input.prev_out.txid);
            buf.extend_from_slice(&input.prev_out.vout.to_le_bytes());
            write_len(&mut buf, input.script_sig.len());
            buf.extend_from_slice(&input.script_sig);
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }
        write_len(&mut buf, self.outputs.len());
        for output in &self.outputs {
            buf.extend_from_slice(&output.value.to_le_bytes());
            write_len(&mut buf, output.script_pubkey.len());
            buf.extend_from_slice(&output.script_pubkey);
        }
        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        double_sha256(&buf)
    }

    /// The first output's script, if any.
    pub fn first_output_script(&self) -> Option<&[u8]> {
        self.outputs.first().map(|o| o.script_pubkey.as_slice())
    }
}

fn write_len(buf: &mut Vec<u8>, len: usize) {
    buf.extend_from_slice(&(len as u64).to_le_bytes());
}

/// A full block: header plus ordered transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// Block identity (the header hash).
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// The coinbase transaction, if the block has any transactions.
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first()
    }
}
