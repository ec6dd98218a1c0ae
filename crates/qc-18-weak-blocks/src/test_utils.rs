//! Deterministic builders for unit tests.

use crate::domain::extension_claim_script;
use crate::ports::outbound::{TimeSource, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{Block, BlockHeader, Hash, OutPoint, Transaction, TxIn, TxOut, NULL_HASH};
use std::sync::atomic::{AtomicU64, Ordering};

/// Seeded RNG so failures reproduce.
pub struct TestRng(StdRng);

impl TestRng {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedTimeSource {
    timestamp: AtomicU64,
}

impl FixedTimeSource {
    pub fn new(timestamp: u64) -> Self {
        Self {
            timestamp: AtomicU64::new(timestamp),
        }
    }

    pub fn set(&self, timestamp: u64) {
        self.timestamp.store(timestamp, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.timestamp.load(Ordering::SeqCst)
    }
}

fn p2pkh_like(rng: &mut TestRng) -> Vec<u8> {
    let mut script = vec![0x76, 0xa9, 0x14];
    script.extend((0..20).map(|_| rng.0.gen::<u8>()));
    script.extend([0x88, 0xac]);
    script
}

pub fn random_tx(rng: &mut TestRng) -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![TxIn {
            prev_out: OutPoint {
                txid: rng.0.gen(),
                vout: rng.0.gen_range(0..4),
            },
            script_sig: (0..8).map(|_| rng.0.gen()).collect(),
            sequence: u32::MAX,
        }],
        outputs: vec![TxOut {
            value: rng.0.gen_range(1..1_000_000),
            script_pubkey: p2pkh_like(rng),
        }],
        lock_time: 0,
    }
}

fn coinbase(rng: &mut TestRng, claim: Option<&Hash>) -> Transaction {
    let mut outputs = Vec::new();
    if let Some(underlying) = claim {
        outputs.push(TxOut {
            value: 0,
            script_pubkey: extension_claim_script(underlying),
        });
    }
    outputs.push(TxOut {
        value: 50,
        script_pubkey: p2pkh_like(rng),
    });
    Transaction {
        version: 1,
        inputs: vec![TxIn {
            prev_out: OutPoint {
                txid: NULL_HASH,
                vout: u32::MAX,
            },
            script_sig: rng.0.gen::<[u8; 8]>().to_vec(),
            sequence: u32::MAX,
        }],
        outputs,
        lock_time: 0,
    }
}

fn header(rng: &mut TestRng) -> BlockHeader {
    BlockHeader {
        version: 1,
        prev_block_hash: NULL_HASH,
        merkle_root: rng.0.gen(),
        timestamp: 1_500_000_000,
        bits: 0x207f_ffff,
        nonce: rng.0.gen(),
    }
}

/// A root block: plain coinbase plus `new_txs` fresh transactions.
pub fn random_block(rng: &mut TestRng, new_txs: usize) -> Block {
    let mut transactions = vec![coinbase(rng, None)];
    transactions.extend((0..new_txs).map(|_| random_tx(rng)));
    Block::new(header(rng), transactions)
}

/// A block extending `underlying`: claim, inherited body, then `new_txs`.
pub fn random_block_on(rng: &mut TestRng, underlying: &Block, new_txs: usize) -> Block {
    let mut transactions = vec![coinbase(rng, Some(&underlying.hash()))];
    transactions.extend(underlying.transactions.iter().skip(1).cloned());
    transactions.extend((0..new_txs).map(|_| random_tx(rng)));
    Block::new(header(rng), transactions)
}

/// Claims `underlying` but replaces its first inherited transaction.
///
/// `underlying` must carry at least one non-coinbase transaction.
pub fn spoofed_block_on(rng: &mut TestRng, underlying: &Block, new_txs: usize) -> Block {
    let mut block = random_block_on(rng, underlying, new_txs);
    block.transactions[1] = random_tx(rng);
    block
}
