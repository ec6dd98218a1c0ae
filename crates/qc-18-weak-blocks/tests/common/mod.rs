//! Shared builders for weak block scenario tests.

#![allow(dead_code)]

use qc_18_weak_blocks::{extension_claim_script, TimeSource, WeakBlockService, WeakBlocksConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{Block, BlockHeader, Hash, OutPoint, Transaction, TxIn, TxOut, NULL_HASH};

pub struct ConstantTime(pub u64);

impl TimeSource for ConstantTime {
    fn now(&self) -> u64 {
        self.0
    }
}

pub fn make_service() -> WeakBlockService<ConstantTime> {
    WeakBlockService::new(WeakBlocksConfig::default(), ConstantTime(1_700_000_000))
        .expect("default config is valid")
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn random_tx(rng: &mut StdRng) -> Transaction {
    Transaction {
        version: 2,
        inputs: vec![TxIn {
            prev_out: OutPoint {
                txid: rng.gen(),
                vout: rng.gen_range(0..8),
            },
            script_sig: rng.gen::<[u8; 16]>().to_vec(),
            sequence: 0xffff_fffe,
        }],
        outputs: vec![TxOut {
            value: rng.gen_range(546..100_000_000),
            script_pubkey: rng.gen::<[u8; 22]>().to_vec(),
        }],
        lock_time: 0,
    }
}

fn coinbase(rng: &mut StdRng, underlying: Option<Hash>) -> Transaction {
    let mut outputs: Vec<TxOut> = underlying
        .iter()
        .map(|h| TxOut {
            value: 0,
            script_pubkey: extension_claim_script(h),
        })
        .collect();
    outputs.push(TxOut {
        value: 1_250_000_000,
        script_pubkey: rng.gen::<[u8; 25]>().to_vec(),
    });
    Transaction {
        version: 2,
        inputs: vec![TxIn {
            prev_out: OutPoint {
                txid: NULL_HASH,
                vout: u32::MAX,
            },
            script_sig: rng.gen::<[u8; 12]>().to_vec(),
            sequence: u32::MAX,
        }],
        outputs,
        lock_time: 0,
    }
}

/// Build a weak block with `new_txs` fresh transactions, optionally extending
/// `underlying`. The header carries a random merkle root so every block has a
/// distinct hash.
pub fn make_block(rng: &mut StdRng, underlying: Option<&Block>, new_txs: usize) -> Block {
    let mut transactions = vec![coinbase(rng, underlying.map(Block::hash))];
    if let Some(under) = underlying {
        transactions.extend(under.transactions.iter().skip(1).cloned());
    }
    transactions.extend((0..new_txs).map(|_| random_tx(rng)));

    let header = BlockHeader {
        version: 0x2000_0000,
        prev_block_hash: NULL_HASH,
        merkle_root: rng.gen(),
        timestamp: 1_700_000_000,
        bits: 0x1d00_ffff,
        nonce: rng.gen(),
    };
    Block::new(header, transactions)
}

/// Insert `blocks` repeatedly until every one is stored, re-queueing those
/// rejected because their underlying block is not stored yet.
///
/// Returns the order in which blocks were accepted.
pub fn store_with_retries(service: &WeakBlockService<ConstantTime>, blocks: Vec<Block>) -> Vec<Hash> {
    use qc_18_weak_blocks::WeakBlockApi;

    let mut queue = std::collections::VecDeque::from(blocks);
    let mut accepted = Vec::new();
    let mut misses = 0;
    while let Some(block) = queue.pop_front() {
        if service.store_weakblock(&block) {
            accepted.push(block.hash());
            misses = 0;
        } else {
            misses += 1;
            assert!(misses <= queue.len() + 1, "no progress storing weak blocks");
            queue.push_back(block);
        }
        service.weakblocks_consistency_check();
    }
    accepted
}
