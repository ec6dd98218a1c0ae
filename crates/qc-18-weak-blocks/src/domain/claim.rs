//! Extension claims carried in the coinbase.
//!
//! A weak block declares its underlying block in the first output script of
//! its first transaction:
//!
//! ```text
//! [OP_RETURN 0x6a][push 0x22]['W' 'B'][underlying hash: 32, internal order]
//! ```
//!
//! Decoding only reports intent. Whether the claim is true is decided by
//! [`corroborate`] against the underlying block's transactions.

use crate::events::{WeakBlockError, WeakBlockResult};
use shared_types::{Block, Hash, TxId};

/// Unconditional-discard opcode.
pub const OP_RETURN: u8 = 0x6a;

/// Marker identifying a weak block extension claim.
pub const CLAIM_MAGIC: [u8; 2] = *b"WB";

const PAYLOAD_LEN: usize = CLAIM_MAGIC.len() + 32;

/// Total length of a claim script.
pub const CLAIM_SCRIPT_LEN: usize = 2 + PAYLOAD_LEN;

/// Build the output script declaring `underlying`.
pub fn extension_claim_script(underlying: &Hash) -> Vec<u8> {
    let mut script = Vec::with_capacity(CLAIM_SCRIPT_LEN);
    script.push(OP_RETURN);
    script.push(PAYLOAD_LEN as u8);
    script.extend_from_slice(&CLAIM_MAGIC);
    script.extend_from_slice(underlying);
    script
}

/// Decode a claim script. Anything but the exact claim form is `None`.
pub fn parse_claim_script(script: &[u8]) -> Option<Hash> {
    if script.len() != CLAIM_SCRIPT_LEN {
        return None;
    }
    if script[0] != OP_RETURN || script[1] as usize != PAYLOAD_LEN {
        return None;
    }
    if script[2..4] != CLAIM_MAGIC {
        return None;
    }
    script[4..].try_into().ok()
}

/// The underlying block `block` claims to extend, if any.
pub fn extract_claim(block: &Block) -> Option<Hash> {
    let script = block.coinbase()?.first_output_script()?;
    parse_claim_script(script)
}

/// Check that `candidate` (full txid list, coinbase first) starts with the
/// underlying block's non-coinbase transactions, in order.
///
/// `underlying_body` is the underlying block's txid list without its coinbase.
pub fn corroborate(
    underlying: &Hash,
    underlying_body: &[TxId],
    candidate: &[TxId],
) -> WeakBlockResult<()> {
    let need = underlying_body.len() + 1;
    if candidate.len() < need {
        return Err(WeakBlockError::TooShort {
            underlying: *underlying,
            have: candidate.len(),
            need,
        });
    }

    match underlying_body
        .iter()
        .zip(&candidate[1..need])
        .position(|(a, b)| a != b)
    {
        Some(offset) => Err(WeakBlockError::PrefixMismatch {
            underlying: *underlying,
            position: offset + 1,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{BlockHeader, Transaction, TxOut};

    fn coinbase_with_script(script: Vec<u8>) -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![],
            outputs: vec![TxOut {
                value: 50,
                script_pubkey: script,
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn test_claim_script_layout() {
        let hash = [0xABu8; 32];
        let script = extension_claim_script(&hash);
        assert_eq!(script.len(), CLAIM_SCRIPT_LEN);
        assert_eq!(script[0], OP_RETURN);
        assert_eq!(&script[2..4], b"WB");
        assert_eq!(parse_claim_script(&script), Some(hash));
    }

    #[test]
    fn test_claim_keeps_internal_byte_order() {
        let mut hash = [0u8; 32];
        hash[0] = 0x01;
        hash[31] = 0xFF;
        let script = extension_claim_script(&hash);
        assert_eq!(script[4], 0x01);
        assert_eq!(script[35], 0xFF);
    }

    #[test]
    fn test_malformed_claims_are_ignored() {
        let good = extension_claim_script(&[7u8; 32]);

        let mut wrong_opcode = good.clone();
        wrong_opcode[0] = 0x51;
        assert_eq!(parse_claim_script(&wrong_opcode), None);

        let mut wrong_magic = good.clone();
        wrong_magic[3] = b'X';
        assert_eq!(parse_claim_script(&wrong_magic), None);

        let mut wrong_push = good.clone();
        wrong_push[1] = 0x20;
        assert_eq!(parse_claim_script(&wrong_push), None);

        assert_eq!(parse_claim_script(&good[..good.len() - 1]), None);

        let mut trailing = good;
        trailing.push(0x00);
        assert_eq!(parse_claim_script(&trailing), None);

        assert_eq!(parse_claim_script(&[]), None);
    }

    #[test]
    fn test_extract_claim_from_block() {
        let hash = [3u8; 32];
        let block = Block::new(
            BlockHeader::default(),
            vec![coinbase_with_script(extension_claim_script(&hash))],
        );
        assert_eq!(extract_claim(&block), Some(hash));

        let root = Block::new(
            BlockHeader::default(),
            vec![coinbase_with_script(vec![0xaa])],
        );
        assert_eq!(extract_claim(&root), None);

        let empty = Block::new(BlockHeader::default(), vec![]);
        assert_eq!(extract_claim(&empty), None);

        let no_outputs = Block::new(BlockHeader::default(), vec![Transaction::default()]);
        assert_eq!(extract_claim(&no_outputs), None);
    }

    #[test]
    fn test_corroborate_accepts_matching_prefix() {
        let under = [9u8; 32];
        let body = [[1u8; 32], [2u8; 32]];
        let candidate = [[0xC0u8; 32], [1u8; 32], [2u8; 32], [3u8; 32]];
        assert!(corroborate(&under, &body, &candidate).is_ok());

        // No new transactions beyond the prefix.
        assert!(corroborate(&under, &body, &candidate[..3]).is_ok());
    }

    #[test]
    fn test_corroborate_rejects_short_candidate() {
        let under = [9u8; 32];
        let body = [[1u8; 32], [2u8; 32]];
        let candidate = [[0xC0u8; 32], [1u8; 32]];
        assert_eq!(
            corroborate(&under, &body, &candidate),
            Err(WeakBlockError::TooShort {
                underlying: under,
                have: 2,
                need: 3
            })
        );
    }

    #[test]
    fn test_corroborate_rejects_reordered_prefix() {
        let under = [9u8; 32];
        let body = [[1u8; 32], [2u8; 32]];
        let candidate = [[0xC0u8; 32], [2u8; 32], [1u8; 32]];
        assert_eq!(
            corroborate(&under, &body, &candidate),
            Err(WeakBlockError::PrefixMismatch {
                underlying: under,
                position: 1
            })
        );
    }
}
