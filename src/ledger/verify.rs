use super::chain::{compute_content_hash, Block, GENESIS_PREV_HASH};

/// Linkage-only scan: checks `previous_hash` equality against the stored
/// digest of each predecessor. Trusts stored hashes, so a payload edit that
/// leaves `previous_hash` untouched goes undetected; use [`verify_chain`]
/// when that matters. True for empty and single-block chains.
pub fn verify_links(chain: &[Block]) -> bool {
    for i in 1..chain.len() {
        if chain[i].previous_hash != chain[i - 1].content_hash {
            return false;
        }
    }
    true
}

/// Full verification: linkage plus recomputation of every block's
/// `content_hash` from its stored fields, so payload tampering is caught as
/// well. The genesis block must carry the all-zero sentinel link.
pub fn verify_chain(chain: &[Block]) -> bool {
    for (i, block) in chain.iter().enumerate() {
        let expected_prev = if i == 0 {
            GENESIS_PREV_HASH
        } else {
            chain[i - 1].content_hash.as_str()
        };
        if block.previous_hash != expected_prev {
            return false;
        }

        let recomputed =
            compute_content_hash(&block.payload, &block.previous_hash, block.timestamp);
        if recomputed != block.content_hash {
            return false;
        }
    }
    true
}
