use sha2::{Digest, Sha256};

/// Sentinel predecessor link for the genesis block. Same width as a real
/// SHA-256 digest (64 hex characters) so every block carries a uniform
/// `previous_hash` field.
pub const GENESIS_PREV_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Payload recorded in the genesis block.
pub const GENESIS_PAYLOAD: &str = "Genesis block";

/// One immutable ledger entry, linked to its predecessor by hash.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Block {
    /// Hex digest of the preceding block (or [`GENESIS_PREV_HASH`]).
    pub previous_hash: String,
    /// Ordered opaque transaction strings; one vote description per block.
    pub payload: Vec<String>,
    /// Milliseconds since the Unix epoch at creation. Advisory only;
    /// monotonicity across the chain is not enforced.
    pub timestamp: u64,
    /// SHA-256 over payload + previous_hash + decimal timestamp, lowercase hex.
    pub content_hash: String,
}

impl Block {
    pub fn new(previous_hash: String, payload: Vec<String>) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis() as u64;
        Self::with_timestamp(previous_hash, payload, timestamp)
    }

    pub fn with_timestamp(previous_hash: String, payload: Vec<String>, timestamp: u64) -> Self {
        let content_hash = compute_content_hash(&payload, &previous_hash, timestamp);
        Block {
            previous_hash,
            payload,
            timestamp,
            content_hash,
        }
    }
}

/// Digest binding a block's payload, predecessor link and timestamp.
///
/// The payload strings are hashed back to back with no delimiter, followed
/// by the previous hash and the decimal timestamp. The concatenation order
/// is part of the wire-compatible hash construction and must not change.
pub fn compute_content_hash(payload: &[String], previous_hash: &str, timestamp: u64) -> String {
    let mut hasher = Sha256::new();
    for entry in payload {
        hasher.update(entry.as_bytes());
    }
    hasher.update(previous_hash.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Read-only projection of a block, for inspection and export.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BlockView {
    pub index: usize,
    pub previous_hash: String,
    pub timestamp: u64,
    pub payload: Vec<String>,
    pub content_hash: String,
}

/// The append-only, hash-linked sequence of blocks.
///
/// Lifecycle: created empty, initialized with a single genesis block before
/// any vote traffic, grows by one block per successful vote, never shrinks
/// or reorders. The chain is process-local and lost at shutdown.
#[derive(Debug, Default)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger { blocks: Vec::new() }
    }

    /// Produce the first block. Must be called exactly once, before any
    /// [`append`](Self::append); calling it twice is a usage error.
    pub fn create_genesis(&mut self) {
        assert!(
            self.blocks.is_empty(),
            "genesis block already exists; create_genesis must be called exactly once"
        );
        self.blocks.push(Block::new(
            GENESIS_PREV_HASH.to_string(),
            vec![GENESIS_PAYLOAD.to_string()],
        ));
    }

    /// Link a new block to the current tail and push it. Infallible apart
    /// from the genesis precondition.
    pub fn append(&mut self, payload: Vec<String>) -> Block {
        let last_hash = self
            .blocks
            .last()
            .expect("ledger has no genesis block; call create_genesis before append")
            .content_hash
            .clone();
        let block = Block::new(last_hash, payload);
        self.blocks.push(block.clone());
        block
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Read-only views of the full chain; never a mutation path.
    pub fn snapshot(&self) -> Vec<BlockView> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, b)| BlockView {
                index,
                previous_hash: b.previous_hash.clone(),
                timestamp: b.timestamp,
                payload: b.payload.clone(),
                content_hash: b.content_hash.clone(),
            })
            .collect()
    }
}
