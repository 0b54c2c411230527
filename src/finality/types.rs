use sha2::{Digest, Sha256};

pub type Height = u64;
pub type BlockId = String;

/// Well-known identifier seeded at height 0 unless configured otherwise.
pub const DEFAULT_GENESIS_ID: &str = "Genesis Block";

/// Votes required before a candidate finalizes, unless configured otherwise.
pub const DEFAULT_QUORUM: u32 = 3;

/// utility: derive a short hex block identifier from arbitrary bytes
pub fn derive_block_id(bytes: &[u8]) -> BlockId {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(&hasher.finalize()[..8])
}
