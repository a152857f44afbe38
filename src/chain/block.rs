use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

use super::BlockSource;

/// How far back block hashes stay retrievable
pub const BLOCK_HASH_WINDOW: u64 = 256;

/// Deterministic stand-in for the host chain.
///
/// Block `h` hashes to `SHA256(seed || h)`; only the last
/// [`BLOCK_HASH_WINDOW`] sealed blocks are visible.
#[derive(Debug)]
pub struct SimulatedChain {
    seed: [u8; 32],
    height: AtomicU64,
}

impl SimulatedChain {
    pub fn new(seed: &str) -> Self {
        Self::at_height(seed, 1)
    }

    pub fn at_height(seed: &str, height: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&Sha256::digest(seed.as_bytes()));
        SimulatedChain {
            seed: bytes,
            height: AtomicU64::new(height),
        }
    }

    /// Seal the current block and return the new height.
    pub fn mine(&self) -> u64 {
        self.advance(1)
    }

    pub fn advance(&self, blocks: u64) -> u64 {
        self.height.fetch_add(blocks, Ordering::SeqCst) + blocks
    }
}

impl BlockSource for SimulatedChain {
    fn height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }

    fn block_hash(&self, height: u64) -> Option<[u8; 32]> {
        let current = self.height();
        if height >= current || current - height > BLOCK_HASH_WINDOW {
            return None;
        }
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(height.to_be_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Some(out)
    }
}
