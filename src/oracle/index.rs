//! Oracle index derivation.
//!
//! `index = H(blockhash(height - nonce) || account) mod 10`, with a shared
//! nonce that is used, incremented, and reset to zero once it passes 250.
//! Anyone who can see or influence recent block hashes can predict or bias
//! the result. The weakness is inherited and kept as-is.

use sha2::{Digest, Sha256};

use super::{INDEXES_PER_ORACLE, MAX_INDEX};
use crate::chain::BlockSource;
use crate::errors::{SuretyError, SuretyResult};
use crate::ledger::Principal;

/// Largest nonce value used before wrapping to zero
pub const NONCE_WRAP: u64 = 250;

/// Draws allowed while looking for an unused index: one full nonce cycle
pub const MAX_DRAW_ATTEMPTS: usize = NONCE_WRAP as usize + 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexGenerator {
    nonce: u64,
}

impl IndexGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nonce(nonce: u64) -> Self {
        IndexGenerator { nonce }
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// One pseudo-random index in `[0, MAX_INDEX)`.
    pub fn draw(&mut self, blocks: &dyn BlockSource, height: u64, account: &Principal) -> u8 {
        let seed = height
            .checked_sub(self.nonce)
            .and_then(|h| blocks.block_hash(h))
            .unwrap_or([0u8; 32]);

        self.nonce += 1;
        if self.nonce > NONCE_WRAP {
            self.nonce = 0;
        }

        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(account.as_bytes());
        reduce(&hasher.finalize(), MAX_INDEX)
    }

    /// Draw until the result is not in `taken`.
    pub fn draw_distinct(
        &mut self,
        blocks: &dyn BlockSource,
        height: u64,
        account: &Principal,
        taken: &[u8],
    ) -> SuretyResult<u8> {
        for _ in 0..MAX_DRAW_ATTEMPTS {
            let index = self.draw(blocks, height, account);
            if !taken.contains(&index) {
                return Ok(index);
            }
        }
        Err(SuretyError::IndexDerivationExhausted {
            attempts: MAX_DRAW_ATTEMPTS,
        })
    }

    /// Three distinct indexes for a registering oracle.
    pub fn generate_indexes(
        &mut self,
        blocks: &dyn BlockSource,
        height: u64,
        account: &Principal,
    ) -> SuretyResult<[u8; INDEXES_PER_ORACLE]> {
        let mut indexes = [0u8; INDEXES_PER_ORACLE];
        for slot in 0..INDEXES_PER_ORACLE {
            indexes[slot] = self.draw_distinct(blocks, height, account, &indexes[..slot])?;
        }
        Ok(indexes)
    }
}

/// Big-endian 256-bit integer modulo `modulus`
pub(crate) fn reduce(digest: &[u8], modulus: u8) -> u8 {
    let m = u32::from(modulus);
    let rem = digest.iter().fold(0u32, |acc, b| (acc * 256 + u32::from(*b)) % m);
    rem as u8
}

