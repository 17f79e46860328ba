//! Seal rules: how a block proves it may extend the chain.

use crate::block::Block;
use crate::constants::HASH_BITS;
use crate::hash::hash_to_int;
use crate::params::ConsensusParams;
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// A consensus rule that decides a block's target, checks its seal and
/// scores it for chain selection.
pub trait SealRule: Send + Sync {
    /// Target a new block must carry. `parent` is `None` for genesis.
    fn calculate_appropriate_target(&self, parent: Option<&Block>) -> BigUint;

    fn seal_is_valid(&self, block: &Block) -> bool;

    /// Consensus weight; heavier chains carry more proof.
    fn weight(&self, block: &Block) -> BigUint;
}

/// `2^256`, the size of the hash space.
pub fn hash_space() -> BigUint {
    BigUint::one() << HASH_BITS
}

/// True when `hash`, read as a big-endian integer, does not exceed `target`.
pub fn meets_target(hash: &str, target: &BigUint) -> bool {
    hash_to_int(hash).is_some_and(|value| &value <= target)
}

/// Proof-of-work with a constant difficulty: genesis fixes the target and
/// every descendant inherits it unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofOfWork {
    genesis_target: BigUint,
}

impl ProofOfWork {
    pub fn new(params: &ConsensusParams) -> Self {
        Self {
            genesis_target: BigUint::one() << params.genesis_target_bits,
        }
    }

    pub fn genesis_target(&self) -> &BigUint {
        &self.genesis_target
    }
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(&ConsensusParams::default())
    }
}

impl SealRule for ProofOfWork {
    fn calculate_appropriate_target(&self, parent: Option<&Block>) -> BigUint {
        match parent {
            Some(parent) => parent.target.clone(),
            None => self.genesis_target.clone(),
        }
    }

    fn seal_is_valid(&self, block: &Block) -> bool {
        meets_target(block.hash(), &block.target)
    }

    fn weight(&self, block: &Block) -> BigUint {
        if block.target.is_zero() {
            return hash_space();
        }
        hash_space() / &block.target
    }
}
