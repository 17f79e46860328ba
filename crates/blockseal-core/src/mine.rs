use crate::block::{sealed_header, Block};
use crate::hash::sha256_2_string;
use crate::seal::meets_target;
use rayon::prelude::*;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, trace};

/// Brute-force the seal: try `0, 1, 2, ...` until the header hash meets the
/// block's target, then store the winning seal on the block.
///
/// `stop` is polled before every attempt; once it is raised the search gives
/// up and returns `None`, leaving the block's seal untouched.
pub fn mine(block: &mut Block, stop: &AtomicBool) -> Option<u64> {
    let unsealed = block.unsealed_header();
    let mut nonce = 0u64;
    loop {
        if stop.load(Ordering::Relaxed) {
            trace!(height = block.height, attempts = nonce, "mining cancelled");
            return None;
        }
        let hash = sha256_2_string(&sealed_header(&unsealed, nonce));
        if meets_target(&hash, &block.target) {
            block.set_seal_data(nonce);
            info!(
                "Mined block {} with seal {} and hash {}",
                block.height,
                nonce,
                block.hash()
            );
            return Some(nonce);
        }
        nonce = nonce.checked_add(1)?;
    }
}

/// Same search as [`mine`] spread across the rayon pool. The result is still
/// the smallest satisfying seal.
pub fn mine_parallel(block: &mut Block, stop: &AtomicBool) -> Option<u64> {
    let unsealed = block.unsealed_header();
    let target = block.target.clone();

    // `Some(None)` marks a cancelled attempt so the search winds down.
    let found = (0u64..u64::MAX)
        .into_par_iter()
        .find_map_first(|nonce| {
            if stop.load(Ordering::Relaxed) {
                return Some(None);
            }
            let hash = sha256_2_string(&sealed_header(&unsealed, nonce));
            meets_target(&hash, &target).then_some(Some(nonce))
        })
        .flatten();

    let Some(nonce) = found else {
        trace!(height = block.height, "parallel mining cancelled");
        return None;
    };
    block.set_seal_data(nonce);
    info!(
        "Mined block {} with seal {} and hash {}",
        block.height,
        nonce,
        block.hash()
    );
    Some(nonce)
}

/// Runs [`mine`] on a dedicated thread so a competing block can be accepted
/// while the search is in flight.
pub struct MiningWorker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Option<Block>>,
}

impl MiningWorker {
    pub fn spawn(mut block: Block) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(format!("miner-{}", block.height))
            .spawn(move || mine(&mut block, &flag).map(|_| block))?;
        Ok(Self { stop, handle })
    }

    /// Ask the worker to stop after its current attempt.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Wait for the worker. `None` if it was cancelled before finding a seal.
    pub fn join(self) -> Option<Block> {
        self.handle.join().ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seal::{ProofOfWork, SealRule};
    use crate::transaction::{Transaction, TxOutput};
    use num_bigint::BigUint;
    use num_traits::{One, Zero};

    fn candidate(target: BigUint) -> Block {
        let txs = vec![Transaction::new(vec![], vec![TxOutput::new("", "alice", 50)])];
        Block::new_at(0, txs, "genesis", true, target, 1_600_000_000)
    }

    #[test]
    fn mine_block_example() {
        let pow = ProofOfWork::default();
        let mut block = candidate(pow.genesis_target().clone());
        let stop = AtomicBool::new(false);
        let seal = mine(&mut block, &stop).expect("seal found");
        assert_eq!(block.seal_data(), seal);
        assert!(pow.seal_is_valid(&block));
        assert_eq!(block.hash(), block.calculate_hash());
    }

    #[test]
    fn mined_seal_is_smallest() {
        let pow = ProofOfWork::default();
        let mut block = candidate(pow.genesis_target().clone());
        let seal = mine(&mut block, &AtomicBool::new(false)).unwrap();
        let mut retry = block.clone();
        for earlier in 0..seal {
            retry.set_seal_data(earlier);
            assert!(!pow.seal_is_valid(&retry), "seal {earlier} already valid");
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let target: BigUint = BigUint::one() << 246;
        let mut a = candidate(target.clone());
        let mut b = a.clone();
        let stop = AtomicBool::new(false);
        let sequential = mine(&mut a, &stop);
        let parallel = mine_parallel(&mut b, &stop);
        assert_eq!(sequential, parallel);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn raised_stop_flag_aborts() {
        let mut block = candidate(BigUint::zero());
        let stop = AtomicBool::new(true);
        assert_eq!(mine(&mut block, &stop), None);
        assert_eq!(mine_parallel(&mut block, &stop), None);
        assert_eq!(block.seal_data(), 0);
    }

    #[test]
    fn worker_can_be_cancelled() {
        // A zero target can never be met.
        let worker = MiningWorker::spawn(candidate(BigUint::zero())).unwrap();
        worker.cancel();
        assert!(worker.join().is_none());
    }

    #[test]
    fn worker_returns_sealed_block() {
        let pow = ProofOfWork::default();
        let worker = MiningWorker::spawn(candidate(pow.genesis_target().clone())).unwrap();
        let block = worker.join().expect("sealed block");
        assert!(pow.seal_is_valid(&block));
    }
}
