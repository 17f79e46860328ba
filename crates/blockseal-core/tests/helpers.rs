#![allow(dead_code)]

use blockseal_core::constants::GENESIS_PARENT;
use blockseal_core::mine::mine;
use blockseal_core::{
    input_ref, Block, Blockchain, ChainIndex, ConsensusParams, ProofOfWork, Transaction,
    TxOutput,
};
use std::sync::atomic::AtomicBool;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A chain holding one genesis block that pays 100 to alice and 50 to bob.
pub struct Fixture {
    pub chain: Blockchain,
    pub genesis: String,
    pub mint: Transaction,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_params(ConsensusParams::default())
    }

    pub fn with_params(params: ConsensusParams) -> Self {
        init_tracing();
        let mut chain = Blockchain::new(ProofOfWork::new(&params), params);
        let mint = Transaction::new(
            vec![],
            vec![TxOutput::new("", "alice", 100), TxOutput::new("", "bob", 50)],
        );
        let genesis = chain
            .candidate(GENESIS_PARENT, vec![mint.clone()])
            .expect("genesis candidate");
        let genesis = sealed(genesis);
        let hash = genesis.hash().to_string();
        chain.add_block(genesis).expect("genesis accepted");
        Self {
            chain,
            genesis: hash,
            mint,
        }
    }

    /// Sealed child of `parent` stamped with the parent's timestamp.
    pub fn child(&self, parent: &str, txs: Vec<Transaction>) -> Block {
        let parent_block = self.chain.block(parent).expect("known parent");
        let target = self.chain.target_for(parent).expect("target");
        sealed(Block::new_at(
            parent_block.height + 1,
            txs,
            parent,
            false,
            target,
            parent_block.timestamp,
        ))
    }

    /// Build, seal and accept a child of `parent`, returning its hash.
    pub fn extend(&mut self, parent: &str, txs: Vec<Transaction>) -> String {
        let block = self.child(parent, txs);
        let hash = block.hash().to_string();
        self.chain.add_block(block).expect("block accepted");
        hash
    }

    pub fn verdict(&self, block: &Block) -> (bool, String) {
        self.chain.validator().is_valid(block, &self.chain)
    }

    /// Reference to output `index` of the genesis mint.
    pub fn minted(&self, index: usize) -> String {
        input_ref(self.mint.hash(), index)
    }
}

pub fn sealed(mut block: Block) -> Block {
    mine(&mut block, &AtomicBool::new(false)).expect("seal found");
    block
}

/// Re-mine after header fields were edited.
pub fn reseal(block: &mut Block) {
    mine(block, &AtomicBool::new(false)).expect("seal found");
}

pub fn pay(inputs: &[String], sender: &str, outputs: &[(&str, u64)]) -> Transaction {
    Transaction::new(
        inputs.to_vec(),
        outputs
            .iter()
            .map(|(receiver, amount)| TxOutput::new(sender, *receiver, *amount))
            .collect(),
    )
}

pub fn rejected(reason: &str) -> (bool, String) {
    (false, reason.to_string())
}

pub fn accepted() -> (bool, String) {
    (true, blockseal_core::ALL_CHECKS_PASSED.to_string())
}
