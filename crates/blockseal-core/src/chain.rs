use crate::block::{AcceptedBlock, Block};
use crate::constants::GENESIS_PARENT;
use crate::params::ConsensusParams;
use crate::seal::{ProofOfWork, SealRule};
use crate::transaction::Transaction;
use crate::validate::{Rejection, Validator};
use num_bigint::BigUint;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Read-only view of the chain the validator checks a block against.
///
/// Index lookups cover every known block on every branch; the ancestor
/// path is what scopes a check to a single branch.
pub trait ChainIndex {
    fn block(&self, hash: &str) -> Option<&AcceptedBlock>;

    /// A transaction confirmed in some accepted block.
    fn transaction(&self, tx_hash: &str) -> Option<&Transaction>;

    /// Hashes of the blocks that include `tx_hash`.
    fn blocks_containing_tx(&self, tx_hash: &str) -> &[String];

    /// Hashes of the blocks that spend `input_ref`.
    fn blocks_spending_input(&self, input_ref: &str) -> &[String];

    /// Block hashes from genesis up to and including `block_hash`. Empty if
    /// the block is unknown.
    fn chain_ending_with(&self, block_hash: &str) -> Vec<String>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("block rejected: {0}")]
    Rejected(#[from] Rejection),
    #[error("unknown parent block {0}")]
    UnknownParent(String),
}

/// In-memory block tree with the auxiliary indices the validator reads.
///
/// Single writer: blocks are validated against `&self` and only then
/// indexed through `&mut self`.
pub struct Blockchain<S: SealRule = ProofOfWork> {
    rule: S,
    params: ConsensusParams,
    blocks: HashMap<String, AcceptedBlock>,
    all_transactions: HashMap<String, Transaction>,
    blocks_containing_tx: HashMap<String, Vec<String>>,
    blocks_spending_input: HashMap<String, Vec<String>>,
}

impl Default for Blockchain<ProofOfWork> {
    fn default() -> Self {
        let params = ConsensusParams::default();
        Self::new(ProofOfWork::new(&params), params)
    }
}

impl<S: SealRule> Blockchain<S> {
    pub fn new(rule: S, params: ConsensusParams) -> Self {
        Self {
            rule,
            params,
            blocks: HashMap::new(),
            all_transactions: HashMap::new(),
            blocks_containing_tx: HashMap::new(),
            blocks_spending_input: HashMap::new(),
        }
    }

    pub fn rule(&self) -> &S {
        &self.rule
    }

    pub fn validator(&self) -> Validator<'_, S> {
        Validator::new(&self.rule, &self.params)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Target a child of `parent_hash` must carry.
    pub fn target_for(&self, parent_hash: &str) -> Result<BigUint, ChainError> {
        if parent_hash == GENESIS_PARENT {
            return Ok(self.rule.calculate_appropriate_target(None));
        }
        let parent: &Block = self
            .blocks
            .get(parent_hash)
            .ok_or_else(|| ChainError::UnknownParent(parent_hash.to_string()))?;
        Ok(self.rule.calculate_appropriate_target(Some(parent)))
    }

    /// Unsealed block extending `parent_hash`, or a genesis block when
    /// `parent_hash` is the genesis sentinel.
    pub fn candidate(
        &self,
        parent_hash: &str,
        transactions: Vec<Transaction>,
    ) -> Result<Block, ChainError> {
        let target = self.target_for(parent_hash)?;
        if parent_hash == GENESIS_PARENT {
            return Ok(Block::genesis(transactions, target));
        }
        let height = self
            .blocks
            .get(parent_hash)
            .map(|parent| parent.height + 1)
            .ok_or_else(|| ChainError::UnknownParent(parent_hash.to_string()))?;
        Ok(Block::new(height, transactions, parent_hash, false, target))
    }

    /// Validate `block` and index it. Adding a block that is already indexed
    /// returns the existing entry untouched.
    pub fn add_block(&mut self, block: Block) -> Result<&AcceptedBlock, ChainError> {
        if self.blocks.contains_key(block.hash()) {
            debug!(hash = block.hash(), "block already indexed");
            return Ok(&self.blocks[block.hash()]);
        }
        self.validator().validate(&block, &*self)?;

        let hash = block.hash().to_string();
        for tx in &block.transactions {
            self.all_transactions
                .entry(tx.hash().to_string())
                .or_insert_with(|| tx.clone());
            self.blocks_containing_tx
                .entry(tx.hash().to_string())
                .or_default()
                .push(hash.clone());
            for input in tx.input_refs() {
                self.blocks_spending_input
                    .entry(input.clone())
                    .or_default()
                    .push(hash.clone());
            }
        }

        let weight = self.rule.weight(&block);
        info!(
            "Accepted block {} at height {} with {} transactions",
            hash,
            block.height,
            block.transactions.len()
        );
        Ok(self
            .blocks
            .entry(hash)
            .or_insert(AcceptedBlock::new(block, weight)))
    }

    pub fn weight_of(&self, hash: &str) -> Option<&BigUint> {
        self.blocks.get(hash).map(AcceptedBlock::weight)
    }
}

impl<S: SealRule> ChainIndex for Blockchain<S> {
    fn block(&self, hash: &str) -> Option<&AcceptedBlock> {
        self.blocks.get(hash)
    }

    fn transaction(&self, tx_hash: &str) -> Option<&Transaction> {
        self.all_transactions.get(tx_hash)
    }

    fn blocks_containing_tx(&self, tx_hash: &str) -> &[String] {
        self.blocks_containing_tx
            .get(tx_hash)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn blocks_spending_input(&self, input_ref: &str) -> &[String] {
        self.blocks_spending_input
            .get(input_ref)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn chain_ending_with(&self, block_hash: &str) -> Vec<String> {
        let mut path = Vec::new();
        let mut cursor = block_hash;
        while let Some(block) = self.blocks.get(cursor) {
            path.push(cursor.to_string());
            if block.is_genesis {
                break;
            }
            cursor = &block.parent_hash;
        }
        path.reverse();
        path
    }
}
