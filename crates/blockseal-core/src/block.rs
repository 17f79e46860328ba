use crate::constants::{BLOCK_TX_SEP, GENESIS_PARENT, HEADER_SEP};
use crate::encoding::{encode_as_str, join_with};
use crate::hash::sha256_2_string;
use crate::merkle::merkle_root;
use crate::transaction::Transaction;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::time::{SystemTime, UNIX_EPOCH};

/// A candidate block: built unsealed, then sealed through [`Block::set_seal_data`].
///
/// The header fields are public so a block can be assembled or inspected
/// freely; any change after sealing leaves `hash` stale, which the validator
/// reports as "Hash failed to match".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub transactions: Vec<Transaction>,
    pub parent_hash: String,
    pub timestamp: u64,
    pub target: BigUint,
    pub is_genesis: bool,
    pub merkle: String,
    seal_data: u64,
    hash: String,
}

impl Block {
    pub fn new(
        height: u64,
        transactions: Vec<Transaction>,
        parent_hash: impl Into<String>,
        is_genesis: bool,
        target: BigUint,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::new_at(height, transactions, parent_hash, is_genesis, target, timestamp)
    }

    pub fn new_at(
        height: u64,
        transactions: Vec<Transaction>,
        parent_hash: impl Into<String>,
        is_genesis: bool,
        target: BigUint,
        timestamp: u64,
    ) -> Self {
        let merkle = merkle_root(&transactions);
        let mut block = Self {
            height,
            transactions,
            parent_hash: parent_hash.into(),
            timestamp,
            target,
            is_genesis,
            merkle,
            seal_data: 0,
            hash: String::new(),
        };
        block.hash = block.calculate_hash();
        block
    }

    /// An unsealed genesis block at height 0.
    pub fn genesis(transactions: Vec<Transaction>, target: BigUint) -> Self {
        Self::new(0, transactions, GENESIS_PARENT, true, target)
    }

    pub fn calculate_merkle_root(&self) -> String {
        merkle_root(&self.transactions)
    }

    /// The part of the header covered by the seal.
    pub fn unsealed_header(&self) -> String {
        encode_as_str(
            &[
                &self.height,
                &self.timestamp,
                &self.target,
                &self.parent_hash,
                &self.is_genesis,
                &self.merkle,
            ],
            HEADER_SEP,
        )
    }

    pub fn header(&self) -> String {
        sealed_header(&self.unsealed_header(), self.seal_data)
    }

    pub fn calculate_hash(&self) -> String {
        sha256_2_string(&self.header())
    }

    /// The cached header hash.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn seal_data(&self) -> u64 {
        self.seal_data
    }

    /// Replace the seal and refresh the cached hash.
    pub fn set_seal_data(&mut self, seal_data: u64) {
        self.seal_data = seal_data;
        self.hash = self.calculate_hash();
    }
}

/// Append a seal to an unsealed header. Miners reuse one unsealed header
/// across attempts instead of re-encoding every field.
pub(crate) fn sealed_header(unsealed: &str, seal_data: u64) -> String {
    encode_as_str(&[&unsealed, &seal_data], HEADER_SEP)
}

/// Debug form: the header followed by every transaction. Never hashed.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let txs = join_with(self.transactions.iter().map(ToString::to_string), BLOCK_TX_SEP);
        f.write_str(&encode_as_str(&[&self.header(), &txs], HEADER_SEP))
    }
}

/// A block that has passed validation and been indexed by a chain.
///
/// It exposes the block read-only; there is no path back to a mutable
/// [`Block`], so an indexed hash can never drift from its contents.
#[derive(Clone, Debug)]
pub struct AcceptedBlock {
    block: Block,
    weight: BigUint,
}

impl AcceptedBlock {
    pub(crate) fn new(block: Block, weight: BigUint) -> Self {
        Self { block, weight }
    }

    pub fn weight(&self) -> &BigUint {
        &self.weight
    }
}

impl Deref for AcceptedBlock {
    type Target = Block;

    fn deref(&self) -> &Block {
        &self.block
    }
}
