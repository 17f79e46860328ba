//! Block admissibility: header consistency, seal, and the UTXO-style
//! inclusion and spending rules scoped to the block's own branch.

use crate::block::Block;
use crate::chain::ChainIndex;
use crate::constants::GENESIS_PARENT;
use crate::params::ConsensusParams;
use crate::seal::SealRule;
use crate::transaction::{InputRef, Transaction, TxOutput};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

pub const ALL_CHECKS_PASSED: &str = "All checks passed";

/// Why a block was refused. The message of each variant is the reason
/// string reported to callers.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("Merkle root failed to match")]
    MerkleMismatch,
    #[error("Hash failed to match")]
    HashMismatch,
    #[error("Too many transactions")]
    TooManyTransactions,
    #[error("Invalid genesis")]
    InvalidGenesis,
    #[error("Nonexistent parent")]
    NonexistentParent,
    #[error("Invalid height")]
    InvalidHeight,
    #[error("Invalid timestamp")]
    InvalidTimestamp,
    #[error("Invalid seal")]
    InvalidSeal,
    #[error("Malformed transaction included")]
    MalformedTransaction,
    #[error("Double transaction inclusion")]
    DoubleTransactionInclusion,
    #[error("Required output not found")]
    OutputNotFound,
    #[error("User inconsistencies")]
    UserInconsistency,
    #[error("Double-spent input")]
    DoubleSpentInput,
    #[error("Input transaction not found")]
    InputTransactionNotFound,
    #[error("Creating money")]
    CreatingMoney,
}

/// Runs the validation pipeline. Checks execute in a fixed order and the
/// first failure wins.
pub struct Validator<'a, S: SealRule + ?Sized> {
    rule: &'a S,
    params: &'a ConsensusParams,
}

impl<'a, S: SealRule + ?Sized> Validator<'a, S> {
    pub fn new(rule: &'a S, params: &'a ConsensusParams) -> Self {
        Self { rule, params }
    }

    pub fn validate<C: ChainIndex + ?Sized>(
        &self,
        block: &Block,
        chain: &C,
    ) -> Result<(), Rejection> {
        let verdict = self.run(block, chain);
        if let Err(reason) = &verdict {
            debug!(hash = block.hash(), height = block.height, %reason, "block rejected");
        }
        verdict
    }

    /// `(true, "All checks passed")` or `(false, <reason>)`.
    pub fn is_valid<C: ChainIndex + ?Sized>(&self, block: &Block, chain: &C) -> (bool, String) {
        match self.validate(block, chain) {
            Ok(()) => (true, ALL_CHECKS_PASSED.to_string()),
            Err(reason) => (false, reason.to_string()),
        }
    }

    fn run<C: ChainIndex + ?Sized>(&self, block: &Block, chain: &C) -> Result<(), Rejection> {
        self.check_identity(block)?;
        if block.is_genesis {
            return check_genesis(block);
        }
        let parent = self.check_parent(block, chain)?;
        // The seal only counts against the target the parent dictates.
        if block.target != self.rule.calculate_appropriate_target(Some(parent))
            || !self.rule.seal_is_valid(block)
        {
            return Err(Rejection::InvalidSeal);
        }
        if !block.transactions.iter().all(Transaction::is_valid) {
            return Err(Rejection::MalformedTransaction);
        }
        BranchView::new(block, chain).check_transactions()
    }

    fn check_identity(&self, block: &Block) -> Result<(), Rejection> {
        if block.merkle != block.calculate_merkle_root() {
            return Err(Rejection::MerkleMismatch);
        }
        if block.hash() != block.calculate_hash() {
            return Err(Rejection::HashMismatch);
        }
        if block.transactions.len() > self.params.max_transactions {
            return Err(Rejection::TooManyTransactions);
        }
        Ok(())
    }

    fn check_parent<'c, C: ChainIndex + ?Sized>(
        &self,
        block: &Block,
        chain: &'c C,
    ) -> Result<&'c Block, Rejection> {
        let parent: &Block = chain
            .block(&block.parent_hash)
            .ok_or(Rejection::NonexistentParent)?;
        if parent.height.checked_add(1) != Some(block.height) {
            return Err(Rejection::InvalidHeight);
        }
        if !self
            .params
            .timestamp_rule
            .admits(block.timestamp, parent.timestamp)
        {
            return Err(Rejection::InvalidTimestamp);
        }
        Ok(parent)
    }
}

fn check_genesis(block: &Block) -> Result<(), Rejection> {
    if block.height != 0 || block.parent_hash != GENESIS_PARENT {
        return Err(Rejection::InvalidGenesis);
    }
    Ok(())
}

/// A block's transactions seen against the branch ending at its parent.
struct BranchView<'b, C: ChainIndex + ?Sized> {
    block: &'b Block,
    chain: &'b C,
    ancestors: HashSet<String>,
    tx_counts: HashMap<&'b str, usize>,
    input_counts: HashMap<&'b str, usize>,
}

impl<'b, C: ChainIndex + ?Sized> BranchView<'b, C> {
    fn new(block: &'b Block, chain: &'b C) -> Self {
        let ancestors = chain
            .chain_ending_with(&block.parent_hash)
            .into_iter()
            .collect();
        let mut tx_counts = HashMap::new();
        let mut input_counts = HashMap::new();
        for tx in &block.transactions {
            *tx_counts.entry(tx.hash()).or_insert(0) += 1;
            for raw in tx.input_refs() {
                *input_counts.entry(raw.as_str()).or_insert(0) += 1;
            }
        }
        Self {
            block,
            chain,
            ancestors,
            tx_counts,
            input_counts,
        }
    }

    fn on_branch(&self, block_hashes: &[String]) -> bool {
        block_hashes.iter().any(|h| self.ancestors.contains(h))
    }

    fn check_transactions(&self) -> Result<(), Rejection> {
        for (position, tx) in self.block.transactions.iter().enumerate() {
            self.check_transaction(position, tx)?;
        }
        Ok(())
    }

    fn check_transaction(&self, position: usize, tx: &Transaction) -> Result<(), Rejection> {
        if self.tx_counts.get(tx.hash()).copied().unwrap_or(0) > 1
            || self.on_branch(self.chain.blocks_containing_tx(tx.hash()))
        {
            return Err(Rejection::DoubleTransactionInclusion);
        }

        let earlier = &self.block.transactions[..position];
        let mut input_total: u128 = 0;
        for raw in tx.input_refs() {
            let input = InputRef::parse(raw).map_err(|_| Rejection::MalformedTransaction)?;
            let in_block = earlier.iter().find(|t| t.hash() == input.tx_hash);
            let spent = self.resolve_output(&input, in_block)?;

            if tx.outputs().iter().any(|out| out.sender != spent.receiver) {
                return Err(Rejection::UserInconsistency);
            }
            if self.input_counts.get(raw.as_str()).copied().unwrap_or(0) > 1
                || self.on_branch(self.chain.blocks_spending_input(raw))
            {
                return Err(Rejection::DoubleSpentInput);
            }
            if in_block.is_none()
                && !self.on_branch(self.chain.blocks_containing_tx(input.tx_hash))
            {
                return Err(Rejection::InputTransactionNotFound);
            }
            input_total += u128::from(spent.amount);
        }

        let senders: HashSet<&str> = tx.outputs().iter().map(|o| o.sender.as_str()).collect();
        if senders.len() != 1 {
            return Err(Rejection::UserInconsistency);
        }
        let output_total: u128 = tx.outputs().iter().map(|o| u128::from(o.amount)).sum();
        if input_total < output_total {
            return Err(Rejection::CreatingMoney);
        }
        Ok(())
    }

    /// Find the output an input points at, first among confirmed
    /// transactions, then among earlier transactions of this block.
    fn resolve_output(
        &self,
        input: &InputRef<'_>,
        in_block: Option<&'b Transaction>,
    ) -> Result<&'b TxOutput, Rejection> {
        let source = self
            .chain
            .transaction(input.tx_hash)
            .or(in_block)
            .ok_or(Rejection::OutputNotFound)?;
        source
            .outputs()
            .get(input.index)
            .ok_or(Rejection::OutputNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Blockchain;
    use crate::seal::ProofOfWork;
    use num_bigint::BigUint;
    use num_traits::One;

    fn genesis_at(height: u64, parent: &str) -> Block {
        Block::new_at(height, vec![], parent, true, BigUint::one() << 248, 1_600_000_000)
    }

    #[test]
    fn reason_strings() {
        assert_eq!(Rejection::MerkleMismatch.to_string(), "Merkle root failed to match");
        assert_eq!(Rejection::DoubleSpentInput.to_string(), "Double-spent input");
        assert_eq!(Rejection::CreatingMoney.to_string(), "Creating money");
    }

    #[test]
    fn genesis_rules() {
        let chain: Blockchain = Blockchain::default();
        let validator = chain.validator();
        assert_eq!(validator.validate(&genesis_at(0, GENESIS_PARENT), &chain), Ok(()));
        assert_eq!(
            validator.validate(&genesis_at(1, GENESIS_PARENT), &chain),
            Err(Rejection::InvalidGenesis)
        );
        assert_eq!(
            validator.validate(&genesis_at(0, "other"), &chain),
            Err(Rejection::InvalidGenesis)
        );
    }

    #[test]
    fn genesis_skips_seal_check() {
        let chain: Blockchain = Blockchain::default();
        let block = Block::new_at(0, vec![], GENESIS_PARENT, true, BigUint::default(), 1);
        assert!(!ProofOfWork::default().seal_is_valid(&block));
        assert_eq!(chain.validator().validate(&block, &chain), Ok(()));
    }

    #[test]
    fn is_valid_reports_success_text() {
        let chain: Blockchain = Blockchain::default();
        let (ok, reason) = chain.validator().is_valid(&genesis_at(0, GENESIS_PARENT), &chain);
        assert!(ok);
        assert_eq!(reason, ALL_CHECKS_PASSED);
    }

    #[test]
    fn merkle_checked_before_hash() {
        let chain: Blockchain = Blockchain::default();
        let mut block = genesis_at(0, GENESIS_PARENT);
        block.merkle = "00".repeat(32);
        block.height = 5;
        assert_eq!(
            chain.validator().validate(&block, &chain),
            Err(Rejection::MerkleMismatch)
        );
    }
}
