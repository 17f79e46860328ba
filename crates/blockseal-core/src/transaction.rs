//! Transactions as seen by the block layer: hashable, with input references
//! into earlier outputs and a structural validity check.

use crate::constants::{BLOCK_TX_SEP, HEADER_SEP, INPUT_REF_SEP, OUTPUT_FIELD_SEP, TX_FIELD_SEP};
use crate::encoding::{encode_as_str, join_with};
use crate::hash::sha256_2_string;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxOutput {
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
}

impl TxOutput {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }
}

impl fmt::Display for TxOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = encode_as_str(
            &[&self.sender, &self.receiver, &self.amount],
            OUTPUT_FIELD_SEP,
        );
        f.write_str(&encoded)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputRefError {
    #[error("input reference {0:?} has no output index separator")]
    MissingSeparator(String),
    #[error("input reference {0:?} names no transaction")]
    EmptyHash(String),
    #[error("input reference {0:?} has a non-numeric output index")]
    BadIndex(String),
    #[error("input reference {0:?} is not in canonical form")]
    NonCanonical(String),
}

/// A parsed `"<tx_hash>:<output_index>"` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRef<'a> {
    pub tx_hash: &'a str,
    pub index: usize,
}

impl<'a> InputRef<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, InputRefError> {
        let (tx_hash, index) = raw
            .rsplit_once(INPUT_REF_SEP)
            .ok_or_else(|| InputRefError::MissingSeparator(raw.to_string()))?;
        if tx_hash.is_empty() {
            return Err(InputRefError::EmptyHash(raw.to_string()));
        }
        let parsed = index
            .parse::<usize>()
            .map_err(|_| InputRefError::BadIndex(raw.to_string()))?;
        // Spend indices key on the raw string, so "h:00" and "h:+0" must not
        // alias "h:0".
        if parsed.to_string() != index {
            return Err(InputRefError::NonCanonical(raw.to_string()));
        }
        Ok(Self {
            tx_hash,
            index: parsed,
        })
    }
}

/// Format an input reference for output `index` of the transaction `tx_hash`.
pub fn input_ref(tx_hash: &str, index: usize) -> String {
    format!("{tx_hash}{INPUT_REF_SEP}{index}")
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "RawTransaction", into = "RawTransaction")]
pub struct Transaction {
    input_refs: Vec<String>,
    outputs: Vec<TxOutput>,
    hash: String,
}

// Wire shape; the hash is always re-derived on the way in.
#[derive(Serialize, Deserialize)]
struct RawTransaction {
    input_refs: Vec<String>,
    outputs: Vec<TxOutput>,
}

impl From<RawTransaction> for Transaction {
    fn from(raw: RawTransaction) -> Self {
        Transaction::new(raw.input_refs, raw.outputs)
    }
}

impl From<Transaction> for RawTransaction {
    fn from(tx: Transaction) -> Self {
        RawTransaction {
            input_refs: tx.input_refs,
            outputs: tx.outputs,
        }
    }
}

impl Transaction {
    pub fn new(input_refs: Vec<String>, outputs: Vec<TxOutput>) -> Self {
        let mut tx = Self {
            input_refs,
            outputs,
            hash: String::new(),
        };
        tx.hash = sha256_2_string(&tx.to_string());
        tx
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn input_refs(&self) -> &[String] {
        &self.input_refs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    /// Structural check the block layer trusts: every input reference must be
    /// a canonical `<tx_hash>:<index>` pair, and no field may contain a
    /// separator of the string form the hash is taken over.
    pub fn is_valid(&self) -> bool {
        let refs_ok = self
            .input_refs
            .iter()
            .all(|raw| !contains_separator(raw) && InputRef::parse(raw).is_ok());
        let outputs_ok = self
            .outputs
            .iter()
            .all(|out| !contains_separator(&out.sender) && !contains_separator(&out.receiver));
        refs_ok && outputs_ok
    }
}

fn contains_separator(field: &str) -> bool {
    field.contains([HEADER_SEP, BLOCK_TX_SEP, TX_FIELD_SEP, OUTPUT_FIELD_SEP])
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Transaction {}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs = join_with(&self.input_refs, TX_FIELD_SEP);
        let outputs = join_with(self.outputs.iter().map(ToString::to_string), TX_FIELD_SEP);
        write!(f, "{inputs}{HEADER_SEP}{outputs}")
    }
}
