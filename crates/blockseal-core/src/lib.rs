//! Block identity, proof-of-work sealing and block validity rules.
//!
//! Transactions reduce to a Merkle root, the root and the other header
//! fields to a header string, the header to a double-SHA-256 hash, and the
//! hash is sealed under a [`SealRule`]. A [`Validator`] then decides whether
//! a sealed block may extend a chain, reading the chain only through
//! [`ChainIndex`].

pub mod block;
pub mod chain;
pub mod constants;
pub mod encoding;
pub mod hash;
pub mod merkle;
pub mod mine;
pub mod params;
pub mod seal;
pub mod transaction;
pub mod validate;

pub use block::{AcceptedBlock, Block};
pub use chain::{Blockchain, ChainError, ChainIndex};
pub use hash::sha256_2_string;
pub use merkle::merkle_root;
pub use params::{ConsensusParams, TimestampRule};
pub use seal::{ProofOfWork, SealRule};
pub use transaction::{input_ref, InputRef, InputRefError, Transaction, TxOutput};
pub use validate::{Rejection, Validator, ALL_CHECKS_PASSED};
