use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// SHA-256 applied twice, hex-encoded. Used for every content address.
pub fn sha256_2_string(input: &str) -> String {
    let first = Sha256::digest(input.as_bytes());
    let second = Sha256::digest(first);
    hex::encode(second)
}

/// Interpret a hex digest as a big-endian unsigned integer.
/// Returns `None` when the string is not valid hex.
pub fn hash_to_int(hash: &str) -> Option<BigUint> {
    BigUint::parse_bytes(hash.as_bytes(), 16)
}
