pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const BYTE: usize = 8;
pub const HASH_BITS: usize = HASH_SIZE * BYTE;

/// Parent hash carried by a genesis block.
pub const GENESIS_PARENT: &str = "genesis";
/// Genesis blocks start at a target of `2^GENESIS_TARGET_BITS`.
pub const GENESIS_TARGET_BITS: u32 = 248;
pub const MAX_TRANSACTIONS: usize = 900;

pub const HEADER_SEP: char = '`';
pub const BLOCK_TX_SEP: char = '!';
pub const TX_FIELD_SEP: char = ';';
pub const OUTPUT_FIELD_SEP: char = '~';
pub const INPUT_REF_SEP: char = ':';
