use crate::constants::{GENESIS_TARGET_BITS, MAX_TRANSACTIONS};
use serde::{Deserialize, Serialize};

/// How a block's timestamp must relate to its parent's.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampRule {
    /// `timestamp >= parent.timestamp`.
    #[default]
    NonDecreasing,
    /// `timestamp == parent.timestamp`. Older nodes enforced this literal
    /// equality; selecting it keeps their acceptance behaviour.
    MatchParent,
}

impl TimestampRule {
    pub fn admits(self, timestamp: u64, parent_timestamp: u64) -> bool {
        match self {
            TimestampRule::NonDecreasing => timestamp >= parent_timestamp,
            TimestampRule::MatchParent => timestamp == parent_timestamp,
        }
    }
}

/// Consensus tunables shared by the seal rule and the validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusParams {
    pub max_transactions: usize,
    pub genesis_target_bits: u32,
    pub timestamp_rule: TimestampRule,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            max_transactions: MAX_TRANSACTIONS,
            genesis_target_bits: GENESIS_TARGET_BITS,
            timestamp_rule: TimestampRule::default(),
        }
    }
}

impl ConsensusParams {
    /// Parse params from JSON; missing keys fall back to the defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
