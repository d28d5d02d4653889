//! Settings for the scanner, the preimage search and the forged message.

use crate::ConfigError;
use alloy_primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};

/// Real-withdrawal scanner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// How many L2 blocks before the anchor block to search for withdrawals
    pub lookback_blocks: u64,
    /// Maximum number of withdrawal events whose proofs are fetched
    pub max_candidates: usize,
    /// Nibbles added to the proof length when deriving the required key prefix
    pub prefix_margin: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_blocks: 1_000_000,
            max_candidates: 100,
            prefix_margin: 1,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_candidates == 0 {
            return Err(ConfigError::Invalid {
                field: "scan.max_candidates",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.prefix_margin > 64 {
            return Err(ConfigError::Invalid {
                field: "scan.prefix_margin",
                reason: format!("{} exceeds the 64 nibbles of a trie key", self.prefix_margin),
            });
        }
        Ok(())
    }
}

/// Preimage search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Attempts before the search gives up
    pub max_attempts: u64,
    /// Upper bound (inclusive) of the random jitter added to the base gas limit
    pub gas_jitter: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5_000_000,
            gas_jitter: 1_000,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "search.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Fixed fields of the forged withdrawal message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgedMessageConfig {
    /// Sentinel nonce, far above any real message nonce
    pub nonce: U256,
    /// Claimed L2 sender
    pub sender: Address,
    /// L1 target
    pub target: Address,
    /// Value in wei
    pub value: U256,
    /// Gas limit before jitter and search increments
    pub base_gas_limit: U256,
}

impl ForgedMessageConfig {
    /// Version 1 message nonce 0x4073.
    pub const DEFAULT_NONCE: U256 = U256::from_limbs([0x4073, 0, 0, 0x0001_0000_0000_0000]);

    /// 5 ether.
    pub const DEFAULT_VALUE: U256 = U256::from_limbs([5_000_000_000_000_000_000, 0, 0, 0]);

    pub const DEFAULT_BASE_GAS_LIMIT: U256 = U256::from_limbs([300_000, 0, 0, 0]);

    /// The search adds jitter and a wrap counter to the base gas limit, so it
    /// must leave headroom below `U256::MAX`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_gas_limit > U256::from(u64::MAX) {
            return Err(ConfigError::Invalid {
                field: "forged.base_gas_limit",
                reason: format!("{} exceeds u64::MAX", self.base_gas_limit),
            });
        }
        Ok(())
    }
}

impl Default for ForgedMessageConfig {
    fn default() -> Self {
        Self {
            nonce: Self::DEFAULT_NONCE,
            sender: address!("0x4200000000000000000000000000000000000007"),
            target: address!("0x88d893d62f2A90Fd2C939040feab4E13A9C4F313"),
            value: Self::DEFAULT_VALUE,
            base_gas_limit: Self::DEFAULT_BASE_GAS_LIMIT,
        }
    }
}
