//! Network configuration for the forger.
//!
//! Provides the OP Stack contract addresses the forger reads from on each
//! network (mainnet, testnet).

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Network type (mainnet or testnet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    #[serde(alias = "sepolia")]
    Testnet,
}

/// Complete network configuration for one L1/L2 pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type (mainnet or testnet)
    pub network_type: NetworkType,
    /// L1 chain ID
    pub l1_chain_id: u64,
    /// L2 chain ID
    pub l2_chain_id: u64,
    /// L2OutputOracle contract address on L1
    pub l2_output_oracle: Address,
    /// L2ToL1MessagePasser predeploy address on L2
    pub message_passer: Address,
}

impl NetworkConfig {
    /// OP Mainnet on Ethereum mainnet.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            l1_chain_id: 1,
            l2_chain_id: 10,
            // https://etherscan.io/address/0xdfe97868233d1aa22e815a266982f2cf17685a27
            l2_output_oracle: address!("0xdfe97868233d1aa22e815a266982f2cf17685a27"),
            message_passer: address!("0x4200000000000000000000000000000000000016"),
        }
    }

    /// OP Sepolia on Ethereum Sepolia.
    pub const fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            l1_chain_id: 11155111,
            l2_chain_id: 11155420,
            // https://sepolia.etherscan.io/address/0x90E9c4f8a994a250F6aEfd61CAFb4F2e895D458F
            l2_output_oracle: address!("0x90E9c4f8a994a250F6aEfd61CAFb4F2e895D458F"),
            message_passer: address!("0x4200000000000000000000000000000000000016"),
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::sepolia(),
        }
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

impl NetworkConfigBuilder {
    /// Start with mainnet defaults.
    pub const fn mainnet() -> Self {
        Self {
            config: NetworkConfig::mainnet(),
        }
    }

    /// Start with testnet defaults.
    pub const fn testnet() -> Self {
        Self {
            config: NetworkConfig::sepolia(),
        }
    }

    /// Start with the defaults of the given network.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        Self {
            config: NetworkConfig::from_network_type(network_type),
        }
    }

    /// Override the L2OutputOracle address (devnets, custom deployments).
    pub const fn l2_output_oracle(mut self, address: Address) -> Self {
        self.config.l2_output_oracle = address;
        self
    }

    /// Override the message passer address.
    pub const fn message_passer(mut self, address: Address) -> Self {
        self.config.message_passer = address;
        self
    }

    /// Build the network configuration.
    pub const fn build(self) -> NetworkConfig {
        self.config
    }
}
