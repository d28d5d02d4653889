use alloy_primitives::Address;
use config::{
    ConfigError, ForgedMessageConfig, NetworkConfig, NetworkConfigBuilder, NetworkType,
    ScanConfig, SearchConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_output_path() -> PathBuf {
    PathBuf::from("forged_withdrawal.json")
}

/// Top-level forger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// L1 RPC endpoint url
    pub l1_rpc_url: String,

    /// L2 RPC endpoint url
    pub l2_rpc_url: String,

    /// Network preset (mainnet or sepolia)
    pub network: NetworkType,

    /// Overrides the preset L2OutputOracle address
    #[serde(default)]
    pub l2_output_oracle_address: Option<Address>,

    /// Overrides the preset L2ToL1MessagePasser address
    #[serde(default)]
    pub message_passer_address: Option<Address>,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub forged: ForgedMessageConfig,

    /// Where the artifact is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Network preset with the address overrides from the file applied.
    pub fn network_config(&self) -> NetworkConfig {
        let mut builder = NetworkConfigBuilder::from_network_type(self.network);
        if let Some(oracle) = self.l2_output_oracle_address {
            builder = builder.l2_output_oracle(oracle);
        }
        if let Some(message_passer) = self.message_passer_address {
            builder = builder.message_passer(message_passer);
        }
        builder.build()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.l1_rpc_url.trim().is_empty() {
            return Err(ConfigError::Missing("l1_rpc_url"));
        }
        if self.l2_rpc_url.trim().is_empty() {
            return Err(ConfigError::Missing("l2_rpc_url"));
        }

        let network = self.network_config();
        if network.l2_output_oracle == Address::ZERO {
            return Err(ConfigError::Invalid {
                field: "l2_output_oracle_address",
                reason: "zero address".to_string(),
            });
        }
        if network.message_passer == Address::ZERO {
            return Err(ConfigError::Invalid {
                field: "message_passer_address",
                reason: "zero address".to_string(),
            });
        }

        self.scan.validate()?;
        self.search.validate()?;
        self.forged.validate()
    }
}
