//! Configuration types for the forged-withdrawal generator.
//!
//! This crate provides:
//! - Network configurations (mainnet, testnet) with OP Stack contract addresses
//! - Scanner, search and forged-message settings with their defaults
//! - Configuration validation errors

pub mod error;
pub mod forge;
pub mod network;

pub use error::ConfigError;
pub use forge::{ForgedMessageConfig, ScanConfig, SearchConfig};
pub use network::{NetworkConfig, NetworkConfigBuilder, NetworkType};
