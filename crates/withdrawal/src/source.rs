//! Remote data the forger needs, independent of how it is fetched.
//!
//! The scanner and the pipeline only talk to these traits. [`crate::rpc`]
//! implements them over JSON-RPC; tests implement them in memory.

use crate::{
    types::{BlockSnapshot, OutputAnchor, StorageProof, WithdrawalEvent},
    ForgeError,
};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;

/// Read access to the L2 chain.
#[async_trait]
pub trait WithdrawalSource: Send + Sync {
    /// Number of the most recent L2 block.
    async fn latest_block_number(&self) -> Result<u64, ForgeError>;

    /// `MessagePassed` events emitted in `[from_block, to_block]`, oldest first.
    async fn withdrawal_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<WithdrawalEvent>, ForgeError>;

    /// Storage proof of `slot` in `account` at `block` (`eth_getProof`).
    async fn storage_proof(
        &self,
        account: Address,
        slot: B256,
        block: u64,
    ) -> Result<StorageProof, ForgeError>;

    /// Header fields of the block at `number`.
    async fn block(&self, number: u64) -> Result<BlockSnapshot, ForgeError>;
}

/// Read access to the L1 output oracle.
#[async_trait]
pub trait OutputSource: Send + Sync {
    /// The most recently proposed L2 output.
    async fn latest_output(&self) -> Result<OutputAnchor, ForgeError>;
}
