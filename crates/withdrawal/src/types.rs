use alloy_primitives::{Bytes, B256, U256};
use binding::opstack::WithdrawalTransaction;

pub type WithdrawalHash = B256;

/// `keccak256(withdrawalHash || 0)`, the `sentMessages` slot of a withdrawal.
pub type StorageSlot = B256;

/// `keccak256(slot)`, the path of a slot in the account's storage trie.
pub type TrieKey = B256;

/// A decoded `MessagePassed` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalEvent {
    pub transaction: WithdrawalTransaction,
    /// Hash the event itself carried
    pub reported_hash: WithdrawalHash,
    /// L2 block the event was emitted in
    pub l2_block: Option<u64>,
}

/// Storage proof for one slot of the message passer, as returned by `eth_getProof`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageProof {
    /// Storage trie root of the account
    pub storage_hash: B256,
    /// RLP-encoded trie nodes, root first
    pub nodes: Vec<Bytes>,
}

/// The header fields of an L2 block the artifact needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSnapshot {
    pub number: u64,
    pub hash: B256,
    pub state_root: B256,
}

/// The latest L2 output proposal on L1.
///
/// Every proof is taken at `l2_block_number` so the artifact can be proven
/// against output `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputAnchor {
    pub index: U256,
    pub output_root: B256,
    pub l2_block_number: u64,
}
