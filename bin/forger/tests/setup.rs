//! Common test setup utilities shared across integration tests.
#![allow(dead_code)]

use alloy_primitives::{hex, Address, Bytes, B256, U256};
use async_trait::async_trait;
use binding::opstack::WithdrawalTransaction;
use config::{ForgedMessageConfig, NetworkConfig, ScanConfig, SearchConfig};
use forger::ForgeSettings;
use std::{collections::HashMap, sync::Mutex};
use withdrawal::{
    key::storage_slot,
    source::{OutputSource, WithdrawalSource},
    types::{BlockSnapshot, OutputAnchor, StorageProof, WithdrawalEvent},
    ForgeError,
};

pub const ANCHOR_BLOCK: u64 = 24_000_000;

/// A real `MessagePassed` event from Unichain.
pub fn real_event() -> WithdrawalEvent {
    WithdrawalEvent {
        transaction: WithdrawalTransaction {
            nonce: U256::from_be_bytes(hex!(
                "0001000000000000000000000000000000000000000000000000000000000818"
            )),
            sender: Address::from_slice(&hex!("000040D6c85A13a1AA74565FDe87e499dC023C6f")),
            target: Address::from_slice(&hex!("B03eEF386A61b5b462051636001485FFfdD3d843")),
            value: U256::ZERO,
            gasLimit: U256::from(200_000),
            data: Bytes::from(hex!(
                "095ea7b3000000000000000000000000000040d6c85a13a1aa74565fde87e499dc023c6fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
            )),
        },
        reported_hash: B256::from(hex!(
            "49c43b60ec99e99046b54aec4c90419ff194300e567de63423c3b974ae46bd28"
        )),
        l2_block: Some(23_969_114),
    }
}

/// A branch node with 17 empty children.
pub fn branch_node() -> Bytes {
    let mut raw = vec![0xc0 + 17];
    raw.extend([0x80; 17]);
    Bytes::from(raw)
}

/// A leaf with odd compact path `abc` and a one-byte value.
pub fn leaf_node() -> Bytes {
    Bytes::from_static(&[0xc4, 0x82, 0x3a, 0xbc, 0x01])
}

/// An extension with even compact path `12`.
pub fn extension_node() -> Bytes {
    Bytes::from_static(&[0xc4, 0x82, 0x00, 0x12, 0x01])
}

pub fn anchor() -> OutputAnchor {
    OutputAnchor {
        index: U256::from(4_242),
        output_root: B256::repeat_byte(0x99),
        l2_block_number: ANCHOR_BLOCK,
    }
}

pub fn anchor_snapshot() -> BlockSnapshot {
    BlockSnapshot {
        number: ANCHOR_BLOCK,
        hash: B256::repeat_byte(0x66),
        state_root: B256::repeat_byte(0x77),
    }
}

pub fn settings() -> ForgeSettings {
    ForgeSettings {
        message_passer: NetworkConfig::mainnet().message_passer,
        scan: ScanConfig::default(),
        search: SearchConfig::default(),
        forged: ForgedMessageConfig::default(),
    }
}

/// L1 output oracle answering with a fixed proposal.
pub struct MockOracle {
    pub anchor: OutputAnchor,
}

#[async_trait]
impl OutputSource for MockOracle {
    async fn latest_output(&self) -> Result<OutputAnchor, ForgeError> {
        Ok(self.anchor)
    }
}

/// In-memory L2 chain with a single known block.
pub struct MockL2 {
    pub head: u64,
    pub snapshot: BlockSnapshot,
    pub events: Vec<WithdrawalEvent>,
    pub proofs: HashMap<B256, Vec<Bytes>>,
    pub proof_blocks: Mutex<Vec<u64>>,
}

impl Default for MockL2 {
    fn default() -> Self {
        Self {
            head: ANCHOR_BLOCK + 100,
            snapshot: anchor_snapshot(),
            events: Vec::new(),
            proofs: HashMap::new(),
            proof_blocks: Mutex::new(Vec::new()),
        }
    }
}

impl MockL2 {
    pub fn with(mut self, event: WithdrawalEvent, nodes: Vec<Bytes>) -> Self {
        self.proofs.insert(storage_slot(event.reported_hash), nodes);
        self.events.push(event);
        self
    }
}

#[async_trait]
impl WithdrawalSource for MockL2 {
    async fn latest_block_number(&self) -> Result<u64, ForgeError> {
        Ok(self.head)
    }

    async fn withdrawal_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<WithdrawalEvent>, ForgeError> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.l2_block.is_some_and(|b| (from_block..=to_block).contains(&b)))
            .cloned()
            .collect())
    }

    async fn storage_proof(
        &self,
        _account: Address,
        slot: B256,
        block: u64,
    ) -> Result<StorageProof, ForgeError> {
        self.proof_blocks.lock().unwrap().push(block);
        let nodes = self
            .proofs
            .get(&slot)
            .cloned()
            .ok_or_else(|| ForgeError::MalformedResponse {
                what: "eth_getProof",
                message: format!("unknown slot {slot}"),
            })?;
        Ok(StorageProof {
            storage_hash: B256::repeat_byte(0x55),
            nodes,
        })
    }

    async fn block(&self, number: u64) -> Result<BlockSnapshot, ForgeError> {
        if number == self.snapshot.number {
            Ok(self.snapshot)
        } else {
            Err(ForgeError::MalformedResponse {
                what: "eth_getBlockByNumber",
                message: format!("block {number} not found"),
            })
        }
    }
}

/// Live endpoints from `L1_RPC_URL` / `L2_RPC_URL`. Panics if unset.
pub fn live_rpc_urls() -> (String, String) {
    let l1 = std::env::var("L1_RPC_URL").expect("L1_RPC_URL must be set for live tests");
    let l2 = std::env::var("L2_RPC_URL").expect("L2_RPC_URL must be set for live tests");
    (l1, l2)
}
