//! The forged withdrawal artifact consumed by the bridge test harness.
//!
//! The record pairs a real storage proof with the fields of a forged
//! withdrawal whose trie key shares the proof's prefix, plus the output root
//! preimage of the block the proof was taken at. Nothing is re-validated here.

use crate::types::{BlockSnapshot, OutputAnchor};
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use binding::opstack::{OutputRootProof, WithdrawalTransaction, OUTPUT_VERSION_V0};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// The persisted record. Hex fields serialize as `0x`-prefixed lowercase
/// strings, large integers as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgedArtifact {
    /// Real proof nodes, unmodified, root first
    pub proof: Vec<Bytes>,
    #[serde(with = "decimal")]
    pub nonce: U256,
    pub sender: Address,
    pub target: Address,
    #[serde(with = "decimal")]
    pub value: U256,
    #[serde(with = "decimal")]
    pub gas_limit: U256,
    pub data: Bytes,
    #[serde(with = "decimal")]
    pub l2_output_index: U256,
    pub version: B256,
    pub state_root: B256,
    pub storage_hash: B256,
    pub latest_blockhash: B256,
}

impl ForgedArtifact {
    /// Combine the real proof with the forged withdrawal's fields.
    ///
    /// `proof` and `storage_hash` must come from `eth_getProof` at `block`,
    /// which is the block `anchor` commits to.
    pub fn assemble(
        proof: Vec<Bytes>,
        forged_tx: &WithdrawalTransaction,
        anchor: &OutputAnchor,
        block: &BlockSnapshot,
        storage_hash: B256,
    ) -> Self {
        Self {
            proof,
            nonce: forged_tx.nonce,
            sender: forged_tx.sender,
            target: forged_tx.target,
            value: forged_tx.value,
            gas_limit: forged_tx.gasLimit,
            data: forged_tx.data.clone(),
            l2_output_index: anchor.index,
            version: OUTPUT_VERSION_V0,
            state_root: block.state_root,
            storage_hash,
            latest_blockhash: block.hash,
        }
    }

    /// The output root preimage the artifact carries.
    pub const fn output_root_proof(&self) -> OutputRootProof {
        OutputRootProof {
            version: self.version,
            stateRoot: self.state_root,
            messagePasserStorageRoot: self.storage_hash,
            latestBlockhash: self.latest_blockhash,
        }
    }

    /// `Hashing.hashOutputRootProof` over [`Self::output_root_proof`].
    pub fn output_root(&self) -> B256 {
        let proof = self.output_root_proof();
        keccak256(
            (
                proof.version,
                proof.stateRoot,
                proof.messagePasserStorageRoot,
                proof.latestBlockhash,
            )
                .abi_encode_sequence(),
        )
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the artifact as pretty JSON. Serialization finishes before the
    /// file is touched, so a failure never leaves a partial artifact.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write artifact to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// `U256` as a decimal string.
mod decimal {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_str_radix(&s, 10).map_err(D::Error::custom)
    }
}
