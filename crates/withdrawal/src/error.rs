use crate::{scanner::Rejection, types::WithdrawalHash};
use thiserror::Error;

/// Failures of the forging pipeline.
///
/// Per-candidate proof-shape problems are not errors: the scanner skips those
/// candidates and only reports [`ForgeError::NoQualifyingCandidate`] when none
/// is left.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// A remote call failed. Never retried.
    #[error("remote call `{call}` failed: {message}")]
    Remote { call: &'static str, message: String },

    /// A remote call answered with data of the wrong shape.
    #[error("malformed {what} response: {message}")]
    MalformedResponse { what: &'static str, message: String },

    #[error("no withdrawal events between L2 blocks {from} and {to}")]
    NoEvents { from: u64, to: u64 },

    #[error(
        "none of the {scanned} scanned withdrawals has a leaf-terminated, extension-free proof at L2 block {block}"
    )]
    NoQualifyingCandidate {
        scanned: usize,
        block: u64,
        /// Every scanned candidate and why it was skipped
        rejected: Vec<(WithdrawalHash, Rejection)>,
    },

    /// Recomputing a withdrawal hash from event fields disagreed with the event.
    #[error(
        "withdrawal hash mismatch for event in L2 block {block:?}: reported {reported}, recomputed {computed}"
    )]
    HashMismatch {
        block: Option<u64>,
        reported: WithdrawalHash,
        computed: WithdrawalHash,
    },

    /// The preimage search ran out of attempts.
    #[error("no forged withdrawal matched trie key prefix `{prefix}` within {attempts} attempts")]
    SearchExhausted { prefix: String, attempts: u64 },
}

impl ForgeError {
    pub(crate) fn remote(call: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Remote {
            call,
            message: err.to_string(),
        }
    }

    pub(crate) fn malformed(what: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            what,
            message: message.into(),
        }
    }
}
