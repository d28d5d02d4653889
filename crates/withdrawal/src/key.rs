//! Storage slot and trie key derivation for `sentMessages` entries.

use crate::types::{StorageSlot, TrieKey, WithdrawalHash};
use alloy_primitives::{keccak256, B256, U256};
use binding::opstack::SENT_MESSAGES_SLOT;
use std::fmt;

/// Number of nibbles in a trie key.
pub const KEY_NIBBLES: usize = 64;

/// Compute the storage slot for a withdrawal hash in the L2ToL1MessagePasser contract.
///
/// The storage layout is: `mapping(bytes32 => bool) public sentMessages`
/// Solidity storage slot = keccak256(key || slot_index)
pub fn storage_slot(withdrawal_hash: WithdrawalHash) -> StorageSlot {
    let mut data = [0u8; 64];
    data[0..32].copy_from_slice(withdrawal_hash.as_slice());
    data[32..64].copy_from_slice(&U256::from(SENT_MESSAGES_SLOT).to_be_bytes::<32>());
    keccak256(data)
}

/// The path of a storage slot in the account's storage trie.
///
/// Storage tries are keyed by the hash of the slot, not the slot itself.
pub fn trie_key(slot: StorageSlot) -> TrieKey {
    keccak256(slot)
}

/// Trie key of a withdrawal's `sentMessages` entry.
pub fn trie_key_for_hash(withdrawal_hash: WithdrawalHash) -> TrieKey {
    trie_key(storage_slot(withdrawal_hash))
}

/// Leading nibbles of a trie key that a forged key has to reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPrefix {
    key: B256,
    len: usize,
}

impl KeyPrefix {
    /// The first `nibbles` nibbles of `key`, clamped to the key length.
    pub fn of(key: TrieKey, nibbles: usize) -> Self {
        Self {
            key,
            len: nibbles.min(KEY_NIBBLES),
        }
    }

    /// Length in nibbles.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn matches(&self, candidate: &TrieKey) -> bool {
        let full_bytes = self.len / 2;
        if self.key[..full_bytes] != candidate[..full_bytes] {
            return false;
        }
        self.len % 2 == 0 || (self.key[full_bytes] >> 4) == (candidate[full_bytes] >> 4)
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = alloy_primitives::hex::encode(self.key);
        f.write_str(&hex[..self.len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_storage_slot_deterministic() {
        let withdrawal_hash = B256::from([1u8; 32]);
        let slot = storage_slot(withdrawal_hash);

        assert_eq!(slot, storage_slot(withdrawal_hash));

        let other_slot = storage_slot(B256::from([2u8; 32]));
        assert_ne!(slot, other_slot);
    }

    #[test]
    fn test_storage_slot_format() {
        // keccak256(withdrawalHash || 0x00...00)
        let slot = storage_slot(B256::ZERO);
        assert_eq!(slot, keccak256([0u8; 64]));
    }

    #[test]
    fn test_trie_key_is_hash_of_slot() {
        let hash = B256::from([7u8; 32]);
        let slot = storage_slot(hash);

        assert_eq!(trie_key(slot), keccak256(slot.as_slice()));
        assert_eq!(trie_key_for_hash(hash), trie_key(slot));
        assert_ne!(trie_key_for_hash(hash), slot);
    }

    #[test]
    fn test_trie_keys_distinct_for_distinct_hashes() {
        let keys: std::collections::HashSet<_> = (0u8..32)
            .map(|i| trie_key_for_hash(B256::from([i; 32])))
            .collect();
        assert_eq!(keys.len(), 32);
    }

    #[test]
    fn test_prefix_even_and_odd_lengths() {
        let key = b256!("abcdef0000000000000000000000000000000000000000000000000000000000");

        let even = KeyPrefix::of(key, 4);
        assert_eq!(even.to_string(), "abcd");
        assert!(even.matches(&b256!(
            "abcd110000000000000000000000000000000000000000000000000000000000"
        )));
        assert!(!even.matches(&b256!(
            "abce000000000000000000000000000000000000000000000000000000000000"
        )));

        let odd = KeyPrefix::of(key, 3);
        assert_eq!(odd.to_string(), "abc");
        assert!(odd.matches(&b256!(
            "abcf000000000000000000000000000000000000000000000000000000000000"
        )));
        assert!(!odd.matches(&b256!(
            "abd0000000000000000000000000000000000000000000000000000000000000"
        )));
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        let prefix = KeyPrefix::of(B256::repeat_byte(0x11), 0);
        assert!(prefix.is_empty());
        assert_eq!(prefix.to_string(), "");
        assert!(prefix.matches(&B256::ZERO));
        assert!(prefix.matches(&B256::repeat_byte(0xff)));
    }

    #[test]
    fn test_prefix_length_clamped() {
        let key = B256::repeat_byte(0x42);
        let prefix = KeyPrefix::of(key, 100);
        assert_eq!(prefix.len(), KEY_NIBBLES);
        assert!(prefix.matches(&key));
        assert!(!prefix.matches(&B256::repeat_byte(0x43)));
    }
}
