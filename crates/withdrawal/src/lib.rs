//! Forged withdrawal proof crafting for the OP Stack message passer.
//!
//! Pipeline pieces, leaves first:
//! - [`key`]: storage slot and trie key derivation for `sentMessages` entries
//! - [`node`]: RLP trie node classification and compact path decoding
//! - [`hash`]: the bridge's withdrawal hash
//! - [`scanner`]: picks the real withdrawal whose proof is cheapest to reuse
//! - [`search`]: brute-forces a forged withdrawal sharing the proof's key prefix
//! - [`artifact`]: the output record
//!
//! Remote data access goes through the traits in [`source`]; [`rpc`] backs
//! them with alloy providers.

pub mod artifact;
pub mod error;
pub mod hash;
pub mod key;
pub mod node;
pub mod rpc;
pub mod scanner;
pub mod search;
pub mod source;
pub mod types;

pub use error::ForgeError;
