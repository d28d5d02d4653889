//! Contract bindings for the OP Stack contracts the forger reads from.
//!
//! - L2ToL1MessagePasser (withdrawal events, `sentMessages` storage)
//! - L2OutputOracle (latest output proposal on L1)
//! - Shared structs (`WithdrawalTransaction`, `OutputRootProof`)
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod opstack;
