//! OP Stack contract bindings.
//!
//! Includes the contracts a forged withdrawal proof is built from:
//! - L2ToL1MessagePasser (L2 predeploy, source of real withdrawals)
//! - L2OutputOracle (L1 contract, anchors the L2 block proofs are taken at)

use alloy_primitives::{address, Address, B256};
use alloy_sol_types::sol;

/// L2ToL1MessagePasser predeploy address (identical on every OP Stack chain).
pub const MESSAGE_PASSER_ADDRESS: Address = address!("0x4200000000000000000000000000000000000016");

/// Output root version 0, the only version the portal accepts.
pub const OUTPUT_VERSION_V0: B256 = B256::ZERO;

/// Storage slot index of `sentMessages` in the message passer layout.
pub const SENT_MESSAGES_SLOT: u64 = 0;

sol! {
    /// L2ToL1MessagePasser - L2 predeploy contract for initiating withdrawals
    /// Address: 0x4200000000000000000000000000000000000016 (on all OP Stack chains)
    #[sol(rpc)]
    interface IL2ToL1MessagePasser {
        /// Emitted when a withdrawal is initiated on L2
        event MessagePassed(
            uint256 indexed nonce,
            address indexed sender,
            address indexed target,
            uint256 value,
            uint256 gasLimit,
            bytes data,
            bytes32 withdrawalHash
        );
    }

    /// L2OutputOracle - L1 contract storing proposed L2 output roots
    #[sol(rpc)]
    interface IL2OutputOracle {
        /// A proposed L2 output
        #[derive(Debug)]
        struct OutputProposal {
            bytes32 outputRoot;
            uint128 timestamp;
            uint128 l2BlockNumber;
        }

        /// Index of the most recently proposed output
        function latestOutputIndex() external view returns (uint256);

        /// Output proposal stored at the given index
        function getL2Output(uint256 _l2OutputIndex) external view returns (OutputProposal memory);
    }

    /// Output root proof structure (used in proving withdrawals)
    #[derive(Debug)]
    struct OutputRootProof {
        bytes32 version;
        bytes32 stateRoot;
        bytes32 messagePasserStorageRoot;
        bytes32 latestBlockhash;
    }

    /// Withdrawal transaction structure (shared across contracts)
    #[derive(Debug, PartialEq, Eq)]
    struct WithdrawalTransaction {
        uint256 nonce;
        address sender;
        address target;
        uint256 value;
        uint256 gasLimit;
        bytes data;
    }
}
