use crate::{
    types::{WithdrawalEvent, WithdrawalHash},
    ForgeError,
};
use alloy_primitives::keccak256;
use alloy_sol_types::SolValue;
use binding::opstack::WithdrawalTransaction;

/// Hash a withdrawal the way `Hashing.hashWithdrawal` does on chain.
///
/// `keccak256(abi.encode(nonce, sender, target, value, gasLimit, data))`: the
/// six fields are encoded as a parameter sequence, not as a single tuple, so
/// there is no leading offset word.
pub fn compute_withdrawal_hash(tx: &WithdrawalTransaction) -> WithdrawalHash {
    let encoded = (
        &tx.nonce,
        &tx.sender,
        &tx.target,
        &tx.value,
        &tx.gasLimit,
        &tx.data,
    )
        .abi_encode_sequence();

    keccak256(encoded)
}

/// Recompute the hash of an event's withdrawal and compare it to the reported one.
pub fn verify_event_hash(event: &WithdrawalEvent) -> Result<WithdrawalHash, ForgeError> {
    let computed = compute_withdrawal_hash(&event.transaction);
    if computed != event.reported_hash {
        return Err(ForgeError::HashMismatch {
            block: event.l2_block,
            reported: event.reported_hash,
            computed,
        });
    }
    Ok(computed)
}
