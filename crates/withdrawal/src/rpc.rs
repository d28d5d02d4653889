//! JSON-RPC backed implementations of the [`crate::source`] traits.

use crate::{
    source::{OutputSource, WithdrawalSource},
    types::{BlockSnapshot, OutputAnchor, StorageProof, WithdrawalEvent},
    ForgeError,
};
use alloy_contract::private::Provider;
use alloy_primitives::{Address, B256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use async_trait::async_trait;
use binding::opstack::{IL2OutputOracle, IL2ToL1MessagePasser, WithdrawalTransaction};
use tracing::debug;

/// L2 data from an RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcWithdrawalSource<P> {
    provider: P,
    message_passer: Address,
}

impl<P> RpcWithdrawalSource<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, message_passer: Address) -> Self {
        Self {
            provider,
            message_passer,
        }
    }
}

#[async_trait]
impl<P> WithdrawalSource for RpcWithdrawalSource<P>
where
    P: Provider + Clone,
{
    async fn latest_block_number(&self) -> Result<u64, ForgeError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ForgeError::remote("eth_blockNumber", e))
    }

    async fn withdrawal_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<WithdrawalEvent>, ForgeError> {
        let contract = IL2ToL1MessagePasser::new(self.message_passer, &self.provider);

        let events = contract
            .MessagePassed_filter()
            .from_block(from_block)
            .to_block(to_block)
            .query()
            .await
            .map_err(|e| ForgeError::remote("eth_getLogs", e))?;

        debug!(
            from = from_block,
            to = to_block,
            count = events.len(),
            "Fetched MessagePassed events"
        );

        Ok(events
            .into_iter()
            .map(|(event, log)| WithdrawalEvent {
                transaction: WithdrawalTransaction {
                    nonce: event.nonce,
                    sender: event.sender,
                    target: event.target,
                    value: event.value,
                    gasLimit: event.gasLimit,
                    data: event.data,
                },
                reported_hash: event.withdrawalHash,
                l2_block: log.block_number,
            })
            .collect())
    }

    async fn storage_proof(
        &self,
        account: Address,
        slot: B256,
        block: u64,
    ) -> Result<StorageProof, ForgeError> {
        let response = self
            .provider
            .get_proof(account, vec![slot])
            .block_id(BlockNumberOrTag::Number(block).into())
            .await
            .map_err(|e| ForgeError::remote("eth_getProof", e))?;

        let storage = response
            .storage_proof
            .into_iter()
            .next()
            .ok_or_else(|| ForgeError::malformed("eth_getProof", "no storage proof returned"))?;

        if storage.proof.is_empty() {
            return Err(ForgeError::malformed(
                "eth_getProof",
                format!("empty proof for slot {slot} at block {block}"),
            ));
        }

        Ok(StorageProof {
            storage_hash: response.storage_hash,
            nodes: storage.proof,
        })
    }

    async fn block(&self, number: u64) -> Result<BlockSnapshot, ForgeError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await
            .map_err(|e| ForgeError::remote("eth_getBlockByNumber", e))?
            .ok_or_else(|| {
                ForgeError::malformed("eth_getBlockByNumber", format!("block {number} not found"))
            })?;

        if block.header.number != number {
            return Err(ForgeError::malformed(
                "eth_getBlockByNumber",
                format!("asked for block {number}, got {}", block.header.number),
            ));
        }

        Ok(BlockSnapshot {
            number,
            hash: block.header.hash,
            state_root: block.header.state_root,
        })
    }
}

/// L1 output oracle data from an RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcOutputSource<P> {
    provider: P,
    oracle: Address,
}

impl<P> RpcOutputSource<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, oracle: Address) -> Self {
        Self { provider, oracle }
    }
}

#[async_trait]
impl<P> OutputSource for RpcOutputSource<P>
where
    P: Provider + Clone,
{
    async fn latest_output(&self) -> Result<OutputAnchor, ForgeError> {
        let oracle = IL2OutputOracle::new(self.oracle, &self.provider);

        let index = oracle
            .latestOutputIndex()
            .call()
            .await
            .map_err(|e| ForgeError::remote("latestOutputIndex", e))?;

        let proposal = oracle
            .getL2Output(index)
            .call()
            .await
            .map_err(|e| ForgeError::remote("getL2Output", e))?;

        let l2_block_number = u64::try_from(proposal.l2BlockNumber).map_err(|_| {
            ForgeError::malformed(
                "getL2Output",
                format!("l2BlockNumber {} does not fit u64", proposal.l2BlockNumber),
            )
        })?;

        debug!(
            index = %index,
            l2_block = l2_block_number,
            output_root = %proposal.outputRoot,
            "Fetched latest output proposal"
        );

        Ok(OutputAnchor {
            index,
            output_root: proposal.outputRoot,
            l2_block_number,
        })
    }
}
