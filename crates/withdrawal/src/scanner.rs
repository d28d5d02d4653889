//! Selection of the real withdrawal whose storage proof is cheapest to reuse.
//!
//! A forged leaf can only borrow a real proof if every node above the leaf is
//! a branch: branch nodes commit to one nibble each, so a forged key that
//! shares the real key's leading nibbles walks the same nodes. Extension nodes
//! would have to be forged too, which this tool does not attempt.
//!
//! Scanning is split into fetching (events, proofs), classifying every node,
//! and a pure [`select_shortest`] over the classified candidates.

use crate::{
    hash::verify_event_hash,
    key::{storage_slot, trie_key, KeyPrefix},
    node::{classify_node, NodeKind},
    source::WithdrawalSource,
    types::{StorageProof, StorageSlot, TrieKey, WithdrawalEvent, WithdrawalHash},
    ForgeError,
};
use alloy_primitives::{Address, Bytes};
use config::ScanConfig;
use std::fmt;
use tracing::{debug, info, warn};

/// Block range of a single `eth_getLogs` request (500 block margin under common 10k limits).
const CHUNK_SIZE: u64 = 9_500;

/// Classified nodes of one proof, root first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofPath(Vec<NodeKind>);

impl ProofPath {
    pub fn classify(nodes: &[Bytes]) -> Self {
        Self(nodes.iter().map(|node| classify_node(node)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Why this path cannot carry a forged leaf, if it cannot.
    pub fn rejection(&self) -> Option<Rejection> {
        if let Some(index) = self.0.iter().position(NodeKind::is_unknown) {
            return Some(Rejection::UnknownNode { index });
        }
        if let Some(index) = self.0.iter().position(NodeKind::is_extension) {
            return Some(Rejection::ExtensionNode { index });
        }
        match self.0.last() {
            Some(last) if last.is_leaf() => None,
            Some(_) => Some(Rejection::NotLeafTerminated),
            None => Some(Rejection::Empty),
        }
    }

    pub fn is_reusable(&self) -> bool {
        self.rejection().is_none()
    }
}

impl fmt::Display for ProofPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", kinds.join(", "))
    }
}

/// Reason a candidate's proof was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    UnknownNode { index: usize },
    ExtensionNode { index: usize },
    NotLeafTerminated,
}

impl Rejection {
    /// Short label, used as a metrics label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::UnknownNode { .. } => "unknown_node",
            Self::ExtensionNode { .. } => "extension_node",
            Self::NotLeafTerminated => "not_leaf_terminated",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("proof has no nodes"),
            Self::UnknownNode { index } => write!(f, "node {index} is not a valid trie node"),
            Self::ExtensionNode { index } => write!(f, "node {index} is an extension"),
            Self::NotLeafTerminated => f.write_str("proof does not end in a leaf"),
        }
    }
}

/// A real withdrawal together with its storage proof at the anchor block.
#[derive(Debug, Clone)]
pub struct ScannedCandidate {
    pub event: WithdrawalEvent,
    pub slot: StorageSlot,
    pub trie_key: TrieKey,
    pub proof: StorageProof,
    pub path: ProofPath,
}

impl ScannedCandidate {
    /// Classify the proof of `event`. `proof` must belong to the event's slot.
    pub fn new(event: WithdrawalEvent, proof: StorageProof) -> Self {
        let slot = storage_slot(event.reported_hash);
        let path = ProofPath::classify(&proof.nodes);
        Self {
            event,
            slot,
            trie_key: trie_key(slot),
            proof,
            path,
        }
    }
}

/// Keep reusable candidates and return the one with the fewest nodes.
///
/// Ties go to the earliest candidate.
pub fn select_shortest(
    candidates: impl IntoIterator<Item = ScannedCandidate>,
) -> Option<ScannedCandidate> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.path.is_reusable())
        .min_by_key(|candidate| candidate.path.len())
}

/// The real proof a forged withdrawal will reuse.
#[derive(Debug, Clone)]
pub struct ProofTarget {
    pub candidate: ScannedCandidate,
    /// Leading trie key nibbles the forged withdrawal has to share
    pub prefix: KeyPrefix,
    /// L2 block all proofs were taken at
    pub block: u64,
    /// Number of candidates whose proofs were classified
    pub scanned: usize,
    /// Skipped candidates and why
    pub rejected: Vec<(WithdrawalHash, Rejection)>,
}

/// Scans recent real withdrawals for a reusable storage proof.
pub struct WithdrawalScanner<'a, S: ?Sized> {
    source: &'a S,
    message_passer: Address,
    config: ScanConfig,
}

impl<'a, S> WithdrawalScanner<'a, S>
where
    S: WithdrawalSource + ?Sized,
{
    pub const fn new(source: &'a S, message_passer: Address, config: ScanConfig) -> Self {
        Self {
            source,
            message_passer,
            config,
        }
    }

    /// Pick the real withdrawal with the shortest reusable proof at `block`.
    ///
    /// Events are taken from the `lookback_blocks` blocks up to and including
    /// `block`, capped at `max_candidates`. Proofs are fetched one at a time.
    pub async fn scan(&self, block: u64) -> Result<ProofTarget, ForgeError> {
        let from_block = block.saturating_sub(self.config.lookback_blocks);
        let events = self.collect_events(from_block, block).await?;
        if events.is_empty() {
            return Err(ForgeError::NoEvents {
                from: from_block,
                to: block,
            });
        }

        info!(
            count = events.len(),
            from = from_block,
            to = block,
            "Searching recent real withdrawals for reusable proofs"
        );

        let mut candidates = Vec::with_capacity(events.len());
        for event in events {
            candidates.push(self.inspect(event, block).await?);
        }

        let scanned = candidates.len();
        let rejected: Vec<_> = candidates
            .iter()
            .filter_map(|candidate| {
                candidate
                    .path
                    .rejection()
                    .map(|reason| (candidate.event.reported_hash, reason))
            })
            .collect();

        let Some(candidate) = select_shortest(candidates) else {
            return Err(ForgeError::NoQualifyingCandidate {
                scanned,
                block,
                rejected,
            });
        };

        // The trie key was derived from the reported hash; it is only the right
        // key if the event's fields hash to it.
        verify_event_hash(&candidate.event)?;

        let prefix = KeyPrefix::of(
            candidate.trie_key,
            candidate.path.len() + self.config.prefix_margin,
        );

        info!(
            withdrawal_hash = %candidate.event.reported_hash,
            trie_key = %candidate.trie_key,
            prefix = %prefix,
            path = %candidate.path,
            scanned,
            rejected = rejected.len(),
            "Selected real withdrawal to reuse"
        );

        Ok(ProofTarget {
            candidate,
            prefix,
            block,
            scanned,
            rejected,
        })
    }

    /// Fetch events in `[from_block, to_block]` chunk by chunk, oldest first,
    /// stopping once `max_candidates` are collected.
    pub async fn collect_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<WithdrawalEvent>, ForgeError> {
        let mut events = Vec::new();
        let mut current = from_block;

        while current <= to_block && events.len() < self.config.max_candidates {
            let chunk_end = current.saturating_add(CHUNK_SIZE - 1).min(to_block);

            debug!(
                from = current,
                to = chunk_end,
                "Scanning chunk for withdrawals"
            );

            let chunk = self.source.withdrawal_events(current, chunk_end).await?;
            events.extend(chunk);

            if chunk_end == to_block {
                break;
            }
            current = chunk_end + 1;
        }

        events.truncate(self.config.max_candidates);
        Ok(events)
    }

    /// Fetch and classify the proof of one event at `block`.
    pub async fn inspect(
        &self,
        event: WithdrawalEvent,
        block: u64,
    ) -> Result<ScannedCandidate, ForgeError> {
        let slot = storage_slot(event.reported_hash);
        let proof = self
            .source
            .storage_proof(self.message_passer, slot, block)
            .await?;
        let candidate = ScannedCandidate::new(event, proof);

        match candidate.path.rejection() {
            None => debug!(
                withdrawal_hash = %candidate.event.reported_hash,
                nodes = candidate.path.len(),
                path = %candidate.path,
                "Reusable proof"
            ),
            Some(reason) => warn!(
                withdrawal_hash = %candidate.event.reported_hash,
                l2_block = ?candidate.event.l2_block,
                nodes = candidate.path.len(),
                %reason,
                "Skipping candidate"
            ),
        }

        Ok(candidate)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        hash::compute_withdrawal_hash,
        node::tests::{branch_node, short_node},
        types::BlockSnapshot,
    };
    use alloy_primitives::{B256, U256};
    use async_trait::async_trait;
    use binding::opstack::{WithdrawalTransaction, MESSAGE_PASSER_ADDRESS};
    use std::{collections::HashMap, sync::Mutex};

    fn leaf() -> Bytes {
        Bytes::from(short_node(&[0x3a, 0xbc], &[0x01]))
    }

    fn extension() -> Bytes {
        Bytes::from(short_node(&[0x00, 0x12], &[0xaa; 32]))
    }

    fn branch() -> Bytes {
        Bytes::from(branch_node())
    }

    pub(crate) fn event(nonce: u64) -> WithdrawalEvent {
        let transaction = WithdrawalTransaction {
            nonce: U256::from(nonce),
            sender: Address::repeat_byte(0x01),
            target: Address::repeat_byte(0x02),
            value: U256::from(1_000),
            gasLimit: U256::from(100_000),
            data: Bytes::new(),
        };
        WithdrawalEvent {
            reported_hash: compute_withdrawal_hash(&transaction),
            transaction,
            l2_block: Some(100 + nonce),
        }
    }

    fn candidate(nonce: u64, nodes: Vec<Bytes>) -> ScannedCandidate {
        ScannedCandidate::new(
            event(nonce),
            StorageProof {
                storage_hash: B256::repeat_byte(0x55),
                nodes,
            },
        )
    }

    /// In-memory L2 with recorded calls.
    #[derive(Default)]
    pub(crate) struct MockSource {
        pub(crate) events: Vec<WithdrawalEvent>,
        pub(crate) proofs: HashMap<B256, Vec<Bytes>>,
        pub(crate) log_ranges: Mutex<Vec<(u64, u64)>>,
        pub(crate) proof_requests: Mutex<Vec<(Address, B256, u64)>>,
    }

    impl MockSource {
        pub(crate) fn with(mut self, event: WithdrawalEvent, nodes: Vec<Bytes>) -> Self {
            self.proofs.insert(storage_slot(event.reported_hash), nodes);
            self.events.push(event);
            self
        }
    }

    #[async_trait]
    impl WithdrawalSource for MockSource {
        async fn latest_block_number(&self) -> Result<u64, ForgeError> {
            Ok(1_000)
        }

        async fn withdrawal_events(
            &self,
            from_block: u64,
            to_block: u64,
        ) -> Result<Vec<WithdrawalEvent>, ForgeError> {
            self.log_ranges.lock().unwrap().push((from_block, to_block));
            Ok(self
                .events
                .iter()
                .filter(|e| e.l2_block.is_some_and(|b| (from_block..=to_block).contains(&b)))
                .cloned()
                .collect())
        }

        async fn storage_proof(
            &self,
            account: Address,
            slot: B256,
            block: u64,
        ) -> Result<StorageProof, ForgeError> {
            self.proof_requests
                .lock()
                .unwrap()
                .push((account, slot, block));
            let nodes = self
                .proofs
                .get(&slot)
                .cloned()
                .ok_or_else(|| ForgeError::malformed("eth_getProof", "unknown slot"))?;
            Ok(StorageProof {
                storage_hash: B256::repeat_byte(0x55),
                nodes,
            })
        }

        async fn block(&self, number: u64) -> Result<BlockSnapshot, ForgeError> {
            Ok(BlockSnapshot {
                number,
                hash: B256::repeat_byte(0x66),
                state_root: B256::repeat_byte(0x77),
            })
        }
    }

    fn scan_config() -> ScanConfig {
        ScanConfig {
            lookback_blocks: 1_000,
            max_candidates: 100,
            prefix_margin: 1,
        }
    }

    #[test]
    fn test_path_rejections() {
        let ends_in_extension = ProofPath::classify(&[branch(), extension()]);
        assert_eq!(
            ends_in_extension.rejection(),
            Some(Rejection::ExtensionNode { index: 1 })
        );

        let mid_extension = ProofPath::classify(&[branch(), extension(), leaf()]);
        assert_eq!(
            mid_extension.rejection(),
            Some(Rejection::ExtensionNode { index: 1 })
        );

        let ends_in_branch = ProofPath::classify(&[branch(), branch()]);
        assert_eq!(
            ends_in_branch.rejection(),
            Some(Rejection::NotLeafTerminated)
        );

        let unknown = ProofPath::classify(&[branch(), Bytes::from_static(&[0xc0]), leaf()]);
        assert_eq!(
            unknown.rejection(),
            Some(Rejection::UnknownNode { index: 1 })
        );

        assert_eq!(ProofPath::classify(&[]).rejection(), Some(Rejection::Empty));

        let clean = ProofPath::classify(&[branch(), branch(), leaf()]);
        assert!(clean.is_reusable());
        assert_eq!(clean.len(), 3);
    }

    #[test]
    fn test_select_only_clean_leaf_path() {
        let candidates = vec![
            candidate(1, vec![branch(), extension()]),
            candidate(2, vec![branch(), extension(), leaf()]),
            candidate(3, vec![branch(), branch(), leaf()]),
        ];

        let selected = select_shortest(candidates).unwrap();
        assert_eq!(selected.event, event(3));
        assert_eq!(selected.path.len(), 3);
    }

    #[test]
    fn test_select_shortest_prefers_fewest_nodes_then_earliest() {
        let candidates = vec![
            candidate(1, vec![branch(), branch(), branch(), leaf()]),
            candidate(2, vec![branch(), leaf()]),
            candidate(3, vec![branch(), leaf()]),
            candidate(4, vec![branch(), branch(), leaf()]),
        ];

        let selected = select_shortest(candidates).unwrap();
        assert_eq!(selected.event, event(2));
    }

    #[test]
    fn test_select_shortest_none_when_nothing_reusable() {
        let candidates = vec![
            candidate(1, vec![branch(), extension()]),
            candidate(2, vec![branch(), branch()]),
        ];
        assert!(select_shortest(candidates).is_none());
        assert!(select_shortest(Vec::new()).is_none());
    }

    #[test]
    fn test_path_display() {
        let path = ProofPath::classify(&[branch(), leaf()]);
        assert_eq!(path.to_string(), "[branch, leaf [path=abc] [value=01]]");
    }

    #[tokio::test]
    async fn test_scan_selects_shortest_and_derives_prefix() {
        let source = MockSource::default()
            .with(event(1), vec![branch(), branch(), branch(), leaf()])
            .with(event(2), vec![branch(), extension(), leaf()])
            .with(event(3), vec![branch(), leaf()]);

        let scanner = WithdrawalScanner::new(&source, MESSAGE_PASSER_ADDRESS, scan_config());
        let target = scanner.scan(500).await.unwrap();

        assert_eq!(target.candidate.event, event(3));
        assert_eq!(target.block, 500);
        assert_eq!(target.scanned, 3);
        assert_eq!(
            target.rejected,
            vec![(
                event(2).reported_hash,
                Rejection::ExtensionNode { index: 1 }
            )]
        );
        // Two nodes plus a one nibble margin.
        assert_eq!(target.prefix.len(), 3);
        assert!(target.prefix.matches(&target.candidate.trie_key));
        assert_eq!(
            target.candidate.trie_key,
            trie_key(storage_slot(event(3).reported_hash))
        );

        // Every proof is fetched at the anchor block from the message passer.
        let requests = source.proof_requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests
            .iter()
            .all(|(account, _, block)| *account == MESSAGE_PASSER_ADDRESS && *block == 500));
    }

    #[tokio::test]
    async fn test_scan_caps_candidates() {
        let mut source = MockSource::default();
        for nonce in 1..=5 {
            source = source.with(event(nonce), vec![branch(), leaf()]);
        }

        let config = ScanConfig {
            max_candidates: 2,
            ..scan_config()
        };
        let scanner = WithdrawalScanner::new(&source, MESSAGE_PASSER_ADDRESS, config);
        let target = scanner.scan(500).await.unwrap();

        assert_eq!(target.scanned, 2);
        assert_eq!(target.candidate.event, event(1));
        assert_eq!(source.proof_requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_collect_events_chunks_range() {
        let source = MockSource::default();
        let config = ScanConfig {
            lookback_blocks: 20_000,
            ..scan_config()
        };
        let scanner = WithdrawalScanner::new(&source, MESSAGE_PASSER_ADDRESS, config);

        let events = scanner.collect_events(0, 20_000).await.unwrap();
        assert!(events.is_empty());

        let ranges = source.log_ranges.lock().unwrap();
        assert_eq!(
            *ranges,
            vec![(0, 9_499), (9_500, 18_999), (19_000, 20_000)]
        );
    }

    #[tokio::test]
    async fn test_collect_events_stops_once_capped() {
        let source = MockSource::default()
            .with(event(1), vec![branch(), leaf()])
            .with(event(2), vec![branch(), leaf()]);
        let config = ScanConfig {
            max_candidates: 1,
            ..scan_config()
        };
        let scanner = WithdrawalScanner::new(&source, MESSAGE_PASSER_ADDRESS, config);

        let events = scanner.collect_events(0, 50_000).await.unwrap();
        assert_eq!(events, vec![event(1)]);
        assert_eq!(source.log_ranges.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_without_events() {
        let source = MockSource::default();
        let scanner = WithdrawalScanner::new(&source, MESSAGE_PASSER_ADDRESS, scan_config());

        let err = scanner.scan(500).await.unwrap_err();
        assert!(matches!(err, ForgeError::NoEvents { from: 0, to: 500 }));
    }

    #[tokio::test]
    async fn test_scan_without_reusable_proof() {
        let source = MockSource::default()
            .with(event(1), vec![branch(), extension()])
            .with(event(2), vec![branch(), branch()]);
        let scanner = WithdrawalScanner::new(&source, MESSAGE_PASSER_ADDRESS, scan_config());

        let err = scanner.scan(500).await.unwrap_err();
        match err {
            ForgeError::NoQualifyingCandidate {
                scanned,
                block,
                rejected,
            } => {
                assert_eq!(scanned, 2);
                assert_eq!(block, 500);
                assert_eq!(
                    rejected,
                    vec![
                        (event(1).reported_hash, Rejection::ExtensionNode { index: 1 }),
                        (event(2).reported_hash, Rejection::NotLeafTerminated),
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_scan_rejects_hash_mismatch() {
        let mut tampered = event(1);
        tampered.transaction.value = U256::from(999);
        let source = MockSource::default().with(tampered, vec![branch(), leaf()]);
        let scanner = WithdrawalScanner::new(&source, MESSAGE_PASSER_ADDRESS, scan_config());

        let err = scanner.scan(500).await.unwrap_err();
        assert!(matches!(err, ForgeError::HashMismatch { block: Some(101), .. }));
    }

    #[tokio::test]
    async fn test_scan_propagates_remote_failure() {
        let mut source = MockSource::default().with(event(1), vec![branch(), leaf()]);
        source.proofs.clear();
        let scanner = WithdrawalScanner::new(&source, MESSAGE_PASSER_ADDRESS, scan_config());

        let err = scanner.scan(500).await.unwrap_err();
        assert!(matches!(err, ForgeError::MalformedResponse { .. }));
    }
}
