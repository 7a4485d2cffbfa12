//! Brute-force dialect discovery
//!
//! Given a target order hash (for example one reported by the verifying
//! contract) and the logical order fields that produced it, walk every
//! combination of the encoding axes until one reproduces the target.
//!
//! Iteration order is prefix -> hash primitive -> struct dialect (address
//! typing, item type encoding, then amount typing with its wide sub-dialects)
//! -> domain name -> version -> chain id -> revision. Each combination is evaluated once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use starknet_crypto::Felt;
use tracing::{debug, info, warn};

use crate::snip12::{
    combine_order_hash, domain_hash_with, felt_to_hex, AddressTyping, AmountEncoding, AmountKind,
    DialectConfig, DomainConfig, DomainRevision, DomainValue, HashPrimitive, ItemTypeEncoding,
    MessagePrefix, StructDialect, StructHash, WideEncoding,
};
use crate::types::OrderParameters;

/// Progress is logged every this many candidates
const PROGRESS_INTERVAL: usize = 5_000;

/// Candidate pools for every axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectSpace {
    pub prefixes: Vec<MessagePrefix>,
    pub primitives: Vec<HashPrimitive>,
    pub address_typings: Vec<AddressTyping>,
    pub item_type_encodings: Vec<ItemTypeEncoding>,
    pub amount_kinds: Vec<AmountKind>,
    pub wide_encodings: Vec<WideEncoding>,
    pub names: Vec<DomainValue>,
    pub versions: Vec<DomainValue>,
    pub chain_ids: Vec<DomainValue>,
    pub revisions: Vec<DomainRevision>,
}

impl DialectSpace {
    /// Built-in pools. Widen these when a search comes back exhausted.
    pub fn documented() -> Self {
        Self {
            prefixes: MessagePrefix::ALL.to_vec(),
            primitives: HashPrimitive::ALL.to_vec(),
            address_typings: AddressTyping::ALL.to_vec(),
            item_type_encodings: ItemTypeEncoding::ALL.to_vec(),
            amount_kinds: vec![AmountKind::Felt, AmountKind::U256],
            wide_encodings: WideEncoding::ALL.to_vec(),
            names: vec![
                DomainValue::text("Marketplace"),
                DomainValue::text("Medialane"),
                DomainValue::text("NFT Marketplace"),
                DomainValue::text("NFTMarketplace"),
                DomainValue::text("Starknet Marketplace"),
                DomainValue::text("Seaport"),
            ],
            versions: vec![
                DomainValue::text("1"),
                DomainValue::text("v1"),
                DomainValue::text("1.0"),
                DomainValue::text("1.0.0"),
                DomainValue::text("0"),
                DomainValue::Numeric(1),
            ],
            chain_ids: vec![
                DomainValue::text("SN_MAIN"),
                DomainValue::text("SN_SEPOLIA"),
                DomainValue::Numeric(0),
                DomainValue::Numeric(1),
            ],
            revisions: DomainRevision::ALL.to_vec(),
        }
    }

    /// Space holding exactly one dialect
    pub fn single(dialect: &DialectConfig) -> Self {
        let (amount_kinds, wide_encodings) = match dialect.structs.amounts {
            AmountEncoding::Felt => (vec![AmountKind::Felt], Vec::new()),
            AmountEncoding::U256(wide) => (vec![AmountKind::U256], vec![wide]),
        };
        Self {
            prefixes: vec![dialect.prefix],
            primitives: vec![dialect.primitive],
            address_typings: vec![dialect.structs.addresses],
            item_type_encodings: vec![dialect.structs.item_types],
            amount_kinds,
            wide_encodings,
            names: vec![dialect.domain.name.clone()],
            versions: vec![dialect.domain.version.clone()],
            chain_ids: vec![dialect.domain.chain_id.clone()],
            revisions: vec![dialect.domain.revision],
        }
    }

    /// Address typing x item type encoding x amount encodings; `Felt` amounts
    /// contribute one entry, `U256` one per wide encoding
    pub fn struct_dialects(&self) -> Vec<StructDialect> {
        let mut dialects = Vec::new();
        for &addresses in &self.address_typings {
            for &item_types in &self.item_type_encodings {
                for kind in &self.amount_kinds {
                    match kind {
                        AmountKind::Felt => dialects.push(
                            StructDialect::new(addresses, AmountEncoding::Felt)
                                .with_item_types(item_types),
                        ),
                        AmountKind::U256 => {
                            for &wide in &self.wide_encodings {
                                dialects.push(
                                    StructDialect::new(addresses, AmountEncoding::U256(wide))
                                        .with_item_types(item_types),
                                );
                            }
                        }
                    }
                }
            }
        }
        dialects
    }

    /// Number of combinations
    pub fn len(&self) -> usize {
        self.prefixes.len()
            * self.primitives.len()
            * self.struct_dialects().len()
            * self.names.len()
            * self.versions.len()
            * self.chain_ids.len()
            * self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn domains(&self) -> impl Iterator<Item = DomainConfig> + '_ {
        self.names.iter().flat_map(move |name| {
            self.versions.iter().flat_map(move |version| {
                self.chain_ids.iter().flat_map(move |chain_id| {
                    self.revisions.iter().map(move |&revision| DomainConfig {
                        name: name.clone(),
                        version: version.clone(),
                        chain_id: chain_id.clone(),
                        revision,
                    })
                })
            })
        })
    }

    /// Every combination, lazily, in search order
    pub fn iter(&self) -> impl Iterator<Item = DialectConfig> + '_ {
        let struct_dialects = self.struct_dialects();
        self.prefixes.iter().flat_map(move |&prefix| {
            let struct_dialects = struct_dialects.clone();
            self.primitives.iter().flat_map(move |&primitive| {
                struct_dialects.clone().into_iter().flat_map(move |structs| {
                    self.domains().map(move |domain| DialectConfig {
                        prefix,
                        primitive,
                        structs,
                        domain,
                    })
                })
            })
        })
    }

    /// One sub-space per prefix x primitive, covering the space exactly once
    pub fn partition(&self) -> Vec<DialectSpace> {
        let mut partitions = Vec::new();
        for &prefix in &self.prefixes {
            for &primitive in &self.primitives {
                partitions.push(DialectSpace {
                    prefixes: vec![prefix],
                    primitives: vec![primitive],
                    ..self.clone()
                });
            }
        }
        partitions
    }
}

/// Hashes computed for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchDetails {
    pub domain_hash: Felt,
    pub struct_hash: Felt,
    pub order_hash: Felt,
    /// Candidates evaluated up to and including this one. A parallel search
    /// reports the total across all workers.
    pub evaluated: usize,
}

/// A dialect reproducing the target hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectMatch {
    pub dialect: DialectConfig,
    pub details: MatchDetails,
}

/// One evaluated combination
#[derive(Debug, Clone)]
pub struct Candidate {
    pub dialect: DialectConfig,
    /// `None` when the order fields cannot be encoded under this dialect
    pub details: Option<MatchDetails>,
    pub matched: bool,
}

impl Candidate {
    pub fn into_match(self) -> Option<DialectMatch> {
        match (self.matched, self.details) {
            (true, Some(details)) => Some(DialectMatch {
                dialect: self.dialect,
                details,
            }),
            _ => None,
        }
    }
}

/// Terminal state of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(DialectMatch),
    /// No combination matched; the pools or the order literals are wrong
    Exhausted { evaluated: usize },
}

impl SearchOutcome {
    pub fn found(&self) -> Option<&DialectMatch> {
        match self {
            SearchOutcome::Found(found) => Some(found),
            SearchOutcome::Exhausted { .. } => None,
        }
    }
}

/// Memoizes the struct and domain hashes shared between candidates
struct CandidateEvaluator<'a> {
    order: &'a OrderParameters,
    struct_hashes: HashMap<(HashPrimitive, StructDialect), Option<Felt>>,
    domain_hashes: HashMap<(HashPrimitive, DomainConfig), Option<Felt>>,
}

impl<'a> CandidateEvaluator<'a> {
    fn new(order: &'a OrderParameters) -> Self {
        Self {
            order,
            struct_hashes: HashMap::new(),
            domain_hashes: HashMap::new(),
        }
    }

    fn evaluate(&mut self, dialect: &DialectConfig, evaluated: usize) -> Option<MatchDetails> {
        let order = self.order;
        let struct_hash = *self
            .struct_hashes
            .entry((dialect.primitive, dialect.structs))
            .or_insert_with(|| {
                order
                    .struct_hash_with(dialect.primitive, dialect.structs)
                    .map_err(|e| debug!("Struct dialect {:?} not applicable: {}", dialect.structs, e))
                    .ok()
            });
        let domain_hash = *self
            .domain_hashes
            .entry((dialect.primitive, dialect.domain.clone()))
            .or_insert_with(|| {
                domain_hash_with(dialect.primitive, &dialect.domain)
                    .map_err(|e| debug!("Domain {:?} not applicable: {}", dialect.domain, e))
                    .ok()
            });

        let (struct_hash, domain_hash) = (struct_hash?, domain_hash?);
        let order_hash = combine_order_hash(dialect.prefix, dialect.primitive, domain_hash, struct_hash)
            .map_err(|e| debug!("Prefix {:?} not applicable: {}", dialect.prefix, e))
            .ok()?;

        Some(MatchDetails {
            domain_hash,
            struct_hash,
            order_hash,
            evaluated,
        })
    }
}

/// Lazy stream of evaluated candidates
pub struct Candidates<'a> {
    configs: Box<dyn Iterator<Item = DialectConfig> + 'a>,
    evaluator: CandidateEvaluator<'a>,
    target: Felt,
    evaluated: usize,
}

impl Iterator for Candidates<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        let dialect = self.configs.next()?;
        self.evaluated += 1;
        if self.evaluated % PROGRESS_INTERVAL == 0 {
            debug!("Evaluated {} candidates", self.evaluated);
        }

        let details = self.evaluator.evaluate(&dialect, self.evaluated);
        let matched = details.is_some_and(|d| d.order_hash == self.target);
        Some(Candidate {
            dialect,
            details,
            matched,
        })
    }
}

/// Search over one space for one order and target hash
pub struct DialectSearch<'a> {
    space: &'a DialectSpace,
    order: &'a OrderParameters,
    target: Felt,
}

impl<'a> DialectSearch<'a> {
    pub fn new(space: &'a DialectSpace, order: &'a OrderParameters, target: Felt) -> Self {
        Self {
            space,
            order,
            target,
        }
    }

    pub fn candidates(&self) -> Candidates<'a> {
        Candidates {
            configs: Box::new(self.space.iter()),
            evaluator: CandidateEvaluator::new(self.order),
            target: self.target,
            evaluated: 0,
        }
    }

    /// Stop at the first match
    pub fn find_first(&self) -> SearchOutcome {
        info!(
            "Searching {} dialects for target {}",
            self.space.len(),
            felt_to_hex(&self.target)
        );

        let mut evaluated = 0;
        for candidate in self.candidates() {
            evaluated += 1;
            if let Some(found) = candidate.into_match() {
                info!("Match after {} candidates: {}", evaluated, found.dialect);
                return SearchOutcome::Found(found);
            }
        }

        warn!("Search exhausted after {} candidates", evaluated);
        SearchOutcome::Exhausted { evaluated }
    }

    /// Every matching dialect in the space
    pub fn find_all(&self) -> Vec<DialectMatch> {
        self.candidates().filter_map(Candidate::into_match).collect()
    }
}

/// Sequential first-match search
pub fn find_dialect(space: &DialectSpace, order: &OrderParameters, target: Felt) -> SearchOutcome {
    DialectSearch::new(space, order, target).find_first()
}

/// First-match search with one worker per prefix x primitive partition.
///
/// Workers stop as soon as any of them finds a match. Among the partitions
/// that report one, the earliest in search order wins. The match carries the
/// candidate count summed over every worker.
pub fn find_dialect_parallel(
    space: &DialectSpace,
    order: &OrderParameters,
    target: Felt,
) -> SearchOutcome {
    let partitions = space.partition();
    let found = AtomicBool::new(false);
    let evaluated = AtomicUsize::new(0);

    info!(
        "Searching {} dialects for target {} across {} workers",
        space.len(),
        felt_to_hex(&target),
        partitions.len()
    );

    let results: Vec<Option<DialectMatch>> = thread::scope(|scope| {
        let handles: Vec<_> = partitions
            .iter()
            .map(|partition| {
                let found = &found;
                let evaluated = &evaluated;
                scope.spawn(move || {
                    let search = DialectSearch::new(partition, order, target);
                    let mut candidates = search.candidates();
                    let mut local = 0;
                    while !found.load(Ordering::Relaxed) {
                        let Some(candidate) = candidates.next() else {
                            break;
                        };
                        local += 1;
                        if let Some(matched) = candidate.into_match() {
                            found.store(true, Ordering::Relaxed);
                            evaluated.fetch_add(local, Ordering::Relaxed);
                            return Some(matched);
                        }
                    }
                    evaluated.fetch_add(local, Ordering::Relaxed);
                    None
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|_| {
                warn!("Search worker panicked");
                None
            }))
            .collect()
    });

    let evaluated = evaluated.load(Ordering::Relaxed);
    match results.into_iter().flatten().next() {
        Some(mut found) => {
            found.details.evaluated = evaluated;
            info!("Match after {} candidates: {}", evaluated, found.dialect);
            SearchOutcome::Found(found)
        }
        None => {
            warn!("Search exhausted after {} candidates", evaluated);
            SearchOutcome::Exhausted { evaluated }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snip12::tests::reference_order;
    use crate::snip12::{order_hash, WideUint};

    fn order() -> OrderParameters {
        reference_order()
    }

    /// Poseidon-only space, small enough for unit tests
    fn narrow_space() -> DialectSpace {
        DialectSpace {
            primitives: vec![HashPrimitive::Poseidon],
            names: vec![DomainValue::text("Marketplace"), DomainValue::text("Seaport")],
            versions: vec![DomainValue::text("1"), DomainValue::Numeric(1)],
            chain_ids: vec![DomainValue::text("SN_MAIN"), DomainValue::text("SN_SEPOLIA")],
            ..DialectSpace::documented()
        }
    }

    #[test]
    fn test_len_matches_iteration_count() {
        let space = narrow_space();
        // 3 prefixes * 1 primitive * 2 * 3 * (1 + 4) struct dialects * 2 * 2 * 2 * 3
        assert_eq!(space.len(), 3 * 30 * 2 * 2 * 2 * 3);
        assert_eq!(space.iter().count(), space.len());
    }

    #[test]
    fn test_documented_space_size() {
        let space = DialectSpace::documented();
        assert_eq!(space.struct_dialects().len(), 30);
        assert_eq!(space.len(), 3 * 2 * 30 * 6 * 6 * 4 * 3);
        assert!(space.names.contains(&DomainValue::text("Medialane")));
    }

    #[test]
    fn test_iteration_covers_each_combination_once() {
        let space = narrow_space();
        let unique: std::collections::HashSet<DialectConfig> = space.iter().collect();
        assert_eq!(unique.len(), space.len());
    }

    #[test]
    fn test_partitions_cover_space() {
        let space = DialectSpace::documented();
        let partitions = space.partition();
        assert_eq!(partitions.len(), 6);
        assert_eq!(partitions.iter().map(|p| p.len()).sum::<usize>(), space.len());
    }

    #[test]
    fn test_innermost_axis_is_revision() {
        let space = narrow_space();
        let first: Vec<DialectConfig> = space.iter().take(3).collect();
        assert_eq!(first[0].domain.revision, DomainRevision::FeltOne);
        assert_eq!(first[1].domain.revision, DomainRevision::ShortStringOne);
        assert_eq!(first[2].domain.revision, DomainRevision::Absent);
        assert_eq!(first[0].domain.name, first[2].domain.name);
    }

    #[test]
    fn test_forward_then_backward_finds_known_dialect() {
        let space = narrow_space();
        let order = order();
        let known = space.iter().nth(97).unwrap();
        let target = order_hash(&known, &order).unwrap();

        match find_dialect(&space, &order, target) {
            SearchOutcome::Found(found) => {
                assert_eq!(found.dialect, known);
                assert_eq!(found.details.order_hash, target);
                assert_eq!(found.details.evaluated, 98);
            }
            SearchOutcome::Exhausted { .. } => panic!("known dialect not found"),
        }
    }

    #[test]
    fn test_find_all_returns_exactly_the_known_dialect() {
        let space = narrow_space();
        let order = order();
        let known = space.iter().last().unwrap();
        let target = order_hash(&known, &order).unwrap();

        let matches = DialectSearch::new(&space, &order, target).find_all();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].dialect, known);
    }

    #[test]
    fn test_narrowed_pool_is_exhausted() {
        let space = narrow_space();
        let order = order();
        let mut outside = space.iter().next().unwrap();
        outside.domain.name = DomainValue::text("Elsewhere");
        let target = order_hash(&outside, &order).unwrap();

        assert_eq!(
            find_dialect(&space, &order, target),
            SearchOutcome::Exhausted {
                evaluated: space.len()
            }
        );
    }

    #[test]
    fn test_parallel_search_finds_known_dialect() {
        let space = narrow_space();
        let order = order();
        let known = space
            .iter()
            .find(|d| d.prefix == MessagePrefix::StarkNetKeccak)
            .unwrap();
        let target = order_hash(&known, &order).unwrap();

        let outcome = find_dialect_parallel(&space, &order, target);
        assert_eq!(outcome.found().map(|f| &f.dialect), Some(&known));
    }

    #[test]
    fn test_parallel_match_counts_every_worker() {
        let space = narrow_space();
        let order = order();
        let known = space.iter().last().unwrap();
        let last_partition_len = space.partition().last().unwrap().len();
        let target = order_hash(&known, &order).unwrap();

        let found = find_dialect_parallel(&space, &order, target)
            .found()
            .cloned()
            .unwrap();
        assert_eq!(found.dialect, known);
        assert!(found.details.evaluated >= last_partition_len);
        assert!(found.details.evaluated <= space.len());
    }

    #[test]
    fn test_parallel_search_exhausts() {
        let space = narrow_space();
        let outcome = find_dialect_parallel(&space, &order(), Felt::from(0xdeadu64));
        assert_eq!(
            outcome,
            SearchOutcome::Exhausted {
                evaluated: space.len()
            }
        );
    }

    #[test]
    fn test_single_space_holds_one_dialect() {
        let known = narrow_space().iter().nth(5).unwrap();
        let space = DialectSpace::single(&known);
        assert_eq!(space.len(), 1);
        assert_eq!(space.iter().next(), Some(known));
    }

    #[test]
    fn test_inapplicable_candidates_are_skipped() {
        let mut order = order();
        order.offer.start_amount = WideUint::from_limbs(u128::MAX, u128::MAX);
        let space = narrow_space();
        let known = space
            .iter()
            .find(|d| d.structs.amounts != AmountEncoding::Felt)
            .unwrap();
        let target = order_hash(&known, &order).unwrap();

        let candidates: Vec<Candidate> = DialectSearch::new(&space, &order, target)
            .candidates()
            .collect();
        assert!(candidates
            .iter()
            .filter(|c| c.dialect.structs.amounts == AmountEncoding::Felt)
            .all(|c| c.details.is_none()));
        assert_eq!(candidates.iter().filter(|c| c.matched).count(), 1);
    }
}
