//! Rule compilation and indexing.
//!
//! This module holds the *static* side of the engine: the structures derived
//! from the full rule list that make an extraction run cheaper.
//!
//! The indexing currently supports:
//!
//! - **Buckets** (`BucketMask`): coarse boolean features of the sentence (e.g.
//!   "contains digits") that let whole rule families be skipped.
//! - **Phrases** (stored on each `RuleMeta`): key words used for further gating
//!   in the extractor.
//! - **Kinds** (`KindSet`): which entity kinds a caller has enabled.
//!
//! ## Extension points
//!
//! - Adding a new bucket:
//!   1. Add a `BucketMask` bit.
//!   2. Add a `BUCKET_*` constant and bump `BUCKET_COUNT`.
//!   3. Teach `CompiledRules::new` to index that bucket.
//!   4. Teach `TriggerInfo::scan` (in `trigger.rs`) to detect it.
//!   5. Teach `Extractor::new_compiled` (in `extractor.rs`) to activate rules from it.
//!
//! ## Invariants
//!
//! - `RuleId` is an index into `CompiledRules::rules` and `CompiledRules::metas`.
//!   Those vectors must stay aligned.

use crate::{EntityKind, Rule};

/// Rule identifier (index into the rules vector).
pub(crate) type RuleId = usize;

bitflags::bitflags! {
    /// Coarse buckets for fast sentence classification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BucketMask: u32 {
        const HAS_DIGITS = 1 << 0;
        const DRUGISH    = 1 << 1;
    }
}

bitflags::bitflags! {
    /// A set of entity kinds.
    ///
    /// Used by [`ExtractorOptions`](crate::ExtractorOptions) to restrict which
    /// pattern sets run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KindSet: u8 {
        const CONDITION   = 1 << 0;
        const MEASUREMENT = 1 << 1;
        const MEDICATION  = 1 << 2;
        const ACTION      = 1 << 3;
    }
}

impl KindSet {
    pub fn of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Condition => KindSet::CONDITION,
            EntityKind::Measurement => KindSet::MEASUREMENT,
            EntityKind::Medication => KindSet::MEDICATION,
            EntityKind::Action => KindSet::ACTION,
        }
    }

    pub fn includes(self, kind: EntityKind) -> bool {
        self.contains(KindSet::of(kind))
    }
}

impl Default for KindSet {
    fn default() -> Self {
        KindSet::all()
    }
}

/// Metadata attached to a rule.
#[derive(Clone, Copy, Debug)]
pub struct RuleMeta {
    pub kind: EntityKind,
    pub required_phrases: &'static [&'static str],
    pub optional_phrases: &'static [&'static str],
    pub buckets: BucketMask,
    pub priority: u16,
}

#[derive(Default, Debug)]
pub struct RuleIndex {
    pub always_on: Vec<RuleId>,
    pub by_bucket: [Vec<RuleId>; BUCKET_COUNT],
}

pub const BUCKET_COUNT: usize = 2;
pub const BUCKET_HAS_DIGITS: usize = 0;
pub const BUCKET_DRUGISH: usize = 1;

/// Pre-compiled rule set with metadata and indexes.
#[derive(Debug)]
pub struct CompiledRules<'a> {
    pub rules: Vec<&'a Rule>,
    pub metas: Vec<RuleMeta>,
    pub index: RuleIndex,
}

impl<'a> CompiledRules<'a> {
    /// Create a compiled rule set from a slice of rules.
    ///
    /// Metadata comes directly from `Rule` fields; patterns are not rewritten.
    pub fn new(rules: &'a [Rule]) -> Self {
        let rule_refs: Vec<&Rule> = rules.iter().collect();

        let metas: Vec<RuleMeta> = rule_refs
            .iter()
            .map(|r| RuleMeta {
                kind: r.kind,
                required_phrases: r.required_phrases,
                optional_phrases: r.optional_phrases,
                buckets: BucketMask::from_bits_truncate(r.buckets),
                priority: r.priority,
            })
            .collect();

        let mut index = RuleIndex::default();

        for (id, meta) in metas.iter().enumerate() {
            if meta.buckets.is_empty() {
                // No bucket requirements -> always on (phrase filtering happens later)
                index.always_on.push(id);
            } else {
                if meta.buckets.contains(BucketMask::HAS_DIGITS) {
                    index.by_bucket[BUCKET_HAS_DIGITS].push(id);
                }
                if meta.buckets.contains(BucketMask::DRUGISH) {
                    index.by_bucket[BUCKET_DRUGISH].push(id);
                }
            }
        }

        CompiledRules { rules: rule_refs, metas, index }
    }
}
