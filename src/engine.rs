//! Entity extraction engine.
//!
//! The engine tags spans of a single sentence as one of the four entity
//! kinds. It is split into focused submodules under `src/engine/`.
//!
//! ## How the parts work together
//!
//! ```text
//! rules (all)  ──┐
//!               │  CompiledRules::new           (compiled_rules.rs)
//!               └───────────────┬──────────────
//!                               │
//! sentence ── TriggerInfo::scan ┼─ select active rules (buckets + phrases + kinds)
//!            (trigger.rs)       │
//!                               v
//!                     Extractor::collect (extractor.rs)
//!                       - match every active rule
//!                       - dedup same-kind same-span via NodeKey (dedup.rs)
//!                               │
//!                               v
//!                     Extractor::resolve_overlaps
//!                       - longer span wins
//!                       - equal length: condition > measurement > medication > action
//!                               │
//!                               v
//!                     resolve_node (resolve.rs)
//!                               │
//!                               v
//!                        Vec<ClinicalEntity>  (left-to-right)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `compiled_rules.rs`: derives `CompiledRules` from `Rule`s and builds cheap
//!   indexes (bucket lists, per-rule metadata).
//! - `trigger.rs`: scans the sentence to compute coarse buckets and key words
//!   for rule activation.
//! - `extractor.rs`: runs matching and overlap resolution.
//! - `dedup.rs`: stable keys for collapsing duplicate candidates.
//! - `resolve.rs`: turns nodes into public `ClinicalEntity` values.
//! - `metrics.rs`: timing and count data for a run.
//!
//! Gating is only an optimisation: a gated run must produce exactly what an
//! ungated run over all rules would.

#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/extractor.rs"]
mod extractor;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/trigger.rs"]
mod trigger;

#[allow(unused_imports)]
pub use compiled_rules::{BucketMask, CompiledRules, KindSet, RuleIndex, RuleMeta};
#[allow(unused_imports)]
pub use extractor::Extractor;
#[allow(unused_imports)]
pub use metrics::{PassMetrics, RunMetrics, RunResult};
#[allow(unused_imports)]
pub use trigger::TriggerInfo;
