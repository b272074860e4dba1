//! Matching and overlap resolution.
//!
//! This module is the operational core of the engine:
//!
//! - Select the subset of rules that are plausible for the sentence (bucket,
//!   phrase and kind gating; see `compiled_rules.rs` and `trigger.rs`).
//! - Match every active rule against the sentence and collect candidate
//!   `Node`s into a `Stash`, collapsing same-kind duplicates (see `dedup.rs`).
//! - Resolve overlapping candidates so that each byte of the sentence belongs
//!   to at most one entity.
//! - Resolve surviving nodes into `ClinicalEntity` values (see `resolve.rs`).
//!
//! ## Overlap policy
//!
//! ```text
//! candidates ── sort by (len desc, kind rank asc, start asc, priority desc)
//!            ── greedily keep a node unless it overlaps a kept node
//!            ── re-sort kept nodes by start
//! ```
//!
//! Kind rank is the declaration order of `EntityKind`
//! (condition < measurement < medication < action), so an equal-length clash
//! between a condition and a measurement keeps the condition.
//!
//! The output depends only on the sentence and the rule list, never on rule
//! evaluation order.

use super::compiled_rules::{BUCKET_DRUGISH, BUCKET_HAS_DIGITS, BucketMask, CompiledRules, KindSet, RuleId};
use super::dedup::NodeKey;
use super::metrics::{PassMetrics, RunMetrics, RunResult};
use super::resolve::resolve_node;
use super::trigger::TriggerInfo;
use crate::{ClinicalEntity, Groups, Node, Range, Rule, Stash};
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use tracing::{debug, trace};

/// Extractor applies `Rule`s to one sentence.
///
/// Usage: create with `Extractor::new(sentence, &rules, kinds)` then call
/// `run()`.
///
/// ```text
/// new() -> collect() -> resolve_overlaps() -> resolve_node()*
/// ```
#[derive(Debug)]
pub struct Extractor<'a> {
    /// Sentence to tag.
    input: &'a str,
    /// Compiled rules (shared reference).
    compiled: CompiledRules<'a>,
    /// Rules that survived gating, in declaration order.
    active_rules: Vec<&'a Rule>,
}

impl<'a> Extractor<'a> {
    /// Create a new `Extractor` for `input` using pre-compiled rules.
    pub fn new_compiled(input: &'a str, compiled: CompiledRules<'a>, kinds: KindSet) -> Self {
        let trigger_info = TriggerInfo::scan(input);
        trace!(buckets = ?trigger_info.buckets, words = trigger_info.phrases.len(), "trigger scan");

        // BTreeSet keeps the active rules in declaration order.
        let mut active_rule_ids: BTreeSet<RuleId> = compiled.index.always_on.iter().copied().collect();

        if trigger_info.buckets.contains(BucketMask::HAS_DIGITS) {
            active_rule_ids.extend(&compiled.index.by_bucket[BUCKET_HAS_DIGITS]);
        }
        if trigger_info.buckets.contains(BucketMask::DRUGISH) {
            active_rule_ids.extend(&compiled.index.by_bucket[BUCKET_DRUGISH]);
        }

        let mut phrase_filtered = 0;
        active_rule_ids.retain(|&id| {
            let meta = &compiled.metas[id];

            if !kinds.includes(meta.kind) {
                return false;
            }

            // Check required_phrases (AND logic - all must be present)
            if !meta.required_phrases.is_empty()
                && !meta.required_phrases.iter().all(|&phrase| trigger_info.phrases.contains(phrase))
            {
                phrase_filtered += 1;
                return false;
            }

            // Check optional_phrases (OR logic - at least one must be present)
            if !meta.optional_phrases.is_empty()
                && !meta.optional_phrases.iter().any(|&phrase| trigger_info.phrases.contains(phrase))
            {
                phrase_filtered += 1;
                return false;
            }

            true
        });

        debug!(
            active = active_rule_ids.len(),
            total = compiled.rules.len(),
            phrase_filtered,
            "active rules"
        );

        let active_rules: Vec<&Rule> = active_rule_ids.iter().map(|&id| compiled.rules[id]).collect();

        Extractor { input, compiled, active_rules }
    }

    /// Create a new `Extractor` for `input` using `rules`.
    ///
    /// Convenience wrapper that builds a temporary `CompiledRules`.
    pub fn new(input: &'a str, rules: &'a [Rule], kinds: KindSet) -> Self {
        Self::new_compiled(input, CompiledRules::new(rules), kinds)
    }

    pub(crate) fn active_rule_names(&self) -> Vec<&'static str> {
        self.active_rules.iter().map(|r| r.name).collect()
    }

    /// Every match of `rule` in the sentence.
    fn lookup_rule(&self, rule: &Rule) -> Vec<Node> {
        let mut res = Vec::new();
        for caps in rule.pattern.captures_iter(self.input) {
            let Some(m) = caps.get(0) else {
                continue;
            };
            if m.as_str().trim().is_empty() {
                continue;
            }
            let groups = Groups::from_captures(&caps);
            match (rule.production)(&groups) {
                Some(token) => {
                    trace!(rule = rule.name, start = m.start(), end = m.end(), text = m.as_str(), "production ok");
                    res.push(Node {
                        range: Range { start: m.start(), end: m.end() },
                        token,
                        rule_name: rule.name,
                        priority: rule.priority,
                    });
                }
                None => trace!(rule = rule.name, text = m.as_str(), "production none"),
            }
        }
        res
    }

    /// Match every active rule and collapse same-kind duplicates, keeping the
    /// highest-priority rule's node for each key.
    fn collect(&self) -> (Stash, PassMetrics) {
        let start = Instant::now();
        let mut discovered: Vec<Node> = Vec::new();
        let mut rules_matched = 0;

        for rule in &self.active_rules {
            let nodes = self.lookup_rule(rule);
            if !nodes.is_empty() {
                rules_matched += 1;
                discovered.extend(nodes);
            }
        }

        // Stable sort: equal priorities keep declaration order.
        discovered.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut seen: HashSet<NodeKey> = HashSet::new();
        let mut stash = Stash::empty();
        for node in discovered {
            if seen.insert(NodeKey::from_node(&node)) {
                stash.insert(node);
            }
        }

        let metrics = PassMetrics {
            duration: start.elapsed(),
            rules_considered: self.active_rules.len(),
            rules_matched,
            produced: stash.len(),
            dropped_overlaps: 0,
        };
        (stash, metrics)
    }

    /// Keep the longest non-overlapping candidates, breaking equal-length ties
    /// by kind rank, then position, then rule priority.
    fn resolve_overlaps(stash: &Stash) -> (Vec<Node>, usize) {
        let mut ranked = stash.to_pos_ordered_list();
        ranked.sort_by(|a, b| {
            b.range
                .len()
                .cmp(&a.range.len())
                .then(a.token.kind.cmp(&b.token.kind))
                .then(a.range.start.cmp(&b.range.start))
                .then(b.priority.cmp(&a.priority))
        });

        let mut kept: Vec<Node> = Vec::new();
        let mut dropped = 0;
        for node in ranked {
            if let Some(winner) = kept.iter().find(|k| k.range.overlaps(&node.range)) {
                trace!(
                    dropped = node.rule_name,
                    kept = winner.rule_name,
                    start = node.range.start,
                    end = node.range.end,
                    "overlap"
                );
                dropped += 1;
                continue;
            }
            kept.push(node);
        }

        kept.sort_by_key(|n| (n.range.start, n.range.end));
        (kept, dropped)
    }

    /// Run the extractor and return timing details.
    pub fn run_with_metrics(self) -> RunResult {
        let total_start = Instant::now();
        let (stash, mut matching) = self.collect();

        let resolve_start = Instant::now();
        let candidates: Vec<ClinicalEntity> =
            stash.to_pos_ordered_list().iter().filter_map(|node| resolve_node(self.input, node)).collect();
        let (kept, dropped) = if stash.null() { (Vec::new(), 0) } else { Self::resolve_overlaps(&stash) };
        matching.dropped_overlaps = dropped;
        let entities: Vec<ClinicalEntity> = kept.iter().filter_map(|node| resolve_node(self.input, node)).collect();
        let resolve = resolve_start.elapsed();

        debug!(
            candidates = candidates.len(),
            entities = entities.len(),
            dropped,
            rules = self.compiled.rules.len(),
            "extraction finished"
        );

        RunResult {
            candidates,
            entities,
            metrics: RunMetrics { total: total_start.elapsed(), matching, resolve },
        }
    }

    /// Run the extractor, discarding timing details.
    pub fn run(self) -> Vec<ClinicalEntity> {
        self.run_with_metrics().entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityKind;

    fn extract(input: &str) -> Vec<ClinicalEntity> {
        let rules = crate::rules::get();
        Extractor::new(input, &rules, KindSet::all()).run()
    }

    #[test]
    fn entities_come_back_left_to_right() {
        let entities = extract("Metformin is preferred for type 2 diabetes; monitor renal function.");
        let starts: Vec<usize> = entities.iter().map(|e| e.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(entities[0].kind, EntityKind::Medication);
        assert_eq!(entities[1].text, "type 2 diabetes");
    }

    #[test]
    fn longer_span_beats_shorter_overlap() {
        let entities = extract("HbA1c > 7.0% warrants review.");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "HbA1c");
        assert_eq!(entities[0].value, Some(7.0));
    }

    #[test]
    fn equal_span_tie_prefers_condition() {
        let entities = extract("Proteinuria was noted.");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].kind, EntityKind::Condition);
        assert_eq!(entities[0].text, "Proteinuria");
    }

    #[test]
    fn duplicate_drug_matches_collapse() {
        let rules = crate::rules::get();
        let run = Extractor::new("Start metformin.", &rules, KindSet::all()).run_with_metrics();
        let meds: Vec<_> = run.candidates.iter().filter(|e| e.kind == EntityKind::Medication).collect();
        assert_eq!(meds.len(), 1);
        assert_eq!(run.entities.len(), 1);
    }

    #[test]
    fn kind_gating_skips_disabled_kinds() {
        let rules = crate::rules::get();
        let entities = Extractor::new("Metformin for type 2 diabetes.", &rules, KindSet::MEDICATION).run();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].kind, EntityKind::Medication);
    }

    #[test]
    fn no_matches_is_empty_not_error() {
        assert!(extract("The committee met on Tuesday.").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn active_rules_follow_triggers() {
        let rules = crate::rules::get();
        let plain = Extractor::new("Patients should be monitored.", &rules, KindSet::all());
        let numeric = Extractor::new("Patients with BMI 30 should be monitored.", &rules, KindSet::all());
        assert!(plain.active_rule_names().len() < numeric.active_rule_names().len());
    }
}
