//! # guideline-gherkin
//!
//! A rule-based pipeline that turns sentences of clinical guideline prose into
//! structured decision records and then into paired positive/negative Gherkin
//! scenarios.
//!
//! ```text
//! prose ── split_sentences ──▶ sentences
//!                                 │  (fan-out per sentence, order-preserving join)
//!                                 ▼
//!                        Extractor (engine/)  ──▶ ClinicalEntity*
//!                                 │
//!                                 ▼
//!                        synthesize (synthesis.rs) ──▶ DecisionRecord*
//!                                 │
//!                                 ▼
//!                        map_record / map_descriptor (scenario.rs) ──▶ ScenarioPair*
//!                                 │
//!                                 ▼
//!                        render_feature (render.rs) ──▶ RenderedFeature
//! ```
//!
//! Every stage is a pure, synchronous transformation. Degenerate input yields
//! degenerate but well-defined output; the only rejected input is a hand
//! authored [`ScenarioDescriptor`] missing a required field.

use regex::{Captures, Regex};

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod normalize;
mod render;
mod rules;
mod scenario;
mod synthesis;

pub use api::{
    ClinicalEntity, Comparator, EntityKind, ExtractorOptions, Generation, GenerationVerbose, Options, SentenceTrace,
    extract_entities, extract_entities_with, generate, generate_from_descriptor, generate_verbose,
    generate_with_counter, records_from_text,
};
pub use engine::{KindSet, RunMetrics};
pub use error::{Error, Result};
pub use normalize::split_sentences;
pub use render::{
    FORMAT, FeatureMetadata, RenderedFeature, ScenarioCounter, render_feature, render_feature_with_counter,
};
pub use scenario::{
    MapperOptions, Polarity, ScenarioDescriptor, ScenarioPair, ScenarioSpec, map_descriptor, map_descriptors,
    map_record,
};
pub use synthesis::{
    DEFAULT_GUIDELINE, DecisionRecord, FALLBACK_SITUATION, LOGIC_RULES, Logic, LogicRule, RECORD_CONFIDENCE,
    SituationFallback, classify_logic, synthesize,
};

// --- Internal types ---------------------------------------------------------

/// A parsed comparison threshold attached to a measurement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Threshold {
    pub comparator: Comparator,
    pub value: f64,
    /// Number of fractional digits in the source literal ("7.0" -> 1).
    pub precision: usize,
    pub unit: Option<String>,
}

/// What a rule production hands back to the engine.
#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: EntityKind,
    /// Entity text when it differs from the matched span (a measurement
    /// threshold spans "HbA1c > 7.0%" but names "HbA1c").
    pub text: Option<String>,
    pub lemma: Option<String>,
    pub threshold: Option<Threshold>,
}

impl Token {
    pub fn term(kind: EntityKind) -> Self {
        Token { kind, text: None, lemma: None, threshold: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_lemma(mut self, lemma: &str) -> Self {
        self.lemma = Some(lemma.to_string());
        self
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Capture groups of a single regex match, original case preserved.
#[derive(Debug, Clone)]
pub(crate) struct Groups {
    groups: Vec<Option<String>>,
}

impl Groups {
    pub fn from_captures(caps: &Captures<'_>) -> Self {
        Groups { groups: caps.iter().map(|g| g.map(|m| m.as_str().to_string())).collect() }
    }

    /// Group `idx`, if it participated in the match.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.groups.get(idx).and_then(|g| g.as_deref())
    }
}

pub(crate) type Production = Box<dyn Fn(&Groups) -> Option<Token> + Send + Sync>;

/// A lexical rule: a name, the entity kind it tags, a regex `pattern`, and a
/// `production` that turns the capture groups into a `Token`.
///
/// The gating fields let the extractor skip rules that cannot match the
/// current sentence.
pub(crate) struct Rule {
    pub name: &'static str,
    pub kind: EntityKind,
    pub pattern: &'static Regex,
    pub production: Production,
    /// Required phrases - ALL must appear in input for this rule to activate (AND logic).
    pub required_phrases: &'static [&'static str],
    /// Optional phrases - ANY one must appear in input for this rule to activate (OR logic).
    pub optional_phrases: &'static [&'static str],
    /// Bucket mask - rule only activates if input has matching buckets.
    pub buckets: u32,
    /// Priority for same-kind, same-span tie-breaking (higher = preferred).
    pub priority: u16,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("pattern", &self.pattern.as_str())
            .field("production", &"<function>")
            .field("buckets", &self.buckets)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Range {
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}

impl Range {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A rule match: the produced `Token` plus the consumed `Range` of the
/// sentence.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub range: Range,
    pub token: Token,
    /// Name of the rule that produced this node.
    pub rule_name: &'static str,
    pub priority: u16,
}

// --- Stash: lightweight container for candidate nodes -----------------------

#[derive(Debug, Clone, Default)]
pub(crate) struct Stash {
    nodes: Vec<Node>,
}

impl Stash {
    /// Create an empty `Stash`.
    pub fn empty() -> Self {
        Stash { nodes: Vec::new() }
    }

    /// Return true if the stash is empty.
    pub fn null(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return nodes sorted by `(start, end)`.
    pub fn to_pos_ordered_list(&self) -> Vec<Node> {
        let mut v = self.nodes.clone();
        v.sort_by_key(|n| (n.range.start, n.range.end));
        v
    }

    /// Insert a node into the stash (appends to internal vector).
    pub fn insert(&mut self, node: Node) {
        self.nodes.push(node);
    }
}
