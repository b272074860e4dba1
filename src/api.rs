use crate::engine::{self, KindSet, RunMetrics};
use crate::error::Result;
use crate::normalize::split_sentences;
use crate::render::{FeatureMetadata, RenderedFeature, ScenarioCounter, render_feature, render_feature_with_counter};
use crate::scenario::{MapperOptions, ScenarioDescriptor, ScenarioPair, map_descriptor, map_record};
use crate::synthesis::{DecisionRecord, SituationFallback, synthesize};
use crate::Rule;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

static DEFAULT_RULES: Lazy<Vec<Rule>> = Lazy::new(crate::rules::get);

/// The closed classification of tagged spans.
///
/// Declaration order is the tie-break order for equal-length overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Condition,
    Measurement,
    Medication,
    Action,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] =
        [EntityKind::Condition, EntityKind::Measurement, EntityKind::Medication, EntityKind::Action];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Condition => "condition",
            EntityKind::Measurement => "measurement",
            EntityKind::Medication => "medication",
            EntityKind::Action => "action",
        }
    }

    /// Kinds that contribute to a record's `situation`.
    pub fn is_situation(self) -> bool {
        matches!(self, EntityKind::Condition | EntityKind::Measurement)
    }

    /// Kinds that yield a record's `recommendation`.
    pub fn is_recommendation(self) -> bool {
        matches!(self, EntityKind::Medication | EntityKind::Action)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator bound to a measurement threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
        }
    }

    /// The complementary comparator: the boundary on the other side of the
    /// threshold.
    pub fn negated(self) -> Self {
        match self {
            Comparator::Gt => Comparator::Le,
            Comparator::Ge => Comparator::Lt,
            Comparator::Lt => Comparator::Ge,
            Comparator::Le => Comparator::Gt,
            Comparator::Eq => Comparator::Ne,
            Comparator::Ne => Comparator::Eq,
        }
    }

    /// Parse a symbolic or verbal comparator ("≥", "at least", "below", ...).
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let lower = lower.split_whitespace().collect::<Vec<_>>().join(" ");
        let cmp = match lower.as_str() {
            ">" | "above" | "over" | "greater than" | "more than" | "higher than" | "exceeds" | "exceeding"
            | "exceed" => Comparator::Gt,
            ">=" | "≥" | "=>" | "at least" | "greater than or equal to" | "of at least" => Comparator::Ge,
            "<" | "below" | "under" | "less than" | "lower than" => Comparator::Lt,
            "<=" | "≤" | "=<" | "at most" | "less than or equal to" => Comparator::Le,
            "=" | "==" | "equal to" => Comparator::Eq,
            "!=" | "≠" => Comparator::Ne,
            _ => return None,
        };
        Some(cmp)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A tagged span of one sentence.
///
/// `start`/`end` are byte offsets into the sentence that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalEntity {
    /// Entity text. For thresholded measurements this is the analyte only.
    pub text: String,
    pub kind: EntityKind,
    /// Parsed comparison value, for measurements with a threshold.
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub comparator: Option<Comparator>,
    /// Fractional digits of the parsed value literal ("7.0" -> 1).
    #[serde(default)]
    pub precision: usize,
    /// Canonical phrase for actions ("monitored" -> "monitoring").
    pub lemma: Option<String>,
    pub start: usize,
    pub end: usize,
}

impl ClinicalEntity {
    /// Situation text: `"<text> <comparator><value><unit>"` when a threshold
    /// was parsed, the bare text otherwise.
    pub fn describe(&self) -> String {
        match (self.comparator, self.value) {
            (Some(cmp), Some(value)) => self.describe_with(cmp, value),
            _ => self.text.clone(),
        }
    }

    /// Situation text with the threshold flipped to its complement, used for
    /// the negative scenario.
    pub fn describe_boundary(&self) -> String {
        match (self.comparator, self.value) {
            (Some(cmp), Some(value)) => self.describe_with(cmp.negated(), value),
            _ if self.kind == EntityKind::Measurement => format!("no abnormal {}", self.text),
            _ => format!("no {}", self.text),
        }
    }

    fn describe_with(&self, cmp: Comparator, value: f64) -> String {
        format!(
            "{} {}{:.*}{}",
            self.text,
            cmp.symbol(),
            self.precision,
            value,
            self.unit.as_deref().unwrap_or("")
        )
    }

    /// Recommendation text: the lemma when one exists, the surface text otherwise.
    pub fn recommendation(&self) -> &str {
        self.lemma.as_deref().unwrap_or(&self.text)
    }
}

/// Options for the extraction step.
#[derive(Debug, Clone, Default)]
pub struct ExtractorOptions {
    /// Entity kinds whose pattern sets run.
    pub kinds: KindSet,
}

/// Options that affect the whole pipeline.
#[derive(Debug, Clone)]
pub struct Options {
    pub extractor: ExtractorOptions,
    /// What to do with a record whose sentence had no condition/measurement.
    pub situation_fallback: SituationFallback,
    pub mapper: MapperOptions,
    /// Fan sentences out across the rayon pool. Output order is the same
    /// either way.
    pub parallel: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            extractor: ExtractorOptions::default(),
            situation_fallback: SituationFallback::default(),
            mapper: MapperOptions::default(),
            parallel: true,
        }
    }
}

/// Output of a generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub feature: RenderedFeature,
    /// Records the scenarios were mapped from (empty on the descriptor path).
    pub records: Vec<DecisionRecord>,
}

impl Generation {
    pub fn metadata(&self) -> FeatureMetadata {
        self.feature.metadata()
    }
}

/// Per-sentence detail for verbose runs.
#[derive(Debug, Clone)]
pub struct SentenceTrace {
    pub sentence: String,
    pub entities: Vec<ClinicalEntity>,
    /// Candidates before overlap resolution.
    pub candidates: Vec<ClinicalEntity>,
    pub records: Vec<DecisionRecord>,
    pub active_rules: Vec<String>,
    pub metrics: RunMetrics,
}

/// Result of [`generate_verbose`].
#[derive(Debug, Clone)]
pub struct GenerationVerbose {
    pub generation: Generation,
    pub sentences: Vec<SentenceTrace>,
    pub elapsed: Duration,
}

/// Tag the entities of one sentence using the default rules.
///
/// # Example
/// ```
/// use guideline_gherkin::{EntityKind, extract_entities};
///
/// let entities = extract_entities("Start metformin for type 2 diabetes.");
/// assert_eq!(entities[0].kind, EntityKind::Medication);
/// ```
pub fn extract_entities(sentence: &str) -> Vec<ClinicalEntity> {
    extract_entities_with(sentence, &ExtractorOptions::default())
}

pub fn extract_entities_with(sentence: &str, options: &ExtractorOptions) -> Vec<ClinicalEntity> {
    engine::Extractor::new(sentence, &DEFAULT_RULES, options.kinds).run()
}

fn trace_sentence(sentence: &str, category: &str, options: &Options) -> SentenceTrace {
    let extractor = engine::Extractor::new(sentence, &DEFAULT_RULES, options.extractor.kinds);
    let active_rules = extractor.active_rule_names().into_iter().map(str::to_string).collect();
    let run = extractor.run_with_metrics();
    let records = synthesize(sentence, &run.entities, category, options.situation_fallback);

    SentenceTrace {
        sentence: sentence.to_string(),
        entities: run.entities,
        candidates: run.candidates,
        records,
        active_rules,
        metrics: run.metrics,
    }
}

/// Stateless map over the sentences; rayon's indexed `collect` keeps the
/// input order regardless of completion order.
fn trace_sentences(sentences: &[String], category: &str, options: &Options) -> Vec<SentenceTrace> {
    if options.parallel {
        sentences.par_iter().map(|s| trace_sentence(s, category, options)).collect()
    } else {
        sentences.iter().map(|s| trace_sentence(s, category, options)).collect()
    }
}

/// Split `text` into sentences and synthesize decision records for each, in
/// sentence order.
pub fn records_from_text(text: &str, category: &str, options: &Options) -> Vec<DecisionRecord> {
    let sentences = split_sentences(text);
    trace_sentences(&sentences, category, options).into_iter().flat_map(|t| t.records).collect()
}

fn pairs_for(records: &[DecisionRecord], options: &Options) -> Vec<ScenarioPair> {
    records.iter().map(|r| map_record(r, &options.mapper)).collect()
}

/// Run the extraction path: prose -> records -> scenario pairs -> Gherkin.
///
/// # Example
/// ```
/// use guideline_gherkin::{Options, generate};
///
/// let out = generate("Patients should be monitored.", "follow_up", "Follow-up", &Options::default());
/// assert_eq!(out.metadata().scenario_count, 2);
/// ```
pub fn generate(text: &str, category: &str, feature_title: &str, options: &Options) -> Generation {
    let records = records_from_text(text, category, options);
    let pairs = pairs_for(&records, options);
    debug!(records = records.len(), pairs = pairs.len(), "generated scenarios");
    Generation { feature: render_feature(feature_title, &pairs), records }
}

/// Like [`generate`], tagging each scenario with an id drawn from `counter`.
pub fn generate_with_counter(
    text: &str,
    category: &str,
    feature_title: &str,
    options: &Options,
    counter: &mut ScenarioCounter,
) -> Generation {
    let records = records_from_text(text, category, options);
    let pairs = pairs_for(&records, options);
    Generation { feature: render_feature_with_counter(feature_title, &pairs, counter), records }
}

/// Run the direct-authoring path for one hand-written descriptor.
pub fn generate_from_descriptor(
    descriptor: &ScenarioDescriptor,
    feature_title: &str,
    options: &Options,
) -> Result<Generation> {
    let pair = map_descriptor(descriptor, &options.mapper)?;
    Ok(Generation { feature: render_feature(feature_title, std::slice::from_ref(&pair)), records: Vec::new() })
}

/// Like [`generate`], also returning per-sentence traces.
pub fn generate_verbose(text: &str, category: &str, feature_title: &str, options: &Options) -> GenerationVerbose {
    let start = Instant::now();
    let sentences = split_sentences(text);
    let traces = trace_sentences(&sentences, category, options);
    let records: Vec<DecisionRecord> = traces.iter().flat_map(|t| t.records.iter().cloned()).collect();
    let pairs = pairs_for(&records, options);
    let generation = Generation { feature: render_feature(feature_title, &pairs), records };

    GenerationVerbose { generation, sentences: traces, elapsed: start.elapsed() }
}
