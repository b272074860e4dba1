//! Scenario mapping: one [`DecisionRecord`] or hand-authored
//! [`ScenarioDescriptor`] becomes exactly one positive and one negative
//! [`ScenarioSpec`].

use crate::error::{Error, Result};
use crate::synthesis::{DecisionRecord, Logic};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::debug;

const NEGATIVE_THEN: [&str; 2] = ["no treatment should be initiated", "the patient should be monitored for changes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Gherkin tag carried by every spec of this polarity.
    pub fn tag(self) -> &'static str {
        match self {
            Polarity::Positive => "@positive",
            Polarity::Negative => "@negative",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag()[1..])
    }
}

/// One scenario, ready to render. `tags` is ordered with the polarity tag first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub title: String,
    pub tags: Vec<String>,
    pub given_clauses: Vec<String>,
    pub when_clause: String,
    pub then_clauses: Vec<String>,
    pub polarity: Polarity,
}

/// A positive spec and its negative counterpart. Only the mapper builds
/// pairs, so the two halves cannot be separated or swapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioPair {
    positive: ScenarioSpec,
    negative: ScenarioSpec,
}

impl ScenarioPair {
    pub fn positive(&self) -> &ScenarioSpec {
        &self.positive
    }

    pub fn negative(&self) -> &ScenarioSpec {
        &self.negative
    }

    /// Both specs, positive first.
    pub fn specs(&self) -> [&ScenarioSpec; 2] {
        [&self.positive, &self.negative]
    }
}

/// A hand-authored scenario for the direct-authoring path.
///
/// Every field is optional at the type level so a JSON object missing one can
/// still be read; [`map_descriptor`] rejects it with [`Error::MissingField`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDescriptor {
    pub scenario: Option<String>,
    pub condition: Option<String>,
    pub action: Option<String>,
    pub context: Option<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    pub expected_outcome: Option<String>,
}

impl ScenarioDescriptor {
    pub fn new(
        scenario: impl Into<String>,
        condition: impl Into<String>,
        action: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        ScenarioDescriptor {
            scenario: Some(scenario.into()),
            condition: Some(condition.into()),
            action: Some(action.into()),
            context: Some(context.into()),
            ..Default::default()
        }
    }

    pub fn with_contraindications<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contraindications = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expected_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.expected_outcome = Some(outcome.into());
        self
    }

    /// Parse a descriptor from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON descriptor file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Mapper settings supplied by the configuration collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperOptions {
    /// Category tag added to every spec, without the leading `@`.
    pub category_tag: String,
    /// Contraindications to emphasise on every positive scenario, after a
    /// descriptor's own list.
    pub contraindications: Vec<String>,
}

impl Default for MapperOptions {
    fn default() -> Self {
        MapperOptions { category_tag: "treatment".to_string(), contraindications: Vec::new() }
    }
}

impl MapperOptions {
    fn tags(&self, polarity: Polarity) -> Vec<String> {
        let category: String = self
            .category_tag
            .trim()
            .trim_start_matches('@')
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        let category = if category.is_empty() { "treatment".to_string() } else { category };
        vec![polarity.tag().to_string(), format!("@{category}")]
    }
}

fn when_clause(name: &str) -> String {
    format!("the {name} algorithm is applied")
}

fn positive_then(action: &str, expected_outcome: Option<&str>) -> Vec<String> {
    let mut then = vec![format!("{action} should be initiated")];
    then.extend(expected_outcome.map(str::trim).filter(|o| !o.is_empty()).map(str::to_string));
    then
}

/// Action identifier as it appears in step text: underscores become spaces
/// and the result is lowercased ("ACE_Inhibitor", "Metformin").
fn action_phrase(action: &str) -> String {
    action.replace('_', " ").split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Trimmed, non-empty contraindications from `lists`, first occurrence kept
/// (compared case-insensitively).
fn merged_contraindications<'a>(lists: &[&'a [String]]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    lists
        .iter()
        .flat_map(|list| list.iter())
        .map(|c| c.trim())
        .filter(|c| !c.is_empty() && seen.insert(c.to_lowercase()))
        .collect()
}

fn contraindication_clause(action: &str, item: &str) -> String {
    format!("the patient has no contraindications for {action}: {item}")
}

/// Context fragments split on "," and the word "and".
fn context_fragments(context: &str) -> Vec<String> {
    regex!(r"(?i),|\s+and\s+")
        .split(context)
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
        .collect()
}

fn negative_given(record: &DecisionRecord) -> String {
    if record.uses_fallback() {
        return format!("the patient does not have {}", record.situation);
    }
    let boundary: Vec<String> = record.criteria.iter().map(|c| c.describe_boundary()).collect();
    format!("the patient has {}", boundary.join(" OR "))
}

/// Map a decision record to its scenario pair.
///
/// A record whose situation is the fallback placeholder still maps; its specs
/// carry the placeholder as their condition clause.
pub fn map_record(record: &DecisionRecord, options: &MapperOptions) -> ScenarioPair {
    let action = action_phrase(&record.recommendation);
    let action = action.as_str();

    let mut given = vec![format!("the patient has {}", record.situation)];
    let emphasis = merged_contraindications(&[options.contraindications.as_slice()]);
    if emphasis.is_empty() {
        if record.logic == Logic::FirstLineUnlessContraindicated {
            given.push(format!("the patient has no contraindications for {action}"));
        }
    } else {
        given.extend(emphasis.into_iter().map(|c| contraindication_clause(action, c)));
    }

    let positive = ScenarioSpec {
        title: format!("Recommend {action} when {}", record.situation),
        tags: options.tags(Polarity::Positive),
        given_clauses: given,
        when_clause: when_clause(&record.guideline),
        then_clauses: positive_then(action, None),
        polarity: Polarity::Positive,
    };
    let negative = ScenarioSpec {
        title: format!("Withhold {action} when {} is not present", record.situation),
        tags: options.tags(Polarity::Negative),
        given_clauses: vec![negative_given(record)],
        when_clause: when_clause(&record.guideline),
        then_clauses: NEGATIVE_THEN.iter().map(|s| s.to_string()).collect(),
        polarity: Polarity::Negative,
    };

    ScenarioPair { positive, negative }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::MissingField { field }),
    }
}

/// Map a hand-authored descriptor to its scenario pair.
///
/// `scenario`, `condition`, `action` and `context` are required; a missing or
/// blank one is reported by name.
pub fn map_descriptor(descriptor: &ScenarioDescriptor, options: &MapperOptions) -> Result<ScenarioPair> {
    let scenario = required(&descriptor.scenario, "scenario")?;
    let condition = required(&descriptor.condition, "condition")?;
    let action = action_phrase(required(&descriptor.action, "action")?);
    let action = action.as_str();
    let context = required(&descriptor.context, "context")?;

    let mut given = vec![format!("the patient has {condition}")];
    given.extend(context_fragments(context));
    // The descriptor's own list first, then the configured emphasis.
    let contraindications =
        merged_contraindications(&[descriptor.contraindications.as_slice(), options.contraindications.as_slice()]);
    given.extend(contraindications.into_iter().map(|c| contraindication_clause(action, c)));

    let positive = ScenarioSpec {
        title: scenario.to_string(),
        tags: options.tags(Polarity::Positive),
        given_clauses: given,
        when_clause: when_clause(scenario),
        then_clauses: positive_then(action, descriptor.expected_outcome.as_deref()),
        polarity: Polarity::Positive,
    };
    let negative = ScenarioSpec {
        title: format!("{scenario} (condition absent)"),
        tags: options.tags(Polarity::Negative),
        given_clauses: vec![format!("the patient does not have {condition}")],
        when_clause: when_clause(scenario),
        then_clauses: NEGATIVE_THEN.iter().map(|s| s.to_string()).collect(),
        polarity: Polarity::Negative,
    };

    debug!(scenario, "mapped descriptor");
    Ok(ScenarioPair { positive, negative })
}

/// Map a batch of descriptors. Each unit fails on its own; one defect never
/// hides its siblings' results.
pub fn map_descriptors(descriptors: &[ScenarioDescriptor], options: &MapperOptions) -> Vec<Result<ScenarioPair>> {
    descriptors.iter().map(|d| map_descriptor(d, options)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SituationFallback, extract_entities, synthesize};

    const METFORMIN: &str = "For patients with type 2 diabetes and HbA1c > 7.0%, metformin should be initiated \
                             as first-line therapy unless contraindicated.";

    fn record(sentence: &str) -> DecisionRecord {
        let entities = extract_entities(sentence);
        let mut records = synthesize(sentence, &entities, "diabetes_management", SituationFallback::Placeholder);
        assert!(!records.is_empty(), "no record for '{sentence}'");
        records.remove(0)
    }

    fn ace_descriptor() -> ScenarioDescriptor {
        ScenarioDescriptor::new("ACE inhibitor for hypertension", "hypertension", "ACE_Inhibitor", "age over 55")
    }

    #[test]
    fn every_input_maps_to_one_positive_and_one_negative() {
        let sentences = [
            METFORMIN,
            "Patients should be monitored.",
            "If eGFR < 30 mL/min/1.73m2, discontinue metformin.",
        ];
        for sentence in sentences {
            let pair = map_record(&record(sentence), &MapperOptions::default());
            let polarities: Vec<Polarity> = pair.specs().iter().map(|s| s.polarity).collect();
            assert_eq!(polarities, vec![Polarity::Positive, Polarity::Negative]);
        }
        let pair = map_descriptor(&ace_descriptor(), &MapperOptions::default()).unwrap();
        assert_eq!(pair.positive().polarity, Polarity::Positive);
        assert_eq!(pair.negative().polarity, Polarity::Negative);
    }

    #[test]
    fn record_scenarios_carry_situation_and_boundary() {
        let pair = map_record(&record(METFORMIN), &MapperOptions::default());
        assert_eq!(
            pair.positive().given_clauses,
            vec![
                "the patient has type 2 diabetes AND HbA1c >7.0%".to_string(),
                "the patient has no contraindications for metformin".to_string(),
            ]
        );
        assert_eq!(pair.positive().when_clause, "the diabetes_management algorithm is applied");
        assert_eq!(pair.positive().then_clauses, vec!["metformin should be initiated".to_string()]);
        assert_eq!(
            pair.negative().given_clauses,
            vec!["the patient has no type 2 diabetes OR HbA1c <=7.0%".to_string()]
        );
        assert_eq!(pair.negative().then_clauses, NEGATIVE_THEN.to_vec());
    }

    #[test]
    fn fallback_record_keeps_placeholder_on_both_sides() {
        let pair = map_record(&record("Patients should be monitored."), &MapperOptions::default());
        assert_eq!(pair.positive().given_clauses, vec!["the patient has patient condition".to_string()]);
        assert_eq!(pair.negative().given_clauses, vec!["the patient does not have patient condition".to_string()]);
    }

    #[test]
    fn tags_put_polarity_first() {
        let options = MapperOptions { category_tag: "@heart failure".to_string(), ..MapperOptions::default() };
        let pair = map_descriptor(&ace_descriptor(), &options).unwrap();
        assert_eq!(pair.positive().tags, vec!["@positive".to_string(), "@heart_failure".to_string()]);
        assert_eq!(pair.negative().tags, vec!["@negative".to_string(), "@heart_failure".to_string()]);
    }

    #[test]
    fn configured_contraindications_replace_generic_clause() {
        let options = MapperOptions {
            contraindications: vec!["pregnancy".to_string()],
            ..MapperOptions::default()
        };
        let pair = map_record(&record("In type 2 diabetes, metformin is first-line unless contraindicated."), &options);
        assert_eq!(
            pair.positive().given_clauses[1..],
            ["the patient has no contraindications for metformin: pregnancy".to_string()]
        );
    }

    #[test]
    fn descriptor_lists_one_clause_per_contraindication() {
        let descriptor = ace_descriptor()
            .with_contraindications(["pregnancy", "bilateral renal artery stenosis"])
            .with_expected_outcome("blood pressure is reduced");
        let pair = map_descriptor(&descriptor, &MapperOptions::default()).unwrap();
        let contraindicated: Vec<&String> =
            pair.positive().given_clauses.iter().filter(|g| g.contains("no contraindications for")).collect();
        assert_eq!(contraindicated.len(), 2);
        assert_ne!(contraindicated[0], contraindicated[1]);
        assert_eq!(
            pair.positive().then_clauses,
            vec!["ace inhibitor should be initiated".to_string(), "blood pressure is reduced".to_string()]
        );
        assert_eq!(pair.negative().title, "ACE inhibitor for hypertension (condition absent)");
    }

    #[test]
    fn actions_are_lowercased_in_steps() {
        let pair = map_record(&record("Metformin should be initiated in type 2 diabetes."), &MapperOptions::default());
        assert_eq!(pair.positive().title, "Recommend metformin when type 2 diabetes");
        assert_eq!(pair.positive().then_clauses, vec!["metformin should be initiated".to_string()]);

        let descriptor = ScenarioDescriptor::new("ACE inhibitors", "hypertension", "ACE Inhibitor", "age over 55")
            .with_contraindications(["pregnancy"]);
        let pair = map_descriptor(&descriptor, &MapperOptions::default()).unwrap();
        assert_eq!(pair.positive().then_clauses, vec!["ace inhibitor should be initiated".to_string()]);
        assert_eq!(
            pair.positive().given_clauses.last().map(String::as_str),
            Some("the patient has no contraindications for ace inhibitor: pregnancy")
        );
    }

    #[test]
    fn descriptor_merges_configured_contraindications() {
        let options = MapperOptions {
            contraindications: vec!["Pregnancy".to_string(), "hyperkalemia".to_string()],
            ..MapperOptions::default()
        };
        let descriptor = ace_descriptor().with_contraindications(["pregnancy", "angioedema"]);
        let pair = map_descriptor(&descriptor, &options).unwrap();
        let items: Vec<&str> = pair
            .positive()
            .given_clauses
            .iter()
            .filter_map(|g| g.strip_prefix("the patient has no contraindications for ace inhibitor: "))
            .collect();
        assert_eq!(items, vec!["pregnancy", "angioedema", "hyperkalemia"]);
    }

    #[test]
    fn context_splits_on_commas_and_and() {
        assert_eq!(
            context_fragments("age over 55, no diabetes and  blood pressure above target"),
            vec!["age over 55", "no diabetes", "blood pressure above target"]
        );
        assert!(context_fragments(" , ").is_empty());
    }

    #[test]
    fn missing_descriptor_field_is_named() {
        let mut descriptor = ace_descriptor();
        descriptor.action = None;
        let err = map_descriptor(&descriptor, &MapperOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingField { field: "action" }));
        assert!(err.to_string().contains("action"));

        descriptor = ace_descriptor();
        descriptor.scenario = Some("   ".to_string());
        let err = map_descriptor(&descriptor, &MapperOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingField { field: "scenario" }));
    }

    #[test]
    fn batch_failures_stay_scoped() {
        let broken = ScenarioDescriptor { condition: None, ..ace_descriptor() };
        let results = map_descriptors(&[ace_descriptor(), broken, ace_descriptor()], &MapperOptions::default());
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::MissingField { field: "condition" })));
        assert!(results[2].is_ok());
    }

    #[test]
    fn descriptor_parses_from_json() {
        let json = r#"{"scenario":"Statins","condition":"hyperlipidemia","action":"statin","context":"LDL above 190",
                       "contraindications":["active liver disease"]}"#;
        let descriptor = ScenarioDescriptor::from_json(json).unwrap();
        assert_eq!(descriptor.contraindications, vec!["active liver disease".to_string()]);
        assert!(descriptor.expected_outcome.is_none());
        assert!(matches!(ScenarioDescriptor::from_json("{"), Err(Error::InvalidDescriptor(_))));
    }

    #[test]
    fn unreadable_descriptor_file_is_io_error() {
        let err = ScenarioDescriptor::from_path("/nonexistent/descriptor.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
