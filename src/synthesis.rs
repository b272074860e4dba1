//! Decision-record synthesis.
//!
//! Combines the ordered entities of one sentence into zero or more
//! [`DecisionRecord`]s, one per medication/action entity:
//!
//! ```text
//! entities ──┬─ condition/measurement ──▶ situation  ("A AND B", or fallback)
//!            └─ medication/action ─────▶ one record each
//! sentence ──── LOGIC_RULES (first match) ▶ logic
//! ```

use crate::ClinicalEntity;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Situation used when a sentence names no condition or measurement.
pub const FALLBACK_SITUATION: &str = "patient condition";

/// Guideline label substituted when the caller supplies a blank one.
pub const DEFAULT_GUIDELINE: &str = "clinical_guideline";

/// Confidence assigned to every record. The pipeline does no calibrated
/// scoring; a learned confidence would replace this constant.
pub const RECORD_CONFIDENCE: f32 = 0.75;

/// Decision-logic class of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Logic {
    FirstLineUnlessContraindicated,
    FirstLine,
    ClinicalJudgmentRequired,
}

impl Logic {
    pub fn as_str(self) -> &'static str {
        match self {
            Logic::FirstLineUnlessContraindicated => "first_line_unless_contraindicated",
            Logic::FirstLine => "first_line",
            Logic::ClinicalJudgmentRequired => "clinical_judgment_required",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(predicate, result)` entry of the logic rule chain.
pub struct LogicRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub logic: Logic,
}

impl fmt::Debug for LogicRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicRule").field("name", &self.name).field("logic", &self.logic).finish()
    }
}

fn mentions_contraindication(s: &str) -> bool {
    regex!(r"(?i)\b(?:unless|contraindicat\w*)").is_match(s)
}

fn mentions_first_line(s: &str) -> bool {
    regex!(r"(?i)\bfirst[\s-]line\b").is_match(s)
}

fn has_deontic_modal(s: &str) -> bool {
    regex!(r"(?i)\b(?:should|must)\b").is_match(s)
}

/// Logic rules in priority order; the first matching rule wins.
pub static LOGIC_RULES: &[LogicRule] = &[
    LogicRule {
        name: "unless/contraindicated",
        matches: mentions_contraindication,
        logic: Logic::FirstLineUnlessContraindicated,
    },
    LogicRule { name: "first-line", matches: mentions_first_line, logic: Logic::FirstLine },
    LogicRule { name: "should/must", matches: has_deontic_modal, logic: Logic::ClinicalJudgmentRequired },
];

/// Classify `sentence` against [`LOGIC_RULES`], defaulting to
/// [`Logic::ClinicalJudgmentRequired`].
pub fn classify_logic(sentence: &str) -> Logic {
    LOGIC_RULES
        .iter()
        .find(|rule| (rule.matches)(sentence))
        .map(|rule| rule.logic)
        .unwrap_or(Logic::ClinicalJudgmentRequired)
}

/// What to do with a record whose sentence has no condition/measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituationFallback {
    /// Emit the record with [`FALLBACK_SITUATION`] as its situation.
    #[default]
    Placeholder,
    /// Emit nothing for the sentence.
    Skip,
}

/// A guideline/situation/recommendation/logic (GSRL) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub guideline: String,
    pub situation: String,
    pub recommendation: String,
    pub logic: Logic,
    pub confidence: f32,
    /// Condition/measurement entities the situation was built from, in
    /// sentence order. Empty when the fallback placeholder was used.
    pub criteria: Vec<ClinicalEntity>,
    /// Sentence the record was synthesized from.
    pub source: String,
}

impl DecisionRecord {
    /// True when `situation` is the fallback placeholder.
    pub fn uses_fallback(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// Synthesize the records for one sentence.
///
/// `entities` must be the sentence's entities in left-to-right order; records
/// come back in the order of their recommendation entities. Repeated mentions
/// of one recommendation (compared case-insensitively) yield a single record
/// at the first mention.
pub fn synthesize(
    sentence: &str,
    entities: &[ClinicalEntity],
    guideline: &str,
    fallback: SituationFallback,
) -> Vec<DecisionRecord> {
    let mut seen = HashSet::new();
    let recommendations: Vec<&ClinicalEntity> = entities
        .iter()
        .filter(|e| e.kind.is_recommendation() && seen.insert(e.recommendation().to_lowercase()))
        .collect();
    if recommendations.is_empty() {
        return Vec::new();
    }

    let criteria: Vec<ClinicalEntity> = entities.iter().filter(|e| e.kind.is_situation()).cloned().collect();
    if criteria.is_empty() && fallback == SituationFallback::Skip {
        debug!(sentence, "no situation entities; skipping sentence");
        return Vec::new();
    }

    let situation = if criteria.is_empty() {
        FALLBACK_SITUATION.to_string()
    } else {
        criteria.iter().map(ClinicalEntity::describe).collect::<Vec<_>>().join(" AND ")
    };
    let guideline = match guideline.trim() {
        "" => DEFAULT_GUIDELINE,
        label => label,
    };
    let logic = classify_logic(sentence);

    let records: Vec<DecisionRecord> = recommendations
        .into_iter()
        .map(|entity| DecisionRecord {
            guideline: guideline.to_string(),
            situation: situation.clone(),
            recommendation: entity.recommendation().to_string(),
            logic,
            confidence: RECORD_CONFIDENCE,
            criteria: criteria.clone(),
            source: sentence.to_string(),
        })
        .collect();

    debug!(count = records.len(), %logic, situation = %situation, "synthesized records");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract_entities;

    fn records(sentence: &str) -> Vec<DecisionRecord> {
        synthesize(sentence, &extract_entities(sentence), "diabetes_management", SituationFallback::Placeholder)
    }

    #[test]
    fn logic_rules_apply_in_priority_order() {
        let cases = [
            ("Metformin is first-line therapy unless contraindicated.", Logic::FirstLineUnlessContraindicated),
            ("ACE inhibitors are contraindicated in pregnancy.", Logic::FirstLineUnlessContraindicated),
            ("Metformin is the first line agent and should be used.", Logic::FirstLine),
            ("Insulin must be started.", Logic::ClinicalJudgmentRequired),
            ("Insulin may be considered.", Logic::ClinicalJudgmentRequired),
        ];
        for (sentence, expected) in cases {
            assert_eq!(classify_logic(sentence), expected, "{sentence}");
        }
    }

    #[test]
    fn logic_rule_table_is_ordered() {
        let names: Vec<&str> = LOGIC_RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["unless/contraindicated", "first-line", "should/must"]);
        assert_eq!(Logic::FirstLine.to_string(), "first_line");
    }

    #[test]
    fn monitoring_sentence_uses_fallback() {
        let out = records("Patients should be monitored.");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].situation, FALLBACK_SITUATION);
        assert_eq!(out[0].logic, Logic::ClinicalJudgmentRequired);
        assert_eq!(out[0].recommendation, "monitoring");
        assert!(out[0].uses_fallback());
    }

    #[test]
    fn one_record_per_recommendation_entity() {
        let out = records("In heart failure, start a beta-blocker and spironolactone, and refer to cardiology.");
        let recs: Vec<&str> = out.iter().map(|r| r.recommendation.as_str()).collect();
        assert_eq!(recs, vec!["beta-blocker", "spironolactone", "referral"]);
        assert!(out.iter().all(|r| r.situation == "heart failure"));
    }

    #[test]
    fn repeated_mentions_yield_one_record() {
        let recs = |sentence: &str| -> Vec<String> {
            records(sentence).into_iter().map(|r| r.recommendation).collect()
        };
        assert_eq!(recs("Monitor blood pressure and continue monitoring."), vec!["monitoring"]);
        assert_eq!(
            recs("Start metformin now, and titrate Metformin monthly."),
            vec!["metformin", "dose titration"]
        );
    }

    #[test]
    fn situation_joins_criteria_with_and() {
        let out = records("With type 2 diabetes and eGFR < 30 mL/min/1.73m2, discontinue metformin.");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].situation, "type 2 diabetes AND eGFR <30mL/min/1.73m2");
    }

    #[test]
    fn no_recommendation_means_no_record() {
        assert!(records("Type 2 diabetes is common in adults with obesity.").is_empty());
        assert!(records("").is_empty());
    }

    #[test]
    fn skip_policy_drops_situationless_sentences() {
        let sentence = "Patients should be monitored.";
        let out = synthesize(sentence, &extract_entities(sentence), "x", SituationFallback::Skip);
        assert!(out.is_empty());
    }

    #[test]
    fn records_have_non_empty_fields() {
        let sentences = [
            "For patients with type 2 diabetes and HbA1c > 7.0%, metformin should be initiated as first-line \
             therapy unless contraindicated.",
            "Patients should be monitored.",
            "Offer smoking cessation.",
        ];
        for sentence in sentences {
            for record in synthesize(sentence, &extract_entities(sentence), "  ", SituationFallback::Placeholder) {
                assert!(!record.guideline.is_empty());
                assert!(!record.situation.is_empty());
                assert!(!record.recommendation.is_empty());
                assert!(!record.logic.as_str().is_empty());
                assert!((0.0..=1.0).contains(&record.confidence));
                assert_eq!(record.guideline, DEFAULT_GUIDELINE);
            }
        }
    }
}
