//! Action rules: non-drug decisions a guideline recommends.
//!
//! Prescribing verbs ("initiate", "start", "prescribe") are deliberately not
//! actions. They describe *how* a medication is recommended and would
//! otherwise yield a second, contentless record next to the medication.
//!
//! Each rule carries the canonical lemma used as the record's recommendation.

use crate::rules::helpers::action;
use crate::{EntityKind, Rule};

macro_rules! action_rule {
    ($fn_name:ident, $name:literal, $lemma:literal, $pat:literal) => {
        fn $fn_name() -> Rule {
            rule! {
                name: $name,
                kind: EntityKind::Action,
                pattern: regex!($pat),
                prod: |_g: &Groups| { Some(action($lemma)) },
            }
        }
    };
}

action_rule!(rule_monitoring, "action: monitoring", "monitoring", r"(?i)\bmonitor(?:s|ed|ing)?\b");
action_rule!(rule_assessment, "action: assessment", "assessment", r"(?i)\b(?:re)?assess(?:es|ed|ing|ment)?\b");
action_rule!(rule_referral, "action: referral", "referral", r"(?i)\b(?:refer(?:s|red|ring|ral)?|referrals)\b");
action_rule!(rule_screening, "action: screening", "screening", r"(?i)\bscreen(?:s|ed|ing)?\b");
action_rule!(
    rule_lifestyle,
    "action: lifestyle modification",
    "lifestyle modification",
    r"(?i)\blifestyle\s+(?:modifications?|changes?|interventions?|measures)\b"
);
action_rule!(
    rule_dietary_counseling,
    "action: dietary counseling",
    "dietary counseling",
    r"(?i)\b(?:dietary|nutritional|nutrition)\s+(?:counsell?ing|advice|therapy)\b"
);
action_rule!(
    rule_smoking_cessation,
    "action: smoking cessation",
    "smoking cessation",
    r"(?i)\b(?:smoking\s+cessation|(?:stop|quit)(?:ping|ting)?\s+smoking)\b"
);
action_rule!(
    rule_physical_activity,
    "action: physical activity",
    "physical activity",
    r"(?i)\b(?:(?:regular|aerobic)\s+)?(?:physical\s+activity|exercise)\b"
);
action_rule!(
    rule_vaccination,
    "action: vaccination",
    "vaccination",
    r"(?i)\b(?:vaccinat(?:e|ed|ion)|immuni[sz](?:e|ed|ation))\b"
);
action_rule!(
    rule_titration,
    "action: dose titration",
    "dose titration",
    r"(?i)\b(?:up-?)?titrat(?:e|ed|ing|ion)\b"
);
action_rule!(
    rule_discontinuation,
    "action: discontinuation",
    "discontinuation",
    r"(?i)\bdiscontinu(?:e|ed|ing|ation)\b"
);
action_rule!(
    rule_admission,
    "action: hospital admission",
    "hospital admission",
    r"(?i)\b(?:hospitali[sz](?:e|ed|ation)|admi(?:t|tted|ssion)\s+to\s+(?:the\s+)?hospital)\b"
);
action_rule!(rule_follow_up, "action: follow-up", "follow-up", r"(?i)\b(?:follow(?:ed)?[\s-]?up)\b");
action_rule!(
    rule_weight_loss,
    "action: weight loss",
    "weight loss",
    r"(?i)\bweight\s+(?:loss|reduction|management)\b"
);
action_rule!(
    rule_education,
    "action: patient education",
    "patient education",
    r"(?i)\b(?:patient|self-management)\s+education\b"
);

pub(crate) fn get() -> Vec<Rule> {
    vec![
        rule_monitoring(),
        rule_assessment(),
        rule_referral(),
        rule_screening(),
        rule_lifestyle(),
        rule_dietary_counseling(),
        rule_smoking_cessation(),
        rule_physical_activity(),
        rule_vaccination(),
        rule_titration(),
        rule_discontinuation(),
        rule_admission(),
        rule_follow_up(),
        rule_weight_loss(),
        rule_education(),
    ]
}
