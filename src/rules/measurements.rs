//! Measurement rules: lab values and vital signs, optionally bound to a
//! threshold ("HbA1c > 7.0%", "eGFR below 30 mL/min/1.73m2").
//!
//! The thresholded rule spans the analyte, comparator, number and unit, so
//! the overlap policy prefers it over the bare analyte match.

use crate::engine::BucketMask;
use crate::rules::helpers::{term, threshold};
use crate::{EntityKind, Rule, Token};
use once_cell::sync::Lazy;
use regex::Regex;

/// Analyte alternation shared by both rules. Longer spellings come first where
/// two alternatives start at the same position.
const ANALYTES: &str = r"hemoglobin\s+a1c|haemoglobin\s+a1c|hba1c|a1c|systolic\s+(?:blood\s+pressure|bp)|diastolic\s+(?:blood\s+pressure|bp)|blood\s+pressure|bp|egfr|non-hdl\s+cholesterol|ldl(?:-c|\s+cholesterol)?|hdl(?:-c|\s+cholesterol)?|total\s+cholesterol|triglycerides|bmi|body\s+mass\s+index|resting\s+heart\s+rate|heart\s+rate|serum\s+potassium|potassium|serum\s+creatinine|creatinine|fasting\s+(?:plasma\s+)?glucose|(?:blood|plasma)\s+glucose|oxygen\s+saturation|spo2|(?:body\s+)?temperature|left\s+ventricular\s+ejection\s+fraction|ejection\s+fraction|lvef|urine\s+albumin-to-creatinine\s+ratio|uacr|inr|proteinuria|albuminuria";

const COMPARATORS: &str = r">=|<=|=>|=<|≥|≤|>|<|=|greater\s+than\s+or\s+equal\s+to|less\s+than\s+or\s+equal\s+to|greater\s+than|more\s+than|higher\s+than|less\s+than|lower\s+than|(?:of\s+)?at\s+least|at\s+most|above|below|over|under|exceed(?:s|ing)?";

const UNITS: &str = r"mg/dl|g/dl|mmol/mol|mmol/l|mmhg|ml/min/1\.73\s?m2|ml/min|kg/m2|meq/l|bpm|mg";

// Groups: 1 analyte, 2 comparator, 3 number, 4 percent sign, 5 other unit.
static THRESHOLD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({ANALYTES})(?:\s+(?:levels?|values?|concentration|reading))?(?:\s+(?:is|was|of))?\s*({COMPARATORS})\s*(\d+(?:\.\d+)?)(?:\s*(%)|\s*({UNITS})\b)?"
    ))
    .unwrap()
});

static BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"(?i)\b(?:{ANALYTES})\b")).unwrap());

/// "HbA1c > 7.0%", "systolic blood pressure of at least 140 mmHg"
fn rule_thresholded_measurement() -> Rule {
    rule! {
        name: "measurement: thresholded",
        kind: EntityKind::Measurement,
        pattern: &THRESHOLD_RE,
        buckets: BucketMask::HAS_DIGITS.bits(),
        priority: 1,
        prod: |g: &Groups| {
            let analyte = g.get(1)?.split_whitespace().collect::<Vec<_>>().join(" ");
            let t = threshold(g.get(2)?, g.get(3)?, g.get(4).or(g.get(5)))?;
            Some(Token::term(EntityKind::Measurement).with_text(analyte).with_threshold(t))
        },
    }
}

/// "blood pressure", "eGFR", "potassium"
fn rule_bare_measurement() -> Rule {
    rule! {
        name: "measurement: bare",
        kind: EntityKind::Measurement,
        pattern: &BARE_RE,
        prod: |_g: &Groups| { Some(term(EntityKind::Measurement)) },
    }
}

pub(crate) fn get() -> Vec<Rule> {
    vec![rule_thresholded_measurement(), rule_bare_measurement()]
}
