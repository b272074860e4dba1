//! Medication rules: named drugs, drug classes, and a suffix fallback for
//! unlisted generic names.
//!
//! The three rules can tag the same span; same-kind dedup keeps the one with
//! the highest priority (named > class > suffix).

use crate::engine::BucketMask;
use crate::rules::helpers::term;
use crate::{EntityKind, Rule};

/// Generic-name suffixes used by the fallback rule and by the trigger scan.
pub(crate) const DRUG_SUFFIXES: &[&str] = &[
    "formin", "pril", "sartan", "olol", "statin", "gliflozin", "glutide", "gliptin", "dipine", "azole", "cillin",
    "mycin", "floxacin", "parin", "xaban", "cycline",
];

/// "metformin", "insulin glargine", "lisinopril"
fn rule_named_drug() -> Rule {
    rule! {
        name: "medication: named",
        kind: EntityKind::Medication,
        pattern: regex!(r"(?i)\b(?:metformin|insulin(?:\s+(?:glargine|detemir|degludec|lispro|aspart))?|glipizide|gliclazide|glimepiride|pioglitazone|sitagliptin|empagliflozin|dapagliflozin|canagliflozin|liraglutide|semaglutide|dulaglutide|lisinopril|enalapril|ramipril|perindopril|losartan|valsartan|candesartan|sacubitril/valsartan|amlodipine|nifedipine|hydrochlorothiazide|chlorthalidone|indapamide|spironolactone|eplerenone|furosemide|bumetanide|metoprolol|bisoprolol|carvedilol|atenolol|atorvastatin|rosuvastatin|simvastatin|ezetimibe|aspirin|clopidogrel|ticagrelor|warfarin|apixaban|rivaroxaban|edoxaban|dabigatran|heparin|enoxaparin|digoxin|albuterol|salbutamol|budesonide|fluticasone|tiotropium|montelukast|prednisone|prednisolone|amoxicillin-clavulanate|amoxicillin|azithromycin|doxycycline|ceftriaxone|vancomycin|piperacillin-tazobactam|nitrofurantoin|oseltamivir|sertraline|fluoxetine|escitalopram|levothyroxine|alendronate)\b"),
        priority: 10,
        prod: |_g: &Groups| { Some(term(EntityKind::Medication)) },
    }
}

/// "ACE inhibitor", "beta-blockers", "SGLT2 inhibitors"
fn rule_drug_class() -> Rule {
    rule! {
        name: "medication: class",
        kind: EntityKind::Medication,
        pattern: regex!(r"(?i)\b(?:ace[\s-]inhibitors?|angiotensin[\s-]converting[\s-]enzyme\s+inhibitors?|arbs?|angiotensin(?:\s+ii)?\s+receptor\s+blockers?|beta[\s-]blockers?|(?:high-intensity\s+|moderate-intensity\s+)?statin(?:\s+therapy|s)?|sglt-?2\s+inhibitors?|glp-?1\s+receptor\s+agonists?|dpp-?4\s+inhibitors?|sulfonylureas?|(?:oral\s+)?anticoagulants?|anticoagulation|antiplatelet\s+therapy|(?:broad-spectrum\s+)?antibiotics?|(?:thiazide|loop)\s+diuretics?|diuretics?|calcium\s+channel\s+blockers?|mineralocorticoid\s+receptor\s+antagonists?|(?:inhaled\s+)?corticosteroids?|bronchodilators?|antihypertensive\s+(?:therapy|medications?|drugs?)|basal\s+insulin)\b"),
        priority: 5,
        prod: |_g: &Groups| { Some(term(EntityKind::Medication)) },
    }
}

/// Unlisted generics by suffix: "captopril", "nebivolol", "pravastatin"
fn rule_drug_suffix() -> Rule {
    rule! {
        name: "medication: suffix",
        kind: EntityKind::Medication,
        pattern: regex!(r"(?i)\b[a-z]{2,}(?:formin|pril|sartan|olol|statin|gliflozin|glutide|gliptin|dipine|azole|cillin|mycin|floxacin|parin|xaban|cycline)\b"),
        buckets: BucketMask::DRUGISH.bits(),
        prod: |_g: &Groups| { Some(term(EntityKind::Medication)) },
    }
}

pub(crate) fn get() -> Vec<Rule> {
    vec![rule_named_drug(), rule_drug_class(), rule_drug_suffix()]
}
