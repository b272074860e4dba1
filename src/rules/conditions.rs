//! Condition rules: diagnoses and patient states.
//!
//! Each family is gated on the words its alternatives contain, so every
//! alternative must include at least one of the family's optional phrases.

use crate::rules::helpers::term;
use crate::{EntityKind, Rule};

/// "type 2 diabetes", "gestational diabetes mellitus", "T2DM"
fn rule_diabetes() -> Rule {
    rule! {
        name: "condition: diabetes",
        kind: EntityKind::Condition,
        pattern: regex!(r"(?i)\b(?:type\s*(?:1|2|i|ii|one|two)\s+diabetes(?:\s+mellitus)?|gestational\s+diabetes(?:\s+mellitus)?|pre-?diabetes|diabetes(?:\s+mellitus)?|t[12]dm)\b"),
        optional_phrases: ["diabetes", "prediabetes", "t1dm", "t2dm"],
        prod: |_g: &Groups| { Some(term(EntityKind::Condition)) },
    }
}

/// "hypertension", "heart failure with reduced ejection fraction", "atrial fibrillation"
fn rule_cardiovascular() -> Rule {
    rule! {
        name: "condition: cardiovascular",
        kind: EntityKind::Condition,
        pattern: regex!(r"(?i)\b(?:(?:resistant|uncontrolled|stage\s+[12])\s+)?hypertension\b|\b(?:(?:chronic|acute|congestive)\s+)?heart\s+failure(?:\s+with\s+(?:reduced|preserved)\s+ejection\s+fraction)?\b|\bhf[rp]ef\b|\batrial\s+fibrillation\b|\bcoronary\s+artery\s+disease\b|\b(?:acute\s+)?myocardial\s+infarction\b|\b(?:(?:ischemic|ischaemic|hemorrhagic|haemorrhagic)\s+)?stroke\b|\btransient\s+ischemic\s+attack\b|\bperipheral\s+arter(?:ial|y)\s+disease\b|\bhyperlipidaemia\b|\bhyperlipidemia\b|\bdyslipidaemia\b|\bdyslipidemia\b|\bhypercholesterolemia\b"),
        optional_phrases: [
            "hypertension", "heart", "hfref", "hfpef", "atrial", "coronary", "myocardial", "stroke",
            "transient", "peripheral", "hyperlipidemia", "hyperlipidaemia", "dyslipidemia", "dyslipidaemia",
            "hypercholesterolemia",
        ],
        prod: |_g: &Groups| { Some(term(EntityKind::Condition)) },
    }
}

/// "chronic kidney disease stage 3a", "bilateral renal artery stenosis", "proteinuria"
fn rule_renal() -> Rule {
    rule! {
        name: "condition: renal",
        kind: EntityKind::Condition,
        pattern: regex!(r"(?i)\b(?:(?:chronic\s+kidney\s+disease|ckd)(?:\s+stage\s+[1-5][ab]?)?|end-stage\s+renal\s+disease|esrd|acute\s+kidney\s+injury|aki|renal\s+(?:impairment|insufficiency)|(?:bilateral\s+)?renal\s+artery\s+stenosis|proteinuria|albuminuria|hyperkal(?:a)?emia)\b"),
        optional_phrases: [
            "kidney", "ckd", "renal", "esrd", "aki", "proteinuria", "albuminuria", "hyperkalemia", "hyperkalaemia",
        ],
        prod: |_g: &Groups| { Some(term(EntityKind::Condition)) },
    }
}

/// "asthma", "community-acquired pneumonia", "sepsis"
fn rule_respiratory_infectious() -> Rule {
    rule! {
        name: "condition: respiratory/infectious",
        kind: EntityKind::Condition,
        pattern: regex!(r"(?i)\b(?:asthma|copd|chronic\s+obstructive\s+pulmonary\s+disease|(?:(?:community|hospital)-acquired\s+)?pneumonia|sepsis|septic\s+shock|urinary\s+tract\s+infections?|utis?|influenza|covid-19)\b"),
        optional_phrases: [
            "asthma", "copd", "pulmonary", "pneumonia", "sepsis", "septic", "urinary", "uti", "utis", "influenza",
            "covid",
        ],
        prod: |_g: &Groups| { Some(term(EntityKind::Condition)) },
    }
}

/// Patient states that are not gated: "pregnancy", "obesity", "angioedema"
fn rule_general() -> Rule {
    rule! {
        name: "condition: general",
        kind: EntityKind::Condition,
        pattern: regex!(r"(?i)\b(?:pregnancy|pregnant|breastfeeding|obesity|overweight|major\s+depressive\s+disorder|depression|hypothyroidism|hyperthyroidism|osteoporosis|anaemia|anemia|angioedema|hypoglycaemia|hypoglycemia|(?:chronic\s+)?liver\s+disease|hepatic\s+impairment|dementia|frailty)\b"),
        prod: |_g: &Groups| { Some(term(EntityKind::Condition)) },
    }
}

pub(crate) fn get() -> Vec<Rule> {
    vec![rule_diabetes(), rule_cardiovascular(), rule_renal(), rule_respiratory_infectious(), rule_general()]
}
