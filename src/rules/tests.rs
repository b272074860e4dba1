use crate::engine::{Extractor, KindSet};
use crate::{Comparator, EntityKind};

fn run(input: &str) -> Vec<crate::ClinicalEntity> {
    let rules = crate::rules::get();
    Extractor::new(input, &rules, KindSet::all()).run()
}

#[test]
fn entity_examples_matching() {
    // Array of (input, expected kind, expected entity text)
    let cases: Vec<(&str, EntityKind, &str)> = vec![
        ("Adults with type 2 diabetes", EntityKind::Condition, "type 2 diabetes"),
        ("women with gestational diabetes mellitus", EntityKind::Condition, "gestational diabetes mellitus"),
        ("patients with T2DM", EntityKind::Condition, "T2DM"),
        ("in resistant hypertension", EntityKind::Condition, "resistant hypertension"),
        (
            "heart failure with reduced ejection fraction",
            EntityKind::Condition,
            "heart failure with reduced ejection fraction",
        ),
        ("with atrial fibrillation", EntityKind::Condition, "atrial fibrillation"),
        ("chronic kidney disease stage 3a", EntityKind::Condition, "chronic kidney disease stage 3a"),
        ("bilateral renal artery stenosis", EntityKind::Condition, "bilateral renal artery stenosis"),
        ("community-acquired pneumonia", EntityKind::Condition, "community-acquired pneumonia"),
        ("during pregnancy", EntityKind::Condition, "pregnancy"),
        ("a history of angioedema", EntityKind::Condition, "angioedema"),
        ("blood pressure", EntityKind::Measurement, "blood pressure"),
        ("check serum potassium", EntityKind::Measurement, "serum potassium"),
        ("LDL-C", EntityKind::Measurement, "LDL-C"),
        ("HbA1c > 7.0%", EntityKind::Measurement, "HbA1c"),
        ("systolic blood pressure of at least 140 mmHg", EntityKind::Measurement, "systolic blood pressure"),
        ("metformin", EntityKind::Medication, "metformin"),
        ("insulin glargine", EntityKind::Medication, "insulin glargine"),
        ("an ACE inhibitor", EntityKind::Medication, "ACE inhibitor"),
        ("beta-blockers", EntityKind::Medication, "beta-blockers"),
        ("SGLT2 inhibitors", EntityKind::Medication, "SGLT2 inhibitors"),
        ("high-intensity statin therapy", EntityKind::Medication, "high-intensity statin therapy"),
        ("captopril", EntityKind::Medication, "captopril"),
        ("nebivolol", EntityKind::Medication, "nebivolol"),
        ("amoxicillin-clavulanate", EntityKind::Medication, "amoxicillin-clavulanate"),
        ("should be monitored", EntityKind::Action, "monitored"),
        ("refer to nephrology", EntityKind::Action, "refer"),
        ("annual screening", EntityKind::Action, "screening"),
        ("lifestyle modifications", EntityKind::Action, "lifestyle modifications"),
        ("smoking cessation", EntityKind::Action, "smoking cessation"),
        ("regular physical activity", EntityKind::Action, "regular physical activity"),
        ("up-titrate", EntityKind::Action, "up-titrate"),
    ];

    for (input, kind, text) in cases {
        let entities = run(input);
        assert!(
            entities.iter().any(|e| e.kind == kind && e.text == text),
            "expected {kind} '{text}' for input '{input}' (got: {entities:#?})"
        );
    }
}

#[test]
fn thresholds_bind_value_and_unit() {
    // (input, comparator, value, precision, unit)
    let cases: Vec<(&str, Comparator, f64, usize, Option<&str>)> = vec![
        ("HbA1c > 7.0%", Comparator::Gt, 7.0, 1, Some("%")),
        ("HbA1c ≥ 6.5%", Comparator::Ge, 6.5, 1, Some("%")),
        ("eGFR < 30 mL/min/1.73m2", Comparator::Lt, 30.0, 0, Some("mL/min/1.73m2")),
        ("eGFR below 45", Comparator::Lt, 45.0, 0, None),
        ("BMI of at least 30 kg/m2", Comparator::Ge, 30.0, 0, Some("kg/m2")),
        ("LDL cholesterol greater than 190 mg/dL", Comparator::Gt, 190.0, 0, Some("mg/dL")),
        ("potassium level above 5.5 mmol/L", Comparator::Gt, 5.5, 1, Some("mmol/L")),
        ("heart rate <= 60 bpm", Comparator::Le, 60.0, 0, Some("bpm")),
    ];

    for (input, comparator, value, precision, unit) in cases {
        let entities = run(input);
        let m = entities
            .iter()
            .find(|e| e.kind == EntityKind::Measurement)
            .unwrap_or_else(|| panic!("no measurement for '{input}'"));
        assert_eq!(m.comparator, Some(comparator), "comparator for '{input}'");
        assert_eq!(m.value, Some(value), "value for '{input}'");
        assert_eq!(m.precision, precision, "precision for '{input}'");
        assert_eq!(m.unit.as_deref(), unit, "unit for '{input}'");
    }
}

#[test]
fn non_drug_words_with_suffixes_are_ignored() {
    assert!(run("Review the plan in April.").is_empty());
}

#[test]
fn prescribing_verbs_are_not_actions() {
    let entities = run("Metformin should be initiated and started early.");
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].kind, EntityKind::Medication);
}

#[test]
fn action_lemmas_are_canonical() {
    let entities = run("Patients were referred and monitored.");
    let lemmas: Vec<&str> = entities.iter().map(|e| e.recommendation()).collect();
    assert_eq!(lemmas, vec!["referral", "monitoring"]);
}

#[test]
fn gated_and_ungated_runs_agree() {
    let rules = crate::rules::get();
    let mut ungated = crate::rules::get();
    for rule in &mut ungated {
        rule.required_phrases = &[];
        rule.optional_phrases = &[];
        rule.buckets = 0;
    }

    let inputs = [
        "For patients with type 2 diabetes and HbA1c > 7.0%, metformin should be initiated.",
        "Start nebivolol or an ARB in stage 1 hypertension with eGFR >= 60.",
        "Screen for proteinuria and refer patients with CKD stage 4.",
        "Review the plan in April.",
    ];
    for input in inputs {
        let gated = Extractor::new(input, &rules, KindSet::all()).run();
        let expected = Extractor::new(input, &ungated, KindSet::all()).run();
        assert_eq!(gated, expected, "gating changed output for '{input}'");
    }
}
