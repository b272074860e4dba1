use crate::{Comparator, EntityKind, Threshold, Token};

/// Plain term of `kind`, text taken from the matched span.
pub fn term(kind: EntityKind) -> Token {
    Token::term(kind)
}

/// Action term with a canonical lemma.
pub fn action(lemma: &str) -> Token {
    Token::term(EntityKind::Action).with_lemma(lemma)
}

/// Parse a decimal literal into its value and the number of fractional digits.
pub fn parse_decimal(s: &str) -> Option<(f64, usize)> {
    let s = s.trim();
    let value = s.parse::<f64>().ok()?;
    let precision = s.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0);
    Some((value, precision))
}

/// Canonical spelling of a unit matched case-insensitively.
pub fn normalize_unit(raw: &str) -> String {
    let compact: String = raw.split_whitespace().collect();
    match compact.to_lowercase().as_str() {
        "%" => "%".to_string(),
        "mg/dl" => "mg/dL".to_string(),
        "g/dl" => "g/dL".to_string(),
        "mmol/l" => "mmol/L".to_string(),
        "mmol/mol" => "mmol/mol".to_string(),
        "mmhg" => "mmHg".to_string(),
        "ml/min/1.73m2" | "ml/min/1.73m²" => "mL/min/1.73m2".to_string(),
        "ml/min" => "mL/min".to_string(),
        "kg/m2" | "kg/m²" => "kg/m2".to_string(),
        "meq/l" => "mEq/L".to_string(),
        "bpm" => "bpm".to_string(),
        "mg" => "mg".to_string(),
        _ => compact,
    }
}

/// Build a threshold from comparator, number and optional unit groups.
pub fn threshold(comparator: &str, number: &str, unit: Option<&str>) -> Option<Threshold> {
    let comparator = Comparator::parse(comparator)?;
    let (value, precision) = parse_decimal(number)?;
    Some(Threshold { comparator, value, precision, unit: unit.map(normalize_unit) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_keeps_precision() {
        assert_eq!(parse_decimal("7.0"), Some((7.0, 1)));
        assert_eq!(parse_decimal("140"), Some((140.0, 0)));
        assert_eq!(parse_decimal("x"), None);
    }

    #[test]
    fn units_are_canonicalised() {
        assert_eq!(normalize_unit("MG/DL"), "mg/dL");
        assert_eq!(normalize_unit("mL/min/1.73 m2"), "mL/min/1.73m2");
        assert_eq!(normalize_unit("mmhg"), "mmHg");
    }

    #[test]
    fn threshold_needs_known_comparator() {
        let t = threshold("at least", "30", Some("kg/m2")).unwrap();
        assert_eq!(t.comparator, Comparator::Ge);
        assert_eq!(t.unit.as_deref(), Some("kg/m2"));
        assert!(threshold("around", "30", None).is_none());
    }
}
