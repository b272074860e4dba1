//! Trigger scanning (sentence pre-classification).
//!
//! This module inspects a sentence and produces coarse signals that let the
//! extractor decide which rules to consider:
//!
//! - **Buckets** (`BucketMask`): cheap booleans such as "contains digits" or
//!   "has a word with a drug-name suffix".
//! - **Phrases** (`TriggerInfo::phrases`): the set of lowercased words in the
//!   sentence, split on anything that is not alphanumeric.
//!
//! This is a *heuristic* scan. False positives are acceptable because the
//! extractor still has to match full rule patterns; false negatives are not,
//! since they would drop entities an ungated run finds.

use super::compiled_rules::BucketMask;
use crate::rules::medications::DRUG_SUFFIXES;
use std::collections::HashSet;

/// Sentence characteristics detected before matching.
#[derive(Debug, Clone)]
pub struct TriggerInfo {
    pub buckets: BucketMask,
    pub phrases: HashSet<String>,
}

impl TriggerInfo {
    /// Scan `input` for coarse buckets and key words.
    pub fn scan(input: &str) -> Self {
        let mut buckets = BucketMask::empty();

        if input.chars().any(char::is_numeric) {
            buckets |= BucketMask::HAS_DIGITS;
        }

        let phrases: HashSet<String> = input
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
            .collect();

        if phrases.iter().any(|w| has_drug_suffix(w)) {
            buckets |= BucketMask::DRUGISH;
        }

        TriggerInfo { buckets, phrases }
    }
}

/// True when `word` is at least two letters longer than one of the drug-class
/// suffixes it ends with (mirrors the suffix rule's `[a-z]{2,}` stem).
fn has_drug_suffix(word: &str) -> bool {
    DRUG_SUFFIXES.iter().any(|suffix| word.len() >= suffix.len() + 2 && word.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_detects_digits_and_drug_suffixes() {
        let info = TriggerInfo::scan("Start lisinopril if BP > 140 mmHg.");
        assert!(info.buckets.contains(BucketMask::HAS_DIGITS));
        assert!(info.buckets.contains(BucketMask::DRUGISH));
        assert!(info.phrases.contains("lisinopril"));
        assert!(info.phrases.contains("bp"));
    }

    #[test]
    fn short_suffix_words_are_not_drugish() {
        let info = TriggerInfo::scan("Review in April.");
        assert!(!info.buckets.contains(BucketMask::DRUGISH));
        assert!(!info.buckets.contains(BucketMask::HAS_DIGITS));
    }

    #[test]
    fn hyphenated_words_split_into_phrases() {
        let info = TriggerInfo::scan("first-line pre-diabetes");
        assert!(info.phrases.contains("first"));
        assert!(info.phrases.contains("line"));
        assert!(info.phrases.contains("diabetes"));
    }
}
