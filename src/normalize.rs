//! Sentence splitting.
//!
//! Guideline prose is split on sentence-terminal punctuation (`.`, `!`, `?`)
//! followed by whitespace or end of input. A few guideline-specific cases do
//! not end a sentence:
//!
//! - a period between digits ("HbA1c > 7.0%"),
//! - a period closing a known abbreviation ("e.g.", "vs.", "Dr."),
//! - a period inside a list marker ("1. Start metformin").
//!
//! Each line that starts with a list bullet (`-`, `*`, `•`, `1.`, `2)`) also
//! starts a new sentence, with the bullet removed. Internal whitespace is
//! collapsed. No semantic analysis happens here.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from(["e.g", "i.e", "vs", "dr", "approx", "incl", "fig", "al", "mr", "mrs", "ms", "cf"])
});

/// Split raw guideline `text` into trimmed, non-empty sentences in source
/// order. Empty or whitespace-only input yields an empty vector.
///
/// # Example
/// ```
/// use guideline_gherkin::split_sentences;
///
/// let s = split_sentences("Target HbA1c < 7.0%. Start metformin, e.g. 500 mg daily!");
/// assert_eq!(s, vec!["Target HbA1c < 7.0%.", "Start metformin, e.g. 500 mg daily!"]);
/// ```
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();

    for block in bullet_blocks(text) {
        let chars: Vec<char> = block.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            current.push(c);
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            let next = chars.get(i + 1).copied();
            let at_boundary = next.is_none_or(char::is_whitespace);
            if !at_boundary {
                continue;
            }
            if c == '.' && is_abbreviation(&current) {
                continue;
            }
            push_sentence(&mut sentences, &current);
            current.clear();
        }
        push_sentence(&mut sentences, &current);
    }

    sentences
}

/// Group lines so that each bulleted line starts a new block and plain
/// continuation lines join the block before them. Blank lines end a block.
fn bullet_blocks(text: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        match strip_bullet(trimmed) {
            Some(rest) => {
                if !current.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
                current.push_str(rest);
            }
            None => {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(trimmed);
            }
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn strip_bullet(line: &str) -> Option<&str> {
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return Some(rest.trim_start());
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && digits <= 3 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some(rest.trim_start());
        }
    }
    None
}

/// True when the text ending in `.` closes a known abbreviation.
fn is_abbreviation(current: &str) -> bool {
    let without_dot = &current[..current.len() - 1];
    let word = without_dot
        .rsplit(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric());
    !word.is_empty() && ABBREVIATIONS.contains(word.to_lowercase().as_str())
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().any(char::is_alphanumeric) {
        sentences.push(collapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_sentences() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t ").is_empty());
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let s = split_sentences("Start metformin. Monitor renal function! Is insulin needed? Yes");
        assert_eq!(s, vec!["Start metformin.", "Monitor renal function!", "Is insulin needed?", "Yes"]);
    }

    #[test]
    fn decimals_do_not_split() {
        let s = split_sentences("If HbA1c > 7.0%, intensify therapy.");
        assert_eq!(s, vec!["If HbA1c > 7.0%, intensify therapy."]);
    }

    #[test]
    fn abbreviations_do_not_split() {
        let s = split_sentences("Use a statin, e.g. atorvastatin, vs. placebo. Review yearly.");
        assert_eq!(s, vec!["Use a statin, e.g. atorvastatin, vs. placebo.", "Review yearly."]);
    }

    #[test]
    fn bullets_start_new_sentences() {
        let text = "Recommendations:\n- Start metformin\n- Refer to a dietitian\n  within 3 months\n1. Screen annually";
        let s = split_sentences(text);
        assert_eq!(
            s,
            vec!["Recommendations:", "Start metformin", "Refer to a dietitian within 3 months", "Screen annually"]
        );
    }

    #[test]
    fn whitespace_is_collapsed() {
        let s = split_sentences("Start   metformin\n\n\n  now.");
        assert_eq!(s, vec!["Start metformin", "now."]);
    }
}
