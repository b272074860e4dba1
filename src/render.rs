//! Gherkin rendering.
//!
//! Output is a pure function of the spec sequence: same specs, same bytes.
//!
//! ```text
//! Feature: <name>
//!
//!   @positive @treatment
//!   Scenario: <title>
//!     Given <first given>
//!     And <more givens>
//!     When <when>
//!     Then <first then>
//!     And <more thens>
//!
//!   @negative @treatment
//!   Scenario: ...
//! ```

use crate::scenario::{ScenarioPair, ScenarioSpec};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Value of [`FeatureMetadata::format`].
pub const FORMAT: &str = "gherkin";

/// Metadata returned to the transport layer alongside the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureMetadata {
    pub scenario_count: usize,
    pub format: &'static str,
}

/// A feature name plus its rendered scenario blocks, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFeature {
    name: String,
    blocks: Vec<String>,
}

impl RenderedFeature {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One rendered block per scenario, each ending in a newline.
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn scenario_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn metadata(&self) -> FeatureMetadata {
        FeatureMetadata { scenario_count: self.scenario_count(), format: FORMAT }
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RenderedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Feature: {}", self.name)?;
        for block in &self.blocks {
            writeln!(f)?;
            f.write_str(block)?;
        }
        Ok(())
    }
}

/// Caller-owned source of unique scenario ids, rendered as `@id-NNNN`.
///
/// Keep one counter across several [`render_feature_with_counter`] calls to
/// get ids that are unique over all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCounter {
    next: u32,
}

impl Default for ScenarioCounter {
    fn default() -> Self {
        ScenarioCounter::new(1)
    }
}

impl ScenarioCounter {
    pub fn new(start: u32) -> Self {
        ScenarioCounter { next: start }
    }

    /// Take the next id tag.
    pub fn next_id(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        format!("@id-{id:04}")
    }

    /// The id the next call will hand out.
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// Replace underscores in identifier-like tokens with spaces and lowercase
/// them ("ACE_Inhibitor" -> "ace inhibitor"). Other words are left alone.
fn tidy(text: &str) -> Cow<'_, str> {
    regex!(r"\S*_\S*").replace_all(text, |caps: &regex::Captures<'_>| caps[0].replace('_', " ").to_lowercase())
}

fn render_block(spec: &ScenarioSpec, id: Option<String>) -> String {
    let mut out = String::new();
    let tags: Vec<&str> = spec.tags.iter().map(String::as_str).chain(id.as_deref()).collect();
    if !tags.is_empty() {
        out.push_str(&format!("  {}\n", tags.join(" ")));
    }
    out.push_str(&format!("  Scenario: {}\n", tidy(&spec.title)));
    for (i, given) in spec.given_clauses.iter().enumerate() {
        let keyword = if i == 0 { "Given" } else { "And" };
        out.push_str(&format!("    {keyword} {}\n", tidy(given)));
    }
    out.push_str(&format!("    When {}\n", tidy(&spec.when_clause)));
    for (i, then) in spec.then_clauses.iter().enumerate() {
        let keyword = if i == 0 { "Then" } else { "And" };
        out.push_str(&format!("    {keyword} {}\n", tidy(then)));
    }
    out
}

fn render(feature_title: &str, pairs: &[ScenarioPair], mut counter: Option<&mut ScenarioCounter>) -> RenderedFeature {
    let blocks = pairs
        .iter()
        .flat_map(ScenarioPair::specs)
        .map(|spec| render_block(spec, counter.as_deref_mut().map(ScenarioCounter::next_id)))
        .collect();
    RenderedFeature { name: feature_title.trim().to_string(), blocks }
}

/// Render `pairs` in the order given, each pair positive-first.
///
/// An empty slice renders the feature line alone.
pub fn render_feature(feature_title: &str, pairs: &[ScenarioPair]) -> RenderedFeature {
    render(feature_title, pairs, None)
}

/// Like [`render_feature`], appending an id tag drawn from `counter` to
/// every scenario.
pub fn render_feature_with_counter(
    feature_title: &str,
    pairs: &[ScenarioPair],
    counter: &mut ScenarioCounter,
) -> RenderedFeature {
    render(feature_title, pairs, Some(counter))
}
