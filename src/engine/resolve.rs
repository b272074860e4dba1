//! Node resolution.
//!
//! Matching produces `Node`s: a span plus the `Token` a rule produced. This
//! module turns a node into the public [`ClinicalEntity`], picking the entity
//! text (the token's override, or the matched slice of the sentence) and
//! copying over threshold and lemma data.

use crate::{ClinicalEntity, Node};

pub(crate) fn resolve_node(input: &str, node: &Node) -> Option<ClinicalEntity> {
    let span = input.get(node.range.start..node.range.end)?;
    let text = node.token.text.clone().unwrap_or_else(|| span.to_string());
    let text = text.trim().to_string();
    if text.is_empty() {
        return None;
    }

    let threshold = node.token.threshold.as_ref();
    let entity = ClinicalEntity {
        text,
        kind: node.token.kind,
        value: threshold.map(|t| t.value),
        unit: threshold.and_then(|t| t.unit.clone()),
        comparator: threshold.map(|t| t.comparator),
        precision: threshold.map(|t| t.precision).unwrap_or(0),
        lemma: node.token.lemma.clone(),
        start: node.range.start,
        end: node.range.end,
    };

    tracing::trace!(
        rule = node.rule_name,
        kind = %entity.kind,
        start = entity.start,
        end = entity.end,
        text = %entity.text,
        "resolved entity"
    );

    Some(entity)
}
