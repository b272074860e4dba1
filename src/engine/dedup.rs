//! Deduplication keys for candidate nodes.
//!
//! Several rules of the same kind can tag the same span: "metformin" is both a
//! named drug and a word with a drug-class suffix. Those candidates describe
//! one entity and must collapse to one before overlap resolution, otherwise a
//! sentence would yield duplicate medications and duplicate decision records.
//!
//! The key combines the span (`start`, `end`) and the entity kind. Candidates
//! of *different* kinds on the same span are kept; choosing between them is the
//! job of overlap resolution.

use crate::{EntityKind, Node};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct NodeKey {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) kind: EntityKind,
}

impl NodeKey {
    pub(crate) fn from_node(node: &Node) -> Self {
        NodeKey { start: node.range.start, end: node.range.end, kind: node.token.kind }
    }
}
