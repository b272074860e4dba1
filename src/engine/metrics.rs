//! Extraction run metrics.
//!
//! - `Extractor::run` for normal operation.
//! - `Extractor::run_with_metrics` for profiling and for inspecting which
//!   candidates a run produced and dropped.

use crate::ClinicalEntity;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for [`Extractor::run_with_metrics`](super::Extractor::run_with_metrics).
    pub total: Duration,
    /// The matching pass over all active rules.
    pub matching: PassMetrics,
    /// Time spent on overlap resolution and entity construction.
    pub resolve: Duration,
}

/// Timing and counts for the matching pass.
#[derive(Debug, Default, Clone)]
pub struct PassMetrics {
    /// Elapsed time for the pass.
    pub duration: Duration,
    /// Rules considered after gating.
    pub rules_considered: usize,
    /// Rules with at least one match.
    pub rules_matched: usize,
    /// Candidates kept after same-kind dedup.
    pub produced: usize,
    /// Candidates removed because a longer (or higher-ranked) span overlapped them.
    pub dropped_overlaps: usize,
}

/// Extractor output bundled with timing information.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// All deduplicated candidates, before overlap resolution.
    pub candidates: Vec<ClinicalEntity>,
    /// Final entities in left-to-right order.
    pub entities: Vec<ClinicalEntity>,
    pub metrics: RunMetrics,
}
