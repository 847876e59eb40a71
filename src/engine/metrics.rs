//! Engine run metrics and candidate reporting.
//!
//! One [`RunReport`] comes back per segmented token. It bundles what the
//! store now contains (accepted outline count), what happened to every
//! candidate on the way (flags), and stage timings.
//!
//! ## Design notes
//!
//! - Candidate reports are always collected; a run rarely sees more than a
//!   handful of candidates, so there is no opt-out.
//! - `CandidateFlags` records the pipeline verdicts additively, so a report
//!   can show e.g. a candidate that had nulls inserted and was then vetoed
//!   by a link.

use bitflags::bitflags;
use std::time::Duration;

// --- Candidate reporting -------------------------------------------------------

bitflags! {
    /// Pipeline verdicts for one candidate sequence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CandidateFlags: u8 {
        /// The grammar filter inserted at least one null morpheme.
        const NULLS_INSERTED = 1 << 0;
        /// Rejected by an unabsorbed strict ordering rule.
        const STRICT_REJECTED = 1 << 1;
        /// Rejected by a unit's own link predicate.
        const LINK_REJECTED = 1 << 2;
        /// Survived everything; registered in the store.
        const ACCEPTED = 1 << 3;
    }
}

/// One candidate's journey through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReport {
    /// Unit names in final sequence order, inserted nulls included.
    pub units: Vec<String>,
    pub flags: CandidateFlags,
    /// Group index the outline was registered under, when accepted.
    pub registered_as: Option<usize>,
}

// --- Metrics ---------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
pub struct RunMetrics {
    /// Total elapsed time for the strategy run.
    pub total: Duration,
    pub search: SearchMetrics,
    pub reconstruct: StageMetrics,
    pub filter: StageMetrics,
    pub validate: StageMetrics,
    pub outline: StageMetrics,
}

/// Decomposition tree statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchMetrics {
    pub duration: Duration,
    /// Total nodes in the tree, failure leaves included.
    pub nodes: usize,
    pub failure_leaves: usize,
    pub success_leaves: usize,
    pub max_depth: usize,
}

/// Timing and yield of one downstream stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct StageMetrics {
    pub duration: Duration,
    /// Candidates that came out of the stage alive.
    pub produced: usize,
}

/// Strategy output bundled with timing information.
#[derive(Debug)]
pub struct RunReport {
    /// Number of outlines registered for the token by this run.
    pub accepted: usize,
    /// Per-candidate verdicts, in reconstruction order.
    pub candidates: Vec<CandidateReport>,
    pub metrics: RunMetrics,
}
