//! Segmentation engine.
//!
//! This module owns the whole pipeline from token content to registered
//! segmentation outlines. It is split into focused submodules under
//! `src/engine/` while keeping public paths stable (for example
//! `crate::engine::RunReport`).
//!
//! ## How the parts work together
//!
//! Segmenting one token is a pipeline:
//!
//! ```text
//! stem log ── precondition check (strategy.rs)
//!                    │
//!                    v
//!          Search::run (search.rs)
//!            - candidate morphemes per start position
//!            - occurrence scan over free positions
//!            - one branch per group permutation
//!            - nodes into the DecompositionArena (arena.rs)
//!                    │
//!                    v
//!          reconstruct (reconstruct.rs)
//!            - full-coverage paths -> candidate sequences
//!                    │
//!                    v
//!          apply_grammar (filter.rs)        validate_links (links.rs)
//!            - null eligibility               - per-unit predicates
//!            - ordering rules     ──────>     - final veto
//!            - null insertion
//!                    │
//!                    v
//!          build_outline (outline.rs) ──> ElementStore::register_segmentation
//! ```
//!
//! The search keeps dead branches in the tree as failure leaves instead of
//! unwinding through errors; a miss is an expected outcome, and the full
//! tree makes run reports and traces explain themselves.
//!
//! ## Responsibilities by module
//!
//! - `arena.rs`: flat parent-linked storage for decomposition nodes.
//! - `search.rs`: the recursive branch expansion and occurrence scan.
//! - `reconstruct.rs`: full-cover extraction and coverage ordering.
//! - `filter.rs`: ordering rules, strict-violation flag, null insertion.
//! - `links.rs`: second-pass unit-local link validation.
//! - `outline.rs`: final outline assembly.
//! - `strategy.rs`: the built-in `(Token, Morpheme)` strategy gluing the
//!   stages together.
//! - `metrics.rs`: run reports, candidate flags, stage timings.
//!
//! ## Extension points
//!
//! New strategies implement [`SegmentStrategy`](crate::SegmentStrategy) and
//! register with a [`Registry`](crate::Registry) under their
//! `(parent, child)` unit-type pair; the pieces here are building blocks
//! for them.
//!
//! ## Debugging
//!
//! Set `MORPHION_DEBUG_SEGMENTS=1` to print scan, branch, filter, and
//! insertion traces.

#[path = "engine/arena.rs"]
mod arena;
#[path = "engine/filter.rs"]
mod filter;
#[path = "engine/links.rs"]
mod links;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/outline.rs"]
mod outline;
#[path = "engine/reconstruct.rs"]
mod reconstruct;
#[path = "engine/search.rs"]
mod search;
#[path = "engine/strategy.rs"]
mod strategy;

#[allow(unused_imports)]
pub use metrics::{
    CandidateFlags, CandidateReport, RunMetrics, RunReport, SearchMetrics, StageMetrics,
};
pub(crate) use strategy::MorphemeInToken;

/// Shared switch for the engine's stderr traces.
pub(crate) fn debug_enabled() -> bool {
    std::env::var_os("MORPHION_DEBUG_SEGMENTS").is_some()
}
