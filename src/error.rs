//! Error types for the segmentation engine and the element store.
//!
//! The split follows the two failure families the engine distinguishes:
//!
//! - [`EngineError`]: faults surfaced to the caller. Note that an *expected*
//!   backtracking miss during the search is **not** an error: dead branches
//!   are modeled as plain outcome values (`SearchMiss` in `engine/search.rs`)
//!   and recorded as failure leaves in the decomposition tree. Only loud
//!   faults (corrupted match state, an exhausted node budget) and fatal
//!   preconditions travel through `Result`.
//! - [`StoreError`]: violations of the store's write contracts, currently
//!   just the overwrite guard on registered segmentations.

use crate::{UnitId, UnitType};
use thiserror::Error;

/// Errors surfaced by segmentation entry points.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The registry has no strategy for this `(parent, child)` pair.
    #[error("no segmentation strategy registered for ({parent:?}, {child:?})")]
    StrategyNotFound { parent: UnitType, child: UnitType },

    /// A unit id did not resolve in the element store.
    #[error("unknown unit id {0:?}")]
    UnknownUnit(UnitId),

    /// No stem spans were recorded for the token. Checked before any
    /// search work happens; segmentation without an extracted stem is
    /// a pipeline misuse, not a "no result".
    #[error("no stem spans recorded for token {0:?}")]
    MissingStems(UnitId),

    /// The top-level search found no match at position 0. The token keeps
    /// zero registered outlines.
    #[error("no segmentation found for token {0:?}")]
    NoSegmentation(UnitId),

    /// The occurrence-scan run bookkeeping broke its invariant. Distinct
    /// from an ordinary dead branch so it can never be mistaken for
    /// backtracking.
    #[error("matching state corrupted at position {position} while scanning unit {unit:?}")]
    MatchStateCorrupted { unit: UnitId, position: usize },

    /// The decomposition tree outgrew [`Options::max_nodes`].
    ///
    /// [`Options::max_nodes`]: crate::Options::max_nodes
    #[error("search budget exhausted after {0} decomposition nodes")]
    BudgetExhausted(usize),

    /// A pattern reference did not follow the `<#id>` / `<.CLASS>` notation.
    #[error("invalid pattern reference notation: {0:?}")]
    PatternSyntax(String),

    /// No grammar function registered under this name.
    #[error("no grammar function registered under {0:?}")]
    FunctionNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by [`ElementStore`](crate::ElementStore) write operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A segmentation alternative was already registered under this group
    /// index. Registered outlines are never overwritten.
    #[error("segmentation group {group} already occupied for token {token:?}")]
    GroupOccupied { token: UnitId, group: usize },
}
