use crate::engine::{CandidateReport, RunMetrics};
use crate::error::EngineError;
use crate::registry::Registry;
use crate::store::{ElementStore, StemLog};
use crate::{UnitId, UnitType};
use once_cell::sync::Lazy;

static DEFAULT_REGISTRY: Lazy<Registry> = Lazy::new(Registry::with_defaults);

/// Options that bound a segmentation run.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Ceiling on decomposition tree nodes per token, failure leaves
    /// included. Highly ambiguous lexicons make the permutation branching
    /// explode; hitting the ceiling aborts the run with
    /// [`EngineError::BudgetExhausted`] instead of churning on.
    pub max_nodes: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options { max_nodes: 100_000 }
    }
}

/// Result from [`segment`] and [`segment_with`].
///
/// Accepted outlines live in the store afterwards (see
/// [`ElementStore::segmentation_alternatives`]); this value reports what
/// the run did and how long each stage took.
#[derive(Debug)]
pub struct SegmentationRun {
    pub token: UnitId,
    /// Outlines registered by this run.
    pub accepted: usize,
    /// Verdicts for every reconstructed candidate, accepted or not.
    pub candidates: Vec<CandidateReport>,
    pub metrics: RunMetrics,
}

/// Segment `token` into morphemes using the default registry and options.
///
/// # Example
/// ```
/// use morphion::{ElementStore, StemLog, StemSpan, Unit};
///
/// let mut store = ElementStore::new();
/// store.insert(Unit::morpheme("cat", "cat"));
/// store.insert(Unit::morpheme("s", "s"));
/// let token = store.insert(Unit::token("cats", "cats"));
///
/// let mut stems = StemLog::new();
/// let cat = store.id_of("cat").unwrap();
/// stems.record(token, StemSpan { unit: cat, positions: vec![0, 1, 2] });
///
/// let run = morphion::segment(&mut store, &stems, token)?;
/// assert_eq!(run.accepted, 1);
/// assert_eq!(store.segmentation_alternatives(token).len(), 1);
/// # Ok::<(), morphion::EngineError>(())
/// ```
pub fn segment(
    store: &mut ElementStore,
    stems: &StemLog,
    token: UnitId,
) -> Result<SegmentationRun, EngineError> {
    segment_with(&DEFAULT_REGISTRY, store, stems, token, UnitType::Morpheme, &Options::default())
}

/// Segment with an explicit registry, child unit type, and options.
///
/// The strategy is dispatched on `(parent, child)`, where `parent` is the
/// token's own unit type. Use this to run synthetic lexicons against a
/// custom [`Registry`] or to tighten the node budget.
pub fn segment_with(
    registry: &Registry,
    store: &mut ElementStore,
    stems: &StemLog,
    token: UnitId,
    child: UnitType,
    options: &Options,
) -> Result<SegmentationRun, EngineError> {
    let parent = store.unit(token).ok_or(EngineError::UnknownUnit(token))?.unit_type;
    let strategy = registry.strategy(parent, child)?;
    let report = strategy.segment(store, stems, token, options)?;
    Ok(SegmentationRun {
        token,
        accepted: report.accepted,
        candidates: report.candidates,
        metrics: report.metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StemSpan, Unit};

    fn stemmed(store: &ElementStore, token: UnitId, stem: &str) -> StemLog {
        let mut stems = StemLog::new();
        let unit = store.id_of(stem).unwrap();
        let positions = (0..store.unit(unit).unwrap().content.chars().count()).collect();
        stems.record(token, StemSpan { unit, positions });
        stems
    }

    #[test]
    fn segment_registers_alternatives_and_reports_them() {
        let mut store = ElementStore::new();
        store.insert(Unit::morpheme("cats", "cats"));
        store.insert(Unit::morpheme("cat", "cat"));
        store.insert(Unit::morpheme("s", "s"));
        store.insert(Unit::morpheme("dog", "dog"));
        let token = store.insert(Unit::token("catsdog", "catsdog"));
        let stems = stemmed(&store, token, "cat");

        let run = segment(&mut store, &stems, token).unwrap();
        assert_eq!(run.accepted, 2);
        assert_eq!(run.candidates.len(), 2);
        assert_eq!(store.segmentation_alternatives(token).len(), 2);
    }

    #[test]
    fn unknown_tokens_fail_before_dispatch() {
        let mut store = ElementStore::new();
        let stems = StemLog::new();
        let err = segment(&mut store, &stems, UnitId(7)).unwrap_err();
        assert!(matches!(err, EngineError::UnknownUnit(UnitId(7))));
    }

    #[test]
    fn dispatch_misses_surface_as_errors() {
        let mut store = ElementStore::new();
        let token = store.insert(Unit::token("cats", "cats"));
        let stems = StemLog::new();

        let registry = Registry::new();
        let err = segment_with(
            &registry,
            &mut store,
            &stems,
            token,
            UnitType::Morpheme,
            &Options::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::StrategyNotFound { .. }));
    }
}
