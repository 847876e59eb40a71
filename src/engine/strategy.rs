//! The built-in `(Token, Morpheme)` strategy.
//!
//! Runs the whole pipeline for one token: stem precondition, tree search,
//! candidate reconstruction, grammar filtering, link validation, and
//! outline registration. Everything up to registration works on a shared
//! immutable view of the store; accepted outlines are collected owned and
//! written back in one final mutable step.

use std::time::Instant;

use super::debug_enabled;
use super::filter::{self, FilterOutcome};
use super::links;
use super::metrics::{CandidateFlags, CandidateReport, RunMetrics, RunReport, SearchMetrics, StageMetrics};
use super::outline;
use super::reconstruct;
use super::search::Search;
use crate::error::EngineError;
use crate::registry::SegmentStrategy;
use crate::store::{ElementStore, StemLog};
use crate::{Options, OutlineEntry, UnitId};

/// Decomposes a token into an ordered cover of lexicon morphemes.
pub(crate) struct MorphemeInToken;

impl SegmentStrategy for MorphemeInToken {
    fn segment(
        &self,
        store: &mut ElementStore,
        stems: &StemLog,
        token: UnitId,
        options: &Options,
    ) -> Result<RunReport, EngineError> {
        let total_start = Instant::now();
        let debug = debug_enabled();

        let (accepted, candidates, mut metrics) = {
            let store: &ElementStore = store;
            let token_unit = store.unit(token).ok_or(EngineError::UnknownUnit(token))?;
            if stems.spans_for(token).is_empty() {
                return Err(EngineError::MissingStems(token));
            }
            if debug {
                eprintln!(
                    "[segment] token=\"{}\" content={:?}",
                    token_unit.name, token_unit.content
                );
            }

            let mut metrics = RunMetrics::default();

            let search_start = Instant::now();
            let (arena, stats) = Search::run(store, token_unit, options)?;
            metrics.search = SearchMetrics {
                duration: search_start.elapsed(),
                nodes: arena.len(),
                failure_leaves: stats.failure_leaves,
                success_leaves: stats.success_leaves,
                max_depth: stats.max_depth,
            };

            let reconstruct_start = Instant::now();
            let token_len = token_unit.content.chars().count();
            let sequences = reconstruct::reconstruct(&arena, token_len);
            metrics.reconstruct =
                StageMetrics { duration: reconstruct_start.elapsed(), produced: sequences.len() };

            let mut accepted: Vec<Vec<OutlineEntry>> = Vec::new();
            let mut candidates = Vec::with_capacity(sequences.len());
            for sequence in sequences {
                let mut flags = CandidateFlags::empty();
                let mut registered_as = None;

                let filter_start = Instant::now();
                let outcome = filter::apply_grammar(store, token_unit, sequence)?;
                metrics.filter.duration += filter_start.elapsed();

                let sequence = match outcome {
                    FilterOutcome::Rejected { sequence } => {
                        flags |= CandidateFlags::STRICT_REJECTED;
                        sequence
                    }
                    FilterOutcome::Resolved { sequence, inserted } => {
                        if inserted > 0 {
                            flags |= CandidateFlags::NULLS_INSERTED;
                        }
                        metrics.filter.produced += 1;

                        let validate_start = Instant::now();
                        let linked = links::validate_links(store, token_unit, &sequence)?;
                        metrics.validate.duration += validate_start.elapsed();

                        if linked {
                            metrics.validate.produced += 1;
                            let outline_start = Instant::now();
                            let outline = outline::build_outline(store, &sequence)?;
                            metrics.outline.duration += outline_start.elapsed();
                            flags |= CandidateFlags::ACCEPTED;
                            registered_as = Some(accepted.len());
                            accepted.push(outline);
                        } else {
                            flags |= CandidateFlags::LINK_REJECTED;
                        }
                        sequence
                    }
                };

                let units = sequence
                    .iter()
                    .map(|entry| {
                        store
                            .unit(entry.unit)
                            .map(|u| u.name.clone())
                            .ok_or(EngineError::UnknownUnit(entry.unit))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                candidates.push(CandidateReport { units, flags, registered_as });
            }

            (accepted, candidates, metrics)
        };

        let register_start = Instant::now();
        metrics.outline.produced = accepted.len();
        for (group, outline) in accepted.into_iter().enumerate() {
            store.register_segmentation(token, group, outline)?;
        }
        metrics.outline.duration += register_start.elapsed();
        metrics.total = total_start.elapsed();

        if debug {
            eprintln!(
                "[segment] done: candidates={} accepted={}",
                candidates.len(),
                metrics.outline.produced
            );
        }
        Ok(RunReport { accepted: metrics.outline.produced, candidates, metrics })
    }
}
