//! Recursive span-matching search.
//!
//! This module grows the decomposition tree:
//!
//! - At a start position, fetch every lexicon morpheme whose content begins
//!   with the character found there (longest/greediest content first; see
//!   `ElementStore::units_by_content`).
//! - Scan each candidate across the free positions of the token, collecting
//!   complete occurrence groups (see [`Search::scan_occurrences`]).
//! - Branch once per non-empty permutation of those groups, claim the
//!   permuted positions, and recurse from the next uncovered position.
//!
//! ## Key concepts
//!
//! - **Claimed positions**: character indices already accounted for on the
//!   current branch. Scans step over them, so a morpheme can match around
//!   an earlier claim.
//! - **Occurrence group**: one complete, in-order match of a morpheme's
//!   content against free token positions.
//! - **Branch ordering**: a permutation of occurrence groups. Each
//!   permutation is its own node because downstream grammar rules care
//!   about morpheme order.
//!
//! ## Shape of a run
//!
//! ```text
//! step(start=0)
//!   ├─ match "cats" {0,1,2,3} ── step(4) ── match "dog" {4,5,6}   (cover)
//!   └─ match "cat"  {0,1,2}   ── step(3) ── match "s" {3} ── ...  (cover)
//! ```
//!
//! Dead branches stay in the tree as failure leaves; only a dead tree root
//! is an error. The node budget (`Options::max_nodes`) bounds the whole
//! tree, dead ends included.
//!
//! ## Debugging
//!
//! Setting `MORPHION_DEBUG_SEGMENTS=1` prints scan hits, covers, and dead
//! branches as the tree grows.

use itertools::Itertools;

use super::arena::{DecompositionArena, DecompositionNode, NodeId, NodeKind, SearchMiss};
use super::debug_enabled;
use crate::error::EngineError;
use crate::store::ElementStore;
use crate::{Options, Unit, UnitType};

/// Counters accumulated while the tree grows.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SearchStats {
    pub failure_leaves: usize,
    pub success_leaves: usize,
    pub max_depth: usize,
}

/// What a recursion level reported back to its parent.
enum StepOutcome {
    /// At least one match node was created at this level.
    Expanded,
    /// Nothing matched here; the parent records a failure leaf.
    Dead(SearchMiss),
}

pub(crate) struct Search<'a> {
    store: &'a ElementStore,
    token: &'a Unit,
    /// Token content as characters; all positions are character indices.
    chars: Vec<char>,
    budget: usize,
    arena: DecompositionArena,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    /// Grow the full decomposition tree for `token`.
    ///
    /// A token whose very first position admits no match has no tree at all
    /// and fails with [`EngineError::NoSegmentation`]. A tree that exists
    /// but reaches no cover is not an error; reconstruction simply finds
    /// nothing in it.
    pub fn run(
        store: &'a ElementStore,
        token: &'a Unit,
        options: &Options,
    ) -> Result<(DecompositionArena, SearchStats), EngineError> {
        let mut search = Search {
            store,
            token,
            chars: token.content.chars().collect(),
            budget: options.max_nodes,
            arena: DecompositionArena::new(),
            stats: SearchStats::default(),
        };
        match search.step(0, &[], None, 1)? {
            StepOutcome::Expanded => Ok((search.arena, search.stats)),
            StepOutcome::Dead(_) => Err(EngineError::NoSegmentation(token.id())),
        }
    }

    /// Expand one recursion level at `start`, with `claimed` holding the
    /// sorted positions this branch has taken so far.
    fn step(
        &mut self,
        start: usize,
        claimed: &[usize],
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<StepOutcome, EngineError> {
        self.stats.max_depth = self.stats.max_depth.max(depth);
        let Some(&first) = self.chars.get(start) else {
            return Ok(StepOutcome::Dead(SearchMiss::NoMatch));
        };

        let candidates = self.store.units_by_content(UnitType::Morpheme, |c| c.starts_with(first));
        let debug = debug_enabled();
        if debug {
            eprintln!("[candidates] start={} first={:?} count={}", start, first, candidates.len());
        }
        if candidates.is_empty() {
            return Ok(StepOutcome::Dead(SearchMiss::NoMatch));
        }

        let mut branch = 0;
        let mut expanded = false;
        for unit in candidates {
            let groups = self.scan_occurrences(unit, start, claimed)?;
            if groups.is_empty() {
                continue;
            }
            if debug {
                eprintln!("[scan] unit=\"{}\" start={} groups={:?}", unit.name, start, groups);
            }

            // One branch per non-empty permutation of the occurrence
            // groups, shortest selections first.
            for k in 1..=groups.len() {
                for ordering in groups.iter().cloned().permutations(k) {
                    let node_id = self.push_node(DecompositionNode {
                        parent,
                        branch,
                        kind: NodeKind::Match { unit: unit.id(), ordering: ordering.clone() },
                    })?;
                    branch += 1;
                    expanded = true;

                    let mut union: Vec<usize> = claimed.to_vec();
                    union.extend(ordering.iter().flatten().copied());
                    union.sort_unstable();
                    union.dedup();

                    let next = next_start(&union);
                    if next >= self.chars.len() {
                        // Every position is claimed; this node closes a
                        // cover and the branch stops here.
                        self.stats.success_leaves += 1;
                        if debug {
                            eprintln!(
                                "[cover] path={:?} unit=\"{}\"",
                                self.arena.path_key(node_id),
                                unit.name
                            );
                        }
                    } else if let StepOutcome::Dead(miss) =
                        self.step(next, &union, Some(node_id), depth + 1)?
                    {
                        self.push_node(DecompositionNode {
                            parent: Some(node_id),
                            branch: 0,
                            kind: NodeKind::Failure(miss),
                        })?;
                        self.stats.failure_leaves += 1;
                        if debug {
                            eprintln!(
                                "[dead] path={:?} reason={:?}",
                                self.arena.path_key(node_id),
                                miss
                            );
                        }
                    }
                }
            }
        }

        if expanded { Ok(StepOutcome::Expanded) } else { Ok(StepOutcome::Dead(SearchMiss::Exhausted)) }
    }

    fn push_node(&mut self, node: DecompositionNode) -> Result<NodeId, EngineError> {
        if self.arena.len() >= self.budget {
            return Err(EngineError::BudgetExhausted(self.arena.len()));
        }
        Ok(self.arena.push(node))
    }

    /// Scan `unit`'s content across the token from `start`, skipping claimed
    /// positions, and collect complete occurrence groups.
    ///
    /// The scan consumes one free position per iteration and keeps a single
    /// in-progress run:
    ///
    /// ```text
    /// run shorter than content, char continues it -> extend the run
    /// run shorter than content, char breaks it    -> discard the run
    /// run already complete                        -> record it, start over
    /// run longer than content                     -> corrupted state
    /// ```
    ///
    /// A run still complete when the scan falls off the end is recorded
    /// ahead of the in-loop records; an incomplete tail is dropped. Groups
    /// may straddle claimed positions, so they are contiguous with respect
    /// to the free positions only.
    fn scan_occurrences(
        &self,
        unit: &Unit,
        start: usize,
        claimed: &[usize],
    ) -> Result<Vec<Vec<usize>>, EngineError> {
        let pattern: Vec<char> = unit.content.chars().collect();
        if pattern.is_empty() {
            // Null variants have no surface form the scan could find.
            return Ok(Vec::new());
        }

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut run: Vec<usize> = Vec::new();
        for j in start..self.chars.len() {
            if claimed.binary_search(&j).is_ok() {
                continue;
            }
            match run.len().cmp(&pattern.len()) {
                std::cmp::Ordering::Less => {
                    if self.chars[j] == pattern[run.len()] {
                        run.push(j);
                    } else if !run.is_empty() {
                        run.clear();
                    }
                }
                std::cmp::Ordering::Equal => {
                    groups.push(std::mem::take(&mut run));
                }
                std::cmp::Ordering::Greater => {
                    return Err(EngineError::MatchStateCorrupted {
                        unit: unit.id(),
                        position: j,
                    });
                }
            }
        }
        if run.len() == pattern.len() {
            groups.insert(0, run);
        }
        Ok(groups)
    }
}

/// Next start position for a branch: the first gap inside the claimed
/// positions, or the position right after them when they are contiguous.
pub(crate) fn next_start(claimed: &[usize]) -> usize {
    for pair in claimed.windows(2) {
        if pair[1] - pair[0] > 1 {
            return pair[0] + 1;
        }
    }
    claimed.last().map_or(0, |last| last + 1)
}
