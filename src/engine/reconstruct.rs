//! Candidate reconstruction from the decomposition tree.
//!
//! A node spawns a candidate when any of its occurrence groups ends on the
//! token's final character. The entries along the root-to-node path form
//! the candidate; they are reordered into left-to-right coverage order
//! (a later level can fill a gap the branch left open earlier) and the
//! candidate is kept only when its groups partition the token exactly.

use super::arena::{DecompositionArena, NodeKind};
use super::debug_enabled;
use crate::{PositionGroup, SequenceEntry};

/// Materialize every full-coverage candidate, in node creation order.
pub(crate) fn reconstruct(
    arena: &DecompositionArena,
    token_len: usize,
) -> Vec<Vec<SequenceEntry>> {
    let mut sequences = Vec::new();
    if token_len == 0 {
        return sequences;
    }
    let last = token_len - 1;
    let debug = debug_enabled();

    for (id, node) in arena.iter() {
        let NodeKind::Match { ordering, .. } = &node.kind else { continue };
        if !ordering.iter().any(|group| group.last() == Some(&last)) {
            continue;
        }

        let mut entries: Vec<SequenceEntry> = arena
            .path(id)
            .into_iter()
            .filter_map(|nid| match &arena.node(nid).kind {
                NodeKind::Match { unit, ordering } => Some(SequenceEntry {
                    unit: *unit,
                    groups: ordering.iter().cloned().map(PositionGroup::Real).collect(),
                }),
                NodeKind::Failure(_) => None,
            })
            .collect();
        entries.sort_by_key(SequenceEntry::coverage_start);

        if !covers_exactly(&entries, token_len) {
            if debug {
                eprintln!("[reconstruct] path={:?} dropped: not a partition", arena.path_key(id));
            }
            continue;
        }
        if debug {
            eprintln!("[reconstruct] path={:?} units={}", arena.path_key(id), entries.len());
        }
        sequences.push(entries);
    }
    sequences
}

/// True when the entries claim every token position exactly once.
fn covers_exactly(entries: &[SequenceEntry], token_len: usize) -> bool {
    let mut seen = vec![false; token_len];
    let mut count = 0;
    for entry in entries {
        for group in &entry.groups {
            for &index in group.indices() {
                if index >= token_len || seen[index] {
                    return false;
                }
                seen[index] = true;
                count += 1;
            }
        }
    }
    count == token_len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnitId;
    use crate::engine::arena::{DecompositionNode, NodeId};

    fn push_match(
        arena: &mut DecompositionArena,
        parent: Option<NodeId>,
        unit: u32,
        ordering: Vec<Vec<usize>>,
    ) -> NodeId {
        arena.push(DecompositionNode {
            parent,
            branch: 0,
            kind: NodeKind::Match { unit: UnitId(unit), ordering },
        })
    }

    #[test]
    fn only_final_position_nodes_spawn_candidates() {
        let mut arena = DecompositionArena::new();
        push_match(&mut arena, None, 0, vec![vec![0]]);
        let seqs = reconstruct(&arena, 2);
        assert!(seqs.is_empty());

        let mut arena = DecompositionArena::new();
        push_match(&mut arena, None, 0, vec![vec![0, 1]]);
        let seqs = reconstruct(&arena, 2);
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0][0].unit, UnitId(0));
    }

    #[test]
    fn non_partitions_are_dropped() {
        // Reaches the final index but leaves position 0 open.
        let mut arena = DecompositionArena::new();
        push_match(&mut arena, None, 0, vec![vec![1]]);
        assert!(reconstruct(&arena, 2).is_empty());

        // Overlapping claims along one path.
        let mut arena = DecompositionArena::new();
        let root = push_match(&mut arena, None, 0, vec![vec![0]]);
        push_match(&mut arena, Some(root), 1, vec![vec![0, 1]]);
        assert!(reconstruct(&arena, 2).is_empty());
    }

    #[test]
    fn entries_are_ordered_by_coverage_not_by_depth() {
        // The branch claimed {4,5} before backfilling {2,3}.
        let mut arena = DecompositionArena::new();
        let a = push_match(&mut arena, None, 0, vec![vec![0, 1]]);
        let b = push_match(&mut arena, Some(a), 1, vec![vec![4, 5]]);
        let c = push_match(&mut arena, Some(b), 2, vec![vec![2, 3]]);
        push_match(&mut arena, Some(c), 3, vec![vec![6, 7]]);

        let seqs = reconstruct(&arena, 8);
        assert_eq!(seqs.len(), 1);
        let order: Vec<UnitId> = seqs[0].iter().map(|e| e.unit).collect();
        assert_eq!(order, [UnitId(0), UnitId(2), UnitId(1), UnitId(3)]);
    }

    #[test]
    fn multi_group_entries_sort_by_their_smallest_index() {
        // Unit 1 claims {3} and {0} as two groups of one ordering; the
        // group ending at 3 makes the node spawn, the group at 0 drags
        // the whole entry to the front.
        let mut arena = DecompositionArena::new();
        let a = push_match(&mut arena, None, 0, vec![vec![1, 2]]);
        push_match(&mut arena, Some(a), 1, vec![vec![3], vec![0]]);

        let seqs = reconstruct(&arena, 4);
        assert_eq!(seqs.len(), 1);
        let order: Vec<UnitId> = seqs[0].iter().map(|e| e.unit).collect();
        assert_eq!(order, [UnitId(1), UnitId(0)]);
    }
}
