//! Flat storage for the decomposition tree.
//!
//! Every branch the search explores becomes a node, including dead ends, so
//! the finished tree is a complete record of the run: reconstruction walks
//! it for full covers, and the debug report can print why a branch died.
//! Nodes are append-only and refer to their parent by index.

use crate::UnitId;

pub(crate) type NodeId = usize;

/// Why a branch died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchMiss {
    /// No lexicon morpheme starts with the character at the position.
    NoMatch,
    /// Candidates were scanned but none completed an occurrence.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// A morpheme claim: the unit plus the occurrence groups it takes, in
    /// the permuted order this branch committed to.
    Match { unit: UnitId, ordering: Vec<Vec<usize>> },
    /// Dead end directly under the parent match.
    Failure(SearchMiss),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecompositionNode {
    pub parent: Option<NodeId>,
    /// Position of this expansion among its siblings, in creation order.
    pub branch: usize,
    pub kind: NodeKind,
}

#[derive(Debug, Default)]
pub(crate) struct DecompositionArena {
    nodes: Vec<DecompositionNode>,
}

impl DecompositionArena {
    pub fn new() -> Self {
        DecompositionArena::default()
    }

    pub fn push(&mut self, node: DecompositionNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &DecompositionNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DecompositionNode)> {
        self.nodes.iter().enumerate()
    }

    /// Node ids from the root of this branch down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            ids.push(current);
            cursor = self.node(current).parent;
        }
        ids.reverse();
        ids
    }

    /// Branch indices from the root down to `id`; identifies a branch in
    /// trace output.
    pub fn path_key(&self, id: NodeId) -> Vec<usize> {
        self.path(id).into_iter().map(|n| self.node(n).branch).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(parent: Option<NodeId>, branch: usize) -> DecompositionNode {
        DecompositionNode {
            parent,
            branch,
            kind: NodeKind::Match { unit: crate::UnitId(0), ordering: vec![vec![0]] },
        }
    }

    #[test]
    fn paths_follow_parent_links() {
        let mut arena = DecompositionArena::new();
        let root = arena.push(claim(None, 0));
        let sibling = arena.push(claim(None, 1));
        let child = arena.push(claim(Some(root), 0));
        let leaf = arena.push(DecompositionNode {
            parent: Some(child),
            branch: 2,
            kind: NodeKind::Failure(SearchMiss::NoMatch),
        });

        assert_eq!(arena.len(), 4);
        assert_eq!(arena.path(leaf), vec![root, child, leaf]);
        assert_eq!(arena.path_key(leaf), vec![0, 0, 2]);
        assert_eq!(arena.path_key(sibling), vec![1]);
    }
}
