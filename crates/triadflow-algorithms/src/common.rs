//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of an undirected edge list for algorithm execution.

use std::collections::HashMap;

/// Node Identifier type (u64)
pub type NodeId = u64;

/// A dense, integer-indexed view of an undirected simple graph using Compressed Sparse Row (CSR) format.
///
/// Dense indices follow ascending `NodeId` order, so comparing two indices
/// is the same as comparing the ids they map to.
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,

    /// Offsets into `targets`. Size = node_count + 1
    pub offsets: Vec<usize>,
    /// Contiguous array of neighbor indices, ascending within each node
    pub targets: Vec<usize>,
}

impl GraphView {
    /// Build a view from raw undirected edges.
    ///
    /// Self-loops are dropped and parallel edges collapse, whichever
    /// direction they were given in.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut pairs: Vec<(NodeId, NodeId)> = edges
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        pairs.sort_unstable();
        pairs.dedup();

        let mut index_to_node: Vec<NodeId> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
        index_to_node.sort_unstable();
        index_to_node.dedup();

        let node_to_index: HashMap<NodeId, usize> = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let node_count = index_to_node.len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for (a, b) in pairs {
            let (u, v) = (node_to_index[&a], node_to_index[&b]);
            adjacency[u].push(v);
            adjacency[v].push(u);
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::new();
        offsets.push(0);
        for mut neighbors in adjacency {
            neighbors.sort_unstable();
            targets.extend(neighbors);
            offsets.push(targets.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            offsets,
            targets,
        }
    }

    /// Number of distinct undirected edges
    pub fn edge_count(&self) -> usize {
        self.targets.len() / 2
    }

    /// Get the degree of a node (by index)
    pub fn degree(&self, idx: usize) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Get all neighbors of a node, ascending
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.targets[self.offsets[idx]..self.offsets[idx + 1]]
    }

    /// Neighbors with a strictly larger index than `idx`
    pub fn higher_neighbors(&self, idx: usize) -> &[usize] {
        let all = self.neighbors(idx);
        let split = all.partition_point(|&n| n <= idx);
        &all[split..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_from_edges() {
        // 30 - 10 - 20, plus a reversed duplicate and a self-loop
        let view = GraphView::from_edges(vec![(10, 20), (30, 10), (20, 10), (20, 20)]);

        assert_eq!(view.node_count, 3);
        assert_eq!(view.edge_count(), 2);
        assert_eq!(view.index_to_node, vec![10, 20, 30]);

        let idx10 = view.node_to_index[&10];
        assert_eq!(view.degree(idx10), 2);
        assert_eq!(view.neighbors(idx10), &[1, 2]);
        assert_eq!(view.higher_neighbors(1), &[] as &[usize]);
        assert_eq!(view.higher_neighbors(idx10), &[1, 2]);
    }

    #[test]
    fn test_empty_view() {
        let view = GraphView::from_edges(Vec::new());
        assert_eq!(view.node_count, 0);
        assert_eq!(view.offsets, vec![0]);
    }
}
