//! Similarity graph over traders.
//!
//! One node per sample index. Two samples are joined by an edge when k-means
//! gave them the same label. Pairs are visited as `i < j`, so every edge is
//! added exactly once and self loops never appear.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::clustering::ClusterAssignment;

#[derive(Debug, Clone)]
pub struct SimilarityGraph {
    graph: UnGraph<usize, ()>,
}

impl SimilarityGraph {
    /// Build the graph from a cluster assignment.
    pub fn from_assignment(assignment: &ClusterAssignment) -> Self {
        Self::from_labels(assignment.labels())
    }

    /// Build the graph from raw labels, one per sample.
    pub fn from_labels(labels: &[usize]) -> Self {
        let mut graph = UnGraph::with_capacity(labels.len(), 0);
        let nodes: Vec<NodeIndex> = (0..labels.len()).map(|i| graph.add_node(i)).collect();

        for i in 0..labels.len() {
            for j in (i + 1)..labels.len() {
                if labels[i] == labels[j] {
                    graph.add_edge(nodes[i], nodes[j], ());
                }
            }
        }

        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges as `(i, j)` sample-index pairs with `i < j`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph.edge_references().map(move |e| {
            let a = self.graph[e.source()];
            let b = self.graph[e.target()];
            if a < b {
                (a, b)
            } else {
                (b, a)
            }
        })
    }

    /// Whether samples `i` and `j` share an edge.
    pub fn contains_edge(&self, i: usize, j: usize) -> bool {
        if i >= self.node_count() || j >= self.node_count() {
            return false;
        }
        self.graph
            .find_edge(NodeIndex::new(i), NodeIndex::new(j))
            .is_some()
    }
}
