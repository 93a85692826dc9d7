//! QUBO coefficient matrix in max-cut encoding.
//!
//! Each graph edge `(i, j)` contributes `-1` to `Q[i][i]`, `-1` to `Q[j][j]`
//! and `+2` to `Q[i][j]`. Minimising `xᵀQx` over binary `x` then maximises
//! the number of edges cut.
//!
//! Keys are stored upper-triangular (`i <= j`) in a `BTreeMap` so iteration
//! order is stable and independent of insertion order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::SimilarityGraph;

/// One serialised coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuboTerm {
    pub i: usize,
    pub j: usize,
    pub bias: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<QuboTerm>", from = "Vec<QuboTerm>")]
pub struct QuboMatrix {
    terms: BTreeMap<(usize, usize), i64>,
}

impl QuboMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate the max-cut coefficients for every edge of `graph`.
    pub fn from_graph(graph: &SimilarityGraph) -> Self {
        let mut q = Self::new();
        for (i, j) in graph.edges() {
            q.add(i, i, -1);
            q.add(j, j, -1);
            q.add(i, j, 2);
        }
        q
    }

    /// Rebuild a matrix from its mapping form.
    pub fn from_mapping<I>(mapping: I) -> Self
    where
        I: IntoIterator<Item = ((usize, usize), i64)>,
    {
        let mut q = Self::new();
        for ((i, j), v) in mapping {
            q.add(i, j, v);
        }
        q
    }

    /// Mapping form: `(i, j) -> coefficient`.
    pub fn to_mapping(&self) -> BTreeMap<(usize, usize), i64> {
        self.terms.clone()
    }

    /// Add `value` to `Q[i][j]`. `(j, i)` and `(i, j)` address the same term.
    pub fn add(&mut self, i: usize, j: usize, value: i64) {
        let key = if i <= j { (i, j) } else { (j, i) };
        *self.terms.entry(key).or_insert(0) += value;
    }

    pub fn get(&self, i: usize, j: usize) -> Option<i64> {
        let key = if i <= j { (i, j) } else { (j, i) };
        self.terms.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), i64)> + '_ {
        self.terms.iter().map(|(&k, &v)| (k, v))
    }

    /// Sorted distinct variable indices referenced by any term.
    pub fn variables(&self) -> Vec<usize> {
        let mut vars: Vec<usize> = self.terms.keys().flat_map(|&(i, j)| [i, j]).collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// Linear (diagonal) coefficients.
    pub fn diagonal(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.iter()
            .filter(|((i, j), _)| i == j)
            .map(|((i, _), v)| (i, v))
    }

    /// Quadratic (off-diagonal) coefficients.
    pub fn off_diagonal(&self) -> impl Iterator<Item = ((usize, usize), i64)> + '_ {
        self.iter().filter(|((i, j), _)| i != j)
    }

    pub fn diagonal_sum(&self) -> i64 {
        self.diagonal().map(|(_, v)| v).sum()
    }

    /// Evaluate `xᵀQx` for a binary assignment. Variables missing from
    /// `assignment` count as 0.
    pub fn energy(&self, assignment: &BTreeMap<usize, u8>) -> f64 {
        let bit = |k: usize| assignment.get(&k).copied().unwrap_or(0) as i64;
        self.iter()
            .map(|((i, j), v)| (v * bit(i) * bit(j)) as f64)
            .sum()
    }

    /// Energy for a sample aligned with `variables` (as produced by a sampler).
    pub fn energy_of(&self, variables: &[usize], sample: &[u8]) -> f64 {
        let assignment: BTreeMap<usize, u8> =
            variables.iter().copied().zip(sample.iter().copied()).collect();
        self.energy(&assignment)
    }
}

impl From<QuboMatrix> for Vec<QuboTerm> {
    fn from(q: QuboMatrix) -> Self {
        q.terms
            .into_iter()
            .map(|((i, j), bias)| QuboTerm { i, j, bias })
            .collect()
    }
}

impl From<Vec<QuboTerm>> for QuboMatrix {
    fn from(terms: Vec<QuboTerm>) -> Self {
        QuboMatrix::from_mapping(terms.into_iter().map(|t| ((t.i, t.j), t.bias)))
    }
}

/// Number of graph edges whose endpoints fall on different sides of the cut.
pub fn cut_size(graph: &SimilarityGraph, assignment: &BTreeMap<usize, u8>) -> usize {
    graph
        .edges()
        .filter(|(i, j)| {
            assignment.get(i).copied().unwrap_or(0) != assignment.get(j).copied().unwrap_or(0)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg_labels(n: usize, k: usize, seed: u64) -> Vec<usize> {
        let mut s = seed;
        (0..n)
            .map(|_| {
                s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((s >> 33) as usize) % k
            })
            .collect()
    }

    #[test]
    fn edge_contribution_rule() {
        let graph = SimilarityGraph::from_labels(&[0, 0]);
        let q = QuboMatrix::from_graph(&graph);
        assert_eq!(q.get(0, 0), Some(-1));
        assert_eq!(q.get(1, 1), Some(-1));
        assert_eq!(q.get(0, 1), Some(2));
        assert_eq!(q.get(1, 0), Some(2));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn diagonal_sum_is_minus_twice_edges() {
        for seed in 0..20u64 {
            let k = 1 + (seed as usize % 5);
            let labels = lcg_labels(12, k, seed);
            let graph = SimilarityGraph::from_labels(&labels);
            let q = QuboMatrix::from_graph(&graph);
            assert_eq!(q.diagonal_sum(), -2 * graph.edge_count() as i64);
            assert!(q.off_diagonal().all(|(_, v)| v == 2));
            assert!(q.diagonal().all(|(_, v)| v <= 0));
            assert_eq!(q.off_diagonal().count(), graph.edge_count());
        }
    }

    #[test]
    fn singleton_clusters_give_empty_matrix() {
        let graph = SimilarityGraph::from_labels(&[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let q = QuboMatrix::from_graph(&graph);
        assert!(q.is_empty());
        assert!(q.variables().is_empty());
    }

    #[test]
    fn mapping_round_trip() {
        let graph = SimilarityGraph::from_labels(&[0, 1, 0, 1, 0, 2]);
        let q = QuboMatrix::from_graph(&graph);
        let mapping = q.to_mapping();
        let rebuilt = QuboMatrix::from_mapping(mapping.clone());
        assert_eq!(rebuilt, q);
        assert_eq!(rebuilt.to_mapping(), mapping);

        let reversed = QuboMatrix::from_mapping(mapping.clone().into_iter().rev());
        assert_eq!(reversed.to_mapping(), mapping);
    }

    #[test]
    fn json_round_trip() {
        let graph = SimilarityGraph::from_labels(&[1, 1, 1, 0]);
        let q = QuboMatrix::from_graph(&graph);
        let json = serde_json::to_string(&q).unwrap();
        let back: QuboMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_mapping(), q.to_mapping());
    }

    #[test]
    fn triangle_energy_and_cut() {
        let graph = SimilarityGraph::from_labels(&[0, 0, 0]);
        let q = QuboMatrix::from_graph(&graph);
        // every node is in two edges
        assert_eq!(q.get(0, 0), Some(-2));

        let best: BTreeMap<usize, u8> = [(0, 1), (1, 0), (2, 0)].into_iter().collect();
        assert_eq!(q.energy(&best), -2.0);
        assert_eq!(cut_size(&graph, &best), 2);

        let none: BTreeMap<usize, u8> = BTreeMap::new();
        assert_eq!(q.energy(&none), 0.0);
        assert_eq!(cut_size(&graph, &none), 0);
    }

    #[test]
    fn energy_equals_minus_cut_size() {
        let labels = lcg_labels(8, 2, 3);
        let graph = SimilarityGraph::from_labels(&labels);
        let q = QuboMatrix::from_graph(&graph);
        let vars = q.variables();
        for mask in 0u32..(1 << vars.len().min(8)) {
            let sample: Vec<u8> = (0..vars.len()).map(|b| ((mask >> b) & 1) as u8).collect();
            let assignment: BTreeMap<usize, u8> =
                vars.iter().copied().zip(sample.iter().copied()).collect();
            assert_eq!(q.energy_of(&vars, &sample), -(cut_size(&graph, &assignment) as f64));
        }
    }
}
