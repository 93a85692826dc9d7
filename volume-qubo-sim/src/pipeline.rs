//! Single-pass pipeline: volumes → labels → similarity graph → QUBO → sampler.

use crate::clustering::{cluster_volumes, ClusterAssignment};
use crate::config::QuboConfig;
use crate::error::Result;
use crate::graph::SimilarityGraph;
use crate::qubo::{cut_size, QuboMatrix};
use crate::sampler::{QuboSampler, SampleParams, SampleSet};

/// Everything produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub assignment: ClusterAssignment,
    pub graph: SimilarityGraph,
    pub qubo: QuboMatrix,
    pub response: SampleSet,
}

impl PipelineReport {
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Cut size of the lowest-energy sample, if any.
    pub fn best_cut(&self) -> Option<usize> {
        self.response
            .first()
            .map(|r| cut_size(&self.graph, &r.assignment(&self.response.variables)))
    }
}

/// Build the QUBO for `config` without sampling it.
pub fn build_qubo(config: &QuboConfig) -> Result<(ClusterAssignment, SimilarityGraph, QuboMatrix)> {
    config.validate()?;

    let assignment = cluster_volumes(&config.volumes, config.n_clusters, config.seed)?;
    log::info!(
        "clustered {} traders into {} groups (sizes {:?})",
        assignment.len(),
        config.n_clusters,
        assignment.group_sizes()
    );

    let graph = SimilarityGraph::from_assignment(&assignment);
    log::info!(
        "similarity graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let qubo = QuboMatrix::from_graph(&graph);
    log::debug!("QUBO terms: {:?}", qubo.to_mapping());

    Ok((assignment, graph, qubo))
}

/// Run the whole pipeline against `sampler`.
pub fn run_pipeline(config: &QuboConfig, sampler: &dyn QuboSampler) -> Result<PipelineReport> {
    let (assignment, graph, qubo) = build_qubo(config)?;

    let params = SampleParams {
        chain_strength: config.chain_strength,
        num_reads: config.num_reads,
        label: config.label.clone(),
    };
    log::info!("submitting QUBO to sampler '{}'", sampler.name());
    let response = sampler.sample_qubo(&qubo, &params)?;

    Ok(PipelineReport {
        assignment,
        graph,
        qubo,
        response,
    })
}
