//! Initial graph construction.

use super::graph::GpGraph;
use super::problem::GpProblem;
use super::repair::GpRepair;
use crate::core::{GeneCreator, ProblemGene};
use crate::error::Result;
use rand::RngCore;

/// Grows a graph from a bare root by repairing it against the search space
/// held in the problem gene.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpGeneCreator {
    repair: GpRepair,
}

impl GpGeneCreator {
    pub fn new(repair: GpRepair) -> Self {
        Self { repair }
    }

    pub fn repair(&self) -> &GpRepair {
        &self.repair
    }
}

impl<ST, PT> GeneCreator<GpGraph<ST, PT>, GpProblem> for GpGeneCreator {
    fn create_gene(
        &self,
        problem_gene: &ProblemGene<GpProblem>,
        rng: &mut dyn RngCore,
    ) -> Result<GpGraph<ST, PT>> {
        let mut graph = GpGraph::new();
        self.repair.repair(&mut graph, problem_gene.gene(), rng)?;
        graph.compact();
        Ok(graph)
    }
}
