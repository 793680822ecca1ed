//! Graph gene mutations.
//!
//! Both operations only build a replacement gene; wrapping them in
//! [`RollbackRandomNGenesMutator`] keeps a change only when it improves the
//! solution.

use super::graph::GpGraph;
use super::node::NodeKind;
use super::problem::GpProblem;
use super::repair::GpRepair;
use super::validate::GpValidator;
use crate::core::{Configurable, Descriptor, Options, SolutionGene};
use crate::error::{Error, Result};
use crate::operators::{GeneMutation, RollbackRandomNGenesMutator};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use tracing::debug;

/// Structural mutation of GP solutions.
pub type GpReplacingNodeMutator<ST, PT> =
    RollbackRandomNGenesMutator<GpGraph<ST, PT>, GpProblem, GpReplacingNodeMutation>;

/// Constant perturbation of GP solutions.
pub type GpValueMutator<ST, PT> =
    RollbackRandomNGenesMutator<GpGraph<ST, PT>, GpProblem, GpValueMutation>;

/// Cuts a random non-root node out of every parent slot that points to it
/// and regrows the emptied slots with [`GpRepair`].
///
/// A failed regrowth leaves the gene unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpReplacingNodeMutation {
    repair: GpRepair,
}

impl GpReplacingNodeMutation {
    pub fn new(repair: GpRepair) -> Self {
        Self { repair }
    }

    fn replace_node<ST, PT>(
        &self,
        gene: &SolutionGene<GpGraph<ST, PT>, GpProblem>,
        rng: &mut dyn RngCore,
    ) -> Result<GpGraph<ST, PT>> {
        let problem = gene
            .problem_genes()
            .first()
            .ok_or_else(|| Error::construction("graph mutation", "gene has no search space"))?
            .gene();
        let mut graph = gene.gene().clone();
        let target = *graph
            .discovered()
            .choose(rng)
            .ok_or_else(|| Error::InvalidGraph("no node to replace".into()))?;
        graph.remove_child_references(target);
        self.repair.repair(&mut graph, problem, rng)?;
        graph.compact();
        graph.reset_caches();
        GpValidator::check(&graph)?;
        Ok(graph)
    }
}

impl<ST, PT> GeneMutation<GpGraph<ST, PT>, GpProblem> for GpReplacingNodeMutation {
    fn create_gene_by_mutation(
        &self,
        gene: &SolutionGene<GpGraph<ST, PT>, GpProblem>,
        rng: &mut dyn RngCore,
    ) -> SolutionGene<GpGraph<ST, PT>, GpProblem> {
        match self.replace_node(gene, rng) {
            Ok(graph) => gene.with_gene(graph),
            Err(error) => {
                debug!(%error, "node replacement skipped");
                gene.clone()
            }
        }
    }
}

/// Flips every boolean constant and moves every number constant by up to
/// `change_by_max` of its own value, in a random direction. The structure is
/// left as is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpValueMutation {
    change_by_max: f64,
}

impl Default for GpValueMutation {
    fn default() -> Self {
        Self { change_by_max: 0.5 }
    }
}

impl GpValueMutation {
    pub fn new(change_by_max: f64) -> Self {
        Self {
            change_by_max: change_by_max.max(0.0),
        }
    }

    pub fn change_by_max(&self) -> f64 {
        self.change_by_max
    }
}

impl<ST, PT> GeneMutation<GpGraph<ST, PT>, GpProblem> for GpValueMutation {
    fn create_gene_by_mutation(
        &self,
        gene: &SolutionGene<GpGraph<ST, PT>, GpProblem>,
        rng: &mut dyn RngCore,
    ) -> SolutionGene<GpGraph<ST, PT>, GpProblem> {
        let mut graph = gene.gene().clone();
        for id in graph.discovered() {
            match graph.node_mut(id).kind_mut() {
                NodeKind::Boolean(b) => *b = !*b,
                NodeKind::Number(v) => {
                    let delta = *v * self.change_by_max * rng.random::<f64>();
                    if rng.random_bool(0.5) {
                        *v += delta;
                    } else {
                        *v -= delta;
                    }
                }
                NodeKind::Integer(v) => {
                    let delta = (*v as f64 * self.change_by_max * rng.random::<f64>()).round();
                    let delta = delta as i64;
                    *v = if rng.random_bool(0.5) {
                        v.saturating_add(delta)
                    } else {
                        v.saturating_sub(delta)
                    };
                }
                _ => {}
            }
        }
        graph.reset_caches();
        gene.with_gene(graph)
    }
}

impl Configurable for GpValueMutation {
    fn options(&self) -> Options {
        let mut options = Options::new();
        options.insert("change_by_max".into(), Descriptor::fixed(self.change_by_max));
        options
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        match (name, descriptor.fixed_value().and_then(|v| v.as_f64())) {
            ("change_by_max", Some(v)) if v >= 0.0 => {
                self.change_by_max = v;
                true
            }
            _ => false,
        }
    }
}
