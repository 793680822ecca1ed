//! Mutation: gene level operators and the accept-if-better wrappers.

use crate::core::{Configurable, Descriptor, Evaluator, Options, Solution, SolutionGene};
use rand::seq::index::sample;
use rand::RngCore;
use std::sync::Arc;

/// Produces a (possibly) changed solution.
pub trait Mutator<ST, PT> {
    fn mutate(&self, solution: &Solution<ST, PT>, rng: &mut dyn RngCore) -> Solution<ST, PT>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Creates a replacement for one solution gene.
pub trait GeneMutation<ST, PT> {
    fn create_gene_by_mutation(
        &self,
        gene: &SolutionGene<ST, PT>,
        rng: &mut dyn RngCore,
    ) -> SolutionGene<ST, PT>;
}

fn pick_positions(len: usize, count: usize, rng: &mut dyn RngCore) -> Vec<usize> {
    let count = count.min(len);
    if count == 0 {
        return Vec::new();
    }
    sample(rng, len, count).into_vec()
}

/// Replaces `mutations_per_solution` distinct genes and keeps the result
/// only if it is strictly better than the input.
///
/// The input is never returned by reference: on rejection a fresh copy of
/// the unmodified input comes back.
pub struct RandomNGenesMutator<ST, PT, M> {
    operator: M,
    evaluator: Arc<Evaluator<ST, PT>>,
    mutations_per_solution: usize,
}

impl<ST, PT, M: GeneMutation<ST, PT>> RandomNGenesMutator<ST, PT, M> {
    pub fn new(operator: M, evaluator: Arc<Evaluator<ST, PT>>) -> Self {
        Self {
            operator,
            evaluator,
            mutations_per_solution: 1,
        }
    }

    pub fn with_mutations_per_solution(mut self, n: usize) -> Self {
        self.mutations_per_solution = n.max(1);
        self
    }

    pub fn operator(&self) -> &M {
        &self.operator
    }
}

impl<ST, PT, M: GeneMutation<ST, PT>> Mutator<ST, PT> for RandomNGenesMutator<ST, PT, M> {
    fn mutate(&self, solution: &Solution<ST, PT>, rng: &mut dyn RngCore) -> Solution<ST, PT> {
        let mut candidate = Solution::from_shared(solution.genes().to_vec());
        for index in pick_positions(solution.len(), self.mutations_per_solution, rng) {
            let gene = self
                .operator
                .create_gene_by_mutation(&solution.genes()[index], rng);
            candidate.replace_gene(index, Arc::new(gene));
        }
        self.evaluator.evaluate_quality(&mut candidate);

        if candidate.quality() < solution.quality() {
            candidate
        } else {
            solution.clone()
        }
    }

    fn name(&self) -> &str {
        "RandomNGenesMutator"
    }
}

impl<ST, PT, M> Configurable for RandomNGenesMutator<ST, PT, M> {
    fn options(&self) -> Options {
        mutation_options(self.mutations_per_solution)
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        set_mutations_per_solution(&mut self.mutations_per_solution, name, descriptor)
    }
}

/// Mutates a shallow copy in place and restores the previous genes,
/// quality and cachets when the result is not strictly better.
///
/// Only the touched slots are snapshotted, so a rejected move costs no
/// second evaluation.
pub struct RollbackRandomNGenesMutator<ST, PT, M> {
    operator: M,
    evaluator: Arc<Evaluator<ST, PT>>,
    mutations_per_solution: usize,
}

impl<ST, PT, M: GeneMutation<ST, PT>> RollbackRandomNGenesMutator<ST, PT, M> {
    pub fn new(operator: M, evaluator: Arc<Evaluator<ST, PT>>) -> Self {
        Self {
            operator,
            evaluator,
            mutations_per_solution: 1,
        }
    }

    pub fn with_mutations_per_solution(mut self, n: usize) -> Self {
        self.mutations_per_solution = n.max(1);
        self
    }

    pub fn operator(&self) -> &M {
        &self.operator
    }

    /// In-place variant; returns whether the mutation was kept.
    pub fn mutate_in_place(&self, solution: &mut Solution<ST, PT>, rng: &mut dyn RngCore) -> bool {
        let previous_quality = solution.quality();
        let previous_cachets = solution.cachets().to_vec();
        let mut previous_genes = Vec::with_capacity(self.mutations_per_solution);

        for index in pick_positions(solution.len(), self.mutations_per_solution, rng) {
            let gene = self
                .operator
                .create_gene_by_mutation(&solution.genes()[index], rng);
            let old = solution.replace_gene(index, Arc::new(gene));
            previous_genes.push((index, old));
        }
        self.evaluator.evaluate_quality(solution);

        if solution.quality() < previous_quality {
            return true;
        }
        for (index, old) in previous_genes.into_iter().rev() {
            solution.replace_gene(index, old);
        }
        solution.set_quality(previous_quality);
        solution.set_cachets(previous_cachets);
        false
    }
}

impl<ST, PT, M: GeneMutation<ST, PT>> Mutator<ST, PT> for RollbackRandomNGenesMutator<ST, PT, M> {
    fn mutate(&self, solution: &Solution<ST, PT>, rng: &mut dyn RngCore) -> Solution<ST, PT> {
        let mut copy = solution.clone();
        self.mutate_in_place(&mut copy, rng);
        copy
    }

    fn name(&self) -> &str {
        "RollbackRandomNGenesMutator"
    }
}

impl<ST, PT, M> Configurable for RollbackRandomNGenesMutator<ST, PT, M> {
    fn options(&self) -> Options {
        mutation_options(self.mutations_per_solution)
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        set_mutations_per_solution(&mut self.mutations_per_solution, name, descriptor)
    }
}

fn mutation_options(n: usize) -> Options {
    let mut options = Options::new();
    options.insert("mutations_per_solution".into(), Descriptor::fixed(n));
    options
}

fn set_mutations_per_solution(slot: &mut usize, name: &str, descriptor: &Descriptor) -> bool {
    match (name, descriptor.fixed_value().and_then(|v| v.as_usize())) {
        ("mutations_per_solution", Some(n)) => {
            *slot = n.max(1);
            true
        }
        _ => false,
    }
}
