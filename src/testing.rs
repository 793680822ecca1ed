//! Genome fixture shared by the algorithm tests.
//!
//! The problem gene is a source sequence; the solution gene starts as a copy
//! of it and is scored by the number of positions that differ from a
//! target sequence.

use crate::amalgam::AlgorithmBlueprint;
use crate::core::{
    Analytics, CachetEvaluator, Descriptor, Evaluator, GeneCreator, MemoryAnalytics,
    OneToOneSolutionCreator, Problem, ProblemGene, Solution, SolutionCreator, SolutionGene,
};
use crate::error::{Error, Result};
use crate::local_search::{LocalSearch, LocalSearchConfig};
use crate::operators::{GeneMutation, RollbackRandomNGenesMutator};
use rand::{Rng, RngCore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const TARGET: &str = "GTACCCGTACCCGTACCCTT";
pub const SOURCE: &str = "AAAAACCCCCGGGGGTTTTT";

pub type Genome = Vec<char>;

pub fn genome_problem() -> Problem<Genome> {
    Problem::new(vec![SOURCE.chars().collect()])
}

pub struct CopyGeneCreator;

impl GeneCreator<Genome, Genome> for CopyGeneCreator {
    fn create_gene(
        &self,
        problem_gene: &ProblemGene<Genome>,
        _rng: &mut dyn RngCore,
    ) -> Result<Genome> {
        Ok(problem_gene.gene().clone())
    }
}

pub fn genome_creator() -> Arc<OneToOneSolutionCreator<Genome, Genome>> {
    Arc::new(OneToOneSolutionCreator::new(CopyGeneCreator))
}

/// Counts positions that differ from the target.
pub struct ElementEqualityCachet {
    target: Genome,
}

impl Default for ElementEqualityCachet {
    fn default() -> Self {
        Self {
            target: TARGET.chars().collect(),
        }
    }
}

impl CachetEvaluator<Genome, Genome> for ElementEqualityCachet {
    fn name(&self) -> &str {
        "ElementEqualityCachet"
    }

    fn quality(&self, solution: &Solution<Genome, Genome>) -> f64 {
        let produced: Vec<char> = solution
            .genes()
            .iter()
            .flat_map(|g| g.gene().iter().copied())
            .collect();
        let mismatches = produced
            .iter()
            .zip(&self.target)
            .filter(|(a, b)| a != b)
            .count();
        (mismatches + produced.len().abs_diff(self.target.len())) as f64
    }
}

pub fn genome_evaluator() -> Arc<Evaluator<Genome, Genome>> {
    Arc::new(Evaluator::new().with_cachet(ElementEqualityCachet::default(), 1.0))
}

/// Copies a random character of the source sequence into a random slot.
pub struct RandomCharMutation;

impl GeneMutation<Genome, Genome> for RandomCharMutation {
    fn create_gene_by_mutation(
        &self,
        gene: &SolutionGene<Genome, Genome>,
        rng: &mut dyn RngCore,
    ) -> SolutionGene<Genome, Genome> {
        let mut chars = gene.gene().clone();
        let source = gene.problem_genes()[0].gene();
        if !chars.is_empty() && !source.is_empty() {
            let from = source[rng.random_range(0..source.len())];
            let slot = rng.random_range(0..chars.len());
            chars[slot] = from;
        }
        gene.with_gene(chars)
    }
}

/// Local search on the genome problem with the rollback char mutator.
pub fn genome_search(generations: usize) -> LocalSearch<Genome, Genome> {
    let evaluator = genome_evaluator();
    let mutator = Arc::new(RollbackRandomNGenesMutator::new(
        RandomCharMutation,
        Arc::clone(&evaluator),
    ));
    LocalSearch::new(evaluator, genome_creator(), mutator)
        .with_config(LocalSearchConfig::default().with_maximum_generations(generations))
}

/// [`genome_search`] with `maximum_generations` sampled from `[1, 40]`.
pub fn search_blueprint() -> AlgorithmBlueprint<Genome, Genome> {
    AlgorithmBlueprint::new(Box::new(genome_search(100)))
        .with_option("maximum_generations", Descriptor::range(1usize, 40usize))
}

/// Copies the source like [`genome_creator`], but fails while switched off.
#[derive(Default)]
pub struct SwitchableCreator {
    off: AtomicBool,
}

impl SwitchableCreator {
    pub fn switched_off() -> Arc<Self> {
        let creator = Self::default();
        creator.set_off(true);
        Arc::new(creator)
    }

    pub fn set_off(&self, off: bool) {
        self.off.store(off, Ordering::SeqCst);
    }
}

impl SolutionCreator<Genome, Genome> for SwitchableCreator {
    fn create_solution(
        &self,
        problem: &Problem<Genome>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<Genome, Genome>> {
        if self.off.load(Ordering::SeqCst) {
            return Err(Error::construction("genome", "creator switched off"));
        }
        OneToOneSolutionCreator::new(CopyGeneCreator).create_solution(problem, rng)
    }
}

/// [`MemoryAnalytics`] whose step rows are rejected while switched off.
#[derive(Default)]
pub struct SwitchableAnalytics {
    pub memory: MemoryAnalytics,
    off: AtomicBool,
}

impl SwitchableAnalytics {
    pub fn switched_off() -> Arc<Self> {
        let analytics = Self::default();
        analytics.set_off(true);
        Arc::new(analytics)
    }

    pub fn set_off(&self, off: bool) {
        self.off.store(off, Ordering::SeqCst);
    }
}

impl<ST, PT> Analytics<ST, PT> for SwitchableAnalytics {
    fn start_analytics(&self) -> Result<()> {
        Analytics::<ST, PT>::start_analytics(&self.memory)
    }

    fn log_param(&self, name: &str, value: &str) -> Result<()> {
        Analytics::<ST, PT>::log_param(&self.memory, name, value)
    }

    fn log_algorithm_step_headers(&self, names: &[&str]) -> Result<()> {
        Analytics::<ST, PT>::log_algorithm_step_headers(&self.memory, names)
    }

    fn log_algorithm_step(&self, values: &[String]) -> Result<()> {
        if self.off.load(Ordering::SeqCst) {
            return Err(Error::construction("step row", "backend switched off"));
        }
        Analytics::<ST, PT>::log_algorithm_step(&self.memory, values)
    }

    fn log_problem(&self, problem: &Problem<PT>) -> Result<()> {
        Analytics::<ST, PT>::log_problem(&self.memory, problem)
    }

    fn log_solution(&self, solution: &Solution<ST, PT>) -> Result<()> {
        Analytics::<ST, PT>::log_solution(&self.memory, solution)
    }

    fn finish_analytics(&self) -> Result<()> {
        Analytics::<ST, PT>::finish_analytics(&self.memory)
    }
}
