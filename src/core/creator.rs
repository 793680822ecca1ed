//! Gene and solution creation policies.

use super::options::{Configurable, Descriptor, Options};
use super::problem::{Problem, ProblemGene};
use super::solution::{Solution, SolutionGene};
use crate::error::{Error, Result};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use std::sync::Arc;

/// Maps one problem gene to one solution gene payload.
pub trait GeneCreator<ST, PT> {
    fn create_gene(&self, problem_gene: &ProblemGene<PT>, rng: &mut dyn RngCore) -> Result<ST>;
}

/// Builds a complete (unevaluated) solution for a problem.
pub trait SolutionCreator<ST, PT> {
    fn create_solution(&self, problem: &Problem<PT>, rng: &mut dyn RngCore)
        -> Result<Solution<ST, PT>>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Exactly one solution gene per problem gene, in order.
pub struct OneToOneSolutionCreator<ST, PT> {
    gene_creator: Arc<dyn GeneCreator<ST, PT>>,
}

impl<ST, PT> OneToOneSolutionCreator<ST, PT> {
    pub fn new(gene_creator: impl GeneCreator<ST, PT> + 'static) -> Self {
        Self {
            gene_creator: Arc::new(gene_creator),
        }
    }
}

impl<ST, PT> SolutionCreator<ST, PT> for OneToOneSolutionCreator<ST, PT> {
    fn create_solution(
        &self,
        problem: &Problem<PT>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<ST, PT>> {
        let mut solution = Solution::new();
        for problem_gene in problem.genes() {
            let gene = self.gene_creator.create_gene(problem_gene, rng)?;
            solution.push_gene(SolutionGene::derived(gene, problem_gene));
        }
        Ok(solution)
    }

    fn name(&self) -> &str {
        "OneToOneSolutionCreator"
    }
}

/// A random number of solution genes, each derived from a random problem
/// gene. The count is drawn from `[minimum, maximum]`.
pub struct NToOneSolutionCreator<ST, PT> {
    gene_creator: Arc<dyn GeneCreator<ST, PT>>,
    minimum: usize,
    maximum: usize,
}

impl<ST, PT> NToOneSolutionCreator<ST, PT> {
    pub fn new(gene_creator: impl GeneCreator<ST, PT> + 'static) -> Self {
        Self {
            gene_creator: Arc::new(gene_creator),
            minimum: 1,
            maximum: 10,
        }
    }

    /// Sets the gene count bounds; `maximum` is raised to `minimum` if lower.
    pub fn with_bounds(mut self, minimum: usize, maximum: usize) -> Self {
        self.minimum = minimum;
        self.maximum = maximum.max(minimum);
        self
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.minimum, self.maximum)
    }
}

impl<ST, PT> SolutionCreator<ST, PT> for NToOneSolutionCreator<ST, PT> {
    fn create_solution(
        &self,
        problem: &Problem<PT>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<ST, PT>> {
        if problem.is_empty() {
            return Err(Error::construction(
                "solution",
                "problem has no genes to derive from",
            ));
        }
        let count = rng.random_range(self.minimum..=self.maximum);
        let mut solution = Solution::new();
        for _ in 0..count {
            let Some(problem_gene) = problem.genes().choose(rng) else {
                break;
            };
            let gene = self.gene_creator.create_gene(problem_gene, rng)?;
            solution.push_gene(SolutionGene::derived(gene, problem_gene));
        }
        Ok(solution)
    }

    fn name(&self) -> &str {
        "NToOneSolutionCreator"
    }
}

impl<ST, PT> Configurable for NToOneSolutionCreator<ST, PT> {
    fn options(&self) -> Options {
        let mut options = Options::new();
        options.insert("minimum".into(), Descriptor::fixed(self.minimum));
        options.insert("maximum".into(), Descriptor::fixed(self.maximum));
        options
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        let Some(value) = descriptor.fixed_value().and_then(|v| v.as_usize()) else {
            return false;
        };
        match name {
            "minimum" => {
                self.minimum = value;
                self.maximum = self.maximum.max(value);
            }
            "maximum" => self.maximum = value.max(self.minimum),
            _ => return false,
        }
        true
    }
}
