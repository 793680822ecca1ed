//! GA evolutionary loop execution.
//!
//! [`GeneticAlgorithm`] orchestrates the complete evolutionary process:
//! initialization → evaluation → elites → crossover or mutation → repeat.

use super::config::GaConfig;
use crate::core::{
    Algorithm, AlgorithmBase, Analytics, Configurable, Descriptor, Evaluator, Options, Problem,
    Solution, SolutionCreator,
};
use crate::error::{Error, Result};
use crate::operators::{Crossover, Mutator, Selector, TournamentSelector};
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::{debug, info};

/// Quality statistics of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub best: f64,
    pub worst: f64,
    pub average: f64,
}

impl GenerationStats {
    fn of<ST, PT>(best: &Solution<ST, PT>, population: &[Solution<ST, PT>]) -> Self {
        let worst = population
            .iter()
            .map(Solution::quality)
            .fold(best.quality(), f64::max);
        let average = if population.is_empty() {
            0.0
        } else {
            population.iter().map(Solution::quality).sum::<f64>() / population.len() as f64
        };
        Self {
            best: best.quality(),
            worst,
            average,
        }
    }

    fn row(&self) -> [String; 3] {
        [
            self.best.to_string(),
            self.worst.to_string(),
            self.average.to_string(),
        ]
    }
}

/// Generational genetic algorithm over [`Solution`]s.
///
/// # Usage
///
/// ```ignore
/// let ga = GeneticAlgorithm::new(evaluator, creator, mutator)
///     .with_crossover(Arc::new(OnePointCrossover::default()))
///     .with_config(GaConfig::default().with_population_size(50));
/// let best = ga.solve_seeded(&problem, Some(42))?;
/// ```
pub struct GeneticAlgorithm<ST, PT> {
    base: AlgorithmBase<ST, PT>,
    mutator: Arc<dyn Mutator<ST, PT>>,
    crossover: Option<Arc<dyn Crossover<ST, PT>>>,
    selector: Arc<dyn Selector<ST, PT>>,
    config: GaConfig,
}

impl<ST, PT> Clone for GeneticAlgorithm<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            mutator: Arc::clone(&self.mutator),
            crossover: self.crossover.clone(),
            selector: Arc::clone(&self.selector),
            config: self.config.clone(),
        }
    }
}

impl<ST, PT> GeneticAlgorithm<ST, PT> {
    /// A GA with tournament selection and no crossover.
    pub fn new(
        evaluator: Arc<Evaluator<ST, PT>>,
        solution_creator: Arc<dyn SolutionCreator<ST, PT>>,
        mutator: Arc<dyn Mutator<ST, PT>>,
    ) -> Self {
        Self {
            base: AlgorithmBase::new(evaluator, solution_creator),
            mutator,
            crossover: None,
            selector: Arc::new(TournamentSelector::default()),
            config: GaConfig::default(),
        }
    }

    pub fn with_crossover(mut self, crossover: Arc<dyn Crossover<ST, PT>>) -> Self {
        self.crossover = Some(crossover);
        self
    }

    pub fn with_selector(mut self, selector: Arc<dyn Selector<ST, PT>>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_config(mut self, config: GaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn Analytics<ST, PT>>) -> Self {
        self.base.set_analytics(Some(analytics));
        self
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    fn offspring(
        &self,
        population: &[Solution<ST, PT>],
        rng: &mut dyn RngCore,
    ) -> Result<Solution<ST, PT>> {
        if let Some(crossover) = &self.crossover {
            if self.config.mutation_probability < rng.random::<f64>() {
                if let Some(child) = crossover.breed(population, self.selector.as_ref(), rng) {
                    return Ok(child);
                }
            }
        }
        let parent = self
            .selector
            .select(population, rng)
            .ok_or(Error::EmptyPopulation)?;
        Ok(self.mutator.mutate(parent, rng))
    }
}

impl<ST, PT> Configurable for GeneticAlgorithm<ST, PT> {
    fn options(&self) -> Options {
        self.config.options()
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        self.config.set_option(name, descriptor)
    }
}

impl<ST: 'static, PT: 'static> Algorithm<ST, PT> for GeneticAlgorithm<ST, PT> {
    fn name(&self) -> &str {
        "GeneticAlgorithm"
    }

    fn base(&self) -> &AlgorithmBase<ST, PT> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase<ST, PT> {
        &mut self.base
    }

    /// Runs the GA with `start` as the first member of the population.
    fn solve_from(
        &self,
        problem: &Problem<PT>,
        start: Solution<ST, PT>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<ST, PT>> {
        self.config.validate().map_err(Error::InvalidConfig)?;
        let evaluator = self.base.evaluator()?;
        let creator = self.base.solution_creator()?;

        let best = self.base.session(|| {
            self.base.report(|a| {
                a.log_param("problem_size", &problem.size().to_string())?;
                a.log_param(
                    "crossover",
                    self.crossover.as_ref().map_or("no crossover", |c| c.name()),
                )?;
                a.log_param("mutator", self.mutator.name())?;
                a.log_param("creator", creator.name())?;
                a.log_param(
                    "mutation_probability",
                    &self.config.mutation_probability.to_string(),
                )?;
                a.log_param("population_size", &self.config.population_size.to_string())?;
                a.log_param("elites", &self.config.elites.to_string())?;
                a.log_param(
                    "maximum_generations",
                    &self.config.maximum_generations.to_string(),
                )?;
                a.log_algorithm_step_headers(&[
                    "best quality",
                    "worst quality",
                    "average quality",
                ])?;
                a.log_problem(problem)
            })?;

            // 1. Initial population, seeded with the start solution
            let mut best = start;
            if best.cachets().is_empty() {
                evaluator.evaluate_quality(&mut best);
            }
            let mut population = Vec::with_capacity(self.config.population_size);
            population.push(best.clone());
            while population.len() < self.config.population_size {
                let mut s = creator.create_solution(problem, rng)?;
                evaluator.evaluate_quality(&mut s);
                if s.quality() < best.quality() {
                    best = s.clone();
                }
                population.push(s);
            }
            let stats = GenerationStats::of(&best, &population);
            self.base.report(|a| a.log_algorithm_step(&stats.row()))?;

            // 2. Evolutionary loop
            for generation in 1..self.config.maximum_generations {
                population.sort_by(|a, b| a.quality().total_cmp(&b.quality()));

                let mut next_gen: Vec<Solution<ST, PT>> =
                    population[..self.config.elites].to_vec();

                while next_gen.len() < self.config.population_size {
                    let mut child = self.offspring(&population, rng)?;
                    evaluator.evaluate_quality(&mut child);
                    if child.quality() < best.quality() {
                        best = child.clone();
                    }
                    next_gen.push(child);
                }
                population = next_gen;

                let stats = GenerationStats::of(&best, &population);
                debug!(generation, best = stats.best, average = stats.average, "ga generation");
                self.base.report(|a| a.log_algorithm_step(&stats.row()))?;
            }

            self.base.report(|a| a.log_solution(&best))?;
            Ok(best)
        })?;
        info!(quality = best.quality(), "ga finished");
        Ok(best)
    }

    fn boxed_clone(&self) -> Box<dyn Algorithm<ST, PT>> {
        Box::new(self.clone())
    }
}
