//! Local search loop execution.

use super::config::LocalSearchConfig;
use crate::core::{
    Algorithm, AlgorithmBase, Analytics, Configurable, Descriptor, Evaluator, Options, Problem,
    Solution, SolutionCreator,
};
use crate::error::{Error, Result};
use crate::operators::Mutator;
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, info};

/// Repeatedly applies one mutator to the incumbent.
///
/// # Usage
///
/// ```ignore
/// let search = LocalSearch::new(evaluator, creator, mutator)
///     .with_config(LocalSearchConfig::default().with_maximum_generations(500));
/// let best = search.solve_seeded(&problem, Some(42))?;
/// ```
pub struct LocalSearch<ST, PT> {
    base: AlgorithmBase<ST, PT>,
    mutator: Arc<dyn Mutator<ST, PT>>,
    config: LocalSearchConfig,
}

impl<ST, PT> Clone for LocalSearch<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            mutator: Arc::clone(&self.mutator),
            config: self.config.clone(),
        }
    }
}

impl<ST, PT> LocalSearch<ST, PT> {
    pub fn new(
        evaluator: Arc<Evaluator<ST, PT>>,
        solution_creator: Arc<dyn SolutionCreator<ST, PT>>,
        mutator: Arc<dyn Mutator<ST, PT>>,
    ) -> Self {
        Self {
            base: AlgorithmBase::new(evaluator, solution_creator),
            mutator,
            config: LocalSearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LocalSearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn Analytics<ST, PT>>) -> Self {
        self.base.set_analytics(Some(analytics));
        self
    }

    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }
}

impl<ST, PT> Configurable for LocalSearch<ST, PT> {
    fn options(&self) -> Options {
        self.config.options()
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        self.config.set_option(name, descriptor)
    }
}

impl<ST: 'static, PT: 'static> Algorithm<ST, PT> for LocalSearch<ST, PT> {
    fn name(&self) -> &str {
        "LocalSearch"
    }

    fn base(&self) -> &AlgorithmBase<ST, PT> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase<ST, PT> {
        &mut self.base
    }

    fn solve_from(
        &self,
        problem: &Problem<PT>,
        start: Solution<ST, PT>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<ST, PT>> {
        self.config.validate().map_err(Error::InvalidConfig)?;

        let best = self.base.session(|| {
            self.base.report(|a| {
                a.log_param("problem_size", &problem.size().to_string())?;
                a.log_param("mutator", self.mutator.name())?;
                a.log_param(
                    "maximum_generations",
                    &self.config.maximum_generations.to_string(),
                )?;
                a.log_algorithm_step_headers(&["best quality"])
            })?;

            let mut best = start;
            for generation in 0..self.config.maximum_generations {
                best = self.mutator.mutate(&best, rng);
                debug!(generation, quality = best.quality(), "local search step");
                self.base
                    .report(|a| a.log_algorithm_step(&[best.quality().to_string()]))?;
            }

            self.base.report(|a| {
                a.log_problem(problem)?;
                a.log_solution(&best)
            })?;
            Ok(best)
        })?;
        info!(quality = best.quality(), "local search finished");
        Ok(best)
    }

    fn boxed_clone(&self) -> Box<dyn Algorithm<ST, PT>> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryAnalytics;
    use crate::operators::RollbackRandomNGenesMutator;
    use crate::testing::*;
    use u_numflow::random::create_rng;

    fn search(generations: usize) -> LocalSearch<Genome, Genome> {
        let evaluator = genome_evaluator();
        let mutator = Arc::new(RollbackRandomNGenesMutator::new(
            RandomCharMutation,
            Arc::clone(&evaluator),
        ));
        LocalSearch::new(evaluator, genome_creator(), mutator).with_config(
            LocalSearchConfig::default().with_maximum_generations(generations),
        )
    }

    #[test]
    fn test_initial_genome_quality() {
        let mut rng = create_rng(42);
        let start = search(1)
            .base()
            .initial_solution(&genome_problem(), &mut rng)
            .unwrap();
        // AAAAACCCCCGGGGGTTTTT vs GTACCCGTACCCGTACCCTT differs in 14 slots
        assert!((start.quality() - 14.0).abs() < 1e-10);
    }

    #[test]
    fn test_genome_end_to_end() {
        let problem = genome_problem();
        let search = search(200);
        let mut rng = create_rng(42);
        let start = search.base().initial_solution(&problem, &mut rng).unwrap();
        let initial = start.quality();

        let best = search.solve_from(&problem, start, &mut rng).unwrap();
        assert!(best.quality() <= initial);
        assert!(best.quality() < initial, "200 steps should improve");

        let mut check = best.clone();
        let re = genome_evaluator().evaluate_quality(&mut check);
        assert!((best.quality() - re).abs() < 1e-10);
    }

    #[test]
    fn test_analytics_rows_per_generation() {
        let memory = Arc::new(MemoryAnalytics::new());
        let search = search(25).with_analytics(memory.clone());
        search.solve_seeded(&genome_problem(), Some(7)).unwrap();

        let runs = memory.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].headers, vec!["best quality".to_string()]);
        assert_eq!(runs[0].steps.len(), 25);
        assert_eq!(runs[0].problem_size, Some(1));
        assert!(runs[0].finished);
        assert!(runs[0]
            .params
            .iter()
            .any(|(k, v)| k == "maximum_generations" && v == "25"));
    }

    #[test]
    fn test_quality_never_increases() {
        let memory = Arc::new(MemoryAnalytics::new());
        search(60)
            .with_analytics(memory.clone())
            .solve_seeded(&genome_problem(), Some(3))
            .unwrap();
        let qualities: Vec<f64> = memory.runs()[0]
            .steps
            .iter()
            .map(|row| row[0].parse().unwrap())
            .collect();
        assert!(qualities.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_invalid_config_errors() {
        let s = search(0);
        let result = s.solve_seeded(&genome_problem(), Some(1));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_options_via_protocol() {
        let mut s = search(10);
        assert!(s.set_option("maximum_generations", &Descriptor::fixed(3usize)));
        assert_eq!(s.config().maximum_generations, 3);
        assert!(!s.set_option("population_size", &Descriptor::fixed(3usize)));
    }

    #[test]
    fn test_rejected_step_closes_session() {
        let analytics = SwitchableAnalytics::switched_off();
        let s = search(10).with_analytics(analytics.clone());

        let err = s.solve_seeded(&genome_problem(), Some(4)).unwrap_err();
        assert!(matches!(err, Error::Construction { .. }));

        analytics.set_off(false);
        s.solve_seeded(&genome_problem(), Some(4)).unwrap();
        let runs = analytics.memory.runs();
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| r.finished));
        assert!(runs[0].solution_quality.is_none());
        assert_eq!(runs[1].steps.len(), 10);
    }
}
