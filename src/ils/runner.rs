//! Iterated local search execution.

use super::config::IlsConfig;
use crate::core::{
    Algorithm, AlgorithmBase, Analytics, Configurable, Descriptor, Evaluator, Options, Problem,
    Solution, SolutionCreator,
};
use crate::error::{Error, Result};
use crate::operators::Mutator;
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, info};

/// Kick, search, keep the best.
///
/// Each round perturbs the incumbent with the kick mutator, hands the
/// result to an inner algorithm as a warm start, re-scores it and keeps
/// it only if it beats the incumbent.
pub struct IteratedLocalSearch<ST, PT> {
    base: AlgorithmBase<ST, PT>,
    kick: Arc<dyn Mutator<ST, PT>>,
    search: Box<dyn Algorithm<ST, PT>>,
    config: IlsConfig,
}

impl<ST, PT> Clone for IteratedLocalSearch<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            kick: Arc::clone(&self.kick),
            search: self.search.boxed_clone(),
            config: self.config.clone(),
        }
    }
}

impl<ST, PT> IteratedLocalSearch<ST, PT> {
    pub fn new(
        evaluator: Arc<Evaluator<ST, PT>>,
        solution_creator: Arc<dyn SolutionCreator<ST, PT>>,
        kick: Arc<dyn Mutator<ST, PT>>,
        search: Box<dyn Algorithm<ST, PT>>,
    ) -> Self {
        Self {
            base: AlgorithmBase::new(evaluator, solution_creator),
            kick,
            search,
            config: IlsConfig::default(),
        }
    }

    pub fn with_config(mut self, config: IlsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn Analytics<ST, PT>>) -> Self {
        self.base.set_analytics(Some(analytics));
        self
    }
}

impl<ST, PT> Configurable for IteratedLocalSearch<ST, PT> {
    fn options(&self) -> Options {
        self.config.options()
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        self.config.set_option(name, descriptor)
    }
}

impl<ST: 'static, PT: 'static> Algorithm<ST, PT> for IteratedLocalSearch<ST, PT> {
    fn name(&self) -> &str {
        "IteratedLocalSearch"
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
        let evaluator = self.base.evaluator()?;

        let best = self.base.session(|| {
            self.base.report(|a| {
                a.log_param("problem_size", &problem.size().to_string())?;
                a.log_param("kick_mutator", self.kick.name())?;
                a.log_param("search_algorithm", self.search.name())?;
                a.log_param("creator", &self.base.creator_name())?;
                a.log_param(
                    "maximum_generations",
                    &self.config.maximum_generations.to_string(),
                )?;
                a.log_algorithm_step_headers(&["best quality"])
            })?;

            let mut best = start;
            for generation in 0..self.config.maximum_generations {
                let kicked = self.kick.mutate(&best, rng);
                let mut candidate = self.search.solve_from(problem, kicked, rng)?;
                candidate.clear_cachets();
                evaluator.evaluate_quality(&mut candidate);

                if candidate.quality() < best.quality() {
                    best = candidate;
                }
                debug!(generation, quality = best.quality(), "ils round");
                self.base
                    .report(|a| a.log_algorithm_step(&[best.quality().to_string()]))?;
            }

            self.base.report(|a| {
                a.log_problem(problem)?;
                a.log_solution(&best)
            })?;
            Ok(best)
        })?;
        info!(quality = best.quality(), "ils finished");
        Ok(best)
    }

    fn boxed_clone(&self) -> Box<dyn Algorithm<ST, PT>> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amalgam::AmalgamAlgorithm;
    use crate::core::MemoryAnalytics;
    use crate::local_search::{LocalSearch, LocalSearchConfig};
    use crate::operators::{RandomNGenesMutator, RollbackRandomNGenesMutator};
    use crate::testing::*;
    use u_numflow::random::create_rng;

    fn ils(rounds: usize) -> IteratedLocalSearch<Genome, Genome> {
        let evaluator = genome_evaluator();
        let step = Arc::new(RollbackRandomNGenesMutator::new(
            RandomCharMutation,
            Arc::clone(&evaluator),
        ));
        let inner = LocalSearch::new(Arc::clone(&evaluator), genome_creator(), step)
            .with_config(LocalSearchConfig::default().with_maximum_generations(20));
        let kick = Arc::new(
            RandomNGenesMutator::new(RandomCharMutation, Arc::clone(&evaluator))
                .with_mutations_per_solution(1),
        );
        IteratedLocalSearch::new(evaluator, genome_creator(), kick, Box::new(inner))
            .with_config(IlsConfig::default().with_maximum_generations(rounds))
    }

    #[test]
    fn test_ils_improves_genome() {
        let problem = genome_problem();
        let mut rng = create_rng(5);
        let algorithm = ils(10);
        let start = algorithm.base().initial_solution(&problem, &mut rng).unwrap();
        let initial = start.quality();
        let best = algorithm.solve_from(&problem, start, &mut rng).unwrap();
        assert!(best.quality() < initial);

        let mut check = best.clone();
        let q = genome_evaluator().evaluate_quality(&mut check);
        assert!((q - best.quality()).abs() < 1e-10);
        assert_eq!(best.cachets().len(), 1, "cachets are recomputed, not appended");
    }

    #[test]
    fn test_ils_logs_run_metadata() {
        let memory = Arc::new(MemoryAnalytics::new());
        ils(4)
            .with_analytics(memory.clone())
            .solve_seeded(&genome_problem(), Some(1))
            .unwrap();
        let run = &memory.runs()[0];
        let keys: Vec<&str> = run.params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "problem_size",
                "kick_mutator",
                "search_algorithm",
                "creator",
                "maximum_generations"
            ]
        );
        assert_eq!(run.steps.len(), 4);
        assert!(run.finished);
    }

    #[test]
    fn test_boxed_clone_is_independent() {
        let original = ils(3);
        let mut copy = original.boxed_clone();
        assert!(copy.set_option("maximum_generations", &Descriptor::fixed(9usize)));
        assert_eq!(
            original.options()["maximum_generations"],
            Descriptor::fixed(3usize)
        );
        assert_eq!(copy.options()["maximum_generations"], Descriptor::fixed(9usize));
    }

    #[test]
    fn test_failing_inner_search_closes_session() {
        let evaluator = genome_evaluator();
        let kick = Arc::new(RandomNGenesMutator::new(
            RandomCharMutation,
            Arc::clone(&evaluator),
        ));
        let memory = Arc::new(MemoryAnalytics::new());
        let broken = IteratedLocalSearch::new(
            evaluator,
            genome_creator(),
            kick,
            Box::new(AmalgamAlgorithm::<Genome, Genome>::new(Vec::new())),
        )
        .with_config(IlsConfig::default().with_maximum_generations(3))
        .with_analytics(memory.clone());

        let result = broken.solve_seeded(&genome_problem(), Some(1));
        assert!(matches!(result, Err(Error::Construction { .. })));

        // the shared backend accepts the next run
        ils(2)
            .with_analytics(memory.clone())
            .solve_seeded(&genome_problem(), Some(1))
            .unwrap();
        let runs = memory.runs();
        assert_eq!(runs.len(), 2);
        assert!(runs[0].finished);
        assert!(runs[0].steps.is_empty());
        assert!(runs[1].finished);
        assert_eq!(runs[1].steps.len(), 2);
    }
}
