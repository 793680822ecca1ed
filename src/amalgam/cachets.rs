//! Pipeline fitness.

use super::problem::{AlgorithmBlueprint, AmalgamSolution, ConfiguredAlgorithm};
use super::runner::AmalgamAlgorithm;
use crate::core::{Algorithm, CachetEvaluator, Configurable, Problem};
use tracing::debug;
use u_numflow::random::create_rng;

/// Quality of a pipeline with no stages, or of one that fails to run.
pub const UNRUNNABLE_PIPELINE_QUALITY: f64 = 1e8;

/// Runs the pipeline on a held problem and takes the resulting quality.
///
/// Every evaluation uses a fresh random source seeded with `seed`, so the
/// same pipeline always scores the same.
pub struct AmalgamEvaluationCachet<ST, PT> {
    problem: Problem<PT>,
    seed: u64,
    _solution: std::marker::PhantomData<fn() -> ST>,
}

impl<ST, PT> AmalgamEvaluationCachet<ST, PT> {
    pub fn new(problem: Problem<PT>) -> Self {
        Self {
            problem,
            seed: 42,
            _solution: std::marker::PhantomData,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn problem(&self) -> &Problem<PT> {
        &self.problem
    }
}

impl<ST: 'static, PT: 'static>
    CachetEvaluator<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>>
    for AmalgamEvaluationCachet<ST, PT>
{
    fn name(&self) -> &str {
        "AmalgamEvaluationCachet"
    }

    fn quality(&self, solution: &AmalgamSolution<ST, PT>) -> f64 {
        let pipeline = AmalgamAlgorithm::from_solution(solution);
        let mut rng = create_rng(self.seed);
        match pipeline.solve(&self.problem, &mut rng) {
            Ok(best) => best.quality(),
            Err(error) => {
                debug!(%error, "pipeline failed to run");
                UNRUNNABLE_PIPELINE_QUALITY
            }
        }
    }

    fn empty_quality(&self) -> f64 {
        UNRUNNABLE_PIPELINE_QUALITY
    }
}

/// Penalizes the search budget of a pipeline: `population_size *
/// maximum_generations` for population based stages, `maximum_generations`
/// for the others. Stages exposing neither add nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmalgamGenerationCachet;

impl AmalgamGenerationCachet {
    fn budget<ST, PT>(stage: &dyn Algorithm<ST, PT>) -> f64 {
        let options = stage.options();
        let read = |name: &str| {
            options
                .get(name)
                .and_then(|d| d.fixed_value())
                .and_then(|v| v.as_f64())
        };
        match (read("population_size"), read("maximum_generations")) {
            (Some(population), Some(generations)) => population * generations,
            (None, Some(generations)) => generations,
            _ => 0.0,
        }
    }
}

impl<ST, PT> CachetEvaluator<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>>
    for AmalgamGenerationCachet
{
    fn name(&self) -> &str {
        "AmalgamGenerationCachet"
    }

    fn quality(&self, solution: &AmalgamSolution<ST, PT>) -> f64 {
        solution
            .genes()
            .iter()
            .map(|g| Self::budget(g.gene().algorithm()))
            .sum()
    }

    fn empty_quality(&self) -> f64 {
        UNRUNNABLE_PIPELINE_QUALITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amalgam::{AmalgamGeneCreator, AmalgamProblem};
    use crate::core::{Descriptor, Evaluator, OneToOneSolutionCreator, Solution, SolutionCreator};
    use crate::ga::{GaConfig, GeneticAlgorithm};
    use crate::operators::RollbackRandomNGenesMutator;
    use crate::testing::*;
    use std::sync::Arc;

    fn pipeline(
        blueprints: Vec<AlgorithmBlueprint<Genome, Genome>>,
        seed: u64,
    ) -> AmalgamSolution<Genome, Genome> {
        let problem: AmalgamProblem<Genome, Genome> = Problem::new(blueprints);
        let creator = OneToOneSolutionCreator::new(AmalgamGeneCreator);
        let mut rng = create_rng(seed);
        creator.create_solution(&problem, &mut rng).unwrap()
    }

    fn ga_blueprint() -> AlgorithmBlueprint<Genome, Genome> {
        let evaluator = genome_evaluator();
        let mutator = Arc::new(RollbackRandomNGenesMutator::new(
            RandomCharMutation,
            Arc::clone(&evaluator),
        ));
        let ga = GeneticAlgorithm::new(evaluator, genome_creator(), mutator).with_config(
            GaConfig::default()
                .with_population_size(4)
                .with_maximum_generations(3),
        );
        AlgorithmBlueprint::new(Box::new(ga))
    }

    #[test]
    fn test_evaluation_runs_pipeline() {
        let cachet = AmalgamEvaluationCachet::new(genome_problem()).with_seed(3);
        let long = || {
            AlgorithmBlueprint::new(Box::new(genome_search(100)))
                .with_option("maximum_generations", Descriptor::fixed(40usize))
        };
        let mut solution = pipeline(vec![long(), long()], 1);
        let q = cachet.evaluate_quality(&mut solution);
        assert!(q < 14.0, "{q}");
        assert_eq!(solution.cachets()[0].name(), "AmalgamEvaluationCachet");
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let cachet = AmalgamEvaluationCachet::new(genome_problem());
        let solution = pipeline(vec![search_blueprint()], 2);
        let first = cachet.quality(&solution);
        let second = cachet.quality(&solution);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_pipeline_scores_sentinel() {
        let mut empty: AmalgamSolution<Genome, Genome> = Solution::new();
        let evaluation = AmalgamEvaluationCachet::new(genome_problem());
        assert_eq!(evaluation.evaluate_quality(&mut empty), UNRUNNABLE_PIPELINE_QUALITY);
        assert_eq!(
            AmalgamGenerationCachet.evaluate_quality(&mut empty),
            UNRUNNABLE_PIPELINE_QUALITY
        );
    }

    #[test]
    fn test_failing_stage_scores_sentinel() {
        let broken = AlgorithmBlueprint::new(Box::new(genome_search(10)))
            .with_option("maximum_generations", Descriptor::fixed(0usize));
        let solution = pipeline(vec![broken], 1);
        let cachet = AmalgamEvaluationCachet::new(genome_problem());
        assert_eq!(cachet.quality(&solution), UNRUNNABLE_PIPELINE_QUALITY);
    }

    #[test]
    fn test_generation_budget() {
        let fixed = |n: usize| {
            AlgorithmBlueprint::new(Box::new(genome_search(100)))
                .with_option("maximum_generations", Descriptor::fixed(n))
        };
        let solution = pipeline(vec![fixed(10), ga_blueprint(), fixed(5)], 1);
        // 10 + 4 * 3 + 5
        assert_eq!(AmalgamGenerationCachet.quality(&solution), 27.0);
    }

    #[test]
    fn test_weighted_pipeline_evaluator() {
        let evaluator: Evaluator<
            ConfiguredAlgorithm<Genome, Genome>,
            AlgorithmBlueprint<Genome, Genome>,
        > = Evaluator::new()
                .with_cachet(AmalgamEvaluationCachet::new(genome_problem()), 1.0)
                .with_cachet(AmalgamGenerationCachet, 0.01);
        let mut solution = pipeline(vec![search_blueprint()], 4);
        let q = evaluator.evaluate_quality(&mut solution);
        assert_eq!(solution.cachets().len(), 2);
        let sum = solution.cachets()[0].quality() + 0.01 * solution.cachets()[1].quality();
        assert!((q - sum).abs() < 1e-9);
    }
}
