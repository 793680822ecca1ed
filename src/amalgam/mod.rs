//! Amalgam: algorithm pipelines and hyperparameter search over them.
//!
//! [`AmalgamAlgorithm`] chains algorithms into a refinement pipeline where
//! every stage warm-starts from the previous stage's best solution.
//!
//! The same pipelines can be searched for: an [`AmalgamProblem`] holds one
//! [`AlgorithmBlueprint`] per stage (a template algorithm plus option
//! descriptors), [`AmalgamGeneCreator`] instantiates configured stages from
//! them, the cachets score a candidate pipeline by running it
//! ([`AmalgamEvaluationCachet`]) and by its search budget
//! ([`AmalgamGenerationCachet`]), and the mutations perturb stage options.
//! Any algorithm of the crate can then optimize the pipeline itself.
//!
//! # Usage
//!
//! ```ignore
//! let problem: AmalgamProblem<_, _> = Problem::new([
//!     AlgorithmBlueprint::new(Box::new(ga))
//!         .with_option("population_size", Descriptor::range(10usize, 100usize)),
//!     AlgorithmBlueprint::new(Box::new(local_search))
//!         .with_option("maximum_generations", Descriptor::range(10usize, 500usize)),
//! ]);
//! let evaluator = Arc::new(
//!     Evaluator::new()
//!         .with_cachet(AmalgamEvaluationCachet::new(target_problem), 1.0)
//!         .with_cachet(AmalgamGenerationCachet, 0.001),
//! );
//! let mutator = Arc::new(AmalgamOffsetMutator::new(
//!     AmalgamOffsetMutation,
//!     Arc::clone(&evaluator),
//! ));
//! let creator = Arc::new(OneToOneSolutionCreator::new(AmalgamGeneCreator));
//! let best = LocalSearch::new(evaluator, creator, mutator).solve_seeded(&problem, Some(1))?;
//! let pipeline = AmalgamAlgorithm::from_solution(&best);
//! ```

mod cachets;
mod mutation;
mod problem;
mod runner;

pub use cachets::{AmalgamEvaluationCachet, AmalgamGenerationCachet, UNRUNNABLE_PIPELINE_QUALITY};
pub use mutation::{AmalgamMutation, AmalgamMutator, AmalgamOffsetMutation, AmalgamOffsetMutator};
pub use problem::{
    AlgorithmBlueprint, AmalgamGeneCreator, AmalgamProblem, AmalgamSolution, ConfiguredAlgorithm,
};
pub use runner::AmalgamAlgorithm;
