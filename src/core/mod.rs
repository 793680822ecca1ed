//! Shared vocabulary: problems, solutions, fitness, creation, configuration,
//! analytics and the algorithm lifecycle.
//!
//! # Key Types
//!
//! - [`Problem`] / [`ProblemGene`]: immutable input
//! - [`Solution`] / [`SolutionGene`] / [`Cachet`]: evolved output and its
//!   partial scores
//! - [`Evaluator`] / [`CachetEvaluator`]: weighted fitness aggregation
//! - [`GeneCreator`] / [`SolutionCreator`]: creation policies
//! - [`Descriptor`] / [`Configurable`]: named-option protocol
//! - [`Algorithm`] / [`AlgorithmBase`]: solve lifecycle
//! - [`Analytics`]: run reporting hook

mod algorithm;
mod analytics;
mod creator;
mod fitness;
mod options;
mod problem;
mod solution;

pub use algorithm::{Algorithm, AlgorithmBase};
pub use analytics::{
    Analytics, AnalyticsRecord, AnalyticsSession, MemoryAnalytics, TracingAnalytics,
};
pub use creator::{GeneCreator, NToOneSolutionCreator, OneToOneSolutionCreator, SolutionCreator};
pub use fitness::{CachetEvaluator, Evaluator, UNEVALUABLE_QUALITY};
pub use options::{Configurable, Descriptor, OptionValue, Options};
pub use problem::{Problem, ProblemGene};
pub use solution::{Cachet, Solution, SolutionGene};
