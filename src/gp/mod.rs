//! Genetic programming over heuristic graphs.
//!
//! A [`GpGraph`] is an evolved program: a DAG of typed nodes under a single
//! [`NodeKind::Result`] root that, when executed against a problem, builds,
//! mutates, recombines and picks solutions of that problem. Evolving graphs
//! is itself an optimization problem: the solution gene is a graph, the
//! problem gene is the [`GpProblem`] search space, and the usual algorithms
//! run on it with the operators from this module.
//!
//! # Nodes and execution
//!
//! - [`NodeKind`] is the closed node library; each kind declares the type it
//!   produces and the types of its child slots.
//! - A node flagged as cached computes once per pass and serves its memo to
//!   every parent. [`GpGraph::calculate_value`] resets all memos and the
//!   interrupt flag before each pass.
//! - Loop nodes poll the graph's interrupt flag, which another thread may set
//!   through [`GpGraph::interrupt_handle`].
//!
//! # Operators
//!
//! - [`GpGeneCreator`]: grows a graph from a bare root with [`GpRepair`]
//! - [`GpCrossover`]: splices a same-typed subgraph of one parent into the
//!   other; falls back to a random parent
//! - [`GpReplacingNodeMutation`], [`GpValueMutation`]: structural and
//!   constant mutation
//! - [`GpDepthCachet`], [`GpNodeCostCachet`], [`GpSolutionCachet`],
//!   [`GpEvaluationCachet`]: fitness components
//!
//! # Example
//!
//! ```
//! use u_metaevo::core::{GeneCreator, ProblemGene};
//! use u_metaevo::gp::{default_problem, GpGeneCreator, GpGraph, GpValidator};
//! use u_numflow::random::create_rng;
//!
//! let space = ProblemGene::new(default_problem());
//! let mut rng = create_rng(42);
//! let graph: GpGraph<Vec<char>, Vec<char>> =
//!     GpGeneCreator::default().create_gene(&space, &mut rng).unwrap();
//! assert!(GpValidator::validate(&graph));
//! ```

mod cachets;
mod creator;
mod crossover;
mod exec;
mod graph;
mod mutation;
mod node;
mod problem;
mod repair;
mod trim;
mod validate;

pub use cachets::{GpDepthCachet, GpEvaluationCachet, GpNodeCostCachet, GpSolutionCachet};
pub use creator::GpGeneCreator;
pub use crossover::GpCrossover;
pub use exec::{ExecutionContext, Heuristics};
pub use graph::GpGraph;
pub use mutation::{
    GpReplacingNodeMutation, GpReplacingNodeMutator, GpValueMutation, GpValueMutator,
};
pub use node::{GpNode, GpValue, NodeId, NodeKind, ValueType, DEFAULT_MAX_ITERATIONS};
pub use problem::{default_blueprints, default_problem, GpProblem};
pub use repair::GpRepair;
pub use trim::GpTrim;
pub use validate::GpValidator;
