//! Generic metaheuristic framework with genetic programming over heuristic
//! graphs, algorithm pipelines and A* search.
//!
//! A problem is described once as a [`Problem`](core::Problem) of problem
//! genes; every strategy evolves [`Solution`](core::Solution)s of solution
//! genes scored by a weighted [`Evaluator`](core::Evaluator) (lower quality
//! is better). Strategies share the same creation, selection, crossover and
//! mutation contracts:
//!
//! - **Local Search**: repeatedly applies one mutator to the incumbent.
//! - **Iterated Local Search (ILS)**: kicks the incumbent and hands it to an
//!   inner algorithm, keeping strict improvements.
//! - **Genetic Algorithm (GA)**: population-based evolution with elitism,
//!   tournament selection, optional crossover and mutation.
//! - **Genetic Programming (GP)**: evolves typed node graphs that are
//!   themselves heuristics for another problem.
//! - **Amalgam**: chains algorithms into warm-started pipelines and
//!   searches over their hyperparameters.
//! - **A\***: shortest paths over weighted graphs, usable as a gene creator.
//!
//! # Architecture
//!
//! Everything is generic over the solution gene type `ST` and the problem
//! gene type `PT`. Randomness is injected as `&mut dyn RngCore` and
//! execution is single threaded; seeded runs are reproducible.

pub mod amalgam;
pub mod astar;
pub mod core;
pub mod error;
pub mod ga;
pub mod gp;
pub mod ils;
pub mod local_search;
pub mod operators;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
