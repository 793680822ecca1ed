//! Genetic Algorithm.
//!
//! A generational GA over [`Solution`](crate::core::Solution)s built from
//! the shared operator contracts: a [`Selector`](crate::operators::Selector)
//! picks parents, an optional [`Crossover`](crate::operators::Crossover)
//! recombines them, and a [`Mutator`](crate::operators::Mutator) produces
//! the remaining offspring.
//!
//! # Key Types
//!
//! - [`GaConfig`]: population size, generations, elites, mutation probability
//! - [`GeneticAlgorithm`]: the evolutionary loop as an
//!   [`Algorithm`](crate::core::Algorithm)
//! - [`GenerationStats`]: best / worst / average quality per generation
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod config;
mod runner;

pub use config::GaConfig;
pub use runner::{GenerationStats, GeneticAlgorithm};
