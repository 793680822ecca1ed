//! Selection, crossover and mutation contracts with their standard
//! implementations.
//!
//! - [`TournamentSelector`]: lowest quality of `k` draws with replacement
//! - [`OnePointCrossover`], [`UniformCrossover`]: gene-list recombination
//! - [`RandomNGenesMutator`], [`RollbackRandomNGenesMutator`]: accept only
//!   strict improvements over the input

mod crossover;
mod mutation;
mod selection;

pub use crossover::{Crossover, OnePointCrossover, UniformCrossover};
pub use mutation::{GeneMutation, Mutator, RandomNGenesMutator, RollbackRandomNGenesMutator};
pub use selection::{Selector, TournamentSelector};
