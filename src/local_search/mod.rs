//! Local search.
//!
//! A single incumbent is repeatedly passed through a [`Mutator`] for a
//! fixed number of generations. Paired with
//! [`RollbackRandomNGenesMutator`] this is a first-improvement hill climber
//! that never evaluates a rejected move twice.
//!
//! [`Mutator`]: crate::operators::Mutator
//! [`RollbackRandomNGenesMutator`]: crate::operators::RollbackRandomNGenesMutator

mod config;
mod runner;

pub use config::LocalSearchConfig;
pub use runner::LocalSearch;
