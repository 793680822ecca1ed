//! Iterated local search (ILS).
//!
//! Alternates a perturbation ("kick") with an inner search algorithm that
//! is warm-started from the kicked solution.
//!
//! # References
//!
//! - Lourenço, Martin & Stützle (2003), "Iterated Local Search"

mod config;
mod runner;

pub use config::IlsConfig;
pub use runner::IteratedLocalSearch;
