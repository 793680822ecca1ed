//! Parent selection.
//!
//! All selectors assume **minimization** (lower quality = better).
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use crate::core::{Configurable, Descriptor, Options, Solution};
use rand::{Rng, RngCore};

/// Chooses one solution from a population.
pub trait Selector<ST, PT> {
    /// Returns `None` for an empty population.
    fn select<'a>(
        &self,
        population: &'a [Solution<ST, PT>],
        rng: &mut dyn RngCore,
    ) -> Option<&'a Solution<ST, PT>>;
}

/// Tournament selection: sample `tournament_size` individuals with
/// replacement and keep the one with the lowest quality.
///
/// Because sampling is with replacement, a tournament as large as the
/// population does not guarantee that every member took part.
///
/// # Complexity
/// O(k) per selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentSelector {
    tournament_size: usize,
}

impl Default for TournamentSelector {
    fn default() -> Self {
        Self { tournament_size: 2 }
    }
}

impl TournamentSelector {
    pub fn new(tournament_size: usize) -> Self {
        Self {
            tournament_size: tournament_size.max(1),
        }
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }
}

impl<ST, PT> Selector<ST, PT> for TournamentSelector {
    fn select<'a>(
        &self,
        population: &'a [Solution<ST, PT>],
        rng: &mut dyn RngCore,
    ) -> Option<&'a Solution<ST, PT>> {
        let n = population.len();
        if n == 0 {
            return None;
        }

        let mut best = &population[rng.random_range(0..n)];
        for _ in 1..self.tournament_size {
            let candidate = &population[rng.random_range(0..n)];
            if candidate.quality() < best.quality() {
                best = candidate;
            }
        }
        Some(best)
    }
}

impl Configurable for TournamentSelector {
    fn options(&self) -> Options {
        let mut options = Options::new();
        options.insert(
            "tournament_size".into(),
            Descriptor::fixed(self.tournament_size),
        );
        options
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        match (name, descriptor.fixed_value().and_then(|v| v.as_usize())) {
            ("tournament_size", Some(size)) => {
                self.tournament_size = size.max(1);
                true
            }
            _ => false,
        }
    }
}
