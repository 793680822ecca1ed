//! Fitness aggregation: weighted sums of named partial scores.

use super::solution::{Cachet, Solution};
use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Quality assigned to a solution that has nothing to score.
pub const UNEVALUABLE_QUALITY: f64 = 1_000_000.0;

/// Computes one named partial quality.
///
/// Implementors provide [`quality`](Self::quality); callers go through
/// [`evaluate_quality`](Self::evaluate_quality), which records the
/// [`Cachet`] on the solution.
pub trait CachetEvaluator<ST, PT> {
    /// Name recorded on each cachet.
    fn name(&self) -> &str;

    /// Raw partial quality of a non-empty solution.
    fn quality(&self, solution: &Solution<ST, PT>) -> f64;

    /// Quality recorded for a solution without genes.
    fn empty_quality(&self) -> f64 {
        UNEVALUABLE_QUALITY
    }

    /// Scores `solution`, appends the cachet and returns the same value.
    fn evaluate_quality(&self, solution: &mut Solution<ST, PT>) -> f64 {
        let quality = if solution.is_empty() {
            self.empty_quality()
        } else {
            self.quality(solution)
        };
        solution.push_cachet(Cachet::new(quality, self.name()));
        quality
    }
}

/// Sums weighted cachet qualities into the solution quality.
pub struct Evaluator<ST, PT> {
    cachets: Vec<(Arc<dyn CachetEvaluator<ST, PT>>, f64)>,
}

impl<ST, PT> Clone for Evaluator<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            cachets: self.cachets.clone(),
        }
    }
}

impl<ST, PT> Default for Evaluator<ST, PT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<ST, PT> Evaluator<ST, PT> {
    pub fn new() -> Self {
        Self {
            cachets: Vec::new(),
        }
    }

    /// Registers a cachet evaluator with its weight.
    pub fn with_cachet(
        mut self,
        cachet: impl CachetEvaluator<ST, PT> + 'static,
        weight: f64,
    ) -> Self {
        self.cachets.push((Arc::new(cachet), weight));
        self
    }

    pub fn with_shared_cachet(
        mut self,
        cachet: Arc<dyn CachetEvaluator<ST, PT>>,
        weight: f64,
    ) -> Self {
        self.cachets.push((cachet, weight));
        self
    }

    pub fn len(&self) -> usize {
        self.cachets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cachets.is_empty()
    }

    /// Clears old cachets, scores every component and stores the weighted
    /// sum as the solution quality.
    pub fn evaluate_quality(&self, solution: &mut Solution<ST, PT>) -> f64 {
        solution.clear_cachets();
        let quality: f64 = self
            .cachets
            .iter()
            .map(|(cachet, weight)| cachet.evaluate_quality(solution) * weight)
            .sum();
        solution.set_quality(quality);
        quality
    }

    /// Like [`evaluate_quality`](Self::evaluate_quality) but rejects a
    /// solution without genes instead of scoring it with the sentinel.
    pub fn try_evaluate_quality(&self, solution: &mut Solution<ST, PT>) -> Result<f64> {
        if solution.is_empty() {
            return Err(Error::UnevaluableSolution("solution has no genes".into()));
        }
        Ok(self.evaluate_quality(solution))
    }

    /// Human readable `name * weight + ...` summary.
    pub fn evaluation_identity(&self) -> String {
        self.cachets
            .iter()
            .map(|(cachet, weight)| format!("{} * {}", cachet.name(), weight))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl<ST, PT> fmt::Debug for Evaluator<ST, PT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Evaluator")
            .field(&self.evaluation_identity())
            .finish()
    }
}
