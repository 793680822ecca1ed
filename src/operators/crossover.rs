//! Recombination of two parents into one child.

use super::selection::Selector;
use crate::core::{Configurable, Descriptor, Options, Solution};
use rand::{Rng, RngCore};

/// Breeds a child from a population.
pub trait Crossover<ST, PT> {
    /// Selects two parents (possibly the same one) and breeds them.
    fn breed(
        &self,
        population: &[Solution<ST, PT>],
        selector: &dyn Selector<ST, PT>,
        rng: &mut dyn RngCore,
    ) -> Option<Solution<ST, PT>> {
        let a = selector.select(population, rng)?;
        let b = selector.select(population, rng)?;
        self.breed_two(a, b, rng)
    }

    fn breed_two(
        &self,
        a: &Solution<ST, PT>,
        b: &Solution<ST, PT>,
        rng: &mut dyn RngCore,
    ) -> Option<Solution<ST, PT>>;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// If a parent has no genes the other one is returned; `Some(None)` when
/// both are empty, `None` when both have genes.
fn empty_parent_fallback<ST, PT>(
    a: &Solution<ST, PT>,
    b: &Solution<ST, PT>,
) -> Option<Option<Solution<ST, PT>>> {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Some(None),
        (true, false) => Some(Some(b.clone())),
        (false, true) => Some(Some(a.clone())),
        (false, false) => None,
    }
}

/// Child = A[0, point) ++ B[point, len(B)), with
/// `point = round(len(A) * crossover_point)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnePointCrossover {
    crossover_point: f64,
}

impl Default for OnePointCrossover {
    fn default() -> Self {
        Self {
            crossover_point: 0.5,
        }
    }
}

impl OnePointCrossover {
    pub fn new(crossover_point: f64) -> Self {
        Self {
            crossover_point: crossover_point.clamp(0.0, 1.0),
        }
    }
}

impl<ST, PT> Crossover<ST, PT> for OnePointCrossover {
    fn breed_two(
        &self,
        a: &Solution<ST, PT>,
        b: &Solution<ST, PT>,
        _rng: &mut dyn RngCore,
    ) -> Option<Solution<ST, PT>> {
        if let Some(fallback) = empty_parent_fallback(a, b) {
            return fallback;
        }
        let point = (a.len() as f64 * self.crossover_point).round() as usize;
        let point = point.min(a.len());

        let mut genes = a.genes()[..point].to_vec();
        if point < b.len() {
            genes.extend_from_slice(&b.genes()[point..]);
        }
        Some(Solution::from_shared(genes))
    }

    fn name(&self) -> &str {
        "OnePointCrossover"
    }
}

impl Configurable for OnePointCrossover {
    fn options(&self) -> Options {
        let mut options = Options::new();
        options.insert(
            "crossover_point".into(),
            Descriptor::fixed(self.crossover_point),
        );
        options
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        match (name, descriptor.fixed_value().and_then(|v| v.as_f64())) {
            ("crossover_point", Some(p)) => {
                self.crossover_point = p.clamp(0.0, 1.0);
                true
            }
            _ => false,
        }
    }
}

/// Child of length min(len(A), len(B)); each position takes A's gene with
/// probability `crossover_rate`, otherwise B's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformCrossover {
    crossover_rate: f64,
}

impl Default for UniformCrossover {
    fn default() -> Self {
        Self {
            crossover_rate: 0.5,
        }
    }
}

impl UniformCrossover {
    pub fn new(crossover_rate: f64) -> Self {
        Self {
            crossover_rate: crossover_rate.clamp(0.0, 1.0),
        }
    }
}

impl<ST, PT> Crossover<ST, PT> for UniformCrossover {
    fn breed_two(
        &self,
        a: &Solution<ST, PT>,
        b: &Solution<ST, PT>,
        rng: &mut dyn RngCore,
    ) -> Option<Solution<ST, PT>> {
        if let Some(fallback) = empty_parent_fallback(a, b) {
            return fallback;
        }
        let genes = a
            .genes()
            .iter()
            .zip(b.genes())
            .map(|(ga, gb)| {
                if rng.random_bool(self.crossover_rate) {
                    ga.clone()
                } else {
                    gb.clone()
                }
            })
            .collect();
        Some(Solution::from_shared(genes))
    }

    fn name(&self) -> &str {
        "UniformCrossover"
    }
}

impl Configurable for UniformCrossover {
    fn options(&self) -> Options {
        let mut options = Options::new();
        options.insert(
            "crossover_rate".into(),
            Descriptor::fixed(self.crossover_rate),
        );
        options
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        match (name, descriptor.fixed_value().and_then(|v| v.as_f64())) {
            ("crossover_rate", Some(r)) => {
                self.crossover_rate = r.clamp(0.0, 1.0);
                true
            }
            _ => false,
        }
    }
}
