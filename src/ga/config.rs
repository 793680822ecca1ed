//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use crate::core::{Descriptor, Options};

/// Configuration for the Genetic Algorithm.
///
/// # Defaults
///
/// ```
/// use u_metaevo::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.maximum_generations, 100);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_metaevo::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_elites(5)
///     .with_mutation_probability(0.3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Number of generations, counting the initial population.
    pub maximum_generations: usize,

    /// Best individuals copied unchanged into the next generation.
    pub elites: usize,

    /// Probability (0.0–1.0) of producing an offspring by selection and
    /// mutation instead of crossover.
    ///
    /// Without a configured crossover every offspring is a mutant.
    pub mutation_probability: f64,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            maximum_generations: 100,
            elites: 1,
            mutation_probability: 0.5,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_maximum_generations(mut self, n: usize) -> Self {
        self.maximum_generations = n;
        self
    }

    /// Sets the elite count.
    pub fn with_elites(mut self, n: usize) -> Self {
        self.elites = n;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 1 {
            return Err("population_size must be at least 1".into());
        }
        if self.maximum_generations == 0 {
            return Err("maximum_generations must be at least 1".into());
        }
        if self.elites > self.population_size {
            return Err("elites cannot exceed population_size".into());
        }
        Ok(())
    }

    pub(crate) fn options(&self) -> Options {
        let mut options = Options::new();
        options.insert("population_size".into(), Descriptor::fixed(self.population_size));
        options.insert(
            "maximum_generations".into(),
            Descriptor::fixed(self.maximum_generations),
        );
        options.insert("elites".into(), Descriptor::fixed(self.elites));
        options.insert(
            "mutation_probability".into(),
            Descriptor::fixed(self.mutation_probability),
        );
        options
    }

    pub(crate) fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        let Some(value) = descriptor.fixed_value() else {
            return false;
        };
        let slot = match name {
            "population_size" => &mut self.population_size,
            "maximum_generations" => &mut self.maximum_generations,
            "elites" => &mut self.elites,
            "mutation_probability" => {
                return match value.as_f64() {
                    Some(p) => {
                        self.mutation_probability = p.clamp(0.0, 1.0);
                        true
                    }
                    None => false,
                };
            }
            _ => return false,
        };
        match value.as_usize() {
            Some(n) => {
                *slot = n;
                true
            }
            None => false,
        }
    }
}
