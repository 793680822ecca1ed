//! Iterated local search configuration.

use crate::core::{Descriptor, Options};

/// Configuration for [`IteratedLocalSearch`](super::IteratedLocalSearch).
#[derive(Debug, Clone, PartialEq)]
pub struct IlsConfig {
    /// Number of kick + search rounds.
    pub maximum_generations: usize,
}

impl Default for IlsConfig {
    fn default() -> Self {
        Self {
            maximum_generations: 10,
        }
    }
}

impl IlsConfig {
    pub fn with_maximum_generations(mut self, n: usize) -> Self {
        self.maximum_generations = n;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.maximum_generations == 0 {
            return Err("maximum_generations must be at least 1".into());
        }
        Ok(())
    }

    pub(crate) fn options(&self) -> Options {
        let mut options = Options::new();
        options.insert(
            "maximum_generations".into(),
            Descriptor::fixed(self.maximum_generations),
        );
        options
    }

    pub(crate) fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        match (name, descriptor.fixed_value().and_then(|v| v.as_usize())) {
            ("maximum_generations", Some(n)) => {
                self.maximum_generations = n;
                true
            }
            _ => false,
        }
    }
}
