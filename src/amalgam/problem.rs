//! Algorithm selection as a search space.
//!
//! Each problem gene is one pipeline stage: a template algorithm plus the
//! options to vary on it. The matching solution gene is a freshly
//! instantiated, fully configured copy of the template, so a solution reads
//! as an ordered pipeline.

use crate::core::{
    Algorithm, Configurable, Descriptor, GeneCreator, Options, Problem, ProblemGene, Solution,
};
use crate::error::{Error, Result};
use rand::RngCore;
use std::fmt;

/// Stage template and the option descriptors sampled per instance.
pub struct AlgorithmBlueprint<ST, PT> {
    template: Box<dyn Algorithm<ST, PT>>,
    options: Options,
}

impl<ST, PT> Clone for AlgorithmBlueprint<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            template: self.template.boxed_clone(),
            options: self.options.clone(),
        }
    }
}

impl<ST, PT> AlgorithmBlueprint<ST, PT> {
    pub fn new(template: Box<dyn Algorithm<ST, PT>>) -> Self {
        Self {
            template,
            options: Options::new(),
        }
    }

    pub fn with_option(mut self, name: &str, descriptor: Descriptor) -> Self {
        self.options.insert(name.to_string(), descriptor);
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options.extend(options);
        self
    }

    pub fn template(&self) -> &dyn Algorithm<ST, PT> {
        self.template.as_ref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Clones the template without analytics and applies one sampled value
    /// per option.
    ///
    /// # Errors
    ///
    /// [`Error::Construction`] when a descriptor cannot be sampled or the
    /// template rejects the sampled value.
    pub fn instantiate(&self, rng: &mut dyn RngCore) -> Result<ConfiguredAlgorithm<ST, PT>> {
        let mut algorithm = self.template.boxed_clone();
        algorithm.set_analytics(None);
        for (name, descriptor) in &self.options {
            let value = descriptor.sample(rng).ok_or_else(|| {
                Error::construction(
                    "algorithm option",
                    format!("{name}: descriptor {descriptor:?} yields no value"),
                )
            })?;
            if !algorithm.set_option(name, &Descriptor::Fixed(value)) {
                return Err(Error::construction(
                    "algorithm option",
                    format!("{} rejects option {name}", algorithm.name()),
                ));
            }
        }
        Ok(ConfiguredAlgorithm(algorithm))
    }
}

impl<ST, PT> fmt::Debug for AlgorithmBlueprint<ST, PT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmBlueprint")
            .field("template", &self.template.name())
            .field("options", &self.options)
            .finish()
    }
}

/// One configured pipeline stage.
pub struct ConfiguredAlgorithm<ST, PT>(Box<dyn Algorithm<ST, PT>>);

impl<ST, PT> Clone for ConfiguredAlgorithm<ST, PT> {
    fn clone(&self) -> Self {
        Self(self.0.boxed_clone())
    }
}

impl<ST, PT> ConfiguredAlgorithm<ST, PT> {
    pub fn new(algorithm: Box<dyn Algorithm<ST, PT>>) -> Self {
        Self(algorithm)
    }

    pub fn algorithm(&self) -> &dyn Algorithm<ST, PT> {
        self.0.as_ref()
    }

    pub fn algorithm_mut(&mut self) -> &mut dyn Algorithm<ST, PT> {
        self.0.as_mut()
    }

    pub fn into_inner(self) -> Box<dyn Algorithm<ST, PT>> {
        self.0
    }
}

impl<ST, PT> fmt::Debug for ConfiguredAlgorithm<ST, PT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredAlgorithm")
            .field("name", &self.0.name())
            .field("options", &self.0.options())
            .finish()
    }
}

/// One blueprint per stage, in pipeline order.
pub type AmalgamProblem<ST, PT> = Problem<AlgorithmBlueprint<ST, PT>>;

/// A configured pipeline.
pub type AmalgamSolution<ST, PT> =
    Solution<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>>;

/// Instantiates one stage per blueprint.
///
/// Pair with [`OneToOneSolutionCreator`](crate::core::OneToOneSolutionCreator)
/// to create whole pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmalgamGeneCreator;

impl<ST, PT> GeneCreator<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>>
    for AmalgamGeneCreator
{
    fn create_gene(
        &self,
        problem_gene: &ProblemGene<AlgorithmBlueprint<ST, PT>>,
        rng: &mut dyn RngCore,
    ) -> Result<ConfiguredAlgorithm<ST, PT>> {
        problem_gene.gene().instantiate(rng)
    }
}
