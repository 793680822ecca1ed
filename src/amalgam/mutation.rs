//! Hyperparameter mutations for pipeline stages.
//!
//! Both operators touch one variable option of the stage's blueprint and
//! leave every other setting as it was.

use super::problem::{AlgorithmBlueprint, ConfiguredAlgorithm};
use crate::core::{Configurable, Descriptor, OptionValue, SolutionGene};
use crate::operators::{GeneMutation, RollbackRandomNGenesMutator};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use tracing::debug;

/// Share of an option's range one offset step moves.
const OFFSET_SHARE: f64 = 0.1;

/// Variable options of the blueprint behind `gene`.
fn variable_options<'a, ST, PT>(
    gene: &'a SolutionGene<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>>,
) -> Vec<(&'a String, &'a Descriptor)> {
    gene.problem_genes()
        .first()
        .map(|pg| {
            pg.gene()
                .options()
                .iter()
                .filter(|(_, d)| d.is_variable())
                .collect()
        })
        .unwrap_or_default()
}

fn apply<ST, PT>(
    gene: &SolutionGene<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>>,
    name: &str,
    value: Option<OptionValue>,
) -> SolutionGene<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>> {
    let mut configured = gene.gene().clone();
    let applied = value.is_some_and(|v| {
        configured
            .algorithm_mut()
            .set_option(name, &Descriptor::Fixed(v))
    });
    if !applied {
        debug!(option = name, "stage mutation rejected");
        return gene.clone();
    }
    gene.with_gene(configured)
}

/// Re-samples one variable option from its blueprint descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmalgamMutation;

impl<ST, PT> GeneMutation<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>>
    for AmalgamMutation
{
    fn create_gene_by_mutation(
        &self,
        gene: &SolutionGene<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>>,
        rng: &mut dyn RngCore,
    ) -> SolutionGene<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>> {
        let options = variable_options(gene);
        let Some((name, descriptor)) = options.choose(rng).copied() else {
            return gene.clone();
        };
        let value = descriptor.sample(rng);
        apply(gene, name, value)
    }
}

/// Moves one ranged option up or down by a tenth of its range (at least
/// one step for integers), clamped to the range. Enumerated options are
/// re-sampled.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmalgamOffsetMutation;

impl AmalgamOffsetMutation {
    fn offset(
        descriptor: &Descriptor,
        current: Option<&OptionValue>,
        rng: &mut dyn RngCore,
    ) -> Option<OptionValue> {
        let up = rng.random_bool(0.5);
        match (descriptor, current) {
            (
                Descriptor::Range {
                    min: OptionValue::Integer(lo),
                    max: OptionValue::Integer(hi),
                },
                Some(OptionValue::Integer(v)),
            ) => {
                let (lo, hi) = ((*lo).min(*hi), (*lo).max(*hi));
                let step = (((hi - lo) as f64 * OFFSET_SHARE).round() as i64).max(1);
                let moved = if up { v + step } else { v - step };
                Some(OptionValue::Integer(moved.clamp(lo, hi)))
            }
            (
                Descriptor::Range {
                    min: OptionValue::Float(lo),
                    max: OptionValue::Float(hi),
                },
                Some(current),
            ) => {
                let (lo, hi) = (lo.min(*hi), lo.max(*hi));
                let step = (hi - lo) * OFFSET_SHARE;
                let v = current.as_f64()?;
                let moved = if up { v + step } else { v - step };
                Some(OptionValue::Float(moved.clamp(lo, hi)))
            }
            (Descriptor::Enumerated(_), _) => descriptor.sample(rng),
            _ => None,
        }
    }
}

impl<ST, PT> GeneMutation<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>>
    for AmalgamOffsetMutation
{
    fn create_gene_by_mutation(
        &self,
        gene: &SolutionGene<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>>,
        rng: &mut dyn RngCore,
    ) -> SolutionGene<ConfiguredAlgorithm<ST, PT>, AlgorithmBlueprint<ST, PT>> {
        let options = variable_options(gene);
        let Some((name, descriptor)) = options.choose(rng).copied() else {
            return gene.clone();
        };
        let current = gene.gene().algorithm().options();
        let value = Self::offset(
            descriptor,
            current.get(name.as_str()).and_then(Descriptor::fixed_value),
            rng,
        );
        apply(gene, name, value)
    }
}

/// Accept-if-better re-sampling of stage options.
pub type AmalgamMutator<ST, PT> = RollbackRandomNGenesMutator<
    ConfiguredAlgorithm<ST, PT>,
    AlgorithmBlueprint<ST, PT>,
    AmalgamMutation,
>;

/// Accept-if-better offsetting of stage options.
pub type AmalgamOffsetMutator<ST, PT> = RollbackRandomNGenesMutator<
    ConfiguredAlgorithm<ST, PT>,
    AlgorithmBlueprint<ST, PT>,
    AmalgamOffsetMutation,
>;
