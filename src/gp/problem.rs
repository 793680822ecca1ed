//! GP search space.

use super::node::{NodeKind, ValueType};
use crate::core::Options;
use std::collections::BTreeMap;

/// Blueprints indexed by produced type, split into terminal and functional
/// subsets, plus per-blueprint settings.
///
/// Settings are keyed by [`NodeKind::name`] and applied to every new
/// instance of that blueprint; range and list descriptors are sampled per
/// instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpProblem {
    valid: BTreeMap<ValueType, Vec<NodeKind>>,
    terminals: BTreeMap<ValueType, Vec<NodeKind>>,
    functionals: BTreeMap<ValueType, Vec<NodeKind>>,
    settings: BTreeMap<String, Options>,
}

impl GpProblem {
    /// Indexes the blueprints; [`NodeKind::Result`] is never a blueprint and
    /// is skipped.
    pub fn new(blueprints: impl IntoIterator<Item = NodeKind>) -> Self {
        let mut problem = Self::default();
        for kind in blueprints {
            if kind == NodeKind::Result {
                continue;
            }
            let ty = kind.produces();
            let subset = if kind.is_terminal() {
                &mut problem.terminals
            } else {
                &mut problem.functionals
            };
            subset.entry(ty).or_default().push(kind.clone());
            problem.valid.entry(ty).or_default().push(kind);
        }
        problem
    }

    /// Lets extra blueprints close a graph, e.g. a functional that does not
    /// grow it further.
    pub fn with_extra_terminals(mut self, extra: impl IntoIterator<Item = NodeKind>) -> Self {
        for kind in extra {
            self.terminals.entry(kind.produces()).or_default().push(kind);
        }
        self
    }

    pub fn with_settings(mut self, blueprint: &str, options: Options) -> Self {
        self.settings.insert(blueprint.to_string(), options);
        self
    }

    pub fn valid(&self, ty: ValueType) -> &[NodeKind] {
        self.valid.get(&ty).map_or(&[], Vec::as_slice)
    }

    pub fn terminals(&self, ty: ValueType) -> &[NodeKind] {
        self.terminals.get(&ty).map_or(&[], Vec::as_slice)
    }

    pub fn functionals(&self, ty: ValueType) -> &[NodeKind] {
        self.functionals.get(&ty).map_or(&[], Vec::as_slice)
    }

    pub fn settings(&self, blueprint: &str) -> Option<&Options> {
        self.settings.get(blueprint)
    }

    /// Types at least one blueprint produces.
    pub fn value_types(&self) -> impl Iterator<Item = ValueType> + '_ {
        self.valid.keys().copied()
    }
}

/// A small arithmetic and heuristic library producing solutions.
pub fn default_blueprints() -> Vec<NodeKind> {
    vec![
        NodeKind::Number(1.0),
        NodeKind::Boolean(true),
        NodeKind::CreateSolution,
        NodeKind::Add,
        NodeKind::Subtract,
        NodeKind::Multiply,
        NodeKind::Divide,
        NodeKind::LessThan,
        NodeKind::And,
        NodeKind::Or,
        NodeKind::Not,
        NodeKind::IfThenElse(ValueType::Solution),
        NodeKind::repeat(),
        NodeKind::Merge,
        NodeKind::Elite,
        NodeKind::BestOf,
        NodeKind::Mutate,
        NodeKind::Crossover,
    ]
}

/// [`default_blueprints`] with `Repeat` also closing solution-list slots,
/// which have no terminal of their own.
pub fn default_problem() -> GpProblem {
    GpProblem::new(default_blueprints()).with_extra_terminals([NodeKind::repeat()])
}
