//! Graph construction and repair.
//!
//! [`GpRepair::repair`] walks the graph from the root and fills every empty
//! or mistyped child slot with a new instance of a type-compatible
//! blueprint (or, sometimes, with an existing node of the graph), then
//! descends into the children. Growth is bounded: from `max_depth` on only
//! terminals (or reused nodes) are placed.

use super::graph::GpGraph;
use super::node::{NodeId, NodeKind, ValueType};
use super::problem::GpProblem;
use crate::core::{Configurable, Descriptor, Options};
use crate::error::{Error, Result};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use std::collections::{BTreeMap, HashSet};

/// Repair policy.
///
/// # Defaults
///
/// ```
/// use u_metaevo::gp::GpRepair;
///
/// let repair = GpRepair::default();
/// assert_eq!(repair.max_depth, 10);
/// assert_eq!(repair.min_depth, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpRepair {
    /// From this depth on the graph stops growing.
    pub max_depth: usize,
    /// Below this depth only functional blueprints are tried.
    pub min_depth: usize,
    /// Probability that a new node memoizes its value.
    pub cached_node_probability: f64,
    /// Probability of reusing an existing node instead of creating one.
    pub reuse_node_probability: f64,
}

impl Default for GpRepair {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_depth: 1,
            cached_node_probability: 0.2,
            reuse_node_probability: 0.2,
        }
    }
}

struct RepairState {
    existing: BTreeMap<ValueType, Vec<NodeId>>,
    visited: HashSet<NodeId>,
}

impl GpRepair {
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    pub fn with_min_depth(mut self, depth: usize) -> Self {
        self.min_depth = depth;
        self
    }

    pub fn with_cached_node_probability(mut self, p: f64) -> Self {
        self.cached_node_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_reuse_node_probability(mut self, p: f64) -> Self {
        self.reuse_node_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Repairs the whole graph in place.
    ///
    /// # Errors
    ///
    /// [`Error::Construction`] when a slot needs a type that no blueprint
    /// produces, or when a slot at the depth limit can be closed neither by
    /// a terminal nor by reusing a node.
    pub fn repair<ST, PT>(
        &self,
        graph: &mut GpGraph<ST, PT>,
        problem: &GpProblem,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let mut state = RepairState {
            existing: graph.nodes_by_type(),
            visited: HashSet::new(),
        };
        self.repair_node(graph, graph.root(), 0, problem, &mut state, rng)
    }

    fn repair_node<ST, PT>(
        &self,
        graph: &mut GpGraph<ST, PT>,
        id: NodeId,
        depth: usize,
        problem: &GpProblem,
        state: &mut RepairState,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        if !graph.is_node_valid(id) {
            let required = graph.kind(id).child_types();
            for (slot, ty) in required.iter().enumerate() {
                let fits = graph
                    .children(id)
                    .get(slot)
                    .is_some_and(|c| graph.kind(*c).produces() == *ty);
                if !fits {
                    let child = self.pick_node(graph, id, depth, *ty, problem, state, rng)?;
                    graph.node_mut(id).children.insert(slot, child);
                }
            }
            // anything past the required slots was displaced by insertion
            graph.node_mut(id).children.truncate(required.len());
        }

        let children = graph.children(id).to_vec();
        for child in children {
            if state.visited.insert(child) {
                self.repair_node(graph, child, depth + 1, problem, state, rng)?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn pick_node<ST, PT>(
        &self,
        graph: &mut GpGraph<ST, PT>,
        parent: NodeId,
        depth: usize,
        ty: ValueType,
        problem: &GpProblem,
        state: &mut RepairState,
        rng: &mut dyn RngCore,
    ) -> Result<NodeId> {
        let at_limit = depth >= self.max_depth;
        let candidates = if at_limit {
            problem.terminals(ty)
        } else if depth < self.min_depth {
            problem.functionals(ty)
        } else if rng.random_range(0..self.max_depth.max(1)) < depth {
            problem.terminals(ty)
        } else {
            &[]
        };
        if let Some(blueprint) = candidates.choose(rng) {
            return Ok(self.instantiate(graph, blueprint, problem, state, rng));
        }

        if at_limit {
            return self.reuse(graph, parent, ty, true, state, rng).ok_or_else(|| {
                Error::construction(
                    "graph node",
                    format!("no terminal blueprint closes a {ty:?} slot at depth {depth}"),
                )
            });
        }
        if rng.random::<f64>() <= self.reuse_node_probability {
            if let Some(reused) = self.reuse(graph, parent, ty, false, state, rng) {
                return Ok(reused);
            }
        }

        let blueprint = problem.valid(ty).choose(rng).ok_or_else(|| {
            Error::construction("graph node", format!("no blueprint produces {ty:?}"))
        })?;
        Ok(self.instantiate(graph, blueprint, problem, state, rng))
    }

    /// An existing node of type `ty` that `parent` can point to without
    /// closing a cycle. When `closing`, only terminals and nodes already
    /// placed at a shallower depth qualify, so the graph does not grow.
    fn reuse<ST, PT>(
        &self,
        graph: &GpGraph<ST, PT>,
        parent: NodeId,
        ty: ValueType,
        closing: bool,
        state: &RepairState,
        rng: &mut dyn RngCore,
    ) -> Option<NodeId> {
        let eligible: Vec<NodeId> = state
            .existing
            .get(&ty)?
            .iter()
            .copied()
            .filter(|&c| !closing || graph.kind(c).is_terminal() || state.visited.contains(&c))
            .filter(|&c| !graph.reaches(c, parent))
            .collect();
        eligible.choose(rng).copied()
    }

    fn instantiate<ST, PT>(
        &self,
        graph: &mut GpGraph<ST, PT>,
        blueprint: &NodeKind,
        problem: &GpProblem,
        state: &mut RepairState,
        rng: &mut dyn RngCore,
    ) -> NodeId {
        let id = graph.add_node(blueprint.clone());
        if let Some(settings) = problem.settings(blueprint.name()) {
            apply_settings(graph.node_mut(id), settings, rng);
        }
        if rng.random::<f64>() <= self.cached_node_probability {
            graph.node_mut(id).set_cached(true);
        }
        state
            .existing
            .entry(graph.kind(id).produces())
            .or_default()
            .push(id);
        id
    }
}

/// Samples every descriptor and applies the result; rejected options are
/// logged and skipped.
pub(crate) fn apply_settings(
    target: &mut dyn Configurable,
    settings: &Options,
    rng: &mut dyn RngCore,
) {
    for (name, descriptor) in settings {
        let applied = descriptor
            .sample(rng)
            .is_some_and(|value| target.set_option(name, &Descriptor::Fixed(value)));
        if !applied {
            tracing::debug!(option = %name, "node setting rejected");
        }
    }
}
