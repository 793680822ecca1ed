//! Structural validation of GP graphs.

use super::graph::GpGraph;
use super::node::NodeKind;
use crate::error::{Error, Result};

/// Checks arity, slot types and acyclicity.
pub struct GpValidator;

impl GpValidator {
    /// Full check: the root is the only `Result` node, no cycle is
    /// reachable, and every reachable node has exactly the child slots its
    /// kind requires, each of the required type.
    pub fn check<ST, PT>(graph: &GpGraph<ST, PT>) -> Result<()> {
        if graph.kind(graph.root()) != &NodeKind::Result {
            return Err(Error::InvalidGraph("root is not a result node".into()));
        }
        Self::check_loops(graph)?;
        for id in graph.reachable() {
            let kind = graph.kind(id);
            if id != graph.root() && kind == &NodeKind::Result {
                return Err(Error::InvalidGraph(format!(
                    "node {} is a second result node",
                    id.index()
                )));
            }
            if !graph.is_node_valid(id) {
                return Err(Error::InvalidGraph(format!(
                    "node {} ({}) expects children {:?}",
                    id.index(),
                    kind.name(),
                    kind.child_types()
                )));
            }
        }
        Ok(())
    }

    /// Loop check only.
    pub fn check_loops<ST, PT>(graph: &GpGraph<ST, PT>) -> Result<()> {
        if graph.has_cycle() {
            return Err(Error::InvalidGraph("graph contains a cycle".into()));
        }
        Ok(())
    }

    pub fn validate<ST, PT>(graph: &GpGraph<ST, PT>) -> bool {
        Self::check(graph).is_ok()
    }

    pub fn validate_loops_only<ST, PT>(graph: &GpGraph<ST, PT>) -> bool {
        !graph.has_cycle()
    }
}
