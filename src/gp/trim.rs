//! Dead-branch trimming and solution counting.
//!
//! Trimming folds pure arithmetic and boolean nodes whose operands are
//! uncached constants, and collapses an `IfThenElse` whose condition is an
//! uncached constant into the branch it would take. Cached operands are
//! never folded.

use super::exec::iteration_count;
use super::graph::GpGraph;
use super::node::{NodeId, NodeKind};

pub struct GpTrim;

impl GpTrim {
    /// A trimmed and compacted copy; the input graph is untouched.
    pub fn trim<ST, PT>(graph: &GpGraph<ST, PT>) -> GpGraph<ST, PT> {
        let mut trimmed = graph.clone();
        // children before parents, so folds cascade upwards
        for id in trimmed.post_order() {
            if id == trimmed.root() {
                continue;
            }
            if let Some(folded) = Self::fold(&trimmed, id) {
                let node = trimmed.node_mut(id);
                *node.kind_mut() = folded;
                node.children.clear();
                node.set_cached(false);
            } else if let Some(branch) = Self::decided_branch(&trimmed, id) {
                trimmed.replace_child_references(id, branch);
            }
        }
        trimmed.compact();
        trimmed
    }

    /// Upper estimate of how many solutions one run of the graph creates.
    ///
    /// `CreateSolution`, `Mutate` and `Crossover` count one each. Loop
    /// bodies are multiplied by their iteration count: the constant count of
    /// `For`/`Repeat` when there is one, `max_iterations` otherwise. A cached
    /// node is counted once however many parents it has; an uncached node is
    /// counted once per incoming edge.
    pub fn solutions_created<ST, PT>(graph: &GpGraph<ST, PT>) -> f64 {
        let mut counter = SolutionCounter {
            graph,
            counted: vec![false; graph.len()],
            active: vec![false; graph.len()],
            memo: vec![None; graph.len()],
        };
        counter.count(graph.root()).0
    }

    fn constant<ST, PT>(graph: &GpGraph<ST, PT>, id: NodeId) -> Option<&NodeKind> {
        let node = graph.node(id);
        match node.kind() {
            NodeKind::Number(_) | NodeKind::Integer(_) | NodeKind::Boolean(_)
                if !node.is_cached() =>
            {
                Some(node.kind())
            }
            _ => None,
        }
    }

    fn fold<ST, PT>(graph: &GpGraph<ST, PT>, id: NodeId) -> Option<NodeKind> {
        let kind = graph.kind(id);
        let children = graph.children(id);
        if *kind == NodeKind::Not {
            return match Self::constant(graph, *children.first()?)? {
                NodeKind::Boolean(b) => Some(NodeKind::Boolean(!b)),
                _ => None,
            };
        }
        if children.len() != 2 {
            return None;
        }
        let a = Self::constant(graph, children[0])?;
        let b = Self::constant(graph, children[1])?;
        if let (Some(a), Some(b)) = (a.constant_number(), b.constant_number()) {
            return kind
                .arithmetic(a, b)
                .map(NodeKind::Number)
                .or_else(|| kind.comparison(a, b).map(NodeKind::Boolean));
        }
        match (a, b) {
            (NodeKind::Boolean(a), NodeKind::Boolean(b)) => {
                kind.logic(*a, *b).map(NodeKind::Boolean)
            }
            _ => None,
        }
    }

    fn decided_branch<ST, PT>(graph: &GpGraph<ST, PT>, id: NodeId) -> Option<NodeId> {
        if !matches!(graph.kind(id), NodeKind::IfThenElse(_)) {
            return None;
        }
        let children = graph.children(id);
        if children.len() != 3 {
            return None;
        }
        match Self::constant(graph, children[0])? {
            NodeKind::Boolean(true) => Some(children[1]),
            NodeKind::Boolean(false) => Some(children[2]),
            _ => None,
        }
    }
}

/// Walk state for [`GpTrim::solutions_created`]. Totals saturate at
/// `f64::MAX`.
struct SolutionCounter<'g, ST, PT> {
    graph: &'g GpGraph<ST, PT>,
    counted: Vec<bool>,
    active: Vec<bool>,
    /// Totals of subtrees without cached nodes or cut cycles; those are the
    /// same on every visit.
    memo: Vec<Option<f64>>,
}

impl<ST, PT> SolutionCounter<'_, ST, PT> {
    /// Total below `id`, and whether a later visit would see the same total.
    fn count(&mut self, id: NodeId) -> (f64, bool) {
        let i = id.index();
        if let Some(total) = self.memo[i] {
            return (total, true);
        }
        let graph = self.graph;
        let node = graph.node(id);
        if self.active[i] || (node.is_cached() && self.counted[i]) {
            return (0.0, false);
        }
        self.counted[i] = true;
        self.active[i] = true;

        let mut stable = !node.is_cached();
        let mut per_child = Vec::with_capacity(node.children().len());
        for &c in node.children() {
            let (total, child_stable) = self.count(c);
            stable &= child_stable;
            per_child.push(total);
        }
        let slot = |i: usize| per_child.get(i).copied().unwrap_or(0.0);
        let total = match node.kind() {
            NodeKind::CreateSolution => 1.0,
            NodeKind::Mutate | NodeKind::Crossover => 1.0 + slot(0),
            NodeKind::For { max_iterations, .. } | NodeKind::Repeat { max_iterations } => {
                let iterations = match node
                    .children()
                    .first()
                    .and_then(|&c| graph.kind(c).constant_number())
                {
                    Some(n) => iteration_count(n, *max_iterations),
                    None => *max_iterations,
                };
                slot(0) + iterations as f64 * slot(1)
            }
            NodeKind::While { max_iterations, .. } => {
                *max_iterations as f64 * (slot(0) + slot(1))
            }
            _ => per_child.iter().sum(),
        };
        let total = total.min(f64::MAX);

        self.active[i] = false;
        if stable {
            self.memo[i] = Some(total);
        }
        (total, stable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::node::ValueType;
    use crate::gp::validate::GpValidator;

    type Graph = GpGraph<(), ()>;

    /// root -> For[Add(2, 3), CreateSolution]
    fn constant_loop() -> Graph {
        let mut g = Graph::new();
        let for_node = g.add_node(NodeKind::for_loop(ValueType::Solution));
        let add = g.add_node(NodeKind::Add);
        let a = g.add_node(NodeKind::Number(2.0));
        let b = g.add_node(NodeKind::Number(3.0));
        let create = g.add_node(NodeKind::CreateSolution);
        g.push_child(g.root(), for_node);
        g.push_child(for_node, add);
        g.push_child(for_node, create);
        g.push_child(add, a);
        g.push_child(add, b);
        g
    }

    #[test]
    fn test_arithmetic_folds_into_constant() {
        let g = constant_loop();
        let trimmed = GpTrim::trim(&g);
        assert!(GpValidator::validate(&trimmed));
        assert_eq!(trimmed.len(), 4);
        let for_node = trimmed.children(trimmed.root())[0];
        let count = trimmed.children(for_node)[0];
        assert_eq!(trimmed.kind(count), &NodeKind::Number(5.0));
        // input untouched
        assert_eq!(g.len(), 6);
    }

    #[test]
    fn test_integer_constants_fold_and_count() {
        let mut g = constant_loop();
        let for_node = g.children(g.root())[0];
        let add = g.children(for_node)[0];
        let a = g.children(add)[0];
        *g.node_mut(a).kind_mut() = NodeKind::Integer(2);
        let trimmed = GpTrim::trim(&g);
        let count = trimmed.children(trimmed.children(trimmed.root())[0])[0];
        assert_eq!(trimmed.kind(count), &NodeKind::Number(5.0));

        let mut g = Graph::new();
        let repeat = g.add_node(NodeKind::repeat());
        let three = g.add_node(NodeKind::Integer(3));
        let create = g.add_node(NodeKind::CreateSolution);
        g.push_child(g.root(), repeat);
        g.push_child(repeat, three);
        g.push_child(repeat, create);
        assert_eq!(GpTrim::solutions_created(&g), 3.0);
    }

    #[test]
    fn test_cached_operand_blocks_folding() {
        let mut g = constant_loop();
        let for_node = g.children(g.root())[0];
        let add = g.children(for_node)[0];
        let a = g.children(add)[0];
        g.node_mut(a).set_cached(true);
        let trimmed = GpTrim::trim(&g);
        assert_eq!(trimmed.len(), g.len());
    }

    #[test]
    fn test_folds_cascade_through_boolean_logic() {
        // root -> IfThenElse[And(true, 1 < 2), CreateSolution, Mutate[CreateSolution]]
        let mut g = Graph::new();
        let ite = g.add_node(NodeKind::IfThenElse(ValueType::Solution));
        let and = g.add_node(NodeKind::And);
        let t = g.add_node(NodeKind::Boolean(true));
        let lt = g.add_node(NodeKind::LessThan);
        let one = g.add_node(NodeKind::Number(1.0));
        let two = g.add_node(NodeKind::Number(2.0));
        let create = g.add_node(NodeKind::CreateSolution);
        let mutate = g.add_node(NodeKind::Mutate);
        let inner = g.add_node(NodeKind::CreateSolution);
        g.push_child(g.root(), ite);
        for (parent, child) in [
            (ite, and),
            (ite, create),
            (ite, mutate),
            (and, t),
            (and, lt),
            (lt, one),
            (lt, two),
            (mutate, inner),
        ] {
            g.push_child(parent, child);
        }
        assert_eq!(GpTrim::solutions_created(&g), 3.0);

        let trimmed = GpTrim::trim(&g);
        assert!(GpValidator::validate(&trimmed));
        assert_eq!(trimmed.len(), 2);
        assert_eq!(
            trimmed.kind(trimmed.children(trimmed.root())[0]),
            &NodeKind::CreateSolution
        );
        assert_eq!(GpTrim::solutions_created(&trimmed), 1.0);
    }

    #[test]
    fn test_loop_counts() {
        // an unfolded count falls back to the iteration cap
        assert_eq!(GpTrim::solutions_created(&constant_loop()), 10_000.0);
        assert_eq!(
            GpTrim::solutions_created(&GpTrim::trim(&constant_loop())),
            5.0
        );

        let mut g = Graph::new();
        let w = g.add_node(NodeKind::While {
            of: ValueType::Solution,
            max_iterations: 10,
        });
        let cond = g.add_node(NodeKind::Boolean(true));
        let create = g.add_node(NodeKind::CreateSolution);
        g.push_child(g.root(), w);
        g.push_child(w, cond);
        g.push_child(w, create);
        assert_eq!(GpTrim::solutions_created(&g), 10.0);
    }

    #[test]
    fn test_cached_creator_counts_once() {
        // root -> BestOf[Merge[Repeat(3, c), Repeat(2, c)]]
        let build = |cached: bool| {
            let mut g = Graph::new();
            let best = g.add_node(NodeKind::BestOf);
            let merge = g.add_node(NodeKind::Merge);
            let r1 = g.add_node(NodeKind::repeat());
            let r2 = g.add_node(NodeKind::repeat());
            let three = g.add_node(NodeKind::Number(3.0));
            let two = g.add_node(NodeKind::Number(2.0));
            let c = g.add_node(NodeKind::CreateSolution);
            g.node_mut(c).set_cached(cached);
            g.push_child(g.root(), best);
            for (parent, child) in [
                (best, merge),
                (merge, r1),
                (merge, r2),
                (r1, three),
                (r1, c),
                (r2, two),
                (r2, c),
            ] {
                g.push_child(parent, child);
            }
            g
        };
        assert_eq!(GpTrim::solutions_created(&build(false)), 5.0);
        assert_eq!(GpTrim::solutions_created(&build(true)), 3.0);
    }

    /// root -> L0, Lk -> Merge[Lk+1, Lk+1], last layer -> CreateSolution
    fn doubling_layers(depth: usize) -> Graph {
        let mut g = Graph::new();
        let mut below = g.add_node(NodeKind::CreateSolution);
        for _ in 0..depth {
            let layer = g.add_node(NodeKind::Merge);
            g.push_child(layer, below);
            g.push_child(layer, below);
            below = layer;
        }
        g.push_child(g.root(), below);
        g
    }

    #[test]
    fn test_shared_subtrees_count_per_edge() {
        assert_eq!(GpTrim::solutions_created(&doubling_layers(3)), 8.0);
        assert_eq!(
            GpTrim::solutions_created(&doubling_layers(60)),
            2f64.powi(60)
        );
    }

    #[test]
    fn test_count_saturates() {
        let total = GpTrim::solutions_created(&doubling_layers(1100));
        assert_eq!(total, f64::MAX);
    }
}
