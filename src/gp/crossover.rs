//! Structural crossover between two graphs.

use super::graph::GpGraph;
use super::node::ValueType;
use super::problem::GpProblem;
use super::validate::GpValidator;
use crate::core::Solution;
use crate::error::{Error, Result};
use crate::operators::Crossover;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore};
use tracing::debug;

/// Replaces a random node of parent A, in every parent slot that points to
/// it, with a copy of a same-typed random node of parent B.
///
/// The value type is the first of A's types, in shuffled order, that B also
/// has. When the parents share no type, one of them has only the root, or
/// the spliced graph fails validation, a uniformly chosen parent comes back
/// unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpCrossover;

impl GpCrossover {
    fn splice<ST, PT>(
        a: &GpGraph<ST, PT>,
        b: &GpGraph<ST, PT>,
        rng: &mut dyn RngCore,
    ) -> Result<GpGraph<ST, PT>> {
        let mut child = a.clone();
        let in_a = child.nodes_by_type();
        let in_b = b.nodes_by_type();

        let mut types: Vec<ValueType> = in_a.keys().copied().collect();
        types.shuffle(rng);
        let shared = types
            .into_iter()
            .find(|ty| in_b.contains_key(ty))
            .ok_or_else(|| Error::InvalidGraph("parents share no value type".into()))?;

        let (Some(&target), Some(&donor)) = (in_a[&shared].choose(rng), in_b[&shared].choose(rng))
        else {
            return Err(Error::InvalidGraph("no node of the shared type".into()));
        };
        let copied = child.import_subgraph(b, donor);
        child.replace_child_references(target, copied);
        child.compact();
        child.reset_caches();
        GpValidator::check(&child)?;
        Ok(child)
    }
}

impl<ST, PT> Crossover<GpGraph<ST, PT>, GpProblem> for GpCrossover {
    fn breed_two(
        &self,
        a: &Solution<GpGraph<ST, PT>, GpProblem>,
        b: &Solution<GpGraph<ST, PT>, GpProblem>,
        rng: &mut dyn RngCore,
    ) -> Option<Solution<GpGraph<ST, PT>, GpProblem>> {
        let (Some(gene_a), Some(gene_b)) = (a.genes().first(), b.genes().first()) else {
            return match (a.is_empty(), b.is_empty()) {
                (true, true) => None,
                (true, false) => Some(b.clone()),
                _ => Some(a.clone()),
            };
        };
        match Self::splice(gene_a.gene(), gene_b.gene(), rng) {
            Ok(graph) => Some(Solution::from_genes([gene_a.with_gene(graph)])),
            Err(error) => {
                debug!(%error, "graph crossover fell back to a parent");
                Some(if rng.random_bool(0.5) {
                    a.clone()
                } else {
                    b.clone()
                })
            }
        }
    }

    fn name(&self) -> &str {
        "GpCrossover"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Problem, SolutionGene};
    use crate::gp::node::NodeKind;
    use crate::gp::problem::default_problem;
    use crate::gp::repair::GpRepair;
    use crate::operators::TournamentSelector;
    use std::sync::Arc;
    use u_numflow::random::create_rng;

    type Graph = GpGraph<(), ()>;
    type GpSolution = Solution<Graph, GpProblem>;

    fn wrap(graph: Graph, problem: &Problem<GpProblem>) -> GpSolution {
        Solution::from_genes([SolutionGene::derived(graph, &problem.genes()[0])])
    }

    /// root -> CreateSolution: only the solution type.
    fn creator_only() -> Graph {
        let mut g = Graph::new();
        let c = g.add_node(NodeKind::CreateSolution);
        g.push_child(g.root(), c);
        g
    }

    /// root -> Mutate[CreateSolution]
    fn mutate_chain() -> Graph {
        let mut g = Graph::new();
        let m = g.add_node(NodeKind::Mutate);
        let c = g.add_node(NodeKind::CreateSolution);
        g.push_child(g.root(), m);
        g.push_child(m, c);
        g
    }

    #[test]
    fn test_no_shared_type_always_returns_a_parent() {
        let problem = Problem::new([default_problem()]);
        let a = wrap(creator_only(), &problem);
        // a graph whose non-root nodes are all numbers
        let mut g = Graph::new();
        let n = g.add_node(NodeKind::Number(1.0));
        g.push_child(g.root(), n);
        let b = wrap(g, &problem);

        let mut rng = create_rng(9);
        for _ in 0..200 {
            let child = GpCrossover.breed_two(&a, &b, &mut rng).unwrap();
            assert!(child.shares_genes_with(&a) || child.shares_genes_with(&b));
        }
    }

    #[test]
    fn test_root_only_parent_falls_back() {
        let problem = Problem::new([default_problem()]);
        let a = wrap(Graph::new(), &problem);
        let b = wrap(mutate_chain(), &problem);
        let mut rng = create_rng(1);
        let child = GpCrossover.breed_two(&a, &b, &mut rng).unwrap();
        assert!(child.shares_genes_with(&a) || child.shares_genes_with(&b));
    }

    #[test]
    fn test_splice_keeps_parents_and_problem_genes() {
        let problem = Problem::new([default_problem()]);
        let a = wrap(creator_only(), &problem);
        let b = wrap(mutate_chain(), &problem);
        let mut rng = create_rng(4);
        let mut grew = false;
        for _ in 0..50 {
            let child = GpCrossover.breed_two(&a, &b, &mut rng).unwrap();
            let gene = &child.genes()[0];
            assert!(GpValidator::validate(gene.gene()));
            if !child.shares_genes_with(&a) && !child.shares_genes_with(&b) {
                assert!(Arc::ptr_eq(&gene.problem_genes()[0], &problem.genes()[0]));
                grew |= gene.gene().len() == 3;
            }
        }
        assert!(grew, "the mutate chain was never spliced into A");
        assert_eq!(a.genes()[0].gene().len(), 2);
        assert_eq!(b.genes()[0].gene().len(), 3);
    }

    #[test]
    fn test_breed_on_repaired_population() {
        let problem = Problem::new([default_problem()]);
        let repair = GpRepair::default().with_max_depth(4);
        let mut rng = create_rng(21);
        let population: Vec<GpSolution> = (0..6)
            .map(|_| {
                let mut g = Graph::new();
                repair.repair(&mut g, problem.genes()[0].gene(), &mut rng).unwrap();
                wrap(g, &problem)
            })
            .collect();
        let selector = TournamentSelector::default();
        for _ in 0..30 {
            let child = GpCrossover.breed(&population, &selector, &mut rng).unwrap();
            assert!(GpValidator::validate(child.genes()[0].gene()));
        }
    }
}
