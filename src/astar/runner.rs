//! A* as a solution creator and as an algorithm.

use super::graph::WeightedGraph;
use super::search::{ascending, find_path, SumWeights, WeightCalculator, WeightComparator};
use crate::core::{
    Algorithm, AlgorithmBase, Analytics, CachetEvaluator, Configurable, Evaluator, GeneCreator,
    OneToOneSolutionCreator, Problem, ProblemGene, Solution, UNEVALUABLE_QUALITY,
};
use crate::error::Result;
use rand::RngCore;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, info};

/// One path request: a graph, a start node and a goal predicate.
pub struct ShortestPathQuery<N: Eq + Hash> {
    graph: Arc<WeightedGraph<N>>,
    from: N,
    goal: Arc<dyn Fn(&N) -> bool>,
}

impl<N: Clone + Eq + Hash> Clone for ShortestPathQuery<N> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            from: self.from.clone(),
            goal: Arc::clone(&self.goal),
        }
    }
}

impl<N: Clone + Eq + Hash> ShortestPathQuery<N> {
    pub fn new(graph: Arc<WeightedGraph<N>>, from: N, goal: impl Fn(&N) -> bool + 'static) -> Self {
        Self {
            graph,
            from,
            goal: Arc::new(goal),
        }
    }

    /// Query for one specific goal node.
    pub fn to_node(graph: Arc<WeightedGraph<N>>, from: N, to: N) -> Self
    where
        N: 'static,
    {
        Self::new(graph, from, move |n| *n == to)
    }

    pub fn graph(&self) -> &WeightedGraph<N> {
        &self.graph
    }

    pub fn from(&self) -> &N {
        &self.from
    }

    pub fn is_goal(&self, node: &N) -> bool {
        (self.goal)(node)
    }
}

impl<N: fmt::Debug + Clone + Eq + Hash> fmt::Debug for ShortestPathQuery<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortestPathQuery")
            .field("nodes", &self.graph.len())
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

/// Creates the path gene of one query.
pub struct AStarGeneCreator<N: Eq + Hash> {
    comparator: WeightComparator,
    calculator: Arc<dyn WeightCalculator<N>>,
}

impl<N: Eq + Hash> Clone for AStarGeneCreator<N> {
    fn clone(&self) -> Self {
        Self {
            comparator: Arc::clone(&self.comparator),
            calculator: Arc::clone(&self.calculator),
        }
    }
}

impl<N: Eq + Hash + 'static> Default for AStarGeneCreator<N> {
    fn default() -> Self {
        Self {
            comparator: ascending(),
            calculator: Arc::new(SumWeights),
        }
    }
}

impl<N: Eq + Hash + 'static> AStarGeneCreator<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comparator(
        mut self,
        comparator: impl Fn(f64, f64) -> std::cmp::Ordering + 'static,
    ) -> Self {
        self.comparator = Arc::new(comparator);
        self
    }

    pub fn with_weight_calculator(
        mut self,
        calculator: impl WeightCalculator<N> + 'static,
    ) -> Self {
        self.calculator = Arc::new(calculator);
        self
    }
}

impl<N: Clone + Eq + Hash> GeneCreator<Vec<N>, ShortestPathQuery<N>> for AStarGeneCreator<N> {
    /// Never fails; an unreachable goal yields an empty path.
    fn create_gene(
        &self,
        problem_gene: &ProblemGene<ShortestPathQuery<N>>,
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<N>> {
        let query = problem_gene.gene();
        Ok(find_path(
            query.graph(),
            query.from(),
            &|n: &N| query.is_goal(n),
            self.comparator.as_ref(),
            self.calculator.as_ref(),
        ))
    }
}

/// Summed edge weights of every path; an empty or broken path scores the
/// sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathWeightCachet;

impl<N: Clone + Eq + Hash> CachetEvaluator<Vec<N>, ShortestPathQuery<N>> for PathWeightCachet {
    fn name(&self) -> &str {
        "PathWeightCachet"
    }

    fn quality(&self, solution: &Solution<Vec<N>, ShortestPathQuery<N>>) -> f64 {
        solution
            .genes()
            .iter()
            .map(|g| {
                let weight = g
                    .problem_genes()
                    .first()
                    .and_then(|q| q.gene().graph().path_weight(g.gene()));
                match weight {
                    Some(w) if !g.gene().is_empty() => w,
                    _ => UNEVALUABLE_QUALITY,
                }
            })
            .sum()
    }
}

/// Solves every query of the problem with one A* search each.
///
/// There is nothing to iterate: a warm start is ignored and the paths are
/// recomputed. The default evaluator scores with [`PathWeightCachet`].
pub struct AStar<N: Eq + Hash> {
    base: AlgorithmBase<Vec<N>, ShortestPathQuery<N>>,
    creator: AStarGeneCreator<N>,
}

impl<N: Eq + Hash> Clone for AStar<N> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            creator: self.creator.clone(),
        }
    }
}

impl<N: Clone + Eq + Hash + 'static> Default for AStar<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone + Eq + Hash + 'static> AStar<N> {
    pub fn new() -> Self {
        let creator = AStarGeneCreator::new();
        let evaluator = Arc::new(Evaluator::new().with_cachet(PathWeightCachet, 1.0));
        Self {
            base: AlgorithmBase::new(
                evaluator,
                Arc::new(OneToOneSolutionCreator::new(creator.clone())),
            ),
            creator,
        }
    }

    fn with_creator(mut self, creator: AStarGeneCreator<N>) -> Self {
        self.base
            .set_solution_creator(Arc::new(OneToOneSolutionCreator::new(creator.clone())));
        self.creator = creator;
        self
    }

    pub fn with_comparator(
        self,
        comparator: impl Fn(f64, f64) -> std::cmp::Ordering + 'static,
    ) -> Self {
        let creator = self.creator.clone().with_comparator(comparator);
        self.with_creator(creator)
    }

    pub fn with_weight_calculator(self, calculator: impl WeightCalculator<N> + 'static) -> Self {
        let creator = self.creator.clone().with_weight_calculator(calculator);
        self.with_creator(creator)
    }

    pub fn with_evaluator(
        mut self,
        evaluator: Arc<Evaluator<Vec<N>, ShortestPathQuery<N>>>,
    ) -> Self {
        self.base.set_evaluator(evaluator);
        self
    }

    pub fn with_analytics(
        mut self,
        analytics: Arc<dyn Analytics<Vec<N>, ShortestPathQuery<N>>>,
    ) -> Self {
        self.base.set_analytics(Some(analytics));
        self
    }

    fn run(
        &self,
        problem: &Problem<ShortestPathQuery<N>>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<Vec<N>, ShortestPathQuery<N>>> {
        let solution = self.base.session(|| {
            self.base.report(|a| {
                a.log_param("problem_size", &problem.size().to_string())?;
                a.log_algorithm_step_headers(&["query", "path length"])
            })?;

            let solution = self.base.initial_solution(problem, rng)?;
            for (i, gene) in solution.genes().iter().enumerate() {
                debug!(query = i, nodes = gene.gene().len(), "path found");
                let row = [i.to_string(), gene.gene().len().to_string()];
                self.base.report(|a| a.log_algorithm_step(&row))?;
            }

            self.base.report(|a| {
                a.log_problem(problem)?;
                a.log_solution(&solution)
            })?;
            Ok(solution)
        })?;
        info!(queries = problem.size(), quality = solution.quality(), "a* finished");
        Ok(solution)
    }
}

/// Comparator and weight calculator are wired with the typed builders.
impl<N: Eq + Hash> Configurable for AStar<N> {}

impl<N: Clone + Eq + Hash + 'static> Algorithm<Vec<N>, ShortestPathQuery<N>> for AStar<N> {
    fn name(&self) -> &str {
        "AStar"
    }

    fn base(&self) -> &AlgorithmBase<Vec<N>, ShortestPathQuery<N>> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase<Vec<N>, ShortestPathQuery<N>> {
        &mut self.base
    }

    fn solve_from(
        &self,
        problem: &Problem<ShortestPathQuery<N>>,
        _start: Solution<Vec<N>, ShortestPathQuery<N>>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<Vec<N>, ShortestPathQuery<N>>> {
        self.run(problem, rng)
    }

    fn solve(
        &self,
        problem: &Problem<ShortestPathQuery<N>>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<Vec<N>, ShortestPathQuery<N>>> {
        self.run(problem, rng)
    }

    fn boxed_clone(&self) -> Box<dyn Algorithm<Vec<N>, ShortestPathQuery<N>>> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryAnalytics;
    use crate::error::Error;
    use crate::testing::SwitchableAnalytics;

    fn ring() -> Arc<WeightedGraph<u32>> {
        // 0 -> 1 -> 2 -> 3 -> 0 plus an expensive chord 0 -> 2
        Arc::new(
            WeightedGraph::new()
                .with_edge(0, 1, 1.0)
                .with_edge(1, 2, 1.0)
                .with_edge(2, 3, 1.0)
                .with_edge(3, 0, 1.0)
                .with_edge(0, 2, 5.0),
        )
    }

    #[test]
    fn test_one_path_per_query() {
        let graph = ring();
        let problem = Problem::new([
            ShortestPathQuery::to_node(Arc::clone(&graph), 0, 2),
            ShortestPathQuery::to_node(Arc::clone(&graph), 3, 1),
        ]);
        let solution = AStar::new().solve_seeded(&problem, Some(1)).unwrap();
        assert_eq!(solution.genes()[0].gene(), &vec![0, 1, 2]);
        assert_eq!(solution.genes()[1].gene(), &vec![3, 0, 1]);
        assert_eq!(solution.quality(), 4.0);
    }

    #[test]
    fn test_unreachable_query_scores_sentinel() {
        let mut graph = (*ring()).clone();
        graph.add_node(9);
        let problem = Problem::new([ShortestPathQuery::to_node(Arc::new(graph), 0, 9)]);
        let solution = AStar::new().solve_seeded(&problem, Some(1)).unwrap();
        assert!(solution.genes()[0].gene().is_empty());
        assert_eq!(solution.quality(), UNEVALUABLE_QUALITY);
    }

    #[test]
    fn test_comparator_is_configurable() {
        let problem = Problem::new([ShortestPathQuery::to_node(ring(), 0, 2)]);
        let heaviest = AStar::new().with_comparator(|a: f64, b: f64| b.total_cmp(&a));
        let solution = heaviest.solve_seeded(&problem, Some(1)).unwrap();
        assert_eq!(solution.genes()[0].gene(), &vec![0, 2]);
    }

    #[test]
    fn test_warm_start_is_recomputed() {
        let problem = Problem::new([ShortestPathQuery::to_node(ring(), 1, 0)]);
        let astar = AStar::new();
        let mut rng = u_numflow::random::create_rng(1);
        let stale = Solution::new();
        let solution = astar.solve_from(&problem, stale, &mut rng).unwrap();
        assert_eq!(solution.genes()[0].gene(), &vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_analytics_row_per_query() {
        let memory = Arc::new(MemoryAnalytics::new());
        let problem = Problem::new([
            ShortestPathQuery::to_node(ring(), 0, 3),
            ShortestPathQuery::new(ring(), 2, |n: &u32| n % 2 == 1),
        ]);
        AStar::new()
            .with_analytics(memory.clone())
            .solve_seeded(&problem, Some(1))
            .unwrap();
        let runs = memory.runs();
        let run = &runs[0];
        assert_eq!(run.steps, vec![vec!["0", "4"], vec!["1", "2"]]);
        assert!(run.finished);
    }

    #[test]
    fn test_rejected_step_closes_session() {
        let analytics = SwitchableAnalytics::switched_off();
        let astar = AStar::<u32>::new().with_analytics(analytics.clone());
        let problem = Problem::new([ShortestPathQuery::to_node(ring(), 0, 3)]);

        let err = astar.solve_seeded(&problem, Some(1)).unwrap_err();
        assert!(matches!(err, Error::Construction { .. }));

        analytics.set_off(false);
        let solution = astar.solve_seeded(&problem, Some(1)).unwrap();
        assert_eq!(solution.genes()[0].gene(), &vec![0, 1, 2, 3]);
        let runs = analytics.memory.runs();
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| r.finished));
        assert_eq!(runs[1].steps, vec![vec!["0".to_string(), "4".to_string()]]);
    }
}
