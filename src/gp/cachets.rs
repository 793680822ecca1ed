//! Fitness components for evolving graphs.
//!
//! Every component clamps its raw value into `[0, UNEVALUABLE_QUALITY]`;
//! negative, non-finite or oversized values score as unevaluable.

use super::exec::{ExecutionContext, Heuristics};
use super::graph::GpGraph;
use super::problem::GpProblem;
use super::trim::GpTrim;
use crate::core::{
    CachetEvaluator, Configurable, Descriptor, Options, Problem, Solution, UNEVALUABLE_QUALITY,
};
use std::collections::BTreeMap;
use tracing::debug;
use u_numflow::random::create_rng;

fn clamp_quality(quality: f64) -> f64 {
    if (0.0..=UNEVALUABLE_QUALITY).contains(&quality) {
        quality
    } else {
        UNEVALUABLE_QUALITY
    }
}

fn graph_of<ST, PT>(solution: &Solution<GpGraph<ST, PT>, GpProblem>) -> Option<&GpGraph<ST, PT>> {
    solution.genes().first().map(|gene| gene.gene())
}

/// Depth of the deepest node; a terminal directly under the root scores 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpDepthCachet;

impl<ST, PT> CachetEvaluator<GpGraph<ST, PT>, GpProblem> for GpDepthCachet {
    fn name(&self) -> &str {
        "GpDepthCachet"
    }

    fn quality(&self, solution: &Solution<GpGraph<ST, PT>, GpProblem>) -> f64 {
        graph_of(solution).map_or(UNEVALUABLE_QUALITY, |g| clamp_quality(g.depth() as f64))
    }
}

/// Sum of per-blueprint costs over the non-root nodes, each node counted
/// once however many parents it has.
#[derive(Debug, Clone, PartialEq)]
pub struct GpNodeCostCachet {
    costs: BTreeMap<String, f64>,
    default_cost: f64,
}

impl Default for GpNodeCostCachet {
    fn default() -> Self {
        Self {
            costs: BTreeMap::new(),
            default_cost: 1.0,
        }
    }
}

impl GpNodeCostCachet {
    /// Cost of one blueprint, keyed by its node name.
    pub fn with_cost(mut self, blueprint: &str, cost: f64) -> Self {
        self.costs.insert(blueprint.to_string(), cost);
        self
    }

    /// Cost of blueprints without an explicit entry.
    pub fn with_default_cost(mut self, cost: f64) -> Self {
        self.default_cost = cost;
        self
    }

    pub fn cost(&self, blueprint: &str) -> f64 {
        self.costs.get(blueprint).copied().unwrap_or(self.default_cost)
    }
}

impl<ST, PT> CachetEvaluator<GpGraph<ST, PT>, GpProblem> for GpNodeCostCachet {
    fn name(&self) -> &str {
        "GpNodeCostCachet"
    }

    fn quality(&self, solution: &Solution<GpGraph<ST, PT>, GpProblem>) -> f64 {
        let Some(graph) = graph_of(solution) else {
            return UNEVALUABLE_QUALITY;
        };
        let total: f64 = graph
            .discovered()
            .into_iter()
            .map(|id| self.cost(graph.kind(id).name()))
            .sum();
        clamp_quality(total)
    }
}

/// How many solutions the trimmed graph would create in one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpSolutionCachet;

impl<ST, PT> CachetEvaluator<GpGraph<ST, PT>, GpProblem> for GpSolutionCachet {
    fn name(&self) -> &str {
        "GpSolutionCachet"
    }

    fn quality(&self, solution: &Solution<GpGraph<ST, PT>, GpProblem>) -> f64 {
        graph_of(solution).map_or(UNEVALUABLE_QUALITY, |g| {
            clamp_quality(GpTrim::solutions_created(&GpTrim::trim(g)))
        })
    }
}

/// Runs the graph as a heuristic on every held problem and scores it by the
/// quality of what it produces.
///
/// Each problem is solved `runs_per_problem` times and the qualities are
/// averaged; the per-problem averages are summed. A graph whose trimmed
/// solution count exceeds `max_solution_creations` is not run at all and
/// scores as unevaluable. Every evaluation draws from a fresh random source
/// seeded with `seed`, so scoring the same graph twice gives the same value.
pub struct GpEvaluationCachet<ST, PT> {
    heuristics: Heuristics<ST, PT>,
    problems: Vec<Problem<PT>>,
    runs_per_problem: usize,
    max_solution_creations: f64,
    seed: u64,
}

impl<ST, PT> GpEvaluationCachet<ST, PT> {
    pub fn new(heuristics: Heuristics<ST, PT>, problems: Vec<Problem<PT>>) -> Self {
        Self {
            heuristics,
            problems,
            runs_per_problem: 1,
            max_solution_creations: 100_000.0,
            seed: 42,
        }
    }

    pub fn with_runs_per_problem(mut self, runs: usize) -> Self {
        self.runs_per_problem = runs.max(1);
        self
    }

    pub fn with_max_solution_creations(mut self, max: f64) -> Self {
        self.max_solution_creations = max.max(0.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl<ST, PT> CachetEvaluator<GpGraph<ST, PT>, GpProblem> for GpEvaluationCachet<ST, PT> {
    fn name(&self) -> &str {
        "GpEvaluationCachet"
    }

    fn quality(&self, solution: &Solution<GpGraph<ST, PT>, GpProblem>) -> f64 {
        let Some(graph) = graph_of(solution) else {
            return UNEVALUABLE_QUALITY;
        };
        let creations = GpTrim::solutions_created(&GpTrim::trim(graph));
        if creations > self.max_solution_creations {
            debug!(creations, "graph creates too many solutions to run");
            return UNEVALUABLE_QUALITY;
        }

        let mut graph = graph.clone();
        let mut rng = create_rng(self.seed);
        let mut total = 0.0;
        for problem in &self.problems {
            let mut sum = 0.0;
            for _ in 0..self.runs_per_problem {
                let mut ctx = ExecutionContext::new(&self.heuristics, problem, &mut rng);
                let mut produced = graph.calculate_value(&mut ctx);
                sum += self.heuristics.evaluator().evaluate_quality(&mut produced);
            }
            total += sum / self.runs_per_problem as f64;
        }
        clamp_quality(total)
    }
}

impl<ST, PT> Configurable for GpEvaluationCachet<ST, PT> {
    fn options(&self) -> Options {
        let mut options = Options::new();
        options.insert("runs_per_problem".into(), Descriptor::fixed(self.runs_per_problem));
        options.insert(
            "max_solution_creations".into(),
            Descriptor::fixed(self.max_solution_creations),
        );
        options
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        let Some(value) = descriptor.fixed_value() else {
            return false;
        };
        match name {
            "runs_per_problem" => value
                .as_usize()
                .map(|v| self.runs_per_problem = v.max(1))
                .is_some(),
            "max_solution_creations" => value
                .as_f64()
                .map(|v| self.max_solution_creations = v.max(0.0))
                .is_some(),
            _ => false,
        }
    }
}
