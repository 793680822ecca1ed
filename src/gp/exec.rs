//! Graph execution: the heuristic kit, the execution context and the
//! per-kind semantics.

use super::graph::GpGraph;
use super::node::{GpValue, NodeId, NodeKind};
use crate::core::{Evaluator, Problem, Solution, SolutionCreator};
use crate::operators::{Crossover, Mutator, Selector, TournamentSelector};
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::debug;

/// Operators the heuristic nodes draw on while a graph runs.
///
/// `Mutate` passes its input through when no mutator is set; `Crossover`
/// yields no solution when no crossover is set.
pub struct Heuristics<ST, PT> {
    creator: Arc<dyn SolutionCreator<ST, PT>>,
    evaluator: Arc<Evaluator<ST, PT>>,
    mutator: Option<Arc<dyn Mutator<ST, PT>>>,
    crossover: Option<Arc<dyn Crossover<ST, PT>>>,
    selector: Arc<dyn Selector<ST, PT>>,
}

impl<ST, PT> Clone for Heuristics<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            creator: Arc::clone(&self.creator),
            evaluator: Arc::clone(&self.evaluator),
            mutator: self.mutator.clone(),
            crossover: self.crossover.clone(),
            selector: Arc::clone(&self.selector),
        }
    }
}

impl<ST, PT> Heuristics<ST, PT> {
    pub fn new(
        creator: Arc<dyn SolutionCreator<ST, PT>>,
        evaluator: Arc<Evaluator<ST, PT>>,
    ) -> Self {
        Self {
            creator,
            evaluator,
            mutator: None,
            crossover: None,
            selector: Arc::new(TournamentSelector::default()),
        }
    }

    pub fn with_mutator(mut self, mutator: Arc<dyn Mutator<ST, PT>>) -> Self {
        self.mutator = Some(mutator);
        self
    }

    pub fn with_crossover(mut self, crossover: Arc<dyn Crossover<ST, PT>>) -> Self {
        self.crossover = Some(crossover);
        self
    }

    pub fn with_selector(mut self, selector: Arc<dyn Selector<ST, PT>>) -> Self {
        self.selector = selector;
        self
    }

    pub fn evaluator(&self) -> &Arc<Evaluator<ST, PT>> {
        &self.evaluator
    }

    fn ensure_evaluated(&self, solution: &mut Solution<ST, PT>) {
        if solution.cachets().is_empty() {
            self.evaluator.evaluate_quality(solution);
        }
    }
}

/// Everything one graph run needs besides the graph itself.
pub struct ExecutionContext<'a, ST, PT> {
    pub heuristics: &'a Heuristics<ST, PT>,
    pub problem: &'a Problem<PT>,
    pub rng: &'a mut dyn RngCore,
}

impl<'a, ST, PT> ExecutionContext<'a, ST, PT> {
    pub fn new(
        heuristics: &'a Heuristics<ST, PT>,
        problem: &'a Problem<PT>,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self {
            heuristics,
            problem,
            rng,
        }
    }
}

pub(super) fn iteration_count(n: f64, max_iterations: usize) -> usize {
    if !n.is_finite() || n <= 0.0 {
        0
    } else {
        (n as usize).min(max_iterations)
    }
}

impl<ST, PT> GpGraph<ST, PT> {
    /// Executes the graph from the root, reusing memoized values of cached
    /// nodes from earlier runs.
    pub fn execute(&mut self, ctx: &mut ExecutionContext<'_, ST, PT>) -> GpValue<ST, PT> {
        let mut active = vec![false; self.nodes.len()];
        self.eval(self.root, ctx, &mut active)
    }

    /// One full evaluation pass: drops every memoized value, clears the
    /// interrupt flag and executes the root.
    ///
    /// Returns a solution without genes if the graph produced none.
    pub fn calculate_value(&mut self, ctx: &mut ExecutionContext<'_, ST, PT>) -> Solution<ST, PT> {
        self.reset_caches();
        self.interrupt(false);
        self.execute(ctx).into_solution().unwrap_or_default()
    }

    fn eval(
        &mut self,
        id: NodeId,
        ctx: &mut ExecutionContext<'_, ST, PT>,
        active: &mut [bool],
    ) -> GpValue<ST, PT> {
        let node = &self.nodes[id.0];
        if node.cached {
            if let Some(memo) = &node.memo {
                return memo.clone();
            }
        }
        // re-entered through a cycle
        if active[id.0] {
            return GpValue::sample(node.kind.produces());
        }
        active[id.0] = true;
        let value = self.compute(id, ctx, active);
        active[id.0] = false;

        let node = &mut self.nodes[id.0];
        if node.cached {
            node.memo = Some(value.clone());
        }
        value
    }

    fn child(
        &mut self,
        children: &[NodeId],
        slot: usize,
        kind: &NodeKind,
        ctx: &mut ExecutionContext<'_, ST, PT>,
        active: &mut [bool],
    ) -> GpValue<ST, PT> {
        match children.get(slot) {
            Some(&c) => self.eval(c, ctx, active),
            None => {
                let ty = kind.child_types().get(slot).copied();
                GpValue::sample(ty.unwrap_or_else(|| kind.produces()))
            }
        }
    }

    fn compute(
        &mut self,
        id: NodeId,
        ctx: &mut ExecutionContext<'_, ST, PT>,
        active: &mut [bool],
    ) -> GpValue<ST, PT> {
        let kind = self.nodes[id.0].kind.clone();
        let children = self.nodes[id.0].children.clone();

        match &kind {
            NodeKind::Number(v) => GpValue::Number(*v),
            NodeKind::Integer(v) => GpValue::Number(*v as f64),
            NodeKind::Boolean(v) => GpValue::Boolean(*v),
            NodeKind::CreateSolution => {
                let heuristics = ctx.heuristics;
                match heuristics.creator.create_solution(ctx.problem, &mut *ctx.rng) {
                    Ok(mut solution) => {
                        heuristics.evaluator.evaluate_quality(&mut solution);
                        GpValue::Solution(solution)
                    }
                    Err(error) => {
                        debug!(%error, "solution creation failed inside graph");
                        GpValue::Solution(Solution::new())
                    }
                }
            }
            NodeKind::Add | NodeKind::Subtract | NodeKind::Multiply | NodeKind::Divide => {
                let a = self.number(&children, 0, &kind, ctx, active);
                let b = self.number(&children, 1, &kind, ctx, active);
                GpValue::Number(kind.arithmetic(a, b).unwrap_or(0.0))
            }
            NodeKind::Random => {
                let a = self.number(&children, 0, &kind, ctx, active);
                let b = self.number(&children, 1, &kind, ctx, active);
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                GpValue::Number(lo + (hi - lo) * ctx.rng.random::<f64>())
            }
            NodeKind::LessThan | NodeKind::Equals => {
                let a = self.number(&children, 0, &kind, ctx, active);
                let b = self.number(&children, 1, &kind, ctx, active);
                GpValue::Boolean(kind.comparison(a, b).unwrap_or(false))
            }
            NodeKind::And | NodeKind::Or => {
                let a = self.boolean(&children, 0, &kind, ctx, active);
                // short-circuit
                let decided = match kind {
                    NodeKind::And => !a,
                    _ => a,
                };
                if decided {
                    GpValue::Boolean(a)
                } else {
                    let b = self.boolean(&children, 1, &kind, ctx, active);
                    GpValue::Boolean(kind.logic(a, b).unwrap_or(false))
                }
            }
            NodeKind::Not => GpValue::Boolean(!self.boolean(&children, 0, &kind, ctx, active)),
            NodeKind::IfThenElse(_) => {
                let slot = if self.boolean(&children, 0, &kind, ctx, active) {
                    1
                } else {
                    2
                };
                self.child(&children, slot, &kind, ctx, active)
            }
            NodeKind::For { of, max_iterations } => {
                let n = self.number(&children, 0, &kind, ctx, active);
                let mut last = None;
                for _ in 0..iteration_count(n, *max_iterations) {
                    last = Some(self.child(&children, 1, &kind, ctx, active));
                    if self.is_interrupted() {
                        break;
                    }
                }
                last.unwrap_or_else(|| GpValue::sample(*of))
            }
            NodeKind::While { of, max_iterations } => {
                let mut last = None;
                let mut i = 0;
                while i < *max_iterations && self.boolean(&children, 0, &kind, ctx, active) {
                    last = Some(self.child(&children, 1, &kind, ctx, active));
                    i += 1;
                    if self.is_interrupted() {
                        break;
                    }
                }
                last.unwrap_or_else(|| GpValue::sample(*of))
            }
            NodeKind::Repeat { max_iterations } => {
                let n = self.number(&children, 0, &kind, ctx, active);
                let mut collected = Vec::new();
                for _ in 0..iteration_count(n, *max_iterations) {
                    collected.push(self.solution(&children, 1, &kind, ctx, active));
                    if self.is_interrupted() {
                        break;
                    }
                }
                GpValue::Solutions(collected)
            }
            NodeKind::Merge => {
                let mut merged = self.solutions(&children, 0, &kind, ctx, active);
                merged.extend(self.solutions(&children, 1, &kind, ctx, active));
                GpValue::Solutions(merged)
            }
            NodeKind::Size => {
                GpValue::Number(self.solutions(&children, 0, &kind, ctx, active).len() as f64)
            }
            NodeKind::Elite => {
                let n = self.number(&children, 0, &kind, ctx, active);
                let mut pool = self.evaluated_pool(&children, 1, &kind, ctx, active);
                pool.sort_by(|a, b| a.quality().total_cmp(&b.quality()));
                pool.truncate(iteration_count(n, pool.len()));
                GpValue::Solutions(pool)
            }
            NodeKind::BestOf => {
                let pool = self.evaluated_pool(&children, 0, &kind, ctx, active);
                let best = pool
                    .into_iter()
                    .min_by(|a, b| a.quality().total_cmp(&b.quality()));
                GpValue::Solution(best.unwrap_or_default())
            }
            NodeKind::Mutate => {
                let mut solution = self.solution(&children, 0, &kind, ctx, active);
                match &ctx.heuristics.mutator {
                    Some(mutator) if !solution.is_empty() => {
                        ctx.heuristics.ensure_evaluated(&mut solution);
                        GpValue::Solution(mutator.mutate(&solution, &mut *ctx.rng))
                    }
                    _ => GpValue::Solution(solution),
                }
            }
            NodeKind::Crossover => {
                let pool = self.evaluated_pool(&children, 0, &kind, ctx, active);
                let heuristics = ctx.heuristics;
                let child = heuristics.crossover.as_ref().and_then(|crossover| {
                    crossover.breed(&pool, heuristics.selector.as_ref(), &mut *ctx.rng)
                });
                match child {
                    Some(mut child) => {
                        heuristics.evaluator.evaluate_quality(&mut child);
                        GpValue::Solution(child)
                    }
                    None => GpValue::Solution(Solution::new()),
                }
            }
            NodeKind::Quality => {
                let mut solution = self.solution(&children, 0, &kind, ctx, active);
                GpValue::Number(ctx.heuristics.evaluator.evaluate_quality(&mut solution))
            }
            NodeKind::Result => GpValue::Solution(self.solution(&children, 0, &kind, ctx, active)),
        }
    }

    fn number(
        &mut self,
        children: &[NodeId],
        slot: usize,
        kind: &NodeKind,
        ctx: &mut ExecutionContext<'_, ST, PT>,
        active: &mut [bool],
    ) -> f64 {
        self.child(children, slot, kind, ctx, active)
            .as_number()
            .unwrap_or(0.0)
    }

    fn boolean(
        &mut self,
        children: &[NodeId],
        slot: usize,
        kind: &NodeKind,
        ctx: &mut ExecutionContext<'_, ST, PT>,
        active: &mut [bool],
    ) -> bool {
        self.child(children, slot, kind, ctx, active)
            .as_bool()
            .unwrap_or(false)
    }

    fn solution(
        &mut self,
        children: &[NodeId],
        slot: usize,
        kind: &NodeKind,
        ctx: &mut ExecutionContext<'_, ST, PT>,
        active: &mut [bool],
    ) -> Solution<ST, PT> {
        self.child(children, slot, kind, ctx, active)
            .into_solution()
            .unwrap_or_default()
    }

    fn solutions(
        &mut self,
        children: &[NodeId],
        slot: usize,
        kind: &NodeKind,
        ctx: &mut ExecutionContext<'_, ST, PT>,
        active: &mut [bool],
    ) -> Vec<Solution<ST, PT>> {
        self.child(children, slot, kind, ctx, active)
            .into_solutions()
            .unwrap_or_default()
    }

    /// Non-empty solutions of a list slot, each scored at least once.
    fn evaluated_pool(
        &mut self,
        children: &[NodeId],
        slot: usize,
        kind: &NodeKind,
        ctx: &mut ExecutionContext<'_, ST, PT>,
        active: &mut [bool],
    ) -> Vec<Solution<ST, PT>> {
        let mut pool: Vec<_> = self
            .solutions(children, slot, kind, ctx, active)
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        for solution in &mut pool {
            ctx.heuristics.ensure_evaluated(solution);
        }
        pool
    }
}
