//! Pipeline execution.

use super::problem::AmalgamSolution;
use crate::core::{Algorithm, AlgorithmBase, Analytics, Configurable, Problem, Solution};
use crate::error::{Error, Result};
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs algorithms one after another, each warm-started from the previous
/// stage's result.
///
/// A cold start lets the first stage create its own starting solution; a
/// warm start hands the caller's solution to the first stage instead.
///
/// # Usage
///
/// ```ignore
/// let pipeline = AmalgamAlgorithm::new(vec![Box::new(ga), Box::new(local_search)]);
/// let best = pipeline.solve_seeded(&problem, Some(42))?;
/// ```
pub struct AmalgamAlgorithm<ST, PT> {
    base: AlgorithmBase<ST, PT>,
    stages: Vec<Box<dyn Algorithm<ST, PT>>>,
}

impl<ST, PT> Clone for AmalgamAlgorithm<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            stages: self.stages.iter().map(|s| s.boxed_clone()).collect(),
        }
    }
}

impl<ST, PT> AmalgamAlgorithm<ST, PT> {
    pub fn new(stages: Vec<Box<dyn Algorithm<ST, PT>>>) -> Self {
        Self {
            base: AlgorithmBase::default(),
            stages,
        }
    }

    /// One stage per solution gene, in order.
    pub fn from_solution(solution: &AmalgamSolution<ST, PT>) -> Self {
        Self::new(
            solution
                .genes()
                .iter()
                .map(|g| g.gene().algorithm().boxed_clone())
                .collect(),
        )
    }

    pub fn with_stage(mut self, stage: Box<dyn Algorithm<ST, PT>>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn Analytics<ST, PT>>) -> Self {
        self.base.set_analytics(Some(analytics));
        self
    }

    pub fn stages(&self) -> &[Box<dyn Algorithm<ST, PT>>] {
        &self.stages
    }

    fn log_stage(&self, stage: &dyn Algorithm<ST, PT>, best: &Solution<ST, PT>) -> Result<()> {
        self.base.report(|a| {
            a.log_algorithm_step(&[stage.name().to_string(), best.quality().to_string()])
        })
    }

    fn run(
        &self,
        problem: &Problem<PT>,
        start: Option<Solution<ST, PT>>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<ST, PT>> {
        let Some((first, rest)) = self.stages.split_first() else {
            return Err(Error::construction("amalgam pipeline", "no stages configured"));
        };

        let best = self.base.session(|| {
            self.base.report(|a| {
                a.log_param("problem_size", &problem.size().to_string())?;
                let names: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
                a.log_param("stages", &names.join(" -> "))?;
                a.log_algorithm_step_headers(&["stage", "best quality"])
            })?;

            debug!(stage = first.name(), warm = start.is_some(), "pipeline stage");
            let mut best = match start {
                Some(start) => first.solve_from(problem, start, rng)?,
                None => first.solve(problem, rng)?,
            };
            self.log_stage(&**first, &best)?;

            for stage in rest {
                debug!(stage = stage.name(), quality = best.quality(), "pipeline stage");
                best = stage.solve_from(problem, best, rng)?;
                self.log_stage(&**stage, &best)?;
            }

            self.base.report(|a| {
                a.log_problem(problem)?;
                a.log_solution(&best)
            })?;
            Ok(best)
        })?;
        info!(stages = self.stages.len(), quality = best.quality(), "pipeline finished");
        Ok(best)
    }
}

/// Stages carry their own options; the pipeline has none.
impl<ST, PT> Configurable for AmalgamAlgorithm<ST, PT> {}

impl<ST: 'static, PT: 'static> Algorithm<ST, PT> for AmalgamAlgorithm<ST, PT> {
    fn name(&self) -> &str {
        "AmalgamAlgorithm"
    }

    fn base(&self) -> &AlgorithmBase<ST, PT> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AlgorithmBase<ST, PT> {
        &mut self.base
    }

    fn solve_from(
        &self,
        problem: &Problem<PT>,
        start: Solution<ST, PT>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<ST, PT>> {
        self.run(problem, Some(start), rng)
    }

    fn solve(&self, problem: &Problem<PT>, rng: &mut dyn RngCore) -> Result<Solution<ST, PT>> {
        self.run(problem, None, rng)
    }

    fn boxed_clone(&self) -> Box<dyn Algorithm<ST, PT>> {
        Box::new(self.clone())
    }
}
