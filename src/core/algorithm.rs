//! Algorithm lifecycle: cold start, warm start, analytics wiring.

use super::analytics::Analytics;
use super::creator::SolutionCreator;
use super::fitness::Evaluator;
use super::options::Configurable;
use super::problem::Problem;
use super::solution::Solution;
use crate::error::{Error, Result};
use rand::RngCore;
use std::sync::Arc;
use tracing::warn;
use u_numflow::random::create_rng;

/// Collaborators shared by every algorithm.
pub struct AlgorithmBase<ST, PT> {
    evaluator: Option<Arc<Evaluator<ST, PT>>>,
    solution_creator: Option<Arc<dyn SolutionCreator<ST, PT>>>,
    analytics: Option<Arc<dyn Analytics<ST, PT>>>,
}

impl<ST, PT> Clone for AlgorithmBase<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            evaluator: self.evaluator.clone(),
            solution_creator: self.solution_creator.clone(),
            analytics: self.analytics.clone(),
        }
    }
}

impl<ST, PT> Default for AlgorithmBase<ST, PT> {
    fn default() -> Self {
        Self {
            evaluator: None,
            solution_creator: None,
            analytics: None,
        }
    }
}

impl<ST, PT> AlgorithmBase<ST, PT> {
    pub fn new(
        evaluator: Arc<Evaluator<ST, PT>>,
        solution_creator: Arc<dyn SolutionCreator<ST, PT>>,
    ) -> Self {
        Self {
            evaluator: Some(evaluator),
            solution_creator: Some(solution_creator),
            analytics: None,
        }
    }

    pub fn set_evaluator(&mut self, evaluator: Arc<Evaluator<ST, PT>>) {
        self.evaluator = Some(evaluator);
    }

    pub fn set_solution_creator(&mut self, creator: Arc<dyn SolutionCreator<ST, PT>>) {
        self.solution_creator = Some(creator);
    }

    pub fn set_analytics(&mut self, analytics: Option<Arc<dyn Analytics<ST, PT>>>) {
        self.analytics = analytics;
    }

    pub fn analytics(&self) -> Option<&Arc<dyn Analytics<ST, PT>>> {
        self.analytics.as_ref()
    }

    pub fn evaluator(&self) -> Result<&Arc<Evaluator<ST, PT>>> {
        self.evaluator
            .as_ref()
            .ok_or_else(|| Error::construction("algorithm", "no evaluator configured"))
    }

    pub fn solution_creator(&self) -> Result<&Arc<dyn SolutionCreator<ST, PT>>> {
        self.solution_creator
            .as_ref()
            .ok_or_else(|| Error::construction("algorithm", "no solution creator configured"))
    }

    pub fn creator_name(&self) -> String {
        self.solution_creator
            .as_ref()
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| "none".into())
    }

    /// Creates and evaluates a fresh solution.
    pub fn initial_solution(
        &self,
        problem: &Problem<PT>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<ST, PT>> {
        let mut solution = self.solution_creator()?.create_solution(problem, rng)?;
        self.evaluator()?.evaluate_quality(&mut solution);
        Ok(solution)
    }

    /// Runs `f` against the attached analytics, if any.
    pub fn report(
        &self,
        f: impl FnOnce(&dyn Analytics<ST, PT>) -> Result<()>,
    ) -> Result<()> {
        match &self.analytics {
            Some(analytics) => f(analytics.as_ref()),
            None => Ok(()),
        }
    }

    /// Runs `body` inside one analytics session.
    ///
    /// The session is finished whether or not `body` succeeds, so a failed
    /// run leaves the backend ready for the next one. The body's error wins
    /// over an error from finishing.
    pub fn session<T>(&self, body: impl FnOnce() -> Result<T>) -> Result<T> {
        self.report(|a| a.start_analytics())?;
        let outcome = body();
        let finished = self.report(|a| a.finish_analytics());
        match (outcome, finished) {
            (Ok(value), finished) => finished.map(|()| value),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(finish)) => {
                warn!(error = %finish, "analytics session not finished after failed run");
                Err(e)
            }
        }
    }
}

/// A search strategy.
///
/// `solve` starts from a freshly created solution; `solve_from` continues
/// from a caller supplied one, which is how pipelines chain algorithms.
pub trait Algorithm<ST, PT>: Configurable {
    fn name(&self) -> &str;

    fn base(&self) -> &AlgorithmBase<ST, PT>;

    fn base_mut(&mut self) -> &mut AlgorithmBase<ST, PT>;

    /// Warm start from `start`.
    fn solve_from(
        &self,
        problem: &Problem<PT>,
        start: Solution<ST, PT>,
        rng: &mut dyn RngCore,
    ) -> Result<Solution<ST, PT>>;

    /// Cold start.
    fn solve(&self, problem: &Problem<PT>, rng: &mut dyn RngCore) -> Result<Solution<ST, PT>> {
        let start = self.base().initial_solution(problem, rng)?;
        self.solve_from(problem, start, rng)
    }

    /// Cold start with a fresh random source; `None` draws a seed.
    fn solve_seeded(&self, problem: &Problem<PT>, seed: Option<u64>) -> Result<Solution<ST, PT>> {
        let mut rng = match seed {
            Some(s) => create_rng(s),
            None => create_rng(rand::random()),
        };
        self.solve(problem, &mut rng)
    }

    fn analytics(&self) -> Option<&Arc<dyn Analytics<ST, PT>>> {
        self.base().analytics()
    }

    fn set_analytics(&mut self, analytics: Option<Arc<dyn Analytics<ST, PT>>>) {
        self.base_mut().set_analytics(analytics);
    }

    /// A new, independently configurable instance with the same settings.
    fn boxed_clone(&self) -> Box<dyn Algorithm<ST, PT>>;
}

impl<ST, PT> Clone for Box<dyn Algorithm<ST, PT>> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Descriptor, MemoryAnalytics};
    use crate::local_search::{LocalSearch, LocalSearchConfig};
    use crate::operators::RollbackRandomNGenesMutator;
    use crate::testing::*;

    fn search_with(creator: Arc<SwitchableCreator>) -> LocalSearch<Genome, Genome> {
        let evaluator = genome_evaluator();
        let mutator = Arc::new(RollbackRandomNGenesMutator::new(
            RandomCharMutation,
            Arc::clone(&evaluator),
        ));
        LocalSearch::new(evaluator, creator, mutator)
            .with_config(LocalSearchConfig::default().with_maximum_generations(10))
    }

    #[test]
    fn test_missing_collaborators_fail_construction() {
        let base = AlgorithmBase::<Genome, Genome>::default();
        assert!(
            matches!(base.evaluator(), Err(Error::Construction { .. })),
            "no evaluator must be a construction error"
        );
        assert!(
            matches!(base.solution_creator(), Err(Error::Construction { .. })),
            "no creator must be a construction error"
        );
        let mut rng = create_rng(1);
        let result = base.initial_solution(&genome_problem(), &mut rng);
        assert!(matches!(result, Err(Error::Construction { .. })));
        assert_eq!(base.creator_name(), "none");
    }

    #[test]
    fn test_solve_cold_starts_through_creator() {
        let creator = SwitchableCreator::switched_off();
        let memory = Arc::new(MemoryAnalytics::new());
        let search = search_with(Arc::clone(&creator)).with_analytics(memory.clone());
        let mut rng = create_rng(3);

        let result = search.solve(&genome_problem(), &mut rng);
        assert!(matches!(result, Err(Error::Construction { .. })));
        assert!(memory.runs().is_empty(), "no session before a start solution exists");

        creator.set_off(false);
        let solution = search.solve(&genome_problem(), &mut rng).unwrap();
        assert_eq!(solution.len(), 1);
        assert!(solution.quality() <= 14.0, "quality {}", solution.quality());
        assert_eq!(memory.runs().len(), 1);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let search = genome_search(30);
        let a = search.solve_seeded(&genome_problem(), Some(11)).unwrap();
        let b = search.solve_seeded(&genome_problem(), Some(11)).unwrap();
        assert_eq!(a.genes()[0].gene(), b.genes()[0].gene());
        assert_eq!(a.quality(), b.quality());
    }

    #[test]
    fn test_boxed_clone_keeps_config_and_analytics() {
        let memory = Arc::new(MemoryAnalytics::new());
        let copy = genome_search(25)
            .with_analytics(memory.clone())
            .boxed_clone();
        assert_eq!(
            copy.options().get("maximum_generations"),
            Some(&Descriptor::fixed(25usize))
        );
        assert!(copy.analytics().is_some());

        copy.solve_seeded(&genome_problem(), Some(2)).unwrap();
        let runs = memory.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].steps.len(), 25);
    }

    #[test]
    fn test_session_finishes_after_failed_body() {
        let memory = Arc::new(MemoryAnalytics::new());
        let mut base = AlgorithmBase::<Genome, Genome>::default();
        base.set_analytics(Some(memory.clone()));

        let err = base
            .session(|| -> Result<()> { Err(Error::EmptyPopulation) })
            .unwrap_err();
        assert!(matches!(err, Error::EmptyPopulation));
        assert_eq!(base.session(|| Ok(5)).unwrap(), 5);

        let runs = memory.runs();
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| r.finished), "every session must be closed");
    }

    #[test]
    fn test_session_does_not_run_body_on_open_backend() {
        let memory = Arc::new(MemoryAnalytics::new());
        Analytics::<Genome, Genome>::start_analytics(memory.as_ref()).unwrap();
        let mut base = AlgorithmBase::<Genome, Genome>::default();
        base.set_analytics(Some(memory.clone()));

        let mut ran = false;
        let err = base
            .session(|| {
                ran = true;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, Error::LoggingOrder(_)));
        assert!(!ran);
    }

    #[test]
    fn test_session_without_analytics_passes_through() {
        let base = AlgorithmBase::<Genome, Genome>::default();
        assert_eq!(base.session(|| Ok("done")).unwrap(), "done");
        assert!(matches!(
            base.session(|| -> Result<()> { Err(Error::EmptyPopulation) }),
            Err(Error::EmptyPopulation)
        ));
    }
}
