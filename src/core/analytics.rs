//! Run analytics hook.
//!
//! Algorithms report run metadata, per-step rows and the final snapshot
//! through [`Analytics`]. A session is strictly sequential:
//!
//! ```text
//! start -> (log_param | log_step_headers)* -> log_step* -> log_problem/log_solution -> finish
//! ```
//!
//! Calls out of that order return [`Error::LoggingOrder`].

use super::problem::Problem;
use super::solution::Solution;
use crate::error::{Error, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Analytics collaborator consumed by algorithms.
pub trait Analytics<ST, PT> {
    fn start_analytics(&self) -> Result<()>;
    fn log_param(&self, name: &str, value: &str) -> Result<()>;
    fn log_algorithm_step_headers(&self, names: &[&str]) -> Result<()>;
    fn log_algorithm_step(&self, values: &[String]) -> Result<()>;
    fn log_problem(&self, problem: &Problem<PT>) -> Result<()>;
    fn log_solution(&self, solution: &Solution<ST, PT>) -> Result<()>;
    fn finish_analytics(&self) -> Result<()>;
}

/// Call-order state machine shared by the backends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsSession {
    open: bool,
    headers: Option<usize>,
}

impl AnalyticsSession {
    pub fn start(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::LoggingOrder("session already open".into()));
        }
        self.open = true;
        self.headers = None;
        Ok(())
    }

    pub fn require_open(&self, call: &str) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::LoggingOrder(format!("{call} outside of a session")))
        }
    }

    pub fn declare_headers(&mut self, count: usize) -> Result<()> {
        self.require_open("log_algorithm_step_headers")?;
        self.headers = Some(count);
        Ok(())
    }

    pub fn check_step(&self, values: usize) -> Result<()> {
        self.require_open("log_algorithm_step")?;
        match self.headers {
            None => Err(Error::LoggingOrder("step logged before headers".into())),
            Some(n) if values > n => Err(Error::LoggingOrder(format!(
                "step has {values} values but only {n} headers"
            ))),
            Some(_) => Ok(()),
        }
    }

    pub fn finish(&mut self) -> Result<()> {
        self.require_open("finish_analytics")?;
        self.open = false;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Everything one session recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsRecord {
    pub params: Vec<(String, String)>,
    pub headers: Vec<String>,
    pub steps: Vec<Vec<String>>,
    pub problem_size: Option<usize>,
    pub solution_quality: Option<f64>,
    pub finished: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    session: AnalyticsSession,
    runs: Vec<AnalyticsRecord>,
}

/// Keeps every session in memory; useful for tests and for callers that
/// export runs themselves.
#[derive(Debug, Default)]
pub struct MemoryAnalytics {
    state: Mutex<MemoryState>,
}

impl MemoryAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all recorded sessions, oldest first.
    pub fn runs(&self) -> Vec<AnalyticsRecord> {
        self.lock().runs.clone()
    }

    fn with_current<T>(
        &self,
        call: &str,
        f: impl FnOnce(&mut AnalyticsSession, &mut AnalyticsRecord) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.lock();
        state.session.require_open(call)?;
        let MemoryState { session, runs } = &mut *state;
        match runs.last_mut() {
            Some(record) => f(session, record),
            None => Err(Error::LoggingOrder(format!("{call} without a record"))),
        }
    }
}

impl<ST, PT> Analytics<ST, PT> for MemoryAnalytics {
    fn start_analytics(&self) -> Result<()> {
        let mut state = self.lock();
        state.session.start()?;
        state.runs.push(AnalyticsRecord::default());
        Ok(())
    }

    fn log_param(&self, name: &str, value: &str) -> Result<()> {
        self.with_current("log_param", |_, record| {
            record.params.push((name.to_string(), value.to_string()));
            Ok(())
        })
    }

    fn log_algorithm_step_headers(&self, names: &[&str]) -> Result<()> {
        self.with_current("log_algorithm_step_headers", |session, record| {
            session.declare_headers(names.len())?;
            record.headers = names.iter().map(|n| n.to_string()).collect();
            Ok(())
        })
    }

    fn log_algorithm_step(&self, values: &[String]) -> Result<()> {
        self.with_current("log_algorithm_step", |session, record| {
            session.check_step(values.len())?;
            record.steps.push(values.to_vec());
            Ok(())
        })
    }

    fn log_problem(&self, problem: &Problem<PT>) -> Result<()> {
        self.with_current("log_problem", |_, record| {
            record.problem_size = Some(problem.size());
            Ok(())
        })
    }

    fn log_solution(&self, solution: &Solution<ST, PT>) -> Result<()> {
        self.with_current("log_solution", |_, record| {
            record.solution_quality = Some(solution.quality());
            Ok(())
        })
    }

    fn finish_analytics(&self) -> Result<()> {
        self.with_current("finish_analytics", |session, record| {
            session.finish()?;
            record.finished = true;
            Ok(())
        })
    }
}

/// Forwards the analytics session to `tracing` events.
#[derive(Debug, Default)]
pub struct TracingAnalytics {
    session: Mutex<(AnalyticsSession, Vec<String>)>,
}

impl TracingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, (AnalyticsSession, Vec<String>)> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<ST, PT> Analytics<ST, PT> for TracingAnalytics {
    fn start_analytics(&self) -> Result<()> {
        let mut guard = self.lock();
        guard.0.start()?;
        guard.1.clear();
        tracing::info!(target: "u_metaevo::analytics", "run started");
        Ok(())
    }

    fn log_param(&self, name: &str, value: &str) -> Result<()> {
        self.lock().0.require_open("log_param")?;
        tracing::info!(target: "u_metaevo::analytics", param = name, value, "run parameter");
        Ok(())
    }

    fn log_algorithm_step_headers(&self, names: &[&str]) -> Result<()> {
        let mut guard = self.lock();
        guard.0.declare_headers(names.len())?;
        guard.1 = names.iter().map(|n| n.to_string()).collect();
        Ok(())
    }

    fn log_algorithm_step(&self, values: &[String]) -> Result<()> {
        let guard = self.lock();
        guard.0.check_step(values.len())?;
        let row = guard
            .1
            .iter()
            .zip(values)
            .map(|(h, v)| format!("{h}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::debug!(target: "u_metaevo::analytics", %row, "step");
        Ok(())
    }

    fn log_problem(&self, problem: &Problem<PT>) -> Result<()> {
        self.lock().0.require_open("log_problem")?;
        tracing::info!(target: "u_metaevo::analytics", size = problem.size(), "problem");
        Ok(())
    }

    fn log_solution(&self, solution: &Solution<ST, PT>) -> Result<()> {
        self.lock().0.require_open("log_solution")?;
        tracing::info!(
            target: "u_metaevo::analytics",
            quality = solution.quality(),
            genes = solution.len(),
            "solution"
        );
        Ok(())
    }

    fn finish_analytics(&self) -> Result<()> {
        self.lock().0.finish()?;
        tracing::info!(target: "u_metaevo::analytics", "run finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type A = dyn Analytics<u8, u8>;

    #[test]
    fn test_memory_records_session() {
        let memory = MemoryAnalytics::new();
        let analytics: &A = &memory;
        analytics.start_analytics().unwrap();
        analytics.log_param("maximum_generations", "10").unwrap();
        analytics.log_algorithm_step_headers(&["best quality"]).unwrap();
        analytics.log_algorithm_step(&["4".into()]).unwrap();
        analytics.log_problem(&Problem::new(vec![1, 2])).unwrap();
        let mut s = Solution::new();
        s.set_quality(4.0);
        analytics.log_solution(&s).unwrap();
        analytics.finish_analytics().unwrap();

        let runs = memory.runs();
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.params, vec![("maximum_generations".into(), "10".into())]);
        assert_eq!(run.headers, vec!["best quality".to_string()]);
        assert_eq!(run.steps, vec![vec!["4".to_string()]]);
        assert_eq!(run.problem_size, Some(2));
        assert_eq!(run.solution_quality, Some(4.0));
        assert!(run.finished);
    }

    #[test]
    fn test_step_before_headers_fails() {
        let memory = MemoryAnalytics::new();
        let analytics: &A = &memory;
        analytics.start_analytics().unwrap();
        let err = analytics.log_algorithm_step(&["1".into()]).unwrap_err();
        assert!(matches!(err, Error::LoggingOrder(_)));
    }

    #[test]
    fn test_too_many_values_fails() {
        let memory = MemoryAnalytics::new();
        let analytics: &A = &memory;
        analytics.start_analytics().unwrap();
        analytics.log_algorithm_step_headers(&["a"]).unwrap();
        assert!(analytics
            .log_algorithm_step(&["1".into(), "2".into()])
            .is_err());
    }

    #[test]
    fn test_param_before_start_fails() {
        let memory = MemoryAnalytics::new();
        let analytics: &A = &memory;
        assert!(analytics.log_param("a", "b").is_err());
        assert!(analytics.finish_analytics().is_err());
    }

    #[test]
    fn test_second_start_while_open_fails() {
        let tracing_backend = TracingAnalytics::new();
        let analytics: &A = &tracing_backend;
        analytics.start_analytics().unwrap();
        assert!(analytics.start_analytics().is_err());
        analytics.finish_analytics().unwrap();
        analytics.start_analytics().unwrap();
    }
}
