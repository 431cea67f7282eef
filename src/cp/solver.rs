//! Solver contract.
//!
//! Any engine able to maximize a [`CpModel`] plugs in behind
//! [`CpSolver`]. The engine reports each strictly improving solution to
//! a callback as it is found; the callback may stop the search.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CpModel, LinearExpr, VarId};

/// Default number of parallel search workers requested from the engine.
pub const DEFAULT_NUM_WORKERS: usize = 8;

/// Terminal solver status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Best possible solution proven.
    Optimal,
    /// A solution was found but not proven optimal.
    Feasible,
    /// Proven to have no solution.
    Infeasible,
    /// Stopped before finding a solution or proving infeasibility.
    Unknown,
    /// The model cannot be solved as stated.
    ModelInvalid,
}

impl SolveStatus {
    /// Whether a usable solution exists.
    pub fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Optimal => "OPTIMAL",
            Self::Feasible => "FEASIBLE",
            Self::Infeasible => "INFEASIBLE",
            Self::Unknown => "UNKNOWN",
            Self::ModelInvalid => "MODEL_INVALID",
        })
    }
}

/// Engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Parallel search workers.
    pub num_workers: usize,
    /// Wall-clock limit; `None` searches to completion.
    pub max_time: Option<Duration>,
    /// Log every improving solution at info level.
    pub log_search_progress: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            max_time: None,
            log_search_progress: false,
        }
    }
}

impl SolverConfig {
    /// Sets the worker count (at least 1).
    pub fn with_num_workers(mut self, workers: usize) -> Self {
        self.num_workers = workers.max(1);
        self
    }

    /// Sets the time limit.
    pub fn with_max_time(mut self, limit: Duration) -> Self {
        self.max_time = Some(limit);
        self
    }

    /// Enables progress logging.
    pub fn with_log_search_progress(mut self, enabled: bool) -> Self {
        self.log_search_progress = enabled;
        self
    }
}

/// A complete variable assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpSolution {
    values: Vec<i64>,
    objective: i64,
}

impl CpSolution {
    /// Wraps a value vector (indexed by [`VarId::index`]).
    pub fn new(values: Vec<i64>, objective: i64) -> Self {
        Self { values, objective }
    }

    /// Value of a variable.
    pub fn value(&self, var: VarId) -> i64 {
        self.values[var.index()]
    }

    /// Value of a boolean variable.
    pub fn boolean_value(&self, var: VarId) -> bool {
        self.values[var.index()] != 0
    }

    /// Value of an expression.
    pub fn evaluate(&self, expr: &LinearExpr) -> i64 {
        expr.evaluate(&self.values)
    }

    /// Objective value.
    pub fn objective(&self) -> i64 {
        self.objective
    }

    /// All values.
    pub fn values(&self) -> &[i64] {
        &self.values
    }
}

/// Callback verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchControl {
    /// Keep searching.
    Continue,
    /// Stop as soon as possible.
    Stop,
}

/// Search statistics.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Search nodes visited.
    pub nodes: u64,
    /// Improving solutions found.
    pub solutions: u64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

/// Outcome of a solve.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Terminal status.
    pub status: SolveStatus,
    /// Best solution found, if any.
    pub best: Option<CpSolution>,
    /// Search statistics.
    pub stats: SearchStats,
}

/// A constraint solver.
///
/// Implementations must call `on_solution` once per strictly improving
/// solution, in the order found, and honor [`SearchControl::Stop`].
pub trait CpSolver {
    /// Maximizes the model's objective, reporting each improvement.
    fn solve_with_callback(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        on_solution: &mut dyn FnMut(&CpSolution) -> SearchControl,
    ) -> SolveResult;

    /// Maximizes the model's objective.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> SolveResult {
        self.solve_with_callback(model, config, &mut |_| SearchControl::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(SolveStatus::Optimal.to_string(), "OPTIMAL");
        assert_eq!(SolveStatus::ModelInvalid.to_string(), "MODEL_INVALID");
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&SolveStatus::Infeasible).unwrap();
        assert_eq!(json, "\"INFEASIBLE\"");
        let back: SolveStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SolveStatus::Infeasible);
    }

    #[test]
    fn test_config_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.num_workers, 8);
        assert!(config.max_time.is_none());

        let config = config
            .with_num_workers(0)
            .with_max_time(Duration::from_secs(5));
        assert_eq!(config.num_workers, 1);
        assert_eq!(config.max_time, Some(Duration::from_secs(5)));
    }
}
