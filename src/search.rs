//! Search orchestration.
//!
//! Drives a [`CpSolver`] over a built model, turns every improving
//! solution into a domain-level [`SolutionEvent`], and decodes the final
//! result. An orchestrator is single-use:
//!
//! ```text
//! Unbuilt ──load──▶ Built ──solve──▶ Solving ──▶ Solved(status)
//!                                            └──▶ Infeasible(status)
//! ```
//!
//! There are no backward transitions. Solving an edited session means
//! building a new model and a new orchestrator.

use serde::{Deserialize, Serialize};

use crate::assign::{AssignmentModelBuilder, Score, SoftTerm};
use crate::cp::{
    CpModel, CpSolution, CpSolver, SearchControl, SearchStats, SimpleCpSolver, SolveStatus,
    SolverConfig,
};
use crate::error::{Error, Result};
use crate::models::{Assignment, Session};

/// A built model that can turn solver values into domain results.
pub trait ModelDecoder {
    /// Domain-level solution type.
    type Output;

    /// The constraint model to solve.
    fn model(&self) -> &CpModel;

    /// Soft terms making up the objective.
    fn soft_terms(&self) -> &[SoftTerm];

    /// Decodes a solution. Must be deterministic.
    fn decode(&self, solution: &CpSolution) -> Self::Output;

    /// Per-term contributions.
    fn decode_scores(&self, solution: &CpSolution) -> Vec<Score> {
        self.soft_terms().iter().map(|t| t.score(solution)).collect()
    }
}

/// Orchestrator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// No model loaded.
    Unbuilt,
    /// Model loaded, not yet solved.
    Built,
    /// Search in progress.
    Solving,
    /// Search ended with a solution.
    Solved(SolveStatus),
    /// Search ended without a solution.
    Infeasible(SolveStatus),
}

impl SearchState {
    /// Lower-case state name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unbuilt => "unbuilt",
            Self::Built => "built",
            Self::Solving => "solving",
            Self::Solved(_) => "solved",
            Self::Infeasible(_) => "infeasible",
        }
    }
}

/// An improving solution, as reported during the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionEvent<T> {
    /// 1-based position in the stream of improving solutions.
    pub index: usize,
    /// Objective value.
    pub objective: i64,
    /// Decoded solution.
    pub solution: T,
    /// Per-term score breakdown.
    pub scores: Vec<Score>,
}

/// Final outcome of a successful search.
#[derive(Debug, Clone)]
pub struct SolveReport<T> {
    /// `Optimal` or `Feasible`.
    pub status: SolveStatus,
    /// Objective value of the best solution.
    pub objective: i64,
    /// Best solution, decoded.
    pub solution: T,
    /// Score breakdown of the best solution.
    pub scores: Vec<Score>,
    /// Search statistics.
    pub stats: SearchStats,
}

/// Runs one search over one model.
pub struct SearchOrchestrator<D: ModelDecoder, S: CpSolver = SimpleCpSolver> {
    solver: S,
    config: SolverConfig,
    decoder: Option<D>,
    state: SearchState,
}

impl<D: ModelDecoder> SearchOrchestrator<D> {
    /// Creates an orchestrator using the bundled solver.
    pub fn new(config: SolverConfig) -> Self {
        Self::with_solver(SimpleCpSolver::new(), config)
    }
}

impl<D: ModelDecoder, S: CpSolver> SearchOrchestrator<D, S> {
    /// Creates an orchestrator with a specific solver.
    pub fn with_solver(solver: S, config: SolverConfig) -> Self {
        Self {
            solver,
            config,
            decoder: None,
            state: SearchState::Unbuilt,
        }
    }

    /// Current state.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Loaded model, if any.
    pub fn decoder(&self) -> Option<&D> {
        self.decoder.as_ref()
    }

    /// Loads a built model.
    ///
    /// # Errors
    /// [`Error::InvalidState`] unless the orchestrator is `Unbuilt`.
    pub fn load(&mut self, decoder: D) -> Result<()> {
        if self.state != SearchState::Unbuilt {
            return Err(Error::InvalidState {
                action: "load a model",
                state: self.state.label(),
            });
        }
        self.decoder = Some(decoder);
        self.state = SearchState::Built;
        Ok(())
    }

    /// Runs the search, reporting every improving solution in order.
    ///
    /// `on_solution` may return [`SearchControl::Stop`] to end the search
    /// early; the best solution so far is then reported as `Feasible`.
    ///
    /// # Errors
    /// - [`Error::InvalidState`] unless the orchestrator is `Built`.
    /// - [`Error::NoSolution`] if the solver ends without a solution.
    pub fn solve<F>(&mut self, mut on_solution: F) -> Result<SolveReport<D::Output>>
    where
        F: FnMut(SolutionEvent<D::Output>) -> SearchControl,
    {
        let Some(decoder) = self.decoder.as_ref().filter(|_| self.state == SearchState::Built)
        else {
            return Err(Error::InvalidState {
                action: "solve",
                state: self.state.label(),
            });
        };
        self.state = SearchState::Solving;

        let mut index = 0;
        let result = self.solver.solve_with_callback(
            decoder.model(),
            &self.config,
            &mut |solution: &CpSolution| {
                index += 1;
                tracing::info!(index, objective = solution.objective(), "solution found");
                on_solution(SolutionEvent {
                    index,
                    objective: solution.objective(),
                    solution: decoder.decode(solution),
                    scores: decoder.decode_scores(solution),
                })
            },
        );

        tracing::info!(
            status = %result.status,
            solutions = result.stats.solutions,
            elapsed_ms = result.stats.elapsed.as_millis() as u64,
            "search finished"
        );
        match result.best {
            Some(best) if result.status.has_solution() => {
                let report = SolveReport {
                    status: result.status,
                    objective: best.objective(),
                    solution: decoder.decode(&best),
                    scores: decoder.decode_scores(&best),
                    stats: result.stats,
                };
                self.state = SearchState::Solved(result.status);
                Ok(report)
            }
            _ => {
                self.state = SearchState::Infeasible(result.status);
                Err(Error::NoSolution {
                    status: result.status,
                })
            }
        }
    }
}

/// Builds the assignment model for a session and solves it with the
/// bundled solver.
pub fn solve_session<F>(
    session: &Session,
    config: SolverConfig,
    on_solution: F,
) -> Result<SolveReport<Vec<Assignment>>>
where
    F: FnMut(SolutionEvent<Vec<Assignment>>) -> SearchControl,
{
    let model = AssignmentModelBuilder::new(session)?.build()?;
    let mut orchestrator = SearchOrchestrator::new(config);
    orchestrator.load(model)?;
    orchestrator.solve(on_solution)
}
