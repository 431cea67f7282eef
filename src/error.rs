//! Error types.

use crate::cp::SolveStatus;
use crate::validation::ValidationError;

/// Crate result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by model construction, search and the solve runner.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid session: {}", join_messages(.0))]
    InvalidSession(Vec<ValidationError>),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("No solution found! Status is {status}")]
    NoSolution { status: SolveStatus },

    #[error("Cannot {action} while the search is {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("Solve did not complete (worker exit code: {exit_code:?})")]
    Incomplete { exit_code: Option<i32> },

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Package error: {0}")]
    Package(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Precondition violations raised while building a constraint model.
///
/// These indicate a bug in the caller (or data that slipped past
/// validation); they are never recovered from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Duplicate variable name: {0}")]
    DuplicateName(String),

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Empty domain for {name}: [{min}, {max}]")]
    EmptyDomain { name: String, min: i64, max: i64 },
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
