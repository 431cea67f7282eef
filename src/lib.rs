//! Task-to-agent assignment for the U-Engine ecosystem.
//!
//! Assigns every task of a session to exactly one agent, honoring fixed
//! assignments, while maximizing soft goals: tag affinity, group
//! co-assignment bonuses, and workload balance. The same machinery
//! resolves package versions for a request.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Agent`, `Task`, `TaskGroup`, `Settings`,
//!   `Assignment`, `Session`
//! - **`validation`**: Input integrity checks (duplicate names, unknown
//!   references, non-positive durations, negative weights)
//! - **`cp`**: Constraint model, solver contract, bundled solver
//! - **`assign`**: Session → constraint model, balance encoding, scores
//! - **`search`**: Single-use search orchestration and solution decoding
//! - **`runner`**: Cancellable out-of-process solving
//! - **`packages`**: Package version resolution
//! - **`kpi`**: Workload statistics
//! - **`generator`**: Seeded random sessions
//!
//! # Example
//! ```
//! use u_assign::cp::{SearchControl, SolverConfig};
//! use u_assign::models::{Agent, Session, Task};
//! use u_assign::search::solve_session;
//!
//! let session = Session::new()
//!     .with_agent(Agent::new("alice"))
//!     .with_agent(Agent::new("bob"))
//!     .with_task(Task::new("0010"))
//!     .with_task(Task::new("0020"));
//! let report = solve_session(&session, SolverConfig::default(), |_| SearchControl::Continue)
//!     .unwrap();
//! assert_eq!(report.solution.len(), 2);
//! ```
//!
//! # References
//!
//! - Pentico (2007), "Assignment problems: A golden anniversary survey"
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

pub mod assign;
pub mod cp;
pub mod error;
pub mod generator;
pub mod kpi;
pub mod models;
pub mod packages;
pub mod runner;
pub mod search;
pub mod validation;

pub use error::{Error, ModelError, Result};
