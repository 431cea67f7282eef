//! Assignment model construction.
//!
//! Translates a [`Session`](crate::models::Session) into a [`CpModel`](crate::cp::CpModel):
//!
//! | Element | Encoding |
//! |---------|----------|
//! | Agent does task | boolean `assign_task_{task}_to_{agent}` |
//! | Task coverage | Σ over agents == 1 (hard) |
//! | Fixed assignment | variable == 1 (hard) |
//! | Tag affinity | pair variable × Σ matching tag weights (soft) |
//! | Group | transition boolean, weight = group weight (soft) |
//! | Workload / task count | [`BalanceEncoder`] penalties (soft) |
//!
//! The objective is the sum of every soft term, maximized.
//!
//! # Reference
//! - Pentico (2007), "Assignment problems: A golden anniversary survey"

mod balance;
mod builder;
mod score;

pub use balance::BalanceEncoder;
pub use builder::{assignment_variable_name, AssignmentModel, AssignmentModelBuilder};
pub use score::{Score, ScoreBreakdown, SoftTerm};
