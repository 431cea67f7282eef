//! Constraint programming layer.
//!
//! A small integer/boolean modeling API ([`CpModel`]) and the solver
//! contract ([`CpSolver`]) that the assignment and package formulations
//! are written against. [`SimpleCpSolver`] is the bundled engine; a
//! faster engine can be dropped in behind the same trait.
//!
//! # Supported constraints
//!
//! | Constraint | Meaning |
//! |------------|---------|
//! | Linear | `lo <= Σ coef·var + c <= hi` |
//! | BoolOr | at least one literal true |
//! | AbsEquality | `t == abs(x)` |
//! | MultiplicationEquality | `t == a·b` |
//! | DivisionEquality | `t == x / d`, truncated |
//!
//! Every constraint may be conditioned on enforcement literals.
//!
//! # Reference
//! - Perron & Didier, "CP-SAT", Google OR-Tools
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod simple;
mod solver;

pub use model::{
    Constraint, ConstraintId, ConstraintKind, ConstraintRef, CpModel, LinearExpr, VarId, VarKind,
    Variable,
};
pub use simple::SimpleCpSolver;
pub use solver::{
    CpSolution, CpSolver, SearchControl, SearchStats, SolveResult, SolveStatus, SolverConfig,
    DEFAULT_NUM_WORKERS,
};
