//! Deviation penalties for workload balancing.
//!
//! Encodes "stay close to a goal" as integer auxiliaries plus a soft
//! term. Only the objective is affected; the auxiliaries are fully
//! determined by the expression, so the encoding never makes a model
//! infeasible.
//!
//! # Quadratic
//! ```text
//! delta    = expr - goal      in [-domain, domain]
//! distance = |delta|          in [0, domain]
//! squared  = distance²        in [0, domain²]
//! score    = -multiplier · squared
//! ```
//!
//! # Aggregate linear
//! Per-expression distances are summed, scaled by 100 and divided by the
//! domain, so hours and task counts yield comparable percentages before
//! the multiplier is applied.

use super::SoftTerm;
use crate::cp::{CpModel, LinearExpr, VarId};
use crate::error::ModelError;

/// Builds deviation penalties over a fixed value domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceEncoder {
    domain: i64,
    multiplier: i64,
}

impl BalanceEncoder {
    /// Creates an encoder.
    ///
    /// # Arguments
    /// * `domain` - Largest possible value of the balanced expressions.
    /// * `multiplier` - Cost per unit of penalty (settings weight).
    pub fn new(domain: i64, multiplier: i64) -> Self {
        Self {
            domain: domain.max(0),
            multiplier,
        }
    }

    /// Value domain.
    pub fn domain(&self) -> i64 {
        self.domain
    }

    /// Adds `{prefix}_delta` and `{prefix}_distance`, returning the
    /// distance variable.
    fn distance(
        &self,
        model: &mut CpModel,
        prefix: &str,
        expr: LinearExpr,
        goal: i64,
    ) -> Result<VarId, ModelError> {
        let delta = model.new_int_var(
            model.unique_name(&format!("{prefix}_delta")),
            -self.domain,
            self.domain,
        )?;
        let distance = model.new_int_var(
            model.unique_name(&format!("{prefix}_distance")),
            0,
            self.domain,
        )?;
        model.add_equality(expr.with_term(delta, -1), goal);
        model.add_abs_equality(distance, delta);
        Ok(distance)
    }

    /// Quadratic penalty on `|expr - goal|`.
    ///
    /// The soft term scores `{prefix}_cost` (the squared distance) with
    /// weight `-multiplier`.
    pub fn encode(
        &self,
        model: &mut CpModel,
        prefix: &str,
        expr: LinearExpr,
        goal: i64,
    ) -> Result<SoftTerm, ModelError> {
        let distance = self.distance(model, prefix, expr, goal)?;
        let squared = model.new_int_var(
            model.unique_name(&format!("{prefix}_cost")),
            0,
            self.domain.saturating_mul(self.domain),
        )?;
        model.add_multiplication_equality(squared, distance, distance);
        Ok(SoftTerm::new(prefix, squared, -self.multiplier))
    }

    /// Summed, domain-relative linear penalty over several expressions.
    ///
    /// `targets` pairs a name suffix with an expression and its goal.
    pub fn encode_aggregate(
        &self,
        model: &mut CpModel,
        prefix: &str,
        targets: Vec<(String, LinearExpr, i64)>,
    ) -> Result<SoftTerm, ModelError> {
        let count = targets.len() as i64;
        let mut distances = Vec::with_capacity(targets.len());
        for (suffix, expr, goal) in targets {
            distances.push(self.distance(model, &format!("{prefix}_{suffix}"), expr, goal)?);
        }

        let sum_max = self.domain.saturating_mul(count);
        let scaled = model.new_int_var(
            model.unique_name(&format!("{prefix}_scaled")),
            0,
            sum_max.saturating_mul(100),
        )?;
        let expr = distances
            .iter()
            .fold(LinearExpr::new(), |e, &d| e.with_term(d, 100))
            .with_term(scaled, -1);
        model.add_equality(expr, 0);

        let percent = model.new_int_var(
            model.unique_name(&format!("{prefix}_cost")),
            0,
            count.saturating_mul(100),
        )?;
        model.add_division_equality(percent, scaled, self.domain.max(1));
        Ok(SoftTerm::new(prefix, percent, -self.multiplier))
    }
}
