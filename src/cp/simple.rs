//! Bundled depth-first branch-and-bound solver.
//!
//! Enumerates boolean variables in creation order and derives every
//! integer variable from the constraints that define it (linear
//! equalities, `abs`, products, divisions). Partial assignments are
//! pruned with interval reasoning on pure-boolean constraints and with
//! an optimistic objective bound. The bound pushes the intervals of the
//! booleans through the derived integers, so penalties such as squared
//! deviations tighten as soon as a partial assignment commits to them.
//!
//! Suitable for small and medium models (tens of booleans per
//! constraint family). The search is exhaustive, so a finished run
//! proves optimality (or infeasibility). Larger models call for a
//! production engine behind [`CpSolver`].
//!
//! # Reference
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete
//!   Programming Problems"
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint
//!   Programming", Ch. 4: Backtracking Search Algorithms

use std::time::{Duration, Instant};

use super::{
    Constraint, ConstraintKind, CpModel, CpSolution, CpSolver, SearchControl, SearchStats,
    SolveResult, SolveStatus, SolverConfig, VarId, VarKind,
};

/// Nodes between two deadline checks.
const CLOCK_CHECK_INTERVAL: u64 = 1024;

/// Exhaustive branch-and-bound solver.
///
/// # Example
/// ```
/// use u_assign::cp::{CpModel, CpSolver, LinearExpr, SimpleCpSolver, SolveStatus, SolverConfig};
///
/// let mut model = CpModel::new("pick");
/// let a = model.new_bool_var("a").unwrap();
/// let b = model.new_bool_var("b").unwrap();
/// model.add_equality(LinearExpr::sum([a, b]), 1);
/// model.maximize(LinearExpr::new().with_term(a, 1).with_term(b, 2));
///
/// let result = SimpleCpSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(result.status, SolveStatus::Optimal);
/// assert!(result.best.unwrap().boolean_value(b));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimpleCpSolver;

impl SimpleCpSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

/// How an integer variable is computed once every boolean is fixed.
#[derive(Debug, Clone)]
enum Derivation {
    Linear {
        target: VarId,
        coef: i64,
        constraint: usize,
    },
    Abs {
        target: VarId,
        source: VarId,
    },
    Product {
        target: VarId,
        left: VarId,
        right: VarId,
    },
    Quotient {
        target: VarId,
        numerator: VarId,
        denominator: i64,
    },
}

/// Orders the derivations of integer variables, or `None` if one of
/// them is not functionally defined by the booleans.
fn plan_derivations(model: &CpModel) -> Option<Vec<Derivation>> {
    let mut known: Vec<bool> = model
        .variables()
        .iter()
        .map(|v| v.kind == VarKind::Bool)
        .collect();
    let mut used = vec![false; model.constraint_count()];
    let mut plan = Vec::new();

    loop {
        let mut progress = false;
        for (index, constraint) in model.constraints().iter().enumerate() {
            if used[index] || !constraint.enforcement.is_empty() {
                continue;
            }
            let derivation = match &constraint.kind {
                ConstraintKind::Linear { expr, lo, hi } if lo == hi => {
                    let mut unknown = expr.terms().iter().filter(|(v, _)| !known[v.index()]);
                    match (unknown.next(), unknown.next()) {
                        (Some(&(target, coef)), None) => Some(Derivation::Linear {
                            target,
                            coef,
                            constraint: index,
                        }),
                        _ => None,
                    }
                }
                ConstraintKind::AbsEquality { target, var }
                    if known[var.index()] && !known[target.index()] =>
                {
                    Some(Derivation::Abs {
                        target: *target,
                        source: *var,
                    })
                }
                ConstraintKind::MultiplicationEquality {
                    target,
                    left,
                    right,
                } if known[left.index()] && known[right.index()] && !known[target.index()] => {
                    Some(Derivation::Product {
                        target: *target,
                        left: *left,
                        right: *right,
                    })
                }
                ConstraintKind::DivisionEquality {
                    target,
                    numerator,
                    denominator,
                } if *denominator != 0
                    && known[numerator.index()]
                    && !known[target.index()] =>
                {
                    Some(Derivation::Quotient {
                        target: *target,
                        numerator: *numerator,
                        denominator: *denominator,
                    })
                }
                _ => None,
            };
            if let Some(derivation) = derivation {
                let target = match &derivation {
                    Derivation::Linear { target, .. }
                    | Derivation::Abs { target, .. }
                    | Derivation::Product { target, .. }
                    | Derivation::Quotient { target, .. } => *target,
                };
                known[target.index()] = true;
                used[index] = true;
                plan.push(derivation);
                progress = true;
            }
        }
        if !progress {
            break;
        }
    }

    known.iter().all(|&k| k).then_some(plan)
}

struct Search<'a> {
    model: &'a CpModel,
    plan: Vec<Derivation>,
    decisions: Vec<VarId>,
    /// Pure-boolean constraints watching each variable.
    watches: Vec<Vec<usize>>,
    /// Preferred first value per decision.
    first_value: Vec<i64>,
    values: Vec<i64>,
    assigned: Vec<bool>,
    best: Option<CpSolution>,
    deadline: Option<Instant>,
    log_progress: bool,
    stopped: bool,
    timed_out: bool,
    nodes: u64,
    solutions: u64,
}

impl<'a> Search<'a> {
    fn new(model: &'a CpModel, plan: Vec<Derivation>, deadline: Option<Instant>) -> Self {
        let variables = model.variables();
        let decisions: Vec<VarId> = (0..variables.len())
            .map(VarId)
            .filter(|v| variables[v.index()].kind == VarKind::Bool)
            .collect();

        let mut watches = vec![Vec::new(); variables.len()];
        for (index, constraint) in model.constraints().iter().enumerate() {
            if is_boolean_constraint(model, constraint) {
                for var in constraint.variables() {
                    if watches[var.index()].last() != Some(&index) {
                        watches[var.index()].push(index);
                    }
                }
            }
        }

        let mut first_value = vec![1; variables.len()];
        for &(var, coef) in model.objective().terms() {
            if coef < 0 {
                first_value[var.index()] = 0;
            }
        }

        Self {
            model,
            plan,
            decisions,
            watches,
            first_value,
            values: vec![0; variables.len()],
            assigned: vec![false; variables.len()],
            best: None,
            deadline,
            log_progress: false,
            stopped: false,
            timed_out: false,
            nodes: 0,
            solutions: 0,
        }
    }

    /// Whether every pure-boolean constraint can still hold.
    fn root_consistent(&self) -> bool {
        self.model
            .constraints()
            .iter()
            .filter(|c| is_boolean_constraint(self.model, c))
            .all(|c| self.may_hold(c))
    }

    fn may_hold(&self, constraint: &Constraint) -> bool {
        for lit in &constraint.enforcement {
            if !self.assigned[lit.index()] || self.values[lit.index()] == 0 {
                return true;
            }
        }
        match &constraint.kind {
            ConstraintKind::Linear { expr, lo, hi } => {
                let (mut min, mut max) = (expr.offset(), expr.offset());
                for &(var, coef) in expr.terms() {
                    if self.assigned[var.index()] {
                        let contribution = coef * self.values[var.index()];
                        min += contribution;
                        max += contribution;
                    } else if coef > 0 {
                        max += coef;
                    } else {
                        min += coef;
                    }
                }
                min <= *hi && max >= *lo
            }
            ConstraintKind::BoolOr { literals } => literals
                .iter()
                .any(|v| !self.assigned[v.index()] || self.values[v.index()] != 0),
            _ => true,
        }
    }

    fn consistent_after(&self, var: VarId) -> bool {
        self.watches[var.index()]
            .iter()
            .all(|&index| self.may_hold(&self.model.constraints()[index]))
    }

    /// Interval of every variable under the current partial assignment,
    /// or `None` if some derived integer has no value left in its domain.
    ///
    /// Derived integers are exact functions of the booleans, so pushing
    /// the boolean intervals through the derivation plan bounds them.
    fn intervals(&self) -> Option<Vec<(i64, i64)>> {
        let mut bounds: Vec<(i64, i64)> = self
            .model
            .variables()
            .iter()
            .enumerate()
            .map(|(i, v)| match v.kind {
                VarKind::Bool if self.assigned[i] => (self.values[i], self.values[i]),
                VarKind::Bool => (0, 1),
                VarKind::Int => (v.min, v.max),
            })
            .collect();

        for derivation in &self.plan {
            let (target, (lo, hi)) = match derivation {
                Derivation::Linear {
                    target,
                    coef,
                    constraint,
                } => {
                    let ConstraintKind::Linear { expr, lo, .. } =
                        &self.model.constraints()[*constraint].kind
                    else {
                        continue;
                    };
                    // coef·target = lo - offset - Σ others
                    let base = lo.saturating_sub(expr.offset());
                    let (rest_lo, rest_hi) = expr
                        .terms()
                        .iter()
                        .filter(|(v, _)| v != target)
                        .fold((base, base), |(rlo, rhi), &(v, c)| {
                            let (vlo, vhi) = bounds[v.index()];
                            let (a, b) = (c.saturating_mul(vlo), c.saturating_mul(vhi));
                            (rlo.saturating_sub(a.max(b)), rhi.saturating_sub(a.min(b)))
                        });
                    let interval = if *coef > 0 {
                        (div_ceil(rest_lo, *coef), div_floor(rest_hi, *coef))
                    } else {
                        (div_ceil(rest_hi, *coef), div_floor(rest_lo, *coef))
                    };
                    (*target, interval)
                }
                Derivation::Abs { target, source } => {
                    let (slo, shi) = bounds[source.index()];
                    let interval = if slo >= 0 {
                        (slo, shi)
                    } else if shi <= 0 {
                        (shi.saturating_neg(), slo.saturating_neg())
                    } else {
                        (0, slo.saturating_neg().max(shi))
                    };
                    (*target, interval)
                }
                Derivation::Product {
                    target,
                    left,
                    right,
                } => {
                    let (llo, lhi) = bounds[left.index()];
                    let (rlo, rhi) = bounds[right.index()];
                    let corners = [
                        llo.saturating_mul(rlo),
                        llo.saturating_mul(rhi),
                        lhi.saturating_mul(rlo),
                        lhi.saturating_mul(rhi),
                    ];
                    let lo = corners.iter().copied().min().unwrap_or(i64::MIN);
                    let hi = corners.iter().copied().max().unwrap_or(i64::MAX);
                    (*target, (lo, hi))
                }
                Derivation::Quotient {
                    target,
                    numerator,
                    denominator,
                } => {
                    let (nlo, nhi) = bounds[numerator.index()];
                    let div = |n: i64| n.checked_div(*denominator).unwrap_or(i64::MAX);
                    let interval = if *denominator > 0 {
                        (div(nlo), div(nhi))
                    } else {
                        (div(nhi), div(nlo))
                    };
                    (*target, interval)
                }
            };
            let variable = self.model.variable(target);
            let (lo, hi) = (lo.max(variable.min), hi.min(variable.max));
            if lo > hi {
                return None;
            }
            bounds[target.index()] = (lo, hi);
        }
        Some(bounds)
    }

    /// Optimistic objective value of the current partial assignment.
    fn upper_bound(&self) -> i64 {
        let Some(bounds) = self.intervals() else {
            return i64::MIN;
        };
        let objective = self.model.objective();
        objective
            .terms()
            .iter()
            .fold(objective.offset(), |acc, &(var, coef)| {
                let (lo, hi) = bounds[var.index()];
                let best = if coef > 0 {
                    coef.saturating_mul(hi)
                } else {
                    coef.saturating_mul(lo)
                };
                acc.saturating_add(best)
            })
    }

    fn search(&mut self, depth: usize, on_solution: &mut dyn FnMut(&CpSolution) -> SearchControl) {
        if self.stopped {
            return;
        }
        self.nodes += 1;
        if self.nodes % CLOCK_CHECK_INTERVAL == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.stopped = true;
                    self.timed_out = true;
                    return;
                }
            }
        }
        if let Some(best) = &self.best {
            if self.upper_bound() <= best.objective() {
                return;
            }
        }
        if depth == self.decisions.len() {
            self.evaluate_leaf(on_solution);
            return;
        }

        let var = self.decisions[depth];
        let first = self.first_value[var.index()];
        for value in [first, 1 - first] {
            self.values[var.index()] = value;
            self.assigned[var.index()] = true;
            if self.consistent_after(var) {
                self.search(depth + 1, on_solution);
            }
            self.assigned[var.index()] = false;
            if self.stopped {
                return;
            }
        }
        self.values[var.index()] = 0;
    }

    fn derive(&mut self) -> bool {
        for derivation in &self.plan {
            let (target, value) = match derivation {
                Derivation::Linear {
                    target,
                    coef,
                    constraint,
                } => {
                    let ConstraintKind::Linear { expr, lo, .. } =
                        &self.model.constraints()[*constraint].kind
                    else {
                        return false;
                    };
                    let rest = expr
                        .terms()
                        .iter()
                        .filter(|(v, _)| v != target)
                        .fold(*lo - expr.offset(), |acc, &(v, c)| {
                            acc - c * self.values[v.index()]
                        });
                    if rest % coef != 0 {
                        return false;
                    }
                    (*target, rest / coef)
                }
                Derivation::Abs { target, source } => {
                    (*target, self.values[source.index()].abs())
                }
                Derivation::Product {
                    target,
                    left,
                    right,
                } => match self.values[left.index()].checked_mul(self.values[right.index()]) {
                    Some(product) => (*target, product),
                    None => return false,
                },
                Derivation::Quotient {
                    target,
                    numerator,
                    denominator,
                } => (*target, self.values[numerator.index()] / denominator),
            };
            if !self.model.variable(target).contains(value) {
                return false;
            }
            self.values[target.index()] = value;
        }
        true
    }

    fn evaluate_leaf(&mut self, on_solution: &mut dyn FnMut(&CpSolution) -> SearchControl) {
        if !self.derive() {
            return;
        }
        let feasible = self
            .model
            .variables()
            .iter()
            .zip(&self.values)
            .all(|(variable, &value)| variable.contains(value))
            && self
                .model
                .constraints()
                .iter()
                .all(|c| c.is_satisfied(&self.values));
        if !feasible {
            return;
        }

        let objective = self.model.objective().evaluate(&self.values);
        if self.best.as_ref().is_some_and(|b| objective <= b.objective()) {
            return;
        }
        let solution = CpSolution::new(self.values.clone(), objective);
        self.solutions += 1;
        if self.log_progress {
            tracing::info!(objective, nodes = self.nodes, "improving solution");
        } else {
            tracing::trace!(objective, nodes = self.nodes, "improving solution");
        }
        if on_solution(&solution) == SearchControl::Stop {
            self.stopped = true;
        }
        self.best = Some(solution);
    }
}

/// `⌊a / b⌋`, saturating.
fn div_floor(a: i64, b: i64) -> i64 {
    match (a.checked_div(b), a.checked_rem(b)) {
        (Some(q), Some(r)) if r != 0 && (r < 0) != (b < 0) => q - 1,
        (Some(q), _) => q,
        (None, _) => i64::MAX,
    }
}

/// `⌈a / b⌉`, saturating.
fn div_ceil(a: i64, b: i64) -> i64 {
    match (a.checked_div(b), a.checked_rem(b)) {
        (Some(q), Some(r)) if r != 0 && (r < 0) == (b < 0) => q + 1,
        (Some(q), _) => q,
        (None, _) => i64::MAX,
    }
}

fn is_boolean_constraint(model: &CpModel, constraint: &Constraint) -> bool {
    let boolean = |v: &VarId| model.variable(*v).kind == VarKind::Bool;
    match &constraint.kind {
        ConstraintKind::Linear { expr, .. } => {
            expr.terms().iter().all(|(v, _)| boolean(v)) && constraint.enforcement.iter().all(boolean)
        }
        ConstraintKind::BoolOr { literals } => {
            literals.iter().all(boolean) && constraint.enforcement.iter().all(boolean)
        }
        _ => false,
    }
}

impl CpSolver for SimpleCpSolver {
    fn solve_with_callback(
        &self,
        model: &CpModel,
        config: &SolverConfig,
        on_solution: &mut dyn FnMut(&CpSolution) -> SearchControl,
    ) -> SolveResult {
        let started = Instant::now();
        tracing::debug!(
            model = model.name(),
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            workers = config.num_workers,
            "starting search"
        );
        if config.num_workers > 1 {
            tracing::debug!("simple solver runs a single search worker");
        }

        let has_zero_division = model.constraints().iter().any(|c| {
            matches!(
                c.kind,
                ConstraintKind::DivisionEquality { denominator: 0, .. }
            )
        });
        let plan = match plan_derivations(model) {
            Some(plan) if !has_zero_division => plan,
            _ => {
                tracing::warn!(model = model.name(), "integer variables are not derivable");
                return SolveResult {
                    status: SolveStatus::ModelInvalid,
                    best: None,
                    stats: SearchStats {
                        elapsed: started.elapsed(),
                        ..SearchStats::default()
                    },
                };
            }
        };

        let deadline = config.max_time.map(|limit: Duration| started + limit);
        let mut search = Search::new(model, plan, deadline);
        search.log_progress = config.log_search_progress;
        if search.root_consistent() {
            search.search(0, on_solution);
        }

        let status = match (&search.best, search.stopped) {
            (Some(_), false) => SolveStatus::Optimal,
            (Some(_), true) => SolveStatus::Feasible,
            (None, false) => SolveStatus::Infeasible,
            (None, true) => SolveStatus::Unknown,
        };
        let stats = SearchStats {
            nodes: search.nodes,
            solutions: search.solutions,
            elapsed: started.elapsed(),
        };
        tracing::debug!(
            %status,
            nodes = stats.nodes,
            solutions = stats.solutions,
            timed_out = search.timed_out,
            "search finished"
        );
        SolveResult {
            status,
            best: search.best,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::LinearExpr;

    fn solve(model: &CpModel) -> SolveResult {
        SimpleCpSolver::new().solve(model, &SolverConfig::default())
    }

    #[test]
    fn test_exactly_one_maximize() {
        let mut model = CpModel::new("m");
        let vars: Vec<VarId> = (0..3)
            .map(|i| model.new_bool_var(format!("x{i}")).unwrap())
            .collect();
        model.add_equality(LinearExpr::sum(vars.iter().copied()), 1);
        model.maximize(LinearExpr::weighted_sum([(vars[0], 2), (vars[1], 7), (vars[2], 3)]));

        let result = solve(&model);
        assert_eq!(result.status, SolveStatus::Optimal);
        let best = result.best.unwrap();
        assert_eq!(best.objective(), 7);
        assert!(best.boolean_value(vars[1]));
        assert!(!best.boolean_value(vars[0]));
    }

    #[test]
    fn test_infeasible() {
        let mut model = CpModel::new("m");
        let a = model.new_bool_var("a").unwrap();
        model.add_equality(LinearExpr::from(a), 1);
        model.add_equality(LinearExpr::from(a), 0);
        let result = solve(&model);
        assert_eq!(result.status, SolveStatus::Infeasible);
        assert!(result.best.is_none());
    }

    #[test]
    fn test_callback_sees_strict_improvements() {
        let mut model = CpModel::new("m");
        let vars: Vec<VarId> = (0..4)
            .map(|i| model.new_bool_var(format!("x{i}")).unwrap())
            .collect();
        model.add_less_or_equal(LinearExpr::sum(vars.iter().copied()), 2);
        model.maximize(LinearExpr::weighted_sum(
            vars.iter().zip([1, 2, 3, 4]).map(|(&v, w)| (v, w)),
        ));

        let mut seen = Vec::new();
        let result = SimpleCpSolver::new().solve_with_callback(
            &model,
            &SolverConfig::default(),
            &mut |s| {
                seen.push(s.objective());
                SearchControl::Continue
            },
        );
        assert_eq!(result.status, SolveStatus::Optimal);
        assert_eq!(result.best.unwrap().objective(), 7);
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*seen.last().unwrap(), 7);
    }

    #[test]
    fn test_callback_stop() {
        let mut model = CpModel::new("m");
        let vars: Vec<VarId> = (0..4)
            .map(|i| model.new_bool_var(format!("x{i}")).unwrap())
            .collect();
        model.maximize(LinearExpr::sum(vars.iter().copied()));

        let mut calls = 0;
        let result = SimpleCpSolver::new().solve_with_callback(
            &model,
            &SolverConfig::default(),
            &mut |_| {
                calls += 1;
                SearchControl::Stop
            },
        );
        assert_eq!(calls, 1);
        assert_eq!(result.status, SolveStatus::Feasible);
    }

    #[test]
    fn test_derived_quadratic_deviation() {
        // Two items, weights 1 and 3, target 2: minimize (sum - 2)^2.
        let mut model = CpModel::new("m");
        let a = model.new_bool_var("a").unwrap();
        let b = model.new_bool_var("b").unwrap();
        let delta = model.new_int_var("delta", -4, 4).unwrap();
        let distance = model.new_int_var("distance", 0, 4).unwrap();
        let squared = model.new_int_var("squared", 0, 16).unwrap();
        model.add_equality(
            LinearExpr::weighted_sum([(a, 1), (b, 3), (delta, -1)]),
            2,
        );
        model.add_abs_equality(distance, delta);
        model.add_multiplication_equality(squared, distance, distance);
        model.maximize(LinearExpr::new().with_term(squared, -1));

        let best = solve(&model).best.unwrap();
        assert_eq!(best.value(squared), 1);
        assert_eq!(best.objective(), -1);
    }

    #[test]
    fn test_division_truncates() {
        let mut model = CpModel::new("m");
        let a = model.new_bool_var("a").unwrap();
        let scaled = model.new_int_var("scaled", 0, 700).unwrap();
        let percent = model.new_int_var("percent", 0, 700).unwrap();
        model.add_equality(LinearExpr::new().with_term(a, 700).with_term(scaled, -1), 0);
        model.add_division_equality(percent, scaled, 3);
        model.maximize(LinearExpr::from(percent));

        let best = solve(&model).best.unwrap();
        assert_eq!(best.value(percent), 233);
    }

    #[test]
    fn test_underivable_integer_is_invalid() {
        let mut model = CpModel::new("m");
        model.new_int_var("free", 0, 10).unwrap();
        assert_eq!(solve(&model).status, SolveStatus::ModelInvalid);

        let mut model = CpModel::new("m");
        let a = model.new_bool_var("a").unwrap();
        let q = model.new_int_var("q", 0, 10).unwrap();
        model.add_division_equality(q, a, 0);
        assert_eq!(solve(&model).status, SolveStatus::ModelInvalid);
    }

    #[test]
    fn test_bool_or_with_enforcement() {
        let mut model = CpModel::new("m");
        let a = model.new_bool_var("a").unwrap();
        let b = model.new_bool_var("b").unwrap();
        let gate = model.new_bool_var("gate").unwrap();
        model.add_bool_or(vec![a, b]).only_enforce_if(gate);
        model.add_equality(LinearExpr::sum([a, b]), 0);
        model.maximize(LinearExpr::from(gate));

        let best = solve(&model).best.unwrap();
        // Gate cannot be on with both literals off.
        assert!(!best.boolean_value(gate));
        assert_eq!(best.objective(), 0);
    }

    fn squared_sum_model(n: usize) -> (CpModel, Vec<VarId>, VarId) {
        let mut model = CpModel::new("m");
        let bits: Vec<VarId> = (0..n)
            .map(|i| model.new_bool_var(format!("b{i}")).unwrap())
            .collect();
        let n = n as i64;
        let delta = model.new_int_var("delta", -n, n).unwrap();
        let distance = model.new_int_var("distance", 0, n).unwrap();
        let squared = model.new_int_var("squared", 0, n * n).unwrap();
        model.add_equality(LinearExpr::sum(bits.iter().copied()).with_term(delta, -1), 0);
        model.add_abs_equality(distance, delta);
        model.add_multiplication_equality(squared, distance, distance);
        model.maximize(LinearExpr::new().with_term(squared, -1));
        (model, bits, squared)
    }

    #[test]
    fn test_bound_follows_derived_integers() {
        let (model, bits, _) = squared_sum_model(3);
        let plan = plan_derivations(&model).unwrap();
        let mut search = Search::new(&model, plan, None);
        assert_eq!(search.upper_bound(), 0);

        // Two ones committed: the squared deviation is at least 4.
        for &bit in &bits[..2] {
            search.values[bit.index()] = 1;
            search.assigned[bit.index()] = true;
        }
        assert_eq!(search.upper_bound(), -4);
    }

    #[test]
    fn test_bound_prunes_quadratic_penalty() {
        let (model, bits, squared) = squared_sum_model(12);
        let result = solve(&model);
        assert_eq!(result.status, SolveStatus::Optimal);
        let best = result.best.unwrap();
        assert_eq!(best.value(squared), 0);
        assert!(bits.iter().all(|&b| !best.boolean_value(b)));
        // Full enumeration visits 2^13 - 1 nodes.
        assert!(result.stats.nodes < 4096, "nodes: {}", result.stats.nodes);
    }

    #[test]
    fn test_rounding_division() {
        assert_eq!(div_floor(7, 2), 3);
        assert_eq!(div_ceil(7, 2), 4);
        assert_eq!(div_floor(-7, 2), -4);
        assert_eq!(div_ceil(-7, 2), -3);
        assert_eq!(div_floor(7, -2), -4);
        assert_eq!(div_ceil(7, -2), -3);
        assert_eq!(div_floor(6, 3), 2);
        assert_eq!(div_ceil(6, 3), 2);
        assert_eq!(div_floor(i64::MIN, -1), i64::MAX);
    }

    #[test]
    fn test_time_limit_reports_partial_status() {
        let mut model = CpModel::new("m");
        let vars: Vec<VarId> = (0..40)
            .map(|i| model.new_bool_var(format!("x{i}")).unwrap())
            .collect();
        // Parity-like objective defeats the bound, forcing a wide search.
        model.add_equality(LinearExpr::sum(vars.iter().copied()), 20);
        model.maximize(LinearExpr::weighted_sum(
            vars.iter().enumerate().map(|(i, &v)| (v, if i % 2 == 0 { 1 } else { -1 })),
        ));
        let config = SolverConfig::default().with_max_time(Duration::ZERO);
        let result = SimpleCpSolver::new().solve(&model, &config);
        assert!(matches!(
            result.status,
            SolveStatus::Feasible | SolveStatus::Unknown | SolveStatus::Optimal
        ));
    }
}
