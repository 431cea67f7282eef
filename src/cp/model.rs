//! Constraint model: variables, constraints and objective.
//!
//! A [`CpModel`] is a plain description of an integer/boolean
//! optimization problem. It carries no solving logic; any [`CpSolver`]
//! can consume it.
//!
//! [`CpSolver`]: super::CpSolver

use std::collections::HashMap;

use crate::error::ModelError;

/// Handle to a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in the model.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether a variable is a boolean decision or a bounded integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// 0/1 variable.
    Bool,
    /// Integer variable in `[min, max]`.
    Int,
}

/// A model variable.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Unique name.
    pub name: String,
    /// Variable kind.
    pub kind: VarKind,
    /// Domain lower bound (inclusive).
    pub min: i64,
    /// Domain upper bound (inclusive).
    pub max: i64,
}

impl Variable {
    /// Whether `value` lies in the domain.
    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// A linear expression `Σ coef·var + constant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
    constant: i64,
}

impl LinearExpr {
    /// The zero expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Sum of variables with coefficient 1.
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self::weighted_sum(vars.into_iter().map(|v| (v, 1)))
    }

    /// Sum of `coef·var` terms.
    pub fn weighted_sum<I: IntoIterator<Item = (VarId, i64)>>(terms: I) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            constant: 0,
        }
    }

    /// Adds a `coef·var` term.
    pub fn with_term(mut self, var: VarId, coef: i64) -> Self {
        self.terms.push((var, coef));
        self
    }

    /// Adds to the constant part.
    pub fn with_constant(mut self, value: i64) -> Self {
        self.constant += value;
        self
    }

    /// Adds a `coef·var` term in place.
    pub fn add_term(&mut self, var: VarId, coef: i64) {
        self.terms.push((var, coef));
    }

    /// The `coef·var` terms.
    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    /// The constant part.
    pub fn offset(&self) -> i64 {
        self.constant
    }

    /// Whether the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Merges repeated variables and drops zero coefficients.
    pub fn normalized(mut self) -> Self {
        let mut merged: Vec<(VarId, i64)> = Vec::with_capacity(self.terms.len());
        let mut position: HashMap<VarId, usize> = HashMap::new();
        for (var, coef) in self.terms.drain(..) {
            match position.get(&var) {
                Some(&i) => merged[i].1 += coef,
                None => {
                    position.insert(var, merged.len());
                    merged.push((var, coef));
                }
            }
        }
        merged.retain(|&(_, coef)| coef != 0);
        self.terms = merged;
        self
    }

    /// Evaluates the expression against a full value vector.
    pub fn evaluate(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, &(var, coef)| acc + coef * values[var.0])
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self::new().with_term(var, 1)
    }
}

/// Constraint payload.
#[derive(Debug, Clone)]
pub enum ConstraintKind {
    /// `lo <= expr <= hi`.
    Linear { expr: LinearExpr, lo: i64, hi: i64 },
    /// At least one literal is true.
    BoolOr { literals: Vec<VarId> },
    /// `target == |var|`.
    AbsEquality { target: VarId, var: VarId },
    /// `target == left * right`.
    MultiplicationEquality {
        target: VarId,
        left: VarId,
        right: VarId,
    },
    /// `target == numerator / denominator`, truncated toward zero.
    DivisionEquality {
        target: VarId,
        numerator: VarId,
        denominator: i64,
    },
}

/// A constraint, optionally enforced only when literals are true.
#[derive(Debug, Clone)]
pub struct Constraint {
    /// What must hold.
    pub kind: ConstraintKind,
    /// The constraint applies only if all of these are true.
    pub enforcement: Vec<VarId>,
}

impl Constraint {
    /// Whether the constraint holds for a full value vector.
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        if self.enforcement.iter().any(|v| values[v.0] == 0) {
            return true;
        }
        match &self.kind {
            ConstraintKind::Linear { expr, lo, hi } => {
                let value = expr.evaluate(values);
                *lo <= value && value <= *hi
            }
            ConstraintKind::BoolOr { literals } => literals.iter().any(|v| values[v.0] != 0),
            ConstraintKind::AbsEquality { target, var } => values[target.0] == values[var.0].abs(),
            ConstraintKind::MultiplicationEquality {
                target,
                left,
                right,
            } => values[left.0]
                .checked_mul(values[right.0])
                .is_some_and(|product| product == values[target.0]),
            ConstraintKind::DivisionEquality {
                target,
                numerator,
                denominator,
            } => *denominator != 0 && values[target.0] == values[numerator.0] / denominator,
        }
    }

    /// Every variable the constraint reads, enforcement literals included.
    pub fn variables(&self) -> Vec<VarId> {
        let mut vars = self.enforcement.clone();
        match &self.kind {
            ConstraintKind::Linear { expr, .. } => vars.extend(expr.terms().iter().map(|t| t.0)),
            ConstraintKind::BoolOr { literals } => vars.extend(literals.iter().copied()),
            ConstraintKind::AbsEquality { target, var } => vars.extend([*target, *var]),
            ConstraintKind::MultiplicationEquality {
                target,
                left,
                right,
            } => vars.extend([*target, *left, *right]),
            ConstraintKind::DivisionEquality {
                target, numerator, ..
            } => vars.extend([*target, *numerator]),
        }
        vars
    }
}

/// Index of a constraint in its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintId(pub(crate) usize);

/// Borrowed handle returned by the `add_*` methods, used to attach
/// enforcement literals.
pub struct ConstraintRef<'a> {
    model: &'a mut CpModel,
    id: ConstraintId,
}

impl ConstraintRef<'_> {
    /// Restricts the constraint to solutions where `literal` is true.
    pub fn only_enforce_if(self, literal: VarId) -> ConstraintId {
        self.model.constraints[self.id.0].enforcement.push(literal);
        self.id
    }

    /// The constraint index.
    pub fn id(&self) -> ConstraintId {
        self.id
    }
}

/// An integer/boolean optimization model with a maximized objective.
///
/// # Example
/// ```
/// use u_assign::cp::{CpModel, LinearExpr};
///
/// let mut model = CpModel::new("demo");
/// let a = model.new_bool_var("a").unwrap();
/// let b = model.new_bool_var("b").unwrap();
/// model.add_equality(LinearExpr::sum([a, b]), 1);
/// model.maximize(LinearExpr::new().with_term(a, 3).with_term(b, 5));
/// assert_eq!(model.variable_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    name: String,
    variables: Vec<Variable>,
    names: HashMap<String, VarId>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            names: HashMap::new(),
            constraints: Vec::new(),
            objective: LinearExpr::new(),
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a boolean variable.
    ///
    /// # Errors
    /// [`ModelError::DuplicateName`] if the name is already taken.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> Result<VarId, ModelError> {
        self.push_variable(name.into(), VarKind::Bool, 0, 1)
    }

    /// Creates an integer variable with domain `[min, max]`.
    ///
    /// # Errors
    /// [`ModelError::DuplicateName`] if the name is already taken,
    /// [`ModelError::EmptyDomain`] if `min > max`.
    pub fn new_int_var(
        &mut self,
        name: impl Into<String>,
        min: i64,
        max: i64,
    ) -> Result<VarId, ModelError> {
        let name = name.into();
        if min > max {
            return Err(ModelError::EmptyDomain { name, min, max });
        }
        self.push_variable(name, VarKind::Int, min, max)
    }

    fn push_variable(
        &mut self,
        name: String,
        kind: VarKind,
        min: i64,
        max: i64,
    ) -> Result<VarId, ModelError> {
        if self.names.contains_key(&name) {
            return Err(ModelError::DuplicateName(name));
        }
        let id = VarId(self.variables.len());
        self.names.insert(name.clone(), id);
        self.variables.push(Variable {
            name,
            kind,
            min,
            max,
        });
        Ok(id)
    }

    /// Looks up a variable by name.
    pub fn var_by_name(&self, name: &str) -> Option<VarId> {
        self.names.get(name).copied()
    }

    /// `base` if no variable uses it yet, otherwise `base#2`, `base#3`, …
    /// (the first free one).
    ///
    /// Names derived from user data can coincide (`a_to_b` + `c` and
    /// `a` + `b_to_c`); model builders pass such names through here.
    pub fn unique_name(&self, base: &str) -> String {
        if !self.names.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}#{n}"))
            .find(|name| !self.names.contains_key(name))
            .unwrap_or_else(|| base.to_string())
    }

    /// Variable metadata.
    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    /// All variables, in creation order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// All constraints, in creation order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    fn push_constraint(&mut self, kind: ConstraintKind) -> ConstraintRef<'_> {
        let id = ConstraintId(self.constraints.len());
        self.constraints.push(Constraint {
            kind,
            enforcement: Vec::new(),
        });
        ConstraintRef { model: self, id }
    }

    /// Adds `lo <= expr <= hi`.
    pub fn add_linear(&mut self, expr: LinearExpr, lo: i64, hi: i64) -> ConstraintRef<'_> {
        let expr = expr.normalized();
        self.push_constraint(ConstraintKind::Linear { expr, lo, hi })
    }

    /// Adds `expr == value`.
    pub fn add_equality(&mut self, expr: LinearExpr, value: i64) -> ConstraintRef<'_> {
        self.add_linear(expr, value, value)
    }

    /// Adds `expr <= value`.
    pub fn add_less_or_equal(&mut self, expr: LinearExpr, value: i64) -> ConstraintRef<'_> {
        self.add_linear(expr, i64::MIN, value)
    }

    /// Adds `expr >= value`.
    pub fn add_greater_or_equal(&mut self, expr: LinearExpr, value: i64) -> ConstraintRef<'_> {
        self.add_linear(expr, value, i64::MAX)
    }

    /// Adds `OR(literals)`.
    pub fn add_bool_or(&mut self, literals: Vec<VarId>) -> ConstraintRef<'_> {
        self.push_constraint(ConstraintKind::BoolOr { literals })
    }

    /// Adds `target == |var|`.
    pub fn add_abs_equality(&mut self, target: VarId, var: VarId) -> ConstraintRef<'_> {
        self.push_constraint(ConstraintKind::AbsEquality { target, var })
    }

    /// Adds `target == left * right`.
    pub fn add_multiplication_equality(
        &mut self,
        target: VarId,
        left: VarId,
        right: VarId,
    ) -> ConstraintRef<'_> {
        self.push_constraint(ConstraintKind::MultiplicationEquality {
            target,
            left,
            right,
        })
    }

    /// Adds `target == numerator / denominator` (truncated toward zero).
    pub fn add_division_equality(
        &mut self,
        target: VarId,
        numerator: VarId,
        denominator: i64,
    ) -> ConstraintRef<'_> {
        self.push_constraint(ConstraintKind::DivisionEquality {
            target,
            numerator,
            denominator,
        })
    }

    /// Sets the objective to maximize.
    pub fn maximize(&mut self, objective: LinearExpr) {
        self.objective = objective.normalized();
    }

    /// The maximized objective.
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_variable_name() {
        let mut model = CpModel::new("m");
        model.new_bool_var("x").unwrap();
        assert_eq!(
            model.new_int_var("x", 0, 3),
            Err(ModelError::DuplicateName("x".into()))
        );
    }

    #[test]
    fn test_unique_name() {
        let mut model = CpModel::new("m");
        assert_eq!(model.unique_name("x"), "x");
        model.new_bool_var("x").unwrap();
        model.new_bool_var("x#2").unwrap();
        assert_eq!(model.unique_name("x"), "x#3");
        assert_eq!(model.unique_name("y"), "y");
    }

    #[test]
    fn test_empty_domain() {
        let mut model = CpModel::new("m");
        assert!(matches!(
            model.new_int_var("y", 3, 1),
            Err(ModelError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn test_linear_expr_normalized() {
        let a = VarId(0);
        let b = VarId(1);
        let expr = LinearExpr::new()
            .with_term(a, 2)
            .with_term(b, 1)
            .with_term(a, -2)
            .with_constant(4)
            .normalized();
        assert_eq!(expr.terms(), &[(b, 1)]);
        assert_eq!(expr.offset(), 4);
        assert_eq!(expr.evaluate(&[9, 3]), 7);
    }

    #[test]
    fn test_enforcement_literal() {
        let mut model = CpModel::new("m");
        let x = model.new_bool_var("x").unwrap();
        let b = model.new_bool_var("b").unwrap();
        model.add_equality(LinearExpr::from(x), 1).only_enforce_if(b);

        let constraint = &model.constraints()[0];
        assert_eq!(constraint.enforcement, vec![b]);
        // Not enforced: anything goes.
        assert!(constraint.is_satisfied(&[0, 0]));
        // Enforced: must hold.
        assert!(!constraint.is_satisfied(&[0, 1]));
        assert!(constraint.is_satisfied(&[1, 1]));
    }

    #[test]
    fn test_nonlinear_constraints_satisfaction() {
        let mut model = CpModel::new("m");
        let d = model.new_int_var("d", -5, 5).unwrap();
        let abs = model.new_int_var("abs", 0, 5).unwrap();
        let sq = model.new_int_var("sq", 0, 25).unwrap();
        let half = model.new_int_var("half", -3, 3).unwrap();
        model.add_abs_equality(abs, d);
        model.add_multiplication_equality(sq, abs, abs);
        model.add_division_equality(half, d, 2);

        let values = [-3, 3, 9, -1];
        assert!(model.constraints().iter().all(|c| c.is_satisfied(&values)));

        let wrong = [-3, 3, 8, -2];
        assert!(!model.constraints()[1].is_satisfied(&wrong));
        assert!(!model.constraints()[2].is_satisfied(&wrong));
    }
}
