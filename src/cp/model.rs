//! Constraint model: bounded integer variables, linear constraints,
//! interval no-overlap and a minimization objective.

use std::collections::HashSet;

/// Handle to an integer variable in a [`CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

/// Handle to an interval in a [`CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalId(pub(crate) usize);

impl VarId {
    /// Position of the variable in the model (and in solution values).
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }

    /// `self - other` as an expression.
    pub fn minus(self, other: VarId) -> LinearExpr {
        LinearExpr::new().with_term(self, 1).with_term(other, -1)
    }
}

impl IntervalId {
    /// Position of the interval in the model.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An integer variable with inclusive bounds `[lb, ub]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVar {
    /// Variable name (diagnostics only).
    pub name: String,
    /// Lower bound.
    pub lb: i64,
    /// Upper bound.
    pub ub: i64,
}

/// A linear expression `Σ coef·var + constant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    /// `(variable, coefficient)` terms.
    pub terms: Vec<(VarId, i64)>,
    /// Constant offset.
    pub constant: i64,
}

impl LinearExpr {
    /// Creates the zero expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coef·var`.
    pub fn with_term(mut self, var: VarId, coef: i64) -> Self {
        self.terms.push((var, coef));
        self
    }

    /// Adds a constant offset.
    pub fn with_constant(mut self, constant: i64) -> Self {
        self.constant += constant;
        self
    }

    /// Sum of the given variables, each with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
            constant: 0,
        }
    }

    /// Evaluates the expression against a full assignment.
    pub fn eval(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * values[v.0])
            .sum::<i64>()
            + self.constant
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self::new().with_term(var, 1)
    }
}

/// Comparison in a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `expr <= rhs`
    Le,
    /// `expr == rhs`
    Eq,
    /// `expr >= rhs`
    Ge,
}

/// `expr (relation) rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: i64,
}

/// A fixed-size interval `[start, start + size)` with `end = start + size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalVar {
    /// Interval name (diagnostics only).
    pub name: String,
    /// Start variable.
    pub start: VarId,
    /// Fixed size.
    pub size: i64,
    /// End variable.
    pub end: VarId,
}

/// A model constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Linear (in)equality.
    Linear(LinearConstraint),
    /// The intervals must be pairwise disjoint.
    NoOverlap(Vec<IntervalId>),
}

/// A constraint-programming model.
///
/// Built incrementally by a formulation, then handed to any
/// [`CpSolver`](super::CpSolver) implementation.
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    /// Model name (diagnostics only).
    pub name: String,
    pub(crate) vars: Vec<IntVar>,
    pub(crate) intervals: Vec<IntervalVar>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Option<LinearExpr>,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Creates an integer variable bounded to `[lb, ub]`.
    pub fn new_int_var(&mut self, lb: i64, ub: i64, name: impl Into<String>) -> VarId {
        self.vars.push(IntVar {
            name: name.into(),
            lb,
            ub,
        });
        VarId(self.vars.len() - 1)
    }

    /// Posts `expr (relation) rhs`.
    pub fn add_linear(&mut self, expr: LinearExpr, relation: Relation, rhs: i64) {
        self.constraints.push(Constraint::Linear(LinearConstraint {
            expr,
            relation,
            rhs,
        }));
    }

    /// Posts `expr <= rhs`.
    pub fn add_le(&mut self, expr: LinearExpr, rhs: i64) {
        self.add_linear(expr, Relation::Le, rhs);
    }

    /// Posts `expr == rhs`.
    pub fn add_eq(&mut self, expr: LinearExpr, rhs: i64) {
        self.add_linear(expr, Relation::Eq, rhs);
    }

    /// Posts `expr >= rhs`.
    pub fn add_ge(&mut self, expr: LinearExpr, rhs: i64) {
        self.add_linear(expr, Relation::Ge, rhs);
    }

    /// Creates an interval over existing start/end variables.
    ///
    /// Also posts `end - start == size`.
    pub fn add_interval(
        &mut self,
        start: VarId,
        size: i64,
        end: VarId,
        name: impl Into<String>,
    ) -> IntervalId {
        self.intervals.push(IntervalVar {
            name: name.into(),
            start,
            size,
            end,
        });
        self.add_eq(
            LinearExpr::new().with_term(end, 1).with_term(start, -1),
            size,
        );
        IntervalId(self.intervals.len() - 1)
    }

    /// Requires the given intervals to be pairwise disjoint.
    pub fn add_no_overlap(&mut self, intervals: Vec<IntervalId>) {
        self.constraints.push(Constraint::NoOverlap(intervals));
    }

    /// Sets the objective to minimize.
    pub fn minimize(&mut self, expr: LinearExpr) {
        self.objective = Some(expr);
    }

    /// Variable by handle.
    pub fn var(&self, id: VarId) -> &IntVar {
        &self.vars[id.0]
    }

    /// Interval by handle.
    pub fn interval(&self, id: IntervalId) -> &IntervalVar {
        &self.intervals[id.0]
    }

    /// Posted constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The objective, if any.
    pub fn objective(&self) -> Option<&LinearExpr> {
        self.objective.as_ref()
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Number of intervals.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Number of constraints (including the ones posted by intervals).
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Checks the model is well-formed.
    ///
    /// Empty variable domains are not an error: they make the model
    /// infeasible, which is for the solver to report.
    pub fn validate(&self) -> Result<(), String> {
        let check_var = |v: VarId, ctx: &str| -> Result<(), String> {
            if v.0 < self.vars.len() {
                Ok(())
            } else {
                Err(format!("{ctx} references unknown variable #{}", v.0))
            }
        };

        for interval in &self.intervals {
            check_var(interval.start, &interval.name)?;
            check_var(interval.end, &interval.name)?;
            if interval.size < 0 {
                return Err(format!(
                    "Interval '{}' has negative size {}",
                    interval.name, interval.size
                ));
            }
        }

        for (i, constraint) in self.constraints.iter().enumerate() {
            match constraint {
                Constraint::Linear(lc) => {
                    for &(v, _) in &lc.expr.terms {
                        check_var(v, &format!("constraint #{i}"))?;
                    }
                }
                Constraint::NoOverlap(ids) => {
                    let mut seen = HashSet::new();
                    for id in ids {
                        if id.0 >= self.intervals.len() {
                            return Err(format!(
                                "constraint #{i} references unknown interval #{}",
                                id.0
                            ));
                        }
                        if !seen.insert(id.0) {
                            return Err(format!(
                                "constraint #{i} lists interval '{}' twice",
                                self.intervals[id.0].name
                            ));
                        }
                    }
                }
            }
        }

        if let Some(obj) = &self.objective {
            for &(v, _) in &obj.terms {
                check_var(v, "objective")?;
            }
        }

        Ok(())
    }
}
