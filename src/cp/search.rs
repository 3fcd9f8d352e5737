//! Default exact engine: depth-first branch-and-bound.
//!
//! # Algorithm
//!
//! 1. Propagate bounds to a fixpoint: linear rows (bounds consistency),
//!    sequencing precedences and pairwise disjunctive reasoning for every
//!    no-overlap group, followed by an overload check per group.
//! 2. Branch on sequencing: take the first group with unranked intervals
//!    and try each unranked interval as the next one (earliest start first).
//! 3. Once every group is ranked, branch on values: `x = lb`, then `x >= lb + 1`.
//! 4. On each solution, post `objective <= best - 1` and keep searching.
//!
//! The search is complete, so an exhausted tree proves optimality (or
//! infeasibility). Budgets are checked once per node: the node limit ends
//! the search with the incumbent (`Feasible`), the wall-clock limit ends it
//! with `Timeout` whether or not an incumbent exists.
//!
//! Bound arithmetic runs in `i128`, so domains anywhere in `i64` are safe.
//!
//! # Reference
//! - Baptiste, Le Pape & Nuijten (2001), "Constraint-Based Scheduling", Ch. 2-4
//! - Carlier & Pinson (1989), "An Algorithm for Solving the Job-Shop Problem"

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::model::{Constraint, CpModel, LinearExpr, Relation};
use super::solution::{CpSolution, SolverConfig, SolverStatus};
use super::CpSolver;

/// Caps one fixpoint; an unfinished fixpoint is still sound, only weaker.
const MAX_PROPAGATION_ROUNDS: usize = 10_000;

/// Exact branch-and-bound solver for [`CpModel`]s.
///
/// Deterministic: the same model and node limit yield the same solution.
/// The only load-dependent outcome is the wall-clock backstop, which never
/// returns values.
///
/// # Example
/// ```
/// use u_slotplan::cp::{BranchAndBoundSolver, CpModel, CpSolver, SolverConfig, SolverStatus};
///
/// let mut model = CpModel::new("pair");
/// let s1 = model.new_int_var(0, 10, "s1");
/// let e1 = model.new_int_var(0, 10, "e1");
/// let s2 = model.new_int_var(0, 10, "s2");
/// let e2 = model.new_int_var(0, 10, "e2");
/// let a = model.add_interval(s1, 3, e1, "a");
/// let b = model.add_interval(s2, 4, e2, "b");
/// model.add_no_overlap(vec![a, b]);
/// let makespan = model.new_int_var(0, 10, "makespan");
/// model.add_ge(makespan.minus(e1), 0);
/// model.add_ge(makespan.minus(e2), 0);
/// model.minimize(makespan.into());
///
/// let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(solution.status, SolverStatus::Optimal);
/// assert_eq!(solution.objective, Some(7));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    /// Creates a new solver.
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();

        if let Err(msg) = model.validate() {
            warn!("model '{}' rejected: {msg}", model.name);
            return CpSolution::error(msg);
        }

        let mut search = Search::new(model, config, started);
        let best = search.run();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let status = match (&best, search.stopped) {
            (Some(_), None) => SolverStatus::Optimal,
            (Some(_), Some(Stop::NodeLimit)) => SolverStatus::Feasible,
            (_, Some(_)) => SolverStatus::Timeout,
            (None, None) => SolverStatus::Infeasible,
        };

        if let Some(stop) = search.stopped {
            warn!(
                "model '{}': {stop:?} reached after {} nodes / {elapsed_ms} ms ({status:?})",
                model.name, search.nodes
            );
        } else {
            debug!(
                "model '{}': search complete after {} nodes / {elapsed_ms} ms ({status:?})",
                model.name, search.nodes
            );
        }

        let (values, objective) = match best {
            Some(incumbent) if status.has_solution() => (incumbent.values, incumbent.objective),
            _ => (Vec::new(), None),
        };

        CpSolution {
            status,
            values,
            objective,
            nodes: search.nodes,
            elapsed_ms,
            message: None,
        }
    }
}

/// Σ a·x <= rhs over variable indices.
#[derive(Debug, Clone)]
struct Row {
    terms: Vec<(usize, i128)>,
    rhs: i128,
}

impl Row {
    fn from_constraint(expr: &LinearExpr, relation: Relation, rhs: i64) -> Vec<Row> {
        let mut merged: BTreeMap<usize, i128> = BTreeMap::new();
        for &(v, c) in &expr.terms {
            *merged.entry(v.index()).or_insert(0) += c as i128;
        }
        let terms: Vec<(usize, i128)> = merged.into_iter().filter(|&(_, c)| c != 0).collect();
        let bound = rhs as i128 - expr.constant as i128;

        let le = Row {
            terms: terms.clone(),
            rhs: bound,
        };
        let ge = Row {
            terms: terms.iter().map(|&(v, c)| (v, -c)).collect(),
            rhs: -bound,
        };

        match relation {
            Relation::Le => vec![le],
            Relation::Ge => vec![ge],
            Relation::Eq => vec![le, ge],
        }
    }

    fn is_satisfied(&self, values: &[i64]) -> bool {
        let lhs: i128 = self
            .terms
            .iter()
            .map(|&(v, c)| c * values[v] as i128)
            .sum();
        lhs <= self.rhs
    }
}

/// Why the search ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    NodeLimit,
    TimeLimit,
}

/// Propagation failure: the node has no solution.
#[derive(Debug)]
struct Conflict;

type Propagation = Result<bool, Conflict>;

#[derive(Debug, Clone)]
struct Node {
    domains: Vec<(i64, i64)>,
    /// `(a, b)`: interval `a` ends before interval `b` starts.
    precedences: Vec<(usize, usize)>,
    /// Ranked prefix per no-overlap group.
    ranked: Vec<Vec<usize>>,
}

#[derive(Debug, Clone)]
struct Incumbent {
    values: Vec<i64>,
    objective: Option<i64>,
}

struct Search<'a> {
    model: &'a CpModel,
    rows: Vec<Row>,
    /// Interval index → (start variable index, size).
    intervals: Vec<(usize, i64)>,
    /// No-overlap groups with at least two intervals.
    groups: Vec<Vec<usize>>,
    objective_bound: Option<Row>,
    best: Option<Incumbent>,
    nodes: u64,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    stopped: Option<Stop>,
}

impl<'a> Search<'a> {
    fn new(model: &'a CpModel, config: &SolverConfig, started: Instant) -> Self {
        let mut rows = Vec::new();
        let mut groups = Vec::new();

        for constraint in &model.constraints {
            match constraint {
                Constraint::Linear(lc) => {
                    rows.extend(Row::from_constraint(&lc.expr, lc.relation, lc.rhs));
                }
                Constraint::NoOverlap(ids) => {
                    if ids.len() > 1 {
                        groups.push(ids.iter().map(|id| id.index()).collect());
                    }
                }
            }
        }

        let intervals = model
            .intervals
            .iter()
            .map(|iv| (iv.start.index(), iv.size))
            .collect();

        debug!(
            "model '{}': {} vars, {} rows, {} no-overlap groups",
            model.name,
            model.vars.len(),
            rows.len(),
            groups.len()
        );

        Self {
            model,
            rows,
            intervals,
            groups,
            objective_bound: None,
            best: None,
            nodes: 0,
            deadline: config
                .time_limit_ms
                .map(|ms| started + Duration::from_millis(ms)),
            node_limit: config.node_limit,
            stopped: None,
        }
    }

    fn run(&mut self) -> Option<Incumbent> {
        let root = Node {
            domains: self.model.vars.iter().map(|v| (v.lb, v.ub)).collect(),
            precedences: Vec::new(),
            ranked: vec![Vec::new(); self.groups.len()],
        };
        let mut stack = vec![root];

        while let Some(mut node) = stack.pop() {
            if let Some(stop) = self.budget_exhausted() {
                self.stopped = Some(stop);
                break;
            }
            self.nodes += 1;

            if self.propagate(&node.precedences, &mut node.domains).is_err() {
                continue;
            }

            if node.domains.iter().all(|&(lb, ub)| lb == ub) {
                let values: Vec<i64> = node.domains.iter().map(|&(lb, _)| lb).collect();
                if self.record_solution(values) {
                    break;
                }
                continue;
            }

            self.branch(node, &mut stack);
        }

        self.best.take()
    }

    fn budget_exhausted(&self) -> Option<Stop> {
        if self.node_limit.is_some_and(|limit| self.nodes >= limit) {
            return Some(Stop::NodeLimit);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(Stop::TimeLimit);
        }
        None
    }

    /// Stores an improving solution. Returns `true` when the search can stop.
    fn record_solution(&mut self, values: Vec<i64>) -> bool {
        if !self.verify(&values) {
            return false;
        }

        let Some(objective) = self.model.objective.as_ref() else {
            self.best = Some(Incumbent {
                values,
                objective: None,
            });
            return true;
        };

        let value = objective.eval(&values);
        if self
            .best
            .as_ref()
            .and_then(|b| b.objective)
            .is_some_and(|best| value >= best)
        {
            return false;
        }

        debug!("new incumbent: objective {value} after {} nodes", self.nodes);
        let mut bound = Row::from_constraint(objective, Relation::Le, value - 1);
        self.objective_bound = bound.pop();
        self.best = Some(Incumbent {
            values,
            objective: Some(value),
        });
        false
    }

    fn verify(&self, values: &[i64]) -> bool {
        if !self.rows.iter().all(|r| r.is_satisfied(values)) {
            return false;
        }
        self.groups.iter().all(|group| {
            group.iter().enumerate().all(|(k, &a)| {
                group[k + 1..].iter().all(|&b| {
                    let (sa, da) = self.intervals[a];
                    let (sb, db) = self.intervals[b];
                    end_at(values[sa], da) <= i128::from(values[sb])
                        || end_at(values[sb], db) <= i128::from(values[sa])
                })
            })
        })
    }

    fn propagate(
        &self,
        precedences: &[(usize, usize)],
        dom: &mut [(i64, i64)],
    ) -> Result<(), Conflict> {
        if dom.iter().any(|&(lb, ub)| lb > ub) {
            return Err(Conflict);
        }

        for _ in 0..MAX_PROPAGATION_ROUNDS {
            let mut changed = false;
            for row in self.rows.iter().chain(self.objective_bound.iter()) {
                changed |= propagate_row(row, dom)?;
            }
            for &(a, b) in precedences {
                changed |= self.propagate_precedence(a, b, dom)?;
            }
            for group in &self.groups {
                changed |= self.propagate_disjunctive(group, dom)?;
            }
            if !changed {
                break;
            }
        }

        for group in &self.groups {
            self.check_overload(group, dom)?;
        }
        Ok(())
    }

    /// Enforces `end(a) <= start(b)` on start bounds.
    fn propagate_precedence(&self, a: usize, b: usize, dom: &mut [(i64, i64)]) -> Propagation {
        let (sa, da) = self.intervals[a];
        let (sb, _) = self.intervals[b];
        let mut changed = false;

        // Both bounds stay within the old domain, so the casts are exact.
        let earliest_b = end_at(dom[sa].0, da);
        if earliest_b > i128::from(dom[sb].1) {
            return Err(Conflict);
        }
        if earliest_b > i128::from(dom[sb].0) {
            dom[sb].0 = earliest_b as i64;
            changed = true;
        }

        let latest_a = i128::from(dom[sb].1) - i128::from(da);
        if latest_a < i128::from(dom[sa].0) {
            return Err(Conflict);
        }
        if latest_a < i128::from(dom[sa].1) {
            dom[sa].1 = latest_a as i64;
            changed = true;
        }
        Ok(changed)
    }

    /// For each pair, if only one order is still possible, enforce it.
    fn propagate_disjunctive(&self, group: &[usize], dom: &mut [(i64, i64)]) -> Propagation {
        let mut changed = false;
        for (k, &a) in group.iter().enumerate() {
            for &b in &group[k + 1..] {
                let (sa, da) = self.intervals[a];
                let (sb, db) = self.intervals[b];
                let a_first = end_at(dom[sa].0, da) <= i128::from(dom[sb].1);
                let b_first = end_at(dom[sb].0, db) <= i128::from(dom[sa].1);
                match (a_first, b_first) {
                    (false, false) => return Err(Conflict),
                    (true, false) => changed |= self.propagate_precedence(a, b, dom)?,
                    (false, true) => changed |= self.propagate_precedence(b, a, dom)?,
                    (true, true) => {}
                }
            }
        }
        Ok(changed)
    }

    /// Fails if some time window must hold more work than it is long.
    ///
    /// Windows run from each earliest start to each latest completion;
    /// walking completions in ascending order accumulates the work inside.
    fn check_overload(&self, group: &[usize], dom: &[(i64, i64)]) -> Result<(), Conflict> {
        let mut windows: Vec<(i128, i128, i128)> = group
            .iter()
            .map(|&i| {
                let (s, size) = self.intervals[i];
                (i128::from(dom[s].0), end_at(dom[s].1, size), i128::from(size))
            })
            .collect();
        windows.sort_unstable_by_key(|&(_, lct, _)| lct);

        for &(from, _, _) in &windows {
            let mut energy = 0i128;
            for &(est, lct, size) in &windows {
                if est < from {
                    continue;
                }
                energy += size;
                if energy > lct - from {
                    return Err(Conflict);
                }
            }
        }
        Ok(())
    }

    fn branch(&self, node: Node, stack: &mut Vec<Node>) {
        let dom = &node.domains;

        for (g, group) in self.groups.iter().enumerate() {
            if node.ranked[g].len() == group.len() {
                continue;
            }

            let mut unranked: Vec<usize> = group
                .iter()
                .copied()
                .filter(|i| !node.ranked[g].contains(i))
                .collect();
            unranked.sort_by_key(|&i| {
                let (s, size) = self.intervals[i];
                (dom[s].0, dom[s].1 + size, i)
            });

            // Reverse push: the earliest candidate is explored first.
            for &next in unranked.iter().rev() {
                let mut child = node.clone();
                child.ranked[g].push(next);
                child.precedences.extend(
                    unranked
                        .iter()
                        .filter(|&&other| other != next)
                        .map(|&other| (next, other)),
                );
                stack.push(child);
            }
            return;
        }

        if let Some(v) = dom.iter().position(|&(lb, ub)| lb < ub) {
            let lb = dom[v].0;
            let mut later = node.clone();
            later.domains[v].0 = lb + 1;
            let mut fixed = node;
            fixed.domains[v].1 = lb;
            stack.push(later);
            stack.push(fixed);
        }
    }
}

#[inline]
fn end_at(start: i64, size: i64) -> i128 {
    i128::from(start) + i128::from(size)
}

/// Bounds consistency for `Σ a·x <= rhs`.
fn propagate_row(row: &Row, dom: &mut [(i64, i64)]) -> Propagation {
    let min_sum: i128 = row
        .terms
        .iter()
        .map(|&(v, a)| {
            let (lb, ub) = dom[v];
            if a > 0 {
                a * lb as i128
            } else {
                a * ub as i128
            }
        })
        .sum();

    if min_sum > row.rhs {
        return Err(Conflict);
    }

    // Tightening one variable leaves the others' minimum contribution intact.
    let room = row.rhs - min_sum;
    let mut changed = false;
    for &(v, a) in &row.terms {
        let (lb, ub) = dom[v];
        if a > 0 {
            let new_ub = lb as i128 + room / a;
            if new_ub < ub as i128 {
                dom[v].1 = new_ub as i64;
                changed = true;
            }
        } else {
            let new_lb = ub as i128 - room / -a;
            if new_lb > lb as i128 {
                dom[v].0 = new_lb as i64;
                changed = true;
            }
        }
    }
    Ok(changed)
}
