// ABOUTME: Depth-first branch-and-bound backend for binary choose-one assignment models
// ABOUTME: Prunes on per-row reachable ranges and on the objective bound, honoring a wall-clock limit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Branch-and-bound search
//!
//! Groups are decided in model order. For every row and group position the
//! backend precomputes the smallest and largest contribution the undecided
//! groups can still make, so a partial assignment is abandoned as soon as a row
//! can no longer land inside its bounds. Within a group, variables are tried by
//! objective, then priority, then index, which makes the first complete
//! assignment a good incumbent and keeps results deterministic.
//!
//! The search stops early once the incumbent reaches [`capped_objective_bound`],
//! which accounts for upper-bounded rows limiting how many high-weight
//! variables can be selected together.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{
    AssignmentBackend, AssignmentModel, LinearConstraint, Solution, SolveStatus, SolverError,
};

/// Feasibility and objective comparison tolerance
const EPS: f64 = 1e-6;

/// Nodes between wall-clock checks
const DEADLINE_CHECK_INTERVAL: u32 = 1024;

/// Exact depth-first search backend
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBound {
    node_limit: Option<u64>,
}

impl BranchAndBound {
    /// Backend limited by wall-clock time only
    #[must_use]
    pub const fn new() -> Self {
        Self { node_limit: None }
    }

    /// Also stop after `limit` nodes, reported like a timeout
    #[must_use]
    pub const fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }
}

impl AssignmentBackend for BranchAndBound {
    fn name(&self) -> &'static str {
        "branch_and_bound"
    }

    fn solve(&self, model: &AssignmentModel, time_limit: Duration) -> Result<Solution, SolverError> {
        let started = Instant::now();
        model.validate()?;

        if model.groups.iter().any(Vec::is_empty) {
            return Ok(Solution::without_assignment(
                SolveStatus::Infeasible,
                0,
                started.elapsed(),
            ));
        }

        let prepared = Prepared::new(model);
        if !(0..model.constraints.len()).all(|row| prepared.row_viable(row, 0, 0.0)) {
            debug!("Assignment model infeasible at root");
            return Ok(Solution::without_assignment(
                SolveStatus::Infeasible,
                0,
                started.elapsed(),
            ));
        }

        let mut search = Search {
            prepared: &prepared,
            sums: vec![0.0; model.constraints.len()],
            path: Vec::with_capacity(model.groups.len()),
            objective: 0.0,
            best: None,
            bound: capped_objective_bound(model),
            nodes: 0,
            until_check: DEADLINE_CHECK_INTERVAL,
            deadline: started + time_limit,
            node_limit: self.node_limit,
            halted: false,
        };
        search.descend(0);

        let elapsed = started.elapsed();
        let nodes = search.nodes;
        let solution = match (search.best, search.halted) {
            (Some((objective, selected)), halted) => Solution {
                status: if halted {
                    SolveStatus::Feasible
                } else {
                    SolveStatus::Optimal
                },
                selected,
                objective,
                nodes,
                elapsed,
            },
            (None, true) => Solution::without_assignment(SolveStatus::TimedOut, nodes, elapsed),
            (None, false) => Solution::without_assignment(SolveStatus::Infeasible, nodes, elapsed),
        };
        debug!(
            status = ?solution.status,
            nodes,
            elapsed_ms = elapsed.as_millis(),
            objective = solution.objective,
            "Branch-and-bound finished"
        );
        Ok(solution)
    }
}

/// Row capacity: the most variables of `constraint` that can be selected together
///
/// Only rows with a finite upper bound and strictly positive coefficients cap a
/// selection count.
fn row_capacity(constraint: &LinearConstraint) -> Option<f64> {
    if !constraint.upper.is_finite() || constraint.terms.is_empty() {
        return None;
    }
    let smallest = constraint
        .terms
        .iter()
        .map(|(_, coef)| *coef)
        .fold(f64::INFINITY, f64::min);
    (smallest > EPS).then(|| ((constraint.upper + EPS) / smallest).floor().max(0.0))
}

/// Per variable, the capacity row with the smallest capacity as `(capacity, row)`
fn tightest_capacity_rows(model: &AssignmentModel) -> Vec<Option<(f64, usize)>> {
    let mut charged: Vec<Option<(f64, usize)>> = vec![None; model.num_variables()];
    for (row, constraint) in model.constraints.iter().enumerate() {
        let Some(capacity) = row_capacity(constraint) else {
            continue;
        };
        for &(var, _) in &constraint.terms {
            let slot = &mut charged[var];
            if slot.is_none_or(|(current, _)| capacity < current) {
                *slot = Some((capacity, row));
            }
        }
    }
    charged
}

/// Upper bound on the objective of any feasible assignment
///
/// Writes the objective as the global floor weight per group plus, for every
/// weight level above it, the number of groups selecting at least that level.
/// That count is limited both by the groups offering such a variable and by the
/// capacity of the rows holding those variables, each variable charged to its
/// tightest capacity row. Never exceeds the sum of per-group maxima.
fn capped_objective_bound(model: &AssignmentModel) -> f64 {
    let objective = &model.objective;
    if model.groups.is_empty() || objective.is_empty() {
        return 0.0;
    }

    let charged_row = tightest_capacity_rows(model);
    let mut group_of = vec![0; objective.len()];
    for (group, vars) in model.groups.iter().enumerate() {
        for &var in vars {
            group_of[var] = group;
        }
    }

    let floor = objective.iter().copied().fold(f64::INFINITY, f64::min);
    let mut by_weight: Vec<usize> = (0..objective.len()).collect();
    by_weight.sort_by(|a, b| objective[*b].total_cmp(&objective[*a]));

    let mut group_seen = vec![false; model.groups.len()];
    let mut row_seen = vec![false; model.constraints.len()];
    let mut groups_reached = 0_usize;
    let mut capacity = 0.0;
    let mut uncapped = false;
    let mut bound = floor * model.groups.len() as f64;

    let mut index = 0;
    while index < by_weight.len() {
        let level = objective[by_weight[index]];
        if level <= floor + EPS {
            break;
        }
        while index < by_weight.len() && objective[by_weight[index]] >= level - EPS {
            let var = by_weight[index];
            if !group_seen[group_of[var]] {
                group_seen[group_of[var]] = true;
                groups_reached += 1;
            }
            match charged_row[var] {
                Some((row_cap, row)) if !row_seen[row] => {
                    row_seen[row] = true;
                    capacity += row_cap;
                }
                Some(_) => {}
                None => uncapped = true,
            }
            index += 1;
        }
        let next = by_weight
            .get(index)
            .map_or(floor, |var| objective[*var])
            .max(floor);
        let selectable = if uncapped {
            groups_reached as f64
        } else {
            (groups_reached as f64).min(capacity)
        };
        bound += (level - next) * selectable;
    }
    bound
}

/// Search tables derived once per model
struct Prepared<'a> {
    model: &'a AssignmentModel,
    /// Variables per group in try order
    order: Vec<Vec<usize>>,
    /// `(row, coefficient)` per variable
    var_terms: Vec<Vec<(usize, f64)>>,
    /// Rows that can be violated by a variable outside them
    sensitive: Vec<usize>,
    /// Smallest remaining contribution, indexed `row * stride + group`
    rest_min: Vec<f64>,
    /// Largest remaining contribution, indexed `row * stride + group`
    rest_max: Vec<f64>,
    /// Best remaining objective per group position
    rest_obj: Vec<f64>,
    stride: usize,
}

impl<'a> Prepared<'a> {
    fn new(model: &'a AssignmentModel) -> Self {
        let groups = model.groups.len();
        let stride = groups + 1;
        let rows = model.constraints.len();

        let order = model
            .groups
            .iter()
            .map(|group| {
                let mut vars = group.clone();
                vars.sort_by(|a, b| {
                    model.objective[*b]
                        .total_cmp(&model.objective[*a])
                        .then(model.priority[*b].total_cmp(&model.priority[*a]))
                        .then(a.cmp(b))
                });
                vars
            })
            .collect();

        let mut var_terms: Vec<Vec<(usize, f64)>> = vec![Vec::new(); model.num_variables()];
        for (row, constraint) in model.constraints.iter().enumerate() {
            for &(var, coef) in &constraint.terms {
                let terms = &mut var_terms[var];
                match terms.last_mut() {
                    Some(last) if last.0 == row => last.1 += coef,
                    _ => terms.push((row, coef)),
                }
            }
        }

        let sensitive = model
            .constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| c.lower.is_finite() || c.terms.iter().any(|(_, coef)| *coef < 0.0))
            .map(|(row, _)| row)
            .collect();

        let mut rest_min = vec![0.0; rows * stride];
        let mut rest_max = vec![0.0; rows * stride];
        for (position, group) in model.groups.iter().enumerate() {
            let mut extremes: HashMap<usize, (f64, f64, usize)> = HashMap::new();
            for &var in group {
                for &(row, coef) in &var_terms[var] {
                    let entry = extremes.entry(row).or_insert((coef, coef, 0));
                    entry.0 = entry.0.min(coef);
                    entry.1 = entry.1.max(coef);
                    entry.2 += 1;
                }
            }
            for (row, (mut low, mut high, count)) in extremes {
                if count < group.len() {
                    low = low.min(0.0);
                    high = high.max(0.0);
                }
                rest_min[row * stride + position] = low;
                rest_max[row * stride + position] = high;
            }
        }
        for row in 0..rows {
            for position in (0..groups).rev() {
                let index = row * stride + position;
                rest_min[index] += rest_min[index + 1];
                rest_max[index] += rest_max[index + 1];
            }
        }

        let mut rest_obj = vec![0.0; stride];
        for position in (0..groups).rev() {
            let best = model.groups[position]
                .iter()
                .map(|var| model.objective[*var])
                .fold(f64::NEG_INFINITY, f64::max);
            rest_obj[position] = rest_obj[position + 1] + best;
        }

        Self {
            model,
            order,
            var_terms,
            sensitive,
            rest_min,
            rest_max,
            rest_obj,
            stride,
        }
    }

    /// Whether `row` can still end inside its bounds given partial sum `sum`
    /// with groups from `position` onward undecided
    fn row_viable(&self, row: usize, position: usize, sum: f64) -> bool {
        let constraint = &self.model.constraints[row];
        let index = row * self.stride + position;
        sum + self.rest_min[index] <= constraint.upper + EPS
            && sum + self.rest_max[index] >= constraint.lower - EPS
    }
}

struct Search<'p, 'm> {
    prepared: &'p Prepared<'m>,
    sums: Vec<f64>,
    path: Vec<usize>,
    objective: f64,
    best: Option<(f64, Vec<usize>)>,
    bound: f64,
    nodes: u64,
    until_check: u32,
    deadline: Instant,
    node_limit: Option<u64>,
    halted: bool,
}

impl Search<'_, '_> {
    /// Explore group `depth`; returns `false` once the search should stop
    fn descend(&mut self, depth: usize) -> bool {
        let prepared = self.prepared;
        if depth == prepared.order.len() {
            self.record_incumbent();
            return !self.reached_bound();
        }

        for &var in &prepared.order[depth] {
            if self.limit_reached() {
                self.halted = true;
                return false;
            }
            self.nodes += 1;

            let weight = prepared.model.objective[var];
            if let Some((best, _)) = &self.best {
                if self.objective + weight + prepared.rest_obj[depth + 1] <= best + EPS {
                    break;
                }
            }

            self.apply(var, 1.0);
            if self.viable_after(var, depth + 1) {
                self.path.push(var);
                self.objective += weight;
                let keep_going = self.descend(depth + 1);
                self.objective -= weight;
                self.path.pop();
                if !keep_going {
                    self.apply(var, -1.0);
                    return false;
                }
            }
            self.apply(var, -1.0);
        }
        true
    }

    fn apply(&mut self, var: usize, sign: f64) {
        for &(row, coef) in &self.prepared.var_terms[var] {
            self.sums[row] += sign * coef;
        }
    }

    fn viable_after(&self, var: usize, position: usize) -> bool {
        let prepared = self.prepared;
        prepared.var_terms[var]
            .iter()
            .map(|(row, _)| *row)
            .chain(prepared.sensitive.iter().copied())
            .all(|row| prepared.row_viable(row, position, self.sums[row]))
    }

    fn record_incumbent(&mut self) {
        let improves = self
            .best
            .as_ref()
            .is_none_or(|(best, _)| self.objective > best + EPS);
        if improves {
            self.best = Some((self.objective, self.path.clone()));
        }
    }

    fn reached_bound(&self) -> bool {
        self.best
            .as_ref()
            .is_some_and(|(best, _)| *best >= self.bound - EPS)
    }

    fn limit_reached(&mut self) -> bool {
        if self.node_limit.is_some_and(|limit| self.nodes >= limit) {
            return true;
        }
        self.until_check -= 1;
        if self.until_check == 0 {
            self.until_check = DEADLINE_CHECK_INTERVAL;
            return Instant::now() >= self.deadline;
        }
        false
    }
}
