// ABOUTME: Weekly model construction: slot-fill groups, variety caps, and per-day macro windows
// ABOUTME: Maps backend solutions back to day-by-day recipe assignments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use chrono::Weekday;
use mealplan_core::constants::{day_name, DAYS_PER_WEEK, WEEK_DAYS};
use mealplan_core::models::{MacroKind, MacroTarget, MealType, RecipeCandidate, UserHistory};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use super::{
    AssignmentBackend, AssignmentModel, BranchAndBound, LinearConstraint, SolveStatus, SolverError,
};
use crate::config::SolverConfig;
use crate::filter::CandidatePool;

/// Which candidate, day, and slot a model variable stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableKey {
    /// Index into the pool
    pub candidate: usize,
    /// Day index, Monday = 0
    pub day: usize,
    /// Slot index within the day
    pub slot: usize,
}

/// A model plus the meaning of each variable
#[derive(Debug, Clone, Default)]
pub struct WeeklyModel {
    /// Backend-neutral model
    pub model: AssignmentModel,
    /// Key per variable
    pub keys: Vec<VariableKey>,
    /// Uses allowed per candidate
    pub use_cap: u32,
}

/// Build the weekly assignment model for a pool
///
/// One variable exists per compatible (candidate, day, slot). Groups are
/// ordered day by day and slot by slot. Macro windows are added only for
/// target macros above zero.
#[must_use]
pub fn build_weekly_model(
    pool: &CandidatePool,
    history: &UserHistory,
    target: &MacroTarget,
    slots: &[MealType],
    config: &SolverConfig,
) -> WeeklyModel {
    let candidates = pool.candidates();
    let total_slots = DAYS_PER_WEEK * slots.len();
    let use_cap = if candidates.len() >= total_slots {
        config.unique_use_cap
    } else {
        config.scarce_use_cap
    };

    let per_slot = target.as_macros().divided_by(slots.len().max(1) as f64);
    let priorities: Vec<f64> = candidates
        .iter()
        .map(|recipe| {
            -MacroKind::ALL
                .iter()
                .filter(|kind| target.get(**kind) > 0.0)
                .map(|kind| {
                    let ideal = per_slot.get(*kind);
                    (recipe.macros.get(*kind) - ideal).abs() / ideal.max(1.0)
                })
                .sum::<f64>()
        })
        .collect();

    let mut model = AssignmentModel::new();
    let mut keys = Vec::new();
    let mut uses: Vec<Vec<(usize, f64)>> = vec![Vec::new(); candidates.len()];
    let mut day_vars: Vec<Vec<usize>> = vec![Vec::new(); DAYS_PER_WEEK];

    for (day, vars_of_day) in day_vars.iter_mut().enumerate() {
        for (slot, slot_type) in slots.iter().enumerate() {
            let mut group = Vec::new();
            for (candidate, recipe) in candidates.iter().enumerate() {
                if !slot_type.accepts(recipe.meal_type) {
                    continue;
                }
                let weight = if history.is_liked(&recipe.id) {
                    config.liked_weight
                } else {
                    config.baseline_weight
                };
                let var = model.add_variable(weight, priorities[candidate]);
                keys.push(VariableKey {
                    candidate,
                    day,
                    slot,
                });
                group.push(var);
                uses[candidate].push((var, 1.0));
                vars_of_day.push(var);
            }
            model.add_group(group);
        }
    }

    for (candidate, terms) in uses.into_iter().enumerate() {
        if !terms.is_empty() {
            model.add_constraint(LinearConstraint::at_most(
                format!("variety[{candidate}]"),
                terms,
                f64::from(use_cap),
            ));
        }
    }

    let tolerance = config.macro_tolerance;
    for (day, vars) in day_vars.iter().enumerate() {
        for kind in MacroKind::ALL {
            let goal = target.get(kind);
            if goal <= 0.0 {
                continue;
            }
            let terms = vars
                .iter()
                .map(|var| (*var, candidates[keys[*var].candidate].macros.get(kind)))
                .collect();
            model.add_constraint(LinearConstraint::between(
                format!("{}[{}]", kind.as_str(), day_name(WEEK_DAYS[day])),
                terms,
                goal * (1.0 - tolerance),
                goal * (1.0 + tolerance),
            ));
        }
    }

    WeeklyModel {
        model,
        keys,
        use_cap,
    }
}

/// Recipes chosen for one day, in slot order
#[derive(Debug, Clone, PartialEq)]
pub struct DayAssignment {
    /// Day of week
    pub day: Weekday,
    /// Slot type and chosen recipe
    pub meals: Vec<(MealType, RecipeCandidate)>,
}

/// Seven days of solver output
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyAssignment {
    /// Days Monday..Sunday
    pub days: Vec<DayAssignment>,
    /// Backend status, `Optimal` or `Feasible`
    pub status: SolveStatus,
    /// Objective value
    pub objective: f64,
}

impl WeeklyAssignment {
    /// Every chosen recipe across the week
    pub fn recipes(&self) -> impl Iterator<Item = &RecipeCandidate> {
        self.days
            .iter()
            .flat_map(|day| day.meals.iter().map(|(_, recipe)| recipe))
    }

    /// Number of filled slots
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.days.iter().map(|day| day.meals.len()).sum()
    }
}

/// Why the solver path produced no plan
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveFailure {
    /// No assignment satisfies slot, variety, and macro constraints
    #[error("weekly assignment is infeasible")]
    ConstraintsInfeasible,
    /// Time limit reached before any assignment was found
    #[error("weekly assignment timed out")]
    Timeout,
    /// Backend error
    #[error(transparent)]
    Backend(#[from] SolverError),
}

/// Weekly solver over a pluggable backend
#[derive(Debug, Clone)]
pub struct WeeklySolver<B = BranchAndBound> {
    backend: B,
    config: SolverConfig,
}

impl WeeklySolver<BranchAndBound> {
    /// Solver with the default backend
    #[must_use]
    pub const fn new(config: SolverConfig) -> Self {
        Self {
            backend: BranchAndBound::new(),
            config,
        }
    }
}

impl<B: AssignmentBackend> WeeklySolver<B> {
    /// Solver with a custom backend
    #[must_use]
    pub fn with_backend(backend: B, config: SolverConfig) -> Self {
        Self { backend, config }
    }

    /// Configured time limit
    #[must_use]
    pub const fn time_limit(&self) -> Duration {
        self.config.timeout()
    }

    /// Build, solve, and extract a weekly assignment
    ///
    /// # Errors
    ///
    /// Returns [`SolveFailure`] when no usable assignment was found
    pub fn solve(
        &self,
        pool: &CandidatePool,
        history: &UserHistory,
        target: &MacroTarget,
        slots: &[MealType],
    ) -> Result<WeeklyAssignment, SolveFailure> {
        let weekly = build_weekly_model(pool, history, target, slots, &self.config);
        info!(
            backend = self.backend.name(),
            variables = weekly.model.num_variables(),
            groups = weekly.model.groups.len(),
            rows = weekly.model.constraints.len(),
            use_cap = weekly.use_cap,
            "Solving weekly assignment"
        );

        let solution = self.backend.solve(&weekly.model, self.time_limit())?;
        match solution.status {
            SolveStatus::Infeasible => return Err(SolveFailure::ConstraintsInfeasible),
            SolveStatus::TimedOut => return Err(SolveFailure::Timeout),
            SolveStatus::Optimal | SolveStatus::Feasible => {}
        }
        if solution.selected.is_empty() {
            warn!(status = ?solution.status, "Backend reported success without an assignment");
            return Err(SolveFailure::ConstraintsInfeasible);
        }

        let candidates = pool.candidates();
        let mut days: Vec<DayAssignment> = WEEK_DAYS
            .iter()
            .map(|day| DayAssignment {
                day: *day,
                meals: Vec::with_capacity(slots.len()),
            })
            .collect();
        for var in &solution.selected {
            let key = weekly.keys.get(*var).ok_or_else(|| SolverError::Backend {
                backend: self.backend.name().to_owned(),
                message: format!("selected unknown variable {var}"),
            })?;
            days[key.day]
                .meals
                .push((slots[key.slot], candidates[key.candidate].clone()));
        }

        info!(
            status = ?solution.status,
            objective = solution.objective,
            nodes = solution.nodes,
            elapsed_ms = solution.elapsed.as_millis(),
            "Weekly assignment solved"
        );
        Ok(WeeklyAssignment {
            days,
            status: solution.status,
            objective: solution.objective,
        })
    }
}
