// ABOUTME: Weekly assignment solver: model types, backend trait, and the default search backend
// ABOUTME: Constraint construction is independent of the backend that solves the model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Weekly Assignment Solver
//!
//! The solver is split in three layers:
//!
//! - [`model`]: a backend-neutral binary model (choose-one groups plus bounded rows)
//! - [`AssignmentBackend`]: solve a model within a wall-clock limit
//! - [`weekly`]: translate a candidate pool into a model and the solution back into days
//!
//! [`BranchAndBound`] is the default backend. Any other integer-programming
//! library can be plugged in by implementing [`AssignmentBackend`].

/// Depth-first branch-and-bound backend
pub mod branch_and_bound;
/// Backend-neutral model
pub mod model;
/// Weekly model construction and solution extraction
pub mod weekly;

pub use branch_and_bound::BranchAndBound;
pub use model::{AssignmentModel, LinearConstraint};
pub use weekly::{
    build_weekly_model, DayAssignment, SolveFailure, VariableKey, WeeklyAssignment, WeeklyModel,
    WeeklySolver,
};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Outcome of a backend run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal
    Optimal,
    /// Feasible, stopped by the time limit before optimality was proven
    Feasible,
    /// Proven to have no feasible assignment
    Infeasible,
    /// Time limit reached without any feasible assignment
    TimedOut,
}

impl SolveStatus {
    /// Whether the run produced an assignment
    #[must_use]
    pub const fn has_solution(&self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

/// Backend result
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Termination status
    pub status: SolveStatus,
    /// Chosen variable per group, in group order; empty without a solution
    pub selected: Vec<usize>,
    /// Objective of the chosen assignment
    pub objective: f64,
    /// Search nodes explored
    pub nodes: u64,
    /// Wall-clock time spent
    pub elapsed: Duration,
}

impl Solution {
    /// Result carrying no assignment
    #[must_use]
    pub const fn without_assignment(status: SolveStatus, nodes: u64, elapsed: Duration) -> Self {
        Self {
            status,
            selected: Vec::new(),
            objective: 0.0,
            nodes,
            elapsed,
        }
    }
}

/// Backend failure unrelated to feasibility
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The model is structurally inconsistent
    #[error("invalid assignment model: {0}")]
    InvalidModel(String),
    /// The backend failed internally
    #[error("solver backend {backend} failed: {message}")]
    Backend {
        /// Backend name
        backend: String,
        /// Failure detail
        message: String,
    },
}

/// Solves an [`AssignmentModel`] within a wall-clock limit
pub trait AssignmentBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Solve `model`, returning within roughly `time_limit`
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] for invalid models or internal failures;
    /// infeasibility and timeouts are reported through [`SolveStatus`]
    fn solve(&self, model: &AssignmentModel, time_limit: Duration) -> Result<Solution, SolverError>;
}
