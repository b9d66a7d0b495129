// ABOUTME: Backend-neutral binary assignment model: choose-one groups plus bounded linear rows
// ABOUTME: Built by the weekly model builder and consumed by any AssignmentBackend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use std::collections::HashSet;

use super::SolverError;

/// `lower <= Σ coef·x <= upper`; either bound may be infinite
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// `(variable, coefficient)` pairs
    pub terms: Vec<(usize, f64)>,
    /// Lower bound, `f64::NEG_INFINITY` for none
    pub lower: f64,
    /// Upper bound, `f64::INFINITY` for none
    pub upper: f64,
    /// Diagnostic label
    pub label: String,
}

impl LinearConstraint {
    /// Row with both bounds
    #[must_use]
    pub fn between(label: impl Into<String>, terms: Vec<(usize, f64)>, lower: f64, upper: f64) -> Self {
        Self {
            terms,
            lower,
            upper,
            label: label.into(),
        }
    }

    /// Row with an upper bound only
    #[must_use]
    pub fn at_most(label: impl Into<String>, terms: Vec<(usize, f64)>, upper: f64) -> Self {
        Self::between(label, terms, f64::NEG_INFINITY, upper)
    }

    /// Row value for a 0/1 assignment
    #[must_use]
    pub fn evaluate(&self, selected: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|(var, _)| selected.get(*var).copied().unwrap_or(false))
            .map(|(_, coef)| coef)
            .sum()
    }
}

/// Maximize `Σ objective·x` over binary `x` such that exactly one variable of
/// every group is 1 and every constraint row holds
///
/// `priority` orders variables with equal objective during search and never
/// changes which assignments are feasible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentModel {
    /// Objective coefficient per variable
    pub objective: Vec<f64>,
    /// Search-order hint per variable, higher first
    pub priority: Vec<f64>,
    /// Choose-exactly-one groups, each variable in exactly one group
    pub groups: Vec<Vec<usize>>,
    /// Linear rows
    pub constraints: Vec<LinearConstraint>,
}

impl AssignmentModel {
    /// Empty model
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable and return its index
    pub fn add_variable(&mut self, objective: f64, priority: f64) -> usize {
        self.objective.push(objective);
        self.priority.push(priority);
        self.objective.len() - 1
    }

    /// Add a choose-exactly-one group
    pub fn add_group(&mut self, vars: Vec<usize>) {
        self.groups.push(vars);
    }

    /// Add a linear row
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Number of variables
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    /// Check structural consistency
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidModel`] for out-of-range indices, variables
    /// outside or in several groups, mismatched vector lengths, non-finite
    /// coefficients, or a row whose lower bound exceeds its upper bound
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.objective.len();
        if self.priority.len() != n {
            return Err(SolverError::InvalidModel(format!(
                "{} priorities for {n} variables",
                self.priority.len()
            )));
        }
        if let Some(var) = self.objective.iter().position(|w| !w.is_finite()) {
            return Err(SolverError::InvalidModel(format!(
                "objective of variable {var} is not finite"
            )));
        }

        let mut seen = HashSet::with_capacity(n);
        for (index, group) in self.groups.iter().enumerate() {
            for &var in group {
                if var >= n {
                    return Err(SolverError::InvalidModel(format!(
                        "group {index} references unknown variable {var}"
                    )));
                }
                if !seen.insert(var) {
                    return Err(SolverError::InvalidModel(format!(
                        "variable {var} appears in more than one group"
                    )));
                }
            }
        }
        if seen.len() != n {
            return Err(SolverError::InvalidModel(format!(
                "{} variables are not in any group",
                n - seen.len()
            )));
        }

        for row in &self.constraints {
            if row.lower.is_nan() || row.upper.is_nan() || row.lower > row.upper {
                return Err(SolverError::InvalidModel(format!(
                    "row {} has invalid bounds",
                    row.label
                )));
            }
            if let Some((var, _)) = row
                .terms
                .iter()
                .find(|(var, coef)| *var >= n || !coef.is_finite())
            {
                return Err(SolverError::InvalidModel(format!(
                    "row {} has an invalid term for variable {var}",
                    row.label
                )));
            }
        }
        Ok(())
    }

    /// Whether one variable per group satisfies every row within `eps`
    #[must_use]
    pub fn is_feasible(&self, selected: &[usize], eps: f64) -> bool {
        if selected.len() != self.groups.len() {
            return false;
        }
        if !selected
            .iter()
            .zip(&self.groups)
            .all(|(var, group)| group.contains(var))
        {
            return false;
        }
        let mut mask = vec![false; self.num_variables()];
        for &var in selected {
            mask[var] = true;
        }
        self.constraints.iter().all(|row| {
            let value = row.evaluate(&mask);
            value >= row.lower - eps && value <= row.upper + eps
        })
    }
}
