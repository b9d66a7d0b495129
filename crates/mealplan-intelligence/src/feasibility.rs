// ABOUTME: Feasibility pre-check rejecting trivially impossible requests before the solver runs
// ABOUTME: Empty pool, missing required bucket, and calorie target outside the achievable range
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use mealplan_core::errors::{AppError, ErrorCode};
use mealplan_core::models::{MacroTarget, MealType, RecipeCandidate};
use std::collections::BTreeSet;
use thiserror::Error;

/// A target below this share of the cheapest possible day is rejected
const LOW_CALORIE_FACTOR: f64 = 0.5;
/// A target above this multiple of the richest possible day is rejected
const HIGH_CALORIE_FACTOR: f64 = 2.0;

/// User-facing reason a request cannot be planned
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeasibilityError {
    /// Nothing survived filtering
    #[error("No recipes match your dietary restrictions. Please adjust your preferences.")]
    EmptyCatalog,
    /// A bucket required by the slot layout has no candidates
    #[error("No {meal_type} recipes match your dietary restrictions.")]
    MissingBucket {
        /// The empty bucket
        meal_type: MealType,
    },
    /// Daily target below what the lightest recipes allow
    #[error(
        "Your calorie target ({target:.0} kcal/day) is too low for available recipes. \
         Minimum achievable is approximately {minimum:.0} kcal/day."
    )]
    CalorieTargetTooLow {
        /// Requested daily calories
        target: f64,
        /// Lightest candidate times slot count
        minimum: f64,
    },
    /// Daily target above what the richest recipes allow
    #[error(
        "Your calorie target ({target:.0} kcal/day) is too high for available recipes. \
         Maximum achievable is approximately {maximum:.0} kcal/day."
    )]
    CalorieTargetTooHigh {
        /// Requested daily calories
        target: f64,
        /// Richest candidate times slot count
        maximum: f64,
    },
}

impl From<FeasibilityError> for AppError {
    fn from(err: FeasibilityError) -> Self {
        Self::new(ErrorCode::PlanInfeasible, err.to_string())
    }
}

/// Check whether a filtered pool can possibly serve the target
///
/// Pure: the verdict depends only on the arguments. Required buckets are the
/// distinct non-snack slot types for `meals_per_day`, matched exactly against
/// each candidate's bucket. Checks run in order and the first failure is returned.
///
/// # Errors
///
/// Returns the first [`FeasibilityError`] that applies
pub fn check_feasibility(
    candidates: &[RecipeCandidate],
    target: &MacroTarget,
    meals_per_day: u8,
) -> Result<(), FeasibilityError> {
    if candidates.is_empty() {
        return Err(FeasibilityError::EmptyCatalog);
    }

    let slots = MealType::slot_layout(meals_per_day);
    let required: BTreeSet<MealType> = slots
        .iter()
        .copied()
        .filter(|slot| *slot != MealType::Snack)
        .collect();
    for meal_type in required {
        if !candidates.iter().any(|r| r.meal_type == meal_type) {
            return Err(FeasibilityError::MissingBucket { meal_type });
        }
    }

    let (lightest, richest) = candidates.iter().map(|r| r.macros.calories).fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), calories| (lo.min(calories), hi.max(calories)),
    );
    let slot_count = slots.len() as f64;
    let minimum = lightest * slot_count;
    let maximum = richest * slot_count;
    let daily = target.calorie_target;

    if daily < minimum * LOW_CALORIE_FACTOR {
        return Err(FeasibilityError::CalorieTargetTooLow {
            target: daily,
            minimum,
        });
    }
    if daily > maximum * HIGH_CALORIE_FACTOR {
        return Err(FeasibilityError::CalorieTargetTooHigh {
            target: daily,
            maximum,
        });
    }
    Ok(())
}
