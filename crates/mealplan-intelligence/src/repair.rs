// ABOUTME: Plan repair filling empty slots of an existing weekly plan through the synthesizer
// ABOUTME: Uses each day's remaining budget and every name already in the plan as the avoid list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use mealplan_core::models::{DayPlan, Meal, MealType, PreferenceProfile, WeeklyPlan};
use thiserror::Error;
use tracing::{info, warn};

use crate::assembler::aggregate_snacks;
use crate::composer::UsedNames;
use crate::config::CuisineMismatchPolicy;
use crate::rules::HardConstraints;
use crate::synthesis::{validate_batch, MealSynthesizer, SynthesisRequest, SynthesizerError};

/// Outcome of a successful repair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Slots that were filled
    pub filled_slots: usize,
    /// Days that needed at least one meal
    pub repaired_days: usize,
}

/// Repair stopped at a day whose batch failed
///
/// Days before it keep the meals they received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not repair {day}: {source}")]
pub struct RepairError {
    /// Day name
    pub day: String,
    /// Batch failure
    #[source]
    pub source: SynthesizerError,
}

/// Slots of `slots` that have no entry in the day
fn missing_slots(plan_day: &DayPlan, slots: &[MealType]) -> Vec<MealType> {
    let mut missing: Vec<MealType> = [MealType::Breakfast, MealType::Lunch, MealType::Dinner]
        .into_iter()
        .filter(|slot| slots.contains(slot) && plan_day.meals.get(*slot).is_none())
        .collect();
    let snack_count = slots.iter().filter(|slot| **slot == MealType::Snack).count();
    if snack_count > 0 && plan_day.meals.snacks.is_none() {
        missing.extend(vec![MealType::Snack; snack_count]);
    }
    missing
}

/// Fill every empty slot of `plan` for the profile's slot layout
///
/// Days are processed in order. Each day's budget is the plan target minus the
/// day's current totals, floored at zero. Generated snacks are aggregated into
/// the day's snack entry and totals are recomputed.
///
/// # Errors
///
/// Returns [`RepairError`] for the first day whose synthesizer batch fails
pub async fn fill_missing_meals(
    plan: &mut WeeklyPlan,
    profile: &PreferenceProfile,
    synthesizer: &dyn MealSynthesizer,
    policy: CuisineMismatchPolicy,
) -> Result<RepairReport, RepairError> {
    let slots = profile.slots();
    let constraints = HardConstraints::from_profile(profile);
    let target = plan.target.as_macros();

    let mut used = UsedNames::new();
    for meal in plan.meals() {
        used.insert(&meal.name);
    }

    let mut report = RepairReport::default();
    for day in &mut plan.days {
        let missing = missing_slots(day, &slots);
        if missing.is_empty() {
            continue;
        }
        day.recompute_totals();
        let budget = target.saturating_sub(&day.totals());
        let request =
            SynthesisRequest::for_profile(profile, missing, budget, used.names().to_vec());

        let generated = synthesizer
            .synthesize(&request)
            .await
            .and_then(|meals| validate_batch(&request, meals, &constraints, policy))
            .map_err(|source| {
                warn!(day = %day.name, error = %source, "Plan repair batch failed");
                RepairError {
                    day: day.name.clone(),
                    source,
                }
            })?;

        let mut snacks: Vec<Meal> = Vec::new();
        for meal in generated {
            used.insert(&meal.name);
            report.filled_slots += 1;
            let slot = meal.meal_type;
            let meal = meal.into_meal();
            if slot == MealType::Snack {
                snacks.push(meal);
            } else {
                *day.meals.get_mut(slot) = Some(meal);
            }
        }
        if !snacks.is_empty() {
            day.meals.snacks = aggregate_snacks(&snacks);
        }
        day.recompute_totals();
        report.repaired_days += 1;
    }

    info!(
        filled_slots = report.filled_slots,
        repaired_days = report.repaired_days,
        "Plan repair complete"
    );
    Ok(report)
}
