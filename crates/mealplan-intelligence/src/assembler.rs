// ABOUTME: Plan assembler normalizing chosen meals into the seven-day output structure
// ABOUTME: Groups meals by slot, aggregates snacks, and recomputes totals from constituent meals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use chrono::Weekday;
use mealplan_core::constants::{day_name, MAX_SNACK_NAMES, WEEK_DAYS};
use mealplan_core::models::{DayPlan, MacroTarget, Macros, Meal, MealSource, MealType, WeeklyPlan};

use crate::composer::WeekComposition;
use crate::solver::WeeklyAssignment;

/// Combine snack entries into one `Snacks: a, b, c` entry
///
/// Macros are summed over every snack; only the first three names are shown.
/// The entry has no id and no tags or ingredients, and its instructions are the
/// non-empty snack instructions joined by a space. It is marked generated if
/// any constituent was.
#[must_use]
pub fn aggregate_snacks(snacks: &[Meal]) -> Option<Meal> {
    if snacks.is_empty() {
        return None;
    }
    let names: Vec<&str> = snacks
        .iter()
        .take(MAX_SNACK_NAMES)
        .map(|meal| {
            if meal.name.trim().is_empty() {
                "Snack"
            } else {
                meal.name.as_str()
            }
        })
        .collect();
    let instructions = snacks
        .iter()
        .map(|meal| meal.instructions.trim())
        .filter(|step| !step.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let source = if snacks.iter().any(|meal| meal.source == MealSource::Generated) {
        MealSource::Generated
    } else {
        MealSource::Catalog
    };

    Some(Meal {
        source,
        id: None,
        name: format!("Snacks: {}", names.join(", ")),
        macros: snacks.iter().map(|meal| meal.macros).sum::<Macros>(),
        cook_time: None,
        cuisine: None,
        tags: Vec::new(),
        ingredients: Vec::new(),
        instructions,
    })
}

/// Build one day from slot-tagged meals
///
/// The first breakfast, lunch, and dinner fill their keys; every snack is
/// aggregated. Totals are recomputed from the resulting entries.
#[must_use]
pub fn assemble_day(day: Weekday, meals: Vec<(MealType, Meal)>) -> DayPlan {
    let mut plan = DayPlan::empty(day_name(day));
    let mut snacks = Vec::new();
    for (slot, meal) in meals {
        if slot == MealType::Snack {
            snacks.push(meal);
            continue;
        }
        let entry = plan.meals.get_mut(slot);
        if entry.is_none() {
            *entry = Some(meal);
        }
    }
    plan.meals.snacks = aggregate_snacks(&snacks);
    plan.recompute_totals();
    plan
}

/// Build the weekly plan; days absent from `days` are emitted empty
#[must_use]
pub fn assemble_week(
    target: &MacroTarget,
    mut days: Vec<(Weekday, Vec<(MealType, Meal)>)>,
) -> WeeklyPlan {
    let plans = WEEK_DAYS
        .iter()
        .map(|weekday| {
            days.iter()
                .position(|(day, _)| day == weekday)
                .map_or_else(
                    || DayPlan::empty(day_name(*weekday)),
                    |position| {
                        let (day, meals) = days.swap_remove(position);
                        assemble_day(day, meals)
                    },
                )
        })
        .collect();
    WeeklyPlan {
        target: *target,
        days: plans,
    }
}

/// Weekly plan from a solver assignment
#[must_use]
pub fn assemble_from_assignment(target: &MacroTarget, assignment: &WeeklyAssignment) -> WeeklyPlan {
    let days = assignment
        .days
        .iter()
        .map(|day| {
            let meals = day
                .meals
                .iter()
                .map(|(slot, recipe)| (*slot, Meal::from_candidate(recipe)))
                .collect();
            (day.day, meals)
        })
        .collect();
    assemble_week(target, days)
}

/// Weekly plan from a hybrid composition
#[must_use]
pub fn assemble_from_composition(target: &MacroTarget, composition: WeekComposition) -> WeeklyPlan {
    let days = composition
        .days
        .into_iter()
        .map(|day| (day.day, day.meals))
        .collect();
    assemble_week(target, days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snack(name: &str, calories: f64) -> Meal {
        Meal {
            source: MealSource::Catalog,
            id: None,
            name: name.to_owned(),
            macros: Macros::new(calories, 5.0, 10.0, 3.0),
            cook_time: Some(5),
            cuisine: None,
            tags: vec!["snack".to_owned()],
            ingredients: vec!["x".to_owned()],
            instructions: String::new(),
        }
    }

    #[test]
    fn test_aggregate_snacks_names_first_three() {
        let snacks = [
            snack("Nuts", 100.0),
            snack("Yogurt", 150.0),
            snack("Apple", 80.0),
            snack("Bar", 200.0),
        ];
        let combined = aggregate_snacks(&snacks).unwrap();
        assert_eq!(combined.name, "Snacks: Nuts, Yogurt, Apple");
        assert!((combined.macros.calories - 530.0).abs() < 1e-9);
        assert!(combined.tags.is_empty());
        assert!(combined.ingredients.is_empty());
        assert_eq!(combined.id, None);
    }

    #[test]
    fn test_aggregate_snacks_empty() {
        assert!(aggregate_snacks(&[]).is_none());
    }
}
