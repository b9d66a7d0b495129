// ABOUTME: Weekly plan output structure: days, slot map, and normalized meals
// ABOUTME: Serializes to the calorieTarget/macroTargets/days shape with fixed slot keys
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MacroGrams, MacroTarget, Macros, MealType, RecipeCandidate};

/// Where a planned meal came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSource {
    /// Selected from the recipe catalog
    Catalog,
    /// Produced by the generative synthesizer
    Generated,
}

/// A meal as it appears in the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    /// Provenance
    pub source: MealSource,
    /// Catalog id; `None` for generated and aggregated meals
    pub id: Option<Uuid>,
    /// Display name
    pub name: String,
    /// Nutrition of this entry
    #[serde(flatten)]
    pub macros: Macros,
    /// Total time in minutes if known
    #[serde(default)]
    pub cook_time: Option<u32>,
    /// Cuisine label if known
    #[serde(default)]
    pub cuisine: Option<String>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ingredient lines
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Instructions as a single paragraph
    #[serde(default)]
    pub instructions: String,
}

impl Meal {
    /// Normalize a catalog recipe into a plan meal
    #[must_use]
    pub fn from_candidate(recipe: &RecipeCandidate) -> Self {
        Self {
            source: MealSource::Catalog,
            id: Some(recipe.id),
            name: recipe.name.clone(),
            macros: recipe.macros,
            cook_time: recipe.total_time_mins,
            cuisine: recipe.cuisine.clone(),
            tags: recipe.tags.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: join_steps(&recipe.instructions),
        }
    }
}

/// Join instruction steps into one paragraph, skipping blank steps
#[must_use]
pub fn join_steps<S: AsRef<str>>(steps: &[S]) -> String {
    steps
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The four slot keys of a day; every key is always serialized, `null` when empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayMeals {
    /// Breakfast slot
    #[serde(rename = "Breakfast")]
    pub breakfast: Option<Meal>,
    /// Lunch slot
    #[serde(rename = "Lunch")]
    pub lunch: Option<Meal>,
    /// Dinner slot
    #[serde(rename = "Dinner")]
    pub dinner: Option<Meal>,
    /// Aggregated snacks
    #[serde(rename = "Snacks")]
    pub snacks: Option<Meal>,
}

impl DayMeals {
    /// Entry for a slot type; snack slots share the aggregated entry
    #[must_use]
    pub const fn get(&self, slot: MealType) -> Option<&Meal> {
        match slot {
            MealType::Breakfast => self.breakfast.as_ref(),
            MealType::Lunch => self.lunch.as_ref(),
            MealType::Dinner => self.dinner.as_ref(),
            MealType::Snack => self.snacks.as_ref(),
        }
    }

    /// Mutable entry for a slot type
    pub fn get_mut(&mut self, slot: MealType) -> &mut Option<Meal> {
        match slot {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snack => &mut self.snacks,
        }
    }

    /// Present entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Meal> {
        [&self.breakfast, &self.lunch, &self.dinner, &self.snacks]
            .into_iter()
            .flatten()
    }
}

/// One day of the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Day name ("Monday" .. "Sunday")
    pub name: String,
    /// Total calories of the day's meals
    pub calories: f64,
    /// Total macros of the day's meals
    pub macros: MacroGrams,
    /// Slot map
    pub meals: DayMeals,
}

impl DayPlan {
    /// Empty day with zero totals
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calories: 0.0,
            macros: MacroGrams::default(),
            meals: DayMeals::default(),
        }
    }

    /// Totals as a [`Macros`] value
    #[must_use]
    pub const fn totals(&self) -> Macros {
        Macros::new(
            self.calories,
            self.macros.protein,
            self.macros.carbs,
            self.macros.fat,
        )
    }

    /// Recompute totals from the constituent meals, rounded to output precision
    pub fn recompute_totals(&mut self) {
        let totals: Macros = self.meals.iter().map(|meal| meal.macros).sum();
        let totals = totals.rounded();
        self.calories = totals.calories;
        self.macros = MacroGrams {
            protein: totals.protein,
            carbs: totals.carbs,
            fat: totals.fat,
        };
    }
}

/// Seven-day plan carrying the daily target it was built for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    /// Daily target
    #[serde(flatten)]
    pub target: MacroTarget,
    /// Days in order Monday..Sunday
    pub days: Vec<DayPlan>,
}

impl WeeklyPlan {
    /// Every present meal across the week
    pub fn meals(&self) -> impl Iterator<Item = &Meal> {
        self.days.iter().flat_map(|day| day.meals.iter())
    }

    /// Number of present meals with the given source
    #[must_use]
    pub fn count_by_source(&self, source: MealSource) -> usize {
        self.meals().filter(|meal| meal.source == source).count()
    }
}
