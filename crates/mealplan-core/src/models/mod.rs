// ABOUTME: Domain models for weekly meal planning
// ABOUTME: Recipes, preferences, history, nutrition targets, body metrics, and plan output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Domain models shared by the planning engine and the service layer.

mod body;
mod history;
mod meal_type;
mod nutrition;
mod plan;
mod preferences;
mod recipe;

pub use body::{ActivityLevel, BodyMetrics, Gender, NutritionGoal};
pub use history::UserHistory;
pub use meal_type::MealType;
pub use nutrition::{MacroGrams, MacroKind, MacroTarget, Macros};
pub use plan::{join_steps, DayMeals, DayPlan, Meal, MealSource, WeeklyPlan};
pub use preferences::{
    normalize_token, BudgetTier, CookingTimeBounds, CookingTimeBucket, DietaryRestriction,
    PreferenceProfile,
};
pub use recipe::{CostCategory, DietaryFlags, RecipeCandidate};
