// ABOUTME: Prompts for meal synthesis and daily target generation
// ABOUTME: System prompts are loaded at compile time; user prompts are rendered from requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Prompts
//!
//! System prompts live in markdown files next to this module and fix the JSON
//! schema the model must answer with. User prompts are rendered per request.

use mealplan_core::models::PreferenceProfile;
use mealplan_intelligence::synthesis::SynthesisRequest;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

/// System prompt for the meal synthesizer
pub const MEAL_SYSTEM_PROMPT: &str = include_str!("meal_system.md");

/// System prompt for daily target generation
pub const TARGET_SYSTEM_PROMPT: &str = include_str!("target_system.md");

fn join_or<S: AsRef<str>>(items: &[S], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_owned()
    } else {
        items
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Serialized label of a unit enum, e.g. `moderately_active`
fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(label)) => label,
        _ => "unknown".to_owned(),
    }
}

/// Render the user prompt for one synthesis batch
#[must_use]
pub fn meal_user_prompt(request: &SynthesisRequest) -> String {
    let slots: Vec<String> = request
        .slot_counts()
        .into_iter()
        .map(|(meal_type, count)| format!("{meal_type} x{count}"))
        .collect();
    let restrictions: Vec<String> = request.restrictions.iter().map(ToString::to_string).collect();
    let budget = request.budget.rounded();

    let mut prompt = String::new();
    let _ = writeln!(prompt, "Create meals for these slots: {}.", slots.join(", "));
    prompt.push('\n');
    prompt.push_str("Total targets for ALL returned meals (sum across meals):\n");
    let _ = writeln!(prompt, "- calories: {}", budget.calories);
    let _ = writeln!(prompt, "- protein: {} g", budget.protein);
    let _ = writeln!(prompt, "- carbs: {} g", budget.carbs);
    let _ = writeln!(prompt, "- fat: {} g", budget.fat);
    prompt.push('\n');
    prompt.push_str("Constraints:\n");
    let _ = writeln!(
        prompt,
        "- Dietary restrictions: {}",
        join_or(&restrictions, "none")
    );
    let _ = writeln!(
        prompt,
        "- Preferred cuisines (allow-list, strict): {}",
        join_or(&request.preferred_cuisines, "none")
    );
    let _ = writeln!(
        prompt,
        "- Cooking time per meal: {}",
        request.cooking_time.describe()
    );
    let _ = writeln!(
        prompt,
        "- Avoid repeating these meal names: {}",
        join_or(&request.avoid_names, "none")
    );
    prompt.push('\n');
    prompt.push_str("Return JSON only, matching the system schema.\n");
    prompt
}

/// Render the user prompt asking for daily targets
#[must_use]
pub fn target_user_prompt(profile: &PreferenceProfile) -> String {
    let restrictions: Vec<String> = profile
        .active_restrictions()
        .map(ToString::to_string)
        .collect();
    let unknown = || "unknown".to_owned();
    let body = profile.body.as_ref();

    let mut prompt = String::from("Create daily calorie and macro targets for this profile:\n");
    let _ = writeln!(
        prompt,
        "- Age: {}",
        body.map_or_else(unknown, |b| b.age.to_string())
    );
    let _ = writeln!(
        prompt,
        "- Gender: {}",
        body.map_or_else(unknown, |b| label(&b.gender))
    );
    let _ = writeln!(
        prompt,
        "- Height: {} cm",
        body.map_or_else(unknown, |b| b.height_cm.to_string())
    );
    let _ = writeln!(
        prompt,
        "- Weight: {} kg",
        body.map_or_else(unknown, |b| b.weight_kg.to_string())
    );
    let _ = writeln!(
        prompt,
        "- Activity level: {}",
        body.map_or_else(unknown, |b| label(&b.activity_level))
    );
    let _ = writeln!(
        prompt,
        "- Nutrition goal: {}",
        body.map_or_else(unknown, |b| label(&b.goal))
    );
    let _ = writeln!(prompt, "- Meals per day: {}", profile.meals_per_day);
    let _ = writeln!(prompt, "- Budget range: {}", label(&profile.budget));
    let _ = writeln!(
        prompt,
        "- Cooking time preference: {}",
        profile.cooking_time.describe()
    );
    let _ = writeln!(
        prompt,
        "- Dietary restrictions: {}",
        join_or(&restrictions, "none")
    );
    let _ = writeln!(
        prompt,
        "- Preferred cuisines: {}",
        join_or(&profile.preferred_cuisines, "no preference")
    );
    prompt.push('\n');
    prompt.push_str("Return ONLY JSON matching the schema in the system prompt.\n");
    prompt
}
