// ABOUTME: Shared fixtures for service-level integration tests
// ABOUTME: Recipe builders, balanced catalogs, and scripted synthesizer and chat-provider doubles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `mealplan`

use async_trait::async_trait;
use mealplan::llm::{ChatRequest, ChatResponse, LlmProvider};
use mealplan_core::errors::AppError;
use mealplan_core::models::{DietaryFlags, MacroTarget, Macros, MealType, RecipeCandidate};
use mealplan_intelligence::synthesis::{
    GeneratedMeal, MealSynthesizer, SynthesisRequest, SynthesizerError,
};
use std::collections::VecDeque;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Recipes
// ============================================================================

/// Daily target that one breakfast and two mains hit exactly
pub const fn standard_target() -> MacroTarget {
    MacroTarget::new(2000.0, 120.0, 200.0, 60.0)
}

/// Breakfast carrying a quarter of the standard target
pub fn breakfast(name: &str) -> RecipeCandidate {
    RecipeCandidate::new(
        Uuid::new_v4(),
        name,
        MealType::Breakfast,
        Macros::new(500.0, 30.0, 50.0, 15.0),
    )
    .with_total_time(15)
    .with_allergens(["none"])
    .with_dietary(DietaryFlags::vegetarian())
    .with_ingredients(["oats", "milk"])
    .with_instructions(["Mix.", "Serve."])
}

/// Lunch or dinner carrying three eighths of the standard target
pub fn main_meal(name: &str, meal_type: MealType) -> RecipeCandidate {
    RecipeCandidate::new(
        Uuid::new_v4(),
        name,
        meal_type,
        Macros::new(750.0, 45.0, 75.0, 22.5),
    )
    .with_total_time(30)
    .with_allergens(["none"])
    .with_dietary(DietaryFlags::vegetarian())
    .with_ingredients(["rice", "beans"])
    .with_instructions(["Cook.", "Plate."])
}

/// `breakfasts`, `lunches` and `dinners` recipes of each bucket
pub fn catalog(prefix: &str, breakfasts: usize, lunches: usize, dinners: usize) -> Vec<RecipeCandidate> {
    let mut recipes = Vec::with_capacity(breakfasts + lunches + dinners);
    recipes.extend((0..breakfasts).map(|i| breakfast(&format!("{prefix} Porridge {i}"))));
    recipes.extend((0..lunches).map(|i| main_meal(&format!("{prefix} Salad {i}"), MealType::Lunch)));
    recipes.extend((0..dinners).map(|i| main_meal(&format!("{prefix} Stew {i}"), MealType::Dinner)));
    recipes
}

/// Seven recipes of each bucket, enough for a three-meal week without repeats
pub fn balanced_week_catalog(prefix: &str) -> Vec<RecipeCandidate> {
    catalog(prefix, 7, 7, 7)
}

/// Ids of every recipe
pub fn ids(recipes: &[RecipeCandidate]) -> Vec<Uuid> {
    recipes.iter().map(|recipe| recipe.id).collect()
}

// ============================================================================
// Synthesizer double
// ============================================================================

/// Vegetarian generated meal with complete data
pub fn generated(meal_type: MealType, name: &str, macros: Macros) -> GeneratedMeal {
    GeneratedMeal {
        meal_type,
        name: name.to_owned(),
        macros,
        dietary: DietaryFlags::vegetarian(),
        allergens: vec!["none".to_owned()],
        cook_time_minutes: Some(20),
        cuisine: None,
        ingredients: vec!["lentils".to_owned()],
        instructions: vec!["Simmer.".to_owned()],
    }
}

/// Synthesizer answering every request with one even-split meal per slot
#[derive(Default)]
pub struct ScriptedSynthesizer {
    calls: AtomicUsize,
    requests: Mutex<Vec<SynthesisRequest>>,
    fail_with: Option<SynthesizerError>,
}

impl ScriptedSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: SynthesizerError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MealSynthesizer for ScriptedSynthesizer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<Vec<GeneratedMeal>, SynthesizerError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        let share = request.budget.divided_by(request.slots.len() as f64);
        Ok(request
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| generated(*slot, &format!("Generated {slot} {call}-{i}"), share))
            .collect())
    }
}

// ============================================================================
// Chat provider double
// ============================================================================

/// Chat provider replaying canned replies in order and recording requests
///
/// A `None` reply answers with an external-service error.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Option<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = Option<S>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(Into::into)).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(reply: impl Into<String>) -> Self {
        Self::new([Some(reply.into())])
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front().flatten();
        reply
            .map(|content| ChatResponse {
                content,
                model: "scripted-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            })
            .ok_or_else(|| AppError::external_service("LLM", "connection refused"))
    }
}
