// ABOUTME: Shared fixtures for planning engine integration tests
// ABOUTME: Recipe builders, balanced weekly catalogs, and a scripted meal synthesizer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `mealplan_intelligence`

use async_trait::async_trait;
use mealplan_core::models::{
    DietaryFlags, MacroTarget, Macros, MealType, RecipeCandidate,
};
use mealplan_intelligence::synthesis::{
    GeneratedMeal, MealSynthesizer, SynthesisRequest, SynthesizerError,
};
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

/// Daily target that three balanced meals hit exactly
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
    .with_ingredients(["rice", "beans"])
    .with_instructions(["Cook.", "Plate."])
}

/// Small snack
pub fn snack(name: &str) -> RecipeCandidate {
    RecipeCandidate::new(
        Uuid::new_v4(),
        name,
        MealType::Snack,
        Macros::new(200.0, 10.0, 20.0, 8.0),
    )
    .with_total_time(5)
    .with_allergens(["none"])
}

/// Seven breakfasts, seven lunches, seven dinners that fill a three-meal week exactly once
pub fn balanced_week_catalog(prefix: &str) -> Vec<RecipeCandidate> {
    let mut catalog = Vec::with_capacity(21);
    for i in 0..7 {
        catalog.push(breakfast(&format!("{prefix} Porridge {i}")));
    }
    for i in 0..7 {
        catalog.push(main_meal(&format!("{prefix} Salad {i}"), MealType::Lunch));
    }
    for i in 0..7 {
        catalog.push(main_meal(&format!("{prefix} Stew {i}"), MealType::Dinner));
    }
    catalog
}

/// Build a generated meal for a slot
pub fn generated(meal_type: MealType, name: &str, macros: Macros) -> GeneratedMeal {
    GeneratedMeal {
        meal_type,
        name: name.to_owned(),
        macros,
        dietary: DietaryFlags::vegan(),
        allergens: vec!["none".to_owned()],
        cook_time_minutes: Some(20),
        cuisine: None,
        ingredients: vec!["lentils".to_owned()],
        instructions: vec!["Simmer.".to_owned()],
    }
}

/// Synthesizer that answers every request with one even-split meal per slot
///
/// Every request is recorded so tests can inspect budgets and avoid lists.
#[derive(Default)]
pub struct ScriptedSynthesizer {
    calls: AtomicUsize,
    requests: Mutex<Vec<SynthesisRequest>>,
    fail_with: Option<SynthesizerError>,
    omit_allergens: bool,
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

    /// Answer with meals that carry no allergen data at all
    pub fn omitting_allergens() -> Self {
        Self {
            omit_allergens: true,
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
            .map(|(i, slot)| {
                let mut meal = generated(*slot, &format!("Generated {slot} {call}-{i}"), share);
                if self.omit_allergens {
                    meal.allergens.clear();
                }
                meal
            })
            .collect())
    }
}
