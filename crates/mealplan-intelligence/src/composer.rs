// ABOUTME: Hybrid day composer filling slots greedily from the catalog by macro fit
// ABOUTME: Unfilled slots go to the meal synthesizer in one validated batch per day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Hybrid Day Composer
//!
//! Days are composed one after another so the used-name set carried across
//! the week stays consistent. Within a day, slots are visited in layout order
//! with a remaining-macro budget that starts at the daily target. Each slot
//! takes the unused candidate of exactly its bucket that best fits
//! `remaining budget / remaining slots`.

use chrono::Weekday;
use mealplan_core::constants::{day_name, WEEK_DAYS};
use mealplan_core::models::{
    MacroKind, MacroTarget, Macros, Meal, MealType, PreferenceProfile, RecipeCandidate,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ComposerConfig;
use crate::rules::HardConstraints;
use crate::synthesis::{
    validate_batch, GeneratedMeal, MealSynthesizer, SynthesisRequest, SynthesizerError,
};

/// Score tolerance for ties
const SCORE_EPS: f64 = 1e-9;

/// Catalog versus generated meal counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcingStats {
    /// Meals taken from the catalog
    pub catalog_meals: usize,
    /// Meals produced by the synthesizer
    pub generated_meals: usize,
}

impl SourcingStats {
    fn add(&mut self, other: Self) {
        self.catalog_meals += other.catalog_meals;
        self.generated_meals += other.generated_meals;
    }
}

/// One composed day
#[derive(Debug, Clone, PartialEq)]
pub struct DayComposition {
    /// Day of week
    pub day: Weekday,
    /// Slot type and meal, in slot order
    pub meals: Vec<(MealType, Meal)>,
    /// Sourcing counts for the day
    pub sourcing: SourcingStats,
}

/// A composed week
#[derive(Debug, Clone, PartialEq)]
pub struct WeekComposition {
    /// Days Monday..Sunday
    pub days: Vec<DayComposition>,
    /// Sourcing counts for the week
    pub sourcing: SourcingStats,
}

/// A day could not be completed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// The synthesizer batch for the day failed
    #[error("could not fill {day}: {source}")]
    DayFailed {
        /// Day name
        day: &'static str,
        /// Batch failure
        #[source]
        source: SynthesizerError,
    },
}

/// Names already placed in the plan; matching is case-insensitive
#[derive(Debug, Clone, Default)]
pub struct UsedNames {
    names: Vec<String>,
    keys: HashSet<String>,
}

impl UsedNames {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name; returns `false` if it was already present
    pub fn insert(&mut self, name: &str) -> bool {
        let key = name.trim().to_lowercase();
        if key.is_empty() || !self.keys.insert(key) {
            return false;
        }
        self.names.push(name.trim().to_owned());
        true
    }

    /// Whether a name was already used
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains(&name.trim().to_lowercase())
    }

    /// Names in insertion order
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of names
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// No names recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Macro-fit score of a candidate against the per-slot ideal
///
/// Negative sum over the four macros of `|value - ideal| / ideal`, with the
/// divisor floored at 1, plus bonuses for listing ingredients and instructions.
#[must_use]
pub fn fit_score(recipe: &RecipeCandidate, ideal: &Macros, config: &ComposerConfig) -> f64 {
    let penalty: f64 = MacroKind::ALL
        .iter()
        .map(|kind| {
            let want = ideal.get(*kind);
            (recipe.macros.get(*kind) - want).abs() / want.max(1.0)
        })
        .sum();
    let mut score = -penalty;
    if !recipe.ingredients.is_empty() {
        score += config.ingredient_bonus;
    }
    if !recipe.instructions.is_empty() {
        score += config.instruction_bonus;
    }
    score
}

/// Greedy catalog composer with synthesizer escalation
pub struct HybridComposer<'a> {
    candidates: &'a [RecipeCandidate],
    profile: &'a PreferenceProfile,
    constraints: HardConstraints,
    synthesizer: &'a dyn MealSynthesizer,
    config: &'a ComposerConfig,
    slots: Vec<MealType>,
    rng: Option<ChaCha8Rng>,
}

impl<'a> HybridComposer<'a> {
    /// Composer over filtered candidates for one profile
    #[must_use]
    pub fn new(
        candidates: &'a [RecipeCandidate],
        profile: &'a PreferenceProfile,
        synthesizer: &'a dyn MealSynthesizer,
        config: &'a ComposerConfig,
    ) -> Self {
        Self {
            candidates,
            profile,
            constraints: HardConstraints::from_profile(profile),
            synthesizer,
            config,
            slots: profile.slots(),
            rng: config.tie_break_seed.map(ChaCha8Rng::seed_from_u64),
        }
    }

    /// Slot layout used for every day
    #[must_use]
    pub fn slots(&self) -> &[MealType] {
        &self.slots
    }

    /// Compose seven days in order, sharing one used-name set
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError`] for the first day whose synthesizer batch fails
    pub async fn compose_week(&mut self, target: &MacroTarget) -> Result<WeekComposition, ComposeError> {
        let mut used = UsedNames::new();
        let mut days = Vec::with_capacity(WEEK_DAYS.len());
        let mut sourcing = SourcingStats::default();
        for day in WEEK_DAYS {
            let composed = self.compose_day(day, target, &mut used).await?;
            sourcing.add(composed.sourcing);
            days.push(composed);
        }
        info!(
            catalog_meals = sourcing.catalog_meals,
            generated_meals = sourcing.generated_meals,
            "Hybrid week composed"
        );
        Ok(WeekComposition { days, sourcing })
    }

    /// Compose one day, recording every placed name in `used`
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::DayFailed`] when unfilled slots remain and the
    /// synthesizer batch fails or does not validate
    pub async fn compose_day(
        &mut self,
        day: Weekday,
        target: &MacroTarget,
        used: &mut UsedNames,
    ) -> Result<DayComposition, ComposeError> {
        let slots = self.slots.clone();
        let mut budget = target.as_macros();
        let mut filled: Vec<Option<Meal>> = Vec::with_capacity(slots.len());
        let mut sourcing = SourcingStats::default();

        for (position, slot) in slots.iter().enumerate() {
            let remaining_slots = (slots.len() - position) as f64;
            let ideal = budget.divided_by(remaining_slots);
            match self.pick(*slot, &ideal, used) {
                Some(recipe) => {
                    debug!(day = day_name(day), slot = %slot, recipe = %recipe.name, "Catalog pick");
                    budget = budget.saturating_sub(&recipe.macros);
                    used.insert(&recipe.name);
                    sourcing.catalog_meals += 1;
                    filled.push(Some(Meal::from_candidate(recipe)));
                }
                None => {
                    debug!(day = day_name(day), slot = %slot, "No unused catalog candidate");
                    filled.push(None);
                }
            }
        }

        let unfilled: Vec<usize> = filled
            .iter()
            .enumerate()
            .filter_map(|(position, meal)| meal.is_none().then_some(position))
            .collect();
        if !unfilled.is_empty() {
            let request = SynthesisRequest::for_profile(
                self.profile,
                unfilled.iter().map(|position| slots[*position]).collect(),
                budget,
                used.names().to_vec(),
            );
            let generated = self.synthesize(day, &request).await?;
            for (position, meal) in unfilled.into_iter().zip(generated) {
                used.insert(&meal.name);
                sourcing.generated_meals += 1;
                filled[position] = Some(meal.into_meal());
            }
        }

        let meals = slots
            .into_iter()
            .zip(filled)
            .filter_map(|(slot, meal)| meal.map(|meal| (slot, meal)))
            .collect();
        info!(
            day = day_name(day),
            catalog_meals = sourcing.catalog_meals,
            generated_meals = sourcing.generated_meals,
            "Hybrid day composed"
        );
        Ok(DayComposition {
            day,
            meals,
            sourcing,
        })
    }

    async fn synthesize(
        &self,
        day: Weekday,
        request: &SynthesisRequest,
    ) -> Result<Vec<GeneratedMeal>, ComposeError> {
        let fail = |source: SynthesizerError| {
            warn!(day = day_name(day), synthesizer = self.synthesizer.name(), error = %source, "Synthesizer batch failed");
            ComposeError::DayFailed {
                day: day_name(day),
                source,
            }
        };
        info!(
            day = day_name(day),
            synthesizer = self.synthesizer.name(),
            slots = request.slots.len(),
            "Escalating unfilled slots to synthesizer"
        );
        let meals = self.synthesizer.synthesize(request).await.map_err(fail)?;
        validate_batch(
            request,
            meals,
            &self.constraints,
            self.config.cuisine_mismatch,
        )
        .map_err(fail)
    }

    /// Best unused candidate of exactly `slot`'s bucket
    fn pick(&mut self, slot: MealType, ideal: &Macros, used: &UsedNames) -> Option<&'a RecipeCandidate> {
        let scored: Vec<(&'a RecipeCandidate, f64)> = self
            .candidates
            .iter()
            .filter(|recipe| recipe.meal_type == slot && !used.contains(&recipe.name))
            .map(|recipe| (recipe, fit_score(recipe, ideal, self.config)))
            .collect();
        let best = scored
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);
        let mut ties = scored
            .into_iter()
            .filter(|(_, score)| *score >= best - SCORE_EPS)
            .map(|(recipe, _)| recipe);
        match self.rng.as_mut() {
            None => ties.next(),
            Some(rng) => {
                let ties: Vec<&'a RecipeCandidate> = ties.collect();
                if ties.is_empty() {
                    None
                } else {
                    Some(ties[rng.gen_range(0..ties.len())])
                }
            }
        }
    }
}
