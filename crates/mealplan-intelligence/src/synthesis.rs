// ABOUTME: Generative meal synthesizer contract and batch validation of generated meals
// ABOUTME: Injected capability with an explicit disabled variant; batches are accepted whole or not at all
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Generative Meal Synthesizer
//!
//! The composer hands every slot it could not fill from the catalog to a
//! [`MealSynthesizer`] in one batch. Whatever comes back is checked by
//! [`validate_batch`] against the same hard rules as catalog recipes before any
//! of it reaches a plan.

use async_trait::async_trait;
use mealplan_core::errors::{AppError, ErrorCode};
use mealplan_core::models::{
    join_steps, CookingTimeBounds, DietaryFlags, DietaryRestriction, Macros, Meal, MealSource,
    MealType, PreferenceProfile,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::config::CuisineMismatchPolicy;
use crate::rules::{HardConstraints, RuleViolation};

/// Everything the synthesizer needs to fill a batch of slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Slots to fill, one meal each, in order
    pub slots: Vec<MealType>,
    /// Macros the whole batch should add up to
    pub budget: Macros,
    /// Active dietary restrictions
    pub restrictions: Vec<DietaryRestriction>,
    /// Cuisine allow-list as the user wrote it; empty means any
    pub preferred_cuisines: Vec<String>,
    /// Per-meal cooking-time window
    pub cooking_time: CookingTimeBounds,
    /// Names that must not be reused
    pub avoid_names: Vec<String>,
}

impl SynthesisRequest {
    /// Request carrying the profile's constraints
    #[must_use]
    pub fn for_profile(
        profile: &PreferenceProfile,
        slots: Vec<MealType>,
        budget: Macros,
        avoid_names: Vec<String>,
    ) -> Self {
        Self {
            slots,
            budget,
            restrictions: profile.active_restrictions().cloned().collect(),
            preferred_cuisines: profile
                .preferred_cuisines
                .iter()
                .filter(|c| !c.trim().is_empty())
                .cloned()
                .collect(),
            cooking_time: profile.cooking_time,
            avoid_names,
        }
    }

    /// Requested count per meal type, in first-seen order
    #[must_use]
    pub fn slot_counts(&self) -> Vec<(MealType, usize)> {
        let mut counts: Vec<(MealType, usize)> = Vec::new();
        for slot in &self.slots {
            match counts.iter_mut().find(|(meal_type, _)| meal_type == slot) {
                Some((_, count)) => *count += 1,
                None => counts.push((*slot, 1)),
            }
        }
        counts
    }
}

/// A meal produced by the synthesizer, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMeal {
    /// Slot type the meal was produced for
    pub meal_type: MealType,
    /// Display name
    pub name: String,
    /// Nutrition
    #[serde(flatten)]
    pub macros: Macros,
    /// Declared dietary flags
    #[serde(default)]
    pub dietary: DietaryFlags,
    /// Declared allergens; empty means unknown
    #[serde(default)]
    pub allergens: Vec<String>,
    /// Declared cooking time
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    /// Declared cuisine
    #[serde(default)]
    pub cuisine: Option<String>,
    /// Ingredient lines
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Instruction steps
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl GeneratedMeal {
    /// Normalize into a plan meal; the cuisine, if any, becomes the only tag
    #[must_use]
    pub fn into_meal(self) -> Meal {
        let tags = self.cuisine.iter().cloned().collect();
        Meal {
            source: MealSource::Generated,
            id: None,
            name: self.name,
            macros: self.macros,
            cook_time: self.cook_time_minutes,
            cuisine: self.cuisine,
            tags,
            ingredients: self.ingredients,
            instructions: join_steps(&self.instructions),
        }
    }
}

/// Synthesizer failure; always fails the whole batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesizerError {
    /// No generator is configured
    #[error("meal generation is disabled because no generator is configured")]
    Disabled,
    /// The generator could not be reached or returned a transport error
    #[error("meal generator request failed: {0}")]
    Transport(String),
    /// The response could not be decoded
    #[error("failed to parse meal generation response: {0}")]
    Unparseable(String),
    /// The generator declined the request
    #[error("meal generator refused the request: {0}")]
    Refused(String),
    /// Wrong number of meals
    #[error("meal count does not match expected slots: expected {expected}, got {actual}")]
    CountMismatch {
        /// Requested slots
        expected: usize,
        /// Returned meals
        actual: usize,
    },
    /// Wrong number of meals of one type
    #[error("expected {expected} '{meal_type}' meal(s) but got {actual}")]
    TypeMismatch {
        /// Meal type with the wrong count
        meal_type: MealType,
        /// Requested count
        expected: usize,
        /// Returned count
        actual: usize,
    },
    /// A returned meal breaks a hard constraint
    #[error("generated meal '{name}' {violation}")]
    ConstraintViolation {
        /// Offending meal
        name: String,
        /// Broken rule
        violation: RuleViolation,
    },
}

impl From<SynthesizerError> for AppError {
    fn from(err: SynthesizerError) -> Self {
        let code = match err {
            SynthesizerError::Disabled => ErrorCode::ExternalServiceUnavailable,
            SynthesizerError::Transport(_) => ErrorCode::ExternalServiceError,
            SynthesizerError::Unparseable(_) => ErrorCode::InvalidFormat,
            SynthesizerError::Refused(_)
            | SynthesizerError::CountMismatch { .. }
            | SynthesizerError::TypeMismatch { .. }
            | SynthesizerError::ConstraintViolation { .. } => ErrorCode::PlanUnavailable,
        };
        Self::new(code, err.to_string())
    }
}

/// Produces meals for slots the catalog could not fill
#[async_trait]
pub trait MealSynthesizer: Send + Sync {
    /// Name for logs
    fn name(&self) -> &'static str;

    /// Whether calls can succeed at all
    fn is_enabled(&self) -> bool {
        true
    }

    /// Produce exactly one meal per requested slot
    ///
    /// Implementations are not required to validate; callers run [`validate_batch`].
    ///
    /// # Errors
    ///
    /// Returns [`SynthesizerError`] when the batch cannot be produced
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<Vec<GeneratedMeal>, SynthesizerError>;
}

/// Synthesizer used when no generator is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSynthesizer;

#[async_trait]
impl MealSynthesizer for DisabledSynthesizer {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn synthesize(
        &self,
        _request: &SynthesisRequest,
    ) -> Result<Vec<GeneratedMeal>, SynthesizerError> {
        Err(SynthesizerError::Disabled)
    }
}

/// Validate a generated batch and order it to match the requested slots
///
/// Cooking time and dietary or allergen rules always reject. A cuisine outside
/// the allow-list rejects under [`CuisineMismatchPolicy::Reject`] and has its
/// label removed under [`CuisineMismatchPolicy::StripTag`].
///
/// # Errors
///
/// Returns the first problem found; no part of a failed batch is kept
pub fn validate_batch(
    request: &SynthesisRequest,
    meals: Vec<GeneratedMeal>,
    constraints: &HardConstraints,
    policy: CuisineMismatchPolicy,
) -> Result<Vec<GeneratedMeal>, SynthesizerError> {
    if meals.len() != request.slots.len() {
        return Err(SynthesizerError::CountMismatch {
            expected: request.slots.len(),
            actual: meals.len(),
        });
    }

    let mut expected: BTreeMap<MealType, usize> = BTreeMap::new();
    for slot in &request.slots {
        *expected.entry(*slot).or_insert(0) += 1;
    }
    let mut actual: BTreeMap<MealType, usize> = BTreeMap::new();
    for meal in &meals {
        *actual.entry(meal.meal_type).or_insert(0) += 1;
    }
    for meal_type in MealType::ALL {
        let want = expected.get(&meal_type).copied().unwrap_or(0);
        let got = actual.get(&meal_type).copied().unwrap_or(0);
        if want != got {
            return Err(SynthesizerError::TypeMismatch {
                meal_type,
                expected: want,
                actual: got,
            });
        }
    }

    let mut checked = Vec::with_capacity(meals.len());
    for mut meal in meals {
        let violation = |violation| SynthesizerError::ConstraintViolation {
            name: meal.name.clone(),
            violation,
        };
        constraints
            .check_cooking_time(meal.cook_time_minutes)
            .map_err(violation)?;
        constraints
            .check_dietary(meal.dietary, &meal.allergens)
            .map_err(violation)?;
        if let Err(mismatch) = constraints.check_cuisine(meal.cuisine.as_deref()) {
            match policy {
                CuisineMismatchPolicy::Reject => return Err(violation(mismatch)),
                CuisineMismatchPolicy::StripTag => {
                    debug!(meal = %meal.name, cuisine = ?meal.cuisine, "Stripping cuisine outside allow-list");
                    meal.cuisine = None;
                }
            }
        }
        checked.push(meal);
    }

    let mut ordered = Vec::with_capacity(checked.len());
    for slot in &request.slots {
        if let Some(position) = checked.iter().position(|meal| meal.meal_type == *slot) {
            ordered.push(checked.remove(position));
        }
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(meal_type: MealType, cuisine: Option<&str>) -> GeneratedMeal {
        GeneratedMeal {
            meal_type,
            name: format!("{meal_type} bowl"),
            macros: Macros::new(500.0, 30.0, 50.0, 15.0),
            dietary: DietaryFlags::vegan(),
            allergens: vec!["soy".to_owned()],
            cook_time_minutes: Some(20),
            cuisine: cuisine.map(str::to_owned),
            ingredients: vec!["tofu".to_owned()],
            instructions: vec!["Cook.".to_owned(), "Serve.".to_owned()],
        }
    }

    fn request(slots: Vec<MealType>) -> SynthesisRequest {
        SynthesisRequest::for_profile(
            &PreferenceProfile::default(),
            slots,
            Macros::new(1000.0, 60.0, 100.0, 30.0),
            Vec::new(),
        )
    }

    #[test]
    fn test_batch_is_reordered_to_slots() {
        let req = request(vec![MealType::Breakfast, MealType::Dinner]);
        let meals = vec![
            meal(MealType::Dinner, None),
            meal(MealType::Breakfast, None),
        ];
        let ordered = validate_batch(
            &req,
            meals,
            &HardConstraints::default(),
            CuisineMismatchPolicy::Reject,
        )
        .unwrap();
        assert_eq!(ordered[0].meal_type, MealType::Breakfast);
        assert_eq!(ordered[1].meal_type, MealType::Dinner);
    }

    #[test]
    fn test_cuisine_policy() {
        let profile = PreferenceProfile::default().with_cuisines(["italian"]);
        let constraints = HardConstraints::from_profile(&profile);
        let req = request(vec![MealType::Dinner]);

        let rejected = validate_batch(
            &req,
            vec![meal(MealType::Dinner, Some("thai"))],
            &constraints,
            CuisineMismatchPolicy::Reject,
        );
        assert!(matches!(
            rejected,
            Err(SynthesizerError::ConstraintViolation {
                violation: RuleViolation::Cuisine(_),
                ..
            })
        ));

        let stripped = validate_batch(
            &req,
            vec![meal(MealType::Dinner, Some("thai"))],
            &constraints,
            CuisineMismatchPolicy::StripTag,
        )
        .unwrap();
        assert_eq!(stripped[0].cuisine, None);
        assert!(stripped[0].clone().into_meal().tags.is_empty());
    }

    #[test]
    fn test_slot_counts_keep_first_seen_order() {
        let req = request(vec![
            MealType::Breakfast,
            MealType::Snack,
            MealType::Dinner,
            MealType::Snack,
        ]);
        assert_eq!(
            req.slot_counts(),
            vec![
                (MealType::Breakfast, 1),
                (MealType::Snack, 2),
                (MealType::Dinner, 1)
            ]
        );
    }

    #[test]
    fn test_into_meal_joins_instructions() {
        let converted = meal(MealType::Lunch, Some("greek")).into_meal();
        assert_eq!(converted.source, MealSource::Generated);
        assert_eq!(converted.id, None);
        assert_eq!(converted.instructions, "Cook. Serve.");
        assert_eq!(converted.tags, vec!["greek".to_owned()]);
    }
}
