// ABOUTME: Hard constraint rules shared by the candidate filter and generated-meal validation
// ABOUTME: Dietary flags, fail-closed allergen checks, cuisine allow-list, cooking-time window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Hard constraints
//!
//! Catalog recipes and generated meals are held to the same rules. Allergen
//! based restrictions fail closed: a meal that declares no allergens at all is
//! treated as possibly containing anything.

use mealplan_core::models::{
    normalize_token, CookingTimeBounds, DietaryFlags, DietaryRestriction, PreferenceProfile,
    RecipeCandidate,
};
use std::collections::BTreeSet;
use thiserror::Error;

/// Why a meal fails a hard constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// Dietary flag required by the restriction is missing
    #[error("violates {0} restriction")]
    Dietary(DietaryRestriction),
    /// Allergen data is missing while an allergen restriction is active
    #[error("has no allergen data but {0} is required")]
    MissingAllergenData(DietaryRestriction),
    /// A declared allergen matches the restriction keyword
    #[error("contains {allergen} ({restriction})")]
    Allergen {
        /// Restriction that was violated
        restriction: DietaryRestriction,
        /// Offending allergen
        allergen: String,
    },
    /// Cuisine not on the allow-list
    #[error("cuisine {} is outside preferred cuisines", .0.as_deref().unwrap_or("<none>"))]
    Cuisine(Option<String>),
    /// Cooking time unknown or outside the window
    #[error("cooking time {} is outside {}", minutes_label(.minutes.as_ref()), .bounds.describe())]
    CookingTime {
        /// Declared time
        minutes: Option<u32>,
        /// Window that was required
        bounds: CookingTimeBounds,
    },
}

fn minutes_label(minutes: Option<&u32>) -> String {
    minutes.map_or_else(|| "<unknown>".to_owned(), |m| format!("{m} minutes"))
}

/// Hard constraints derived from a preference profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardConstraints {
    restrictions: Vec<DietaryRestriction>,
    cuisines: BTreeSet<String>,
    cooking_time: CookingTimeBounds,
}

impl HardConstraints {
    /// Build from a profile; `none` restrictions and blank cuisines are ignored
    #[must_use]
    pub fn from_profile(profile: &PreferenceProfile) -> Self {
        Self {
            restrictions: profile.active_restrictions().cloned().collect(),
            cuisines: profile
                .preferred_cuisines
                .iter()
                .map(|c| normalize_token(c))
                .filter(|c| !c.is_empty())
                .collect(),
            cooking_time: profile.cooking_time,
        }
    }

    /// Active dietary restrictions
    #[must_use]
    pub fn restrictions(&self) -> &[DietaryRestriction] {
        &self.restrictions
    }

    /// Normalized cuisine allow-list
    #[must_use]
    pub const fn cuisines(&self) -> &BTreeSet<String> {
        &self.cuisines
    }

    /// Cooking-time window
    #[must_use]
    pub const fn cooking_time(&self) -> CookingTimeBounds {
        self.cooking_time
    }

    /// Check dietary flags and allergens against every restriction
    ///
    /// # Errors
    ///
    /// Returns the first violated restriction
    pub fn check_dietary(
        &self,
        flags: DietaryFlags,
        allergens: &[String],
    ) -> Result<(), RuleViolation> {
        for restriction in &self.restrictions {
            check_restriction(restriction, flags, allergens)?;
        }
        Ok(())
    }

    /// Check a cuisine label against the allow-list
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::Cuisine`] when the allow-list is set and no listed cuisine matches
    pub fn check_cuisine(&self, cuisine: Option<&str>) -> Result<(), RuleViolation> {
        if matches_cuisine(cuisine, &self.cuisines) {
            Ok(())
        } else {
            Err(RuleViolation::Cuisine(cuisine.map(str::to_owned)))
        }
    }

    /// Check a cooking time against the window
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::CookingTime`] when the window is set and the time is unknown or outside it
    pub fn check_cooking_time(&self, minutes: Option<u32>) -> Result<(), RuleViolation> {
        if self.cooking_time.allows(minutes) {
            Ok(())
        } else {
            Err(RuleViolation::CookingTime {
                minutes,
                bounds: self.cooking_time,
            })
        }
    }

    /// Dietary, allergen, and cuisine rules for a catalog recipe
    ///
    /// # Errors
    ///
    /// Returns the first violated rule
    pub fn check_recipe(&self, recipe: &RecipeCandidate) -> Result<(), RuleViolation> {
        self.check_dietary(recipe.dietary, &recipe.allergens)?;
        self.check_cuisine(recipe.cuisine.as_deref())
    }
}

fn check_restriction(
    restriction: &DietaryRestriction,
    flags: DietaryFlags,
    allergens: &[String],
) -> Result<(), RuleViolation> {
    match restriction {
        DietaryRestriction::Unrestricted => Ok(()),
        DietaryRestriction::Vegan if !flags.is_vegan => {
            Err(RuleViolation::Dietary(restriction.clone()))
        }
        DietaryRestriction::Vegetarian if !(flags.is_vegetarian || flags.is_vegan) => {
            Err(RuleViolation::Dietary(restriction.clone()))
        }
        DietaryRestriction::Vegan | DietaryRestriction::Vegetarian => Ok(()),
        DietaryRestriction::GlutenFree
        | DietaryRestriction::DairyFree
        | DietaryRestriction::NutFree
        | DietaryRestriction::AllergenFree(_) => {
            let Some(keyword) = restriction.allergen_keyword() else {
                return Ok(());
            };
            let declared: Vec<String> = allergens
                .iter()
                .map(|a| a.trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect();
            if declared.is_empty() {
                return Err(RuleViolation::MissingAllergenData(restriction.clone()));
            }
            declared
                .into_iter()
                .find(|a| a.contains(keyword))
                .map_or(Ok(()), |allergen| {
                    Err(RuleViolation::Allergen {
                        restriction: restriction.clone(),
                        allergen,
                    })
                })
        }
    }
}

/// Whether a cuisine label matches a normalized allow-list
///
/// An empty allow-list accepts everything. A label may list several cuisines
/// separated by `,` `/` `;` or `|`; any one matching is enough. A missing label
/// never matches a non-empty allow-list.
#[must_use]
pub fn matches_cuisine(cuisine: Option<&str>, allowed: &BTreeSet<String>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let Some(label) = cuisine else {
        return false;
    };
    label
        .split([',', '/', ';', '|'])
        .map(normalize_token)
        .any(|token| !token.is_empty() && allowed.contains(&token))
}
