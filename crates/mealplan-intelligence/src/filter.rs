// ABOUTME: Candidate filter narrowing the catalog to recipes a user may be served
// ABOUTME: Hard rules, exclusions, calorie sanity, cooking window, then pool-size-guarded soft rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Candidate Filter
//!
//! Stages run in a fixed order and each stage's survivor count is recorded in
//! a [`FilterReport`]:
//!
//! 1. hard rules (dietary flags, allergens, cuisine allow-list)
//! 2. disliked and last-week exclusions
//! 3. candidates without usable calorie data
//! 4. hard cooking-time window
//! 5. soft budget tier, kept only if the pool stays at or above the minimum size
//! 6. soft cooking pace, same guard
//!
//! Predicates are evaluated with rayon; survivor order always matches catalog order.

use mealplan_core::models::{MealType, PreferenceProfile, RecipeCandidate, UserHistory};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::FilterConfig;
use crate::rules::HardConstraints;

/// Survivor counts per filter stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    /// Catalog size before filtering
    pub catalog_size: usize,
    /// After dietary, allergen, and cuisine rules
    pub after_hard_rules: usize,
    /// After disliked and last-week exclusions
    pub after_exclusions: usize,
    /// After dropping candidates without usable calories
    pub after_calorie_check: usize,
    /// After the hard cooking-time window
    pub after_cooking_window: usize,
    /// Budget tier was applied
    pub budget_applied: bool,
    /// Cooking pace was applied
    pub cooking_bucket_applied: bool,
    /// Final pool size
    pub final_size: usize,
}

/// Filtered candidates, grouped on demand by bucket
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    candidates: Vec<RecipeCandidate>,
    report: FilterReport,
}

impl CandidatePool {
    /// Wrap candidates that were filtered elsewhere
    #[must_use]
    pub fn from_candidates(candidates: Vec<RecipeCandidate>) -> Self {
        let size = candidates.len();
        Self {
            candidates,
            report: FilterReport {
                catalog_size: size,
                after_hard_rules: size,
                after_exclusions: size,
                after_calorie_check: size,
                after_cooking_window: size,
                final_size: size,
                ..FilterReport::default()
            },
        }
    }

    /// Surviving candidates in catalog order
    #[must_use]
    pub fn candidates(&self) -> &[RecipeCandidate] {
        &self.candidates
    }

    /// Take ownership of the candidates
    #[must_use]
    pub fn into_candidates(self) -> Vec<RecipeCandidate> {
        self.candidates
    }

    /// Stage counts
    #[must_use]
    pub const fn report(&self) -> &FilterReport {
        &self.report
    }

    /// Pool size
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Pool is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates whose bucket is exactly `meal_type`
    pub fn bucket(&self, meal_type: MealType) -> impl Iterator<Item = &RecipeCandidate> {
        self.candidates
            .iter()
            .filter(move |r| r.meal_type == meal_type)
    }

    /// Candidate count per bucket; buckets with no candidates are absent
    #[must_use]
    pub fn bucket_counts(&self) -> BTreeMap<MealType, usize> {
        let mut counts = BTreeMap::new();
        for recipe in &self.candidates {
            *counts.entry(recipe.meal_type).or_insert(0) += 1;
        }
        counts
    }

    /// Number of candidates in the liked set
    #[must_use]
    pub fn liked_count(&self, history: &UserHistory) -> usize {
        self.candidates
            .iter()
            .filter(|r| history.is_liked(&r.id))
            .count()
    }
}

/// Filter a catalog for one request
#[must_use]
pub fn filter_candidates(
    catalog: &[RecipeCandidate],
    profile: &PreferenceProfile,
    history: &UserHistory,
    config: &FilterConfig,
) -> CandidatePool {
    let constraints = HardConstraints::from_profile(profile);
    let mut report = FilterReport {
        catalog_size: catalog.len(),
        ..FilterReport::default()
    };

    let mut candidates: Vec<RecipeCandidate> = catalog
        .par_iter()
        .filter(|recipe| constraints.check_recipe(recipe).is_ok())
        .cloned()
        .collect();
    report.after_hard_rules = candidates.len();

    candidates.retain(|recipe| !history.is_excluded(&recipe.id));
    report.after_exclusions = candidates.len();

    candidates.retain(|recipe| recipe.macros.has_usable_calories());
    report.after_calorie_check = candidates.len();

    candidates.retain(|recipe| constraints.check_cooking_time(recipe.total_time_mins).is_ok());
    report.after_cooking_window = candidates.len();

    if profile.budget.is_limited() {
        let budget = profile.budget;
        report.budget_applied = apply_soft_rule(
            &mut candidates,
            config.min_pool_size,
            "budget",
            |recipe| budget.matches(recipe.cost),
        );
    }

    if let Some(bucket) = profile.cooking_time_bucket {
        report.cooking_bucket_applied = apply_soft_rule(
            &mut candidates,
            config.min_pool_size,
            "cooking_time_bucket",
            |recipe| bucket.contains(recipe.total_time_mins),
        );
    }

    report.final_size = candidates.len();
    info!(
        catalog = report.catalog_size,
        hard_rules = report.after_hard_rules,
        exclusions = report.after_exclusions,
        calories = report.after_calorie_check,
        cooking_window = report.after_cooking_window,
        budget_applied = report.budget_applied,
        cooking_bucket_applied = report.cooking_bucket_applied,
        pool = report.final_size,
        "Candidate filter complete"
    );

    CandidatePool { candidates, report }
}

/// Apply `keep` only if at least `min_pool` candidates survive; returns whether it was applied
fn apply_soft_rule<F>(
    candidates: &mut Vec<RecipeCandidate>,
    min_pool: usize,
    rule: &'static str,
    keep: F,
) -> bool
where
    F: Fn(&RecipeCandidate) -> bool + Sync,
{
    let survivors = candidates.par_iter().filter(|r| keep(r)).count();
    if survivors < min_pool {
        debug!(
            rule,
            survivors, min_pool, "Skipping soft rule, pool would fall below minimum"
        );
        return false;
    }
    candidates.retain(|r| keep(r));
    true
}
