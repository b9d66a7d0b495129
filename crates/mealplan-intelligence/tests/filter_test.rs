// ABOUTME: Integration tests for the candidate filter and feasibility pre-check
// ABOUTME: Covers hard rules, exclusions, calorie sanity, cooking windows, and guarded soft rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{balanced_week_catalog, breakfast, init_test_logging, main_meal, standard_target};
use mealplan_core::errors::{AppError, ErrorCode};
use mealplan_core::models::{
    BudgetTier, CookingTimeBounds, CookingTimeBucket, CostCategory, DietaryFlags,
    DietaryRestriction, MacroTarget, Macros, MealType, PreferenceProfile, RecipeCandidate,
    UserHistory,
};
use mealplan_intelligence::config::FilterConfig;
use mealplan_intelligence::feasibility::{check_feasibility, FeasibilityError};
use mealplan_intelligence::filter::filter_candidates;
use uuid::Uuid;

fn names(candidates: &[RecipeCandidate]) -> Vec<&str> {
    candidates.iter().map(|r| r.name.as_str()).collect()
}

// ============================================================================
// Hard rules and exclusions
// ============================================================================

#[test]
fn test_vegan_profile_keeps_only_vegan_recipes() {
    init_test_logging();
    let catalog = vec![
        breakfast("Tofu Scramble").with_dietary(DietaryFlags::vegan()),
        breakfast("Cheese Omelette").with_dietary(DietaryFlags::vegetarian()),
        main_meal("Beef Stew", MealType::Dinner),
        main_meal("Lentil Curry", MealType::Dinner).with_dietary(DietaryFlags::vegan()),
    ];
    let profile = PreferenceProfile::default().with_restriction(DietaryRestriction::Vegan);

    let pool = filter_candidates(
        &catalog,
        &profile,
        &UserHistory::default(),
        &FilterConfig::default(),
    );

    assert_eq!(names(pool.candidates()), vec!["Tofu Scramble", "Lentil Curry"]);
    assert_eq!(pool.report().catalog_size, 4);
    assert_eq!(pool.report().after_hard_rules, 2);
}

#[test]
fn test_allergen_restriction_fails_closed_on_missing_data() {
    init_test_logging();
    let catalog = vec![
        breakfast("Peanut Toast").with_allergens(["Peanuts", "gluten"]),
        breakfast("Plain Oats").with_allergens(["oats"]),
        breakfast("Mystery Muffin").with_allergens(Vec::<String>::new()),
    ];
    let profile = PreferenceProfile::default().with_restriction(DietaryRestriction::NutFree);

    let pool = filter_candidates(
        &catalog,
        &profile,
        &UserHistory::default(),
        &FilterConfig::default(),
    );

    assert_eq!(names(pool.candidates()), vec!["Plain Oats"]);
}

#[test]
fn test_cuisine_allow_list_matches_composite_labels() {
    init_test_logging();
    let catalog = vec![
        main_meal("Risotto", MealType::Dinner).with_cuisine("Italian / Mediterranean"),
        main_meal("Pad Thai", MealType::Dinner).with_cuisine("Thai"),
        main_meal("Unlabelled Bake", MealType::Dinner),
    ];
    let profile = PreferenceProfile::default().with_cuisines(["mediterranean"]);

    let pool = filter_candidates(
        &catalog,
        &profile,
        &UserHistory::default(),
        &FilterConfig::default(),
    );

    assert_eq!(names(pool.candidates()), vec!["Risotto"]);
}

#[test]
fn test_exclusions_calories_and_cooking_window() {
    init_test_logging();
    let disliked = breakfast("Disliked Oats");
    let repeated = breakfast("Last Week Oats");
    let catalog = vec![
        disliked.clone(),
        repeated.clone(),
        RecipeCandidate::new(
            Uuid::new_v4(),
            "Water",
            MealType::Snack,
            Macros::new(0.0, 0.0, 0.0, 0.0),
        ),
        main_meal("Slow Roast", MealType::Dinner).with_total_time(180),
        main_meal("Quick Wrap", MealType::Lunch).with_total_time(10),
    ];
    let history = UserHistory::default()
        .with_disliked([disliked.id])
        .with_last_week([repeated.id]);
    let profile = PreferenceProfile::default().with_cooking_time(CookingTimeBounds::at_most(30));

    let pool = filter_candidates(&catalog, &profile, &history, &FilterConfig::default());

    assert_eq!(names(pool.candidates()), vec!["Quick Wrap"]);
    let report = pool.report();
    assert_eq!(report.after_hard_rules, 5);
    assert_eq!(report.after_exclusions, 3);
    assert_eq!(report.after_calorie_check, 2);
    assert_eq!(report.after_cooking_window, 1);
    assert_eq!(report.final_size, 1);
}

// ============================================================================
// Soft rules guarded by pool size
// ============================================================================

#[test]
fn test_budget_rule_applied_when_pool_stays_large_enough() {
    init_test_logging();
    let mut catalog = balanced_week_catalog("Cheap");
    for recipe in &mut catalog {
        recipe.cost = Some(CostCategory::Cheap);
    }
    catalog.push(main_meal("Lobster", MealType::Dinner).with_cost(CostCategory::Premium));
    let profile = PreferenceProfile::default().with_budget(BudgetTier::Budget);

    let pool = filter_candidates(
        &catalog,
        &profile,
        &UserHistory::default(),
        &FilterConfig { min_pool_size: 10 },
    );

    assert!(pool.report().budget_applied);
    assert_eq!(pool.len(), 21);
    assert!(pool.candidates().iter().all(|r| r.name != "Lobster"));
}

#[test]
fn test_budget_rule_skipped_when_pool_would_shrink_too_far() {
    init_test_logging();
    let mut catalog = balanced_week_catalog("Mixed");
    catalog[0].cost = Some(CostCategory::Cheap);
    let profile = PreferenceProfile::default().with_budget(BudgetTier::Budget);

    let pool = filter_candidates(
        &catalog,
        &profile,
        &UserHistory::default(),
        &FilterConfig { min_pool_size: 10 },
    );

    assert!(!pool.report().budget_applied);
    assert_eq!(pool.len(), 21);
}

#[test]
fn test_cooking_bucket_soft_rule() {
    init_test_logging();
    let catalog = balanced_week_catalog("Pace");
    let quick = PreferenceProfile::default().with_cooking_bucket(CookingTimeBucket::Quick);
    let moderate = PreferenceProfile::default().with_cooking_bucket(CookingTimeBucket::Moderate);
    let config = FilterConfig { min_pool_size: 1 };

    let quick_pool = filter_candidates(&catalog, &quick, &UserHistory::default(), &config);
    assert!(quick_pool.report().cooking_bucket_applied);
    assert_eq!(quick_pool.len(), 21);

    // nothing in the catalog takes longer than 30 minutes
    let moderate_pool = filter_candidates(&catalog, &moderate, &UserHistory::default(), &config);
    assert!(!moderate_pool.report().cooking_bucket_applied);
    assert_eq!(moderate_pool.len(), 21);
}

#[test]
fn test_bucket_counts_and_liked_count() {
    init_test_logging();
    let catalog = balanced_week_catalog("Count");
    let history = UserHistory::default().with_liked([catalog[0].id, catalog[8].id]);
    let pool = filter_candidates(
        &catalog,
        &PreferenceProfile::default(),
        &history,
        &FilterConfig::default(),
    );

    let counts = pool.bucket_counts();
    assert_eq!(counts.get(&MealType::Breakfast), Some(&7));
    assert_eq!(counts.get(&MealType::Lunch), Some(&7));
    assert_eq!(counts.get(&MealType::Snack), None);
    assert_eq!(pool.liked_count(&history), 2);
    assert_eq!(pool.bucket(MealType::Dinner).count(), 7);
}

// ============================================================================
// Feasibility
// ============================================================================

#[test]
fn test_feasibility_accepts_balanced_catalog() {
    let catalog = balanced_week_catalog("Ok");
    assert!(check_feasibility(&catalog, &standard_target(), 3).is_ok());
}

#[test]
fn test_feasibility_reports_missing_lunch_bucket() {
    let catalog: Vec<RecipeCandidate> = balanced_week_catalog("NoLunch")
        .into_iter()
        .filter(|r| r.meal_type != MealType::Lunch)
        .collect();

    let error = check_feasibility(&catalog, &standard_target(), 3).unwrap_err();
    assert_eq!(
        error,
        FeasibilityError::MissingBucket {
            meal_type: MealType::Lunch
        }
    );
    assert_eq!(
        error.to_string(),
        "No lunch recipes match your dietary restrictions."
    );
}

#[test]
fn test_feasibility_calorie_range_messages() {
    let catalog = balanced_week_catalog("Range");

    let low = check_feasibility(&catalog, &MacroTarget::new(500.0, 30.0, 50.0, 15.0), 3)
        .unwrap_err();
    assert_eq!(
        low.to_string(),
        "Your calorie target (500 kcal/day) is too low for available recipes. \
         Minimum achievable is approximately 1500 kcal/day."
    );

    let high = check_feasibility(&catalog, &MacroTarget::new(5000.0, 300.0, 500.0, 150.0), 3)
        .unwrap_err();
    assert!(matches!(
        high,
        FeasibilityError::CalorieTargetTooHigh { maximum, .. } if (maximum - 2250.0).abs() < 1e-9
    ));

    let app: AppError = high.into();
    assert_eq!(app.code, ErrorCode::PlanInfeasible);
}

#[test]
fn test_feasibility_is_repeatable_and_leaves_pool_untouched() {
    let catalog: Vec<RecipeCandidate> = balanced_week_catalog("Pure")
        .into_iter()
        .filter(|r| r.meal_type != MealType::Dinner)
        .collect();
    let snapshot = catalog.clone();

    let first = check_feasibility(&catalog, &standard_target(), 3);
    let second = check_feasibility(&catalog, &standard_target(), 3);

    assert_eq!(first, second);
    assert_eq!(
        first.unwrap_err(),
        FeasibilityError::MissingBucket {
            meal_type: MealType::Dinner
        }
    );
    assert_eq!(catalog, snapshot);
    assert_eq!(names(&catalog), names(&snapshot));

    let balanced = balanced_week_catalog("PureOk");
    let before = balanced.clone();
    assert_eq!(
        check_feasibility(&balanced, &standard_target(), 3),
        check_feasibility(&balanced, &standard_target(), 3)
    );
    assert!(check_feasibility(&balanced, &standard_target(), 3).is_ok());
    assert_eq!(balanced, before);
}

#[test]
fn test_feasibility_empty_pool() {
    let error = check_feasibility(&[], &standard_target(), 3).unwrap_err();
    assert_eq!(
        error.to_string(),
        "No recipes match your dietary restrictions. Please adjust your preferences."
    );
}
