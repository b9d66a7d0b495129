// ABOUTME: Daily calorie and macro target calculation from body metrics
// ABOUTME: Mifflin-St Jeor BMR, activity-factor TDEE, goal adjustment, and a protein-first macro split
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Nutrition target calculator
//!
//! # Scientific References
//!
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting energy expenditure.
//!   *American Journal of Clinical Nutrition*, 51(2), 241-247.
//!   <https://doi.org/10.1093/ajcn/51.2.241>
//!
//! - Phillips, S.M., & Van Loon, L.J. (2011). Dietary protein for athletes.
//!   *Journal of Sports Sciences*, 29(sup1), S29-S38.
//!   <https://doi.org/10.1080/02640414.2011.619204>

use mealplan_core::constants::{energy, round_output};
use mealplan_core::errors::AppError;
use mealplan_core::models::{ActivityLevel, BodyMetrics, Gender, MacroTarget, NutritionGoal};

use crate::config::{ActivityFactorsConfig, BmrConfig, TargetCalculationConfig};

/// Calculate Basal Metabolic Rate using Mifflin-St Jeor
///
/// Formula:
/// - Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// - Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
///
/// # Reference
/// Mifflin et al. (1990) DOI: 10.1093/ajcn/51.2.241
///
/// # Errors
///
/// Returns an error if input values are out of valid ranges
pub fn calculate_mifflin_st_jeor(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    gender: Gender,
    config: &BmrConfig,
) -> Result<f64, AppError> {
    if weight_kg <= 0.0 || weight_kg > 300.0 {
        return Err(AppError::invalid_input(
            "Weight must be between 0 and 300 kg",
        ));
    }
    if height_cm <= 0.0 || height_cm > 300.0 {
        return Err(AppError::invalid_input(
            "Height must be between 0 and 300 cm",
        ));
    }
    if !(10..=120).contains(&age) {
        return Err(AppError::invalid_input(
            "Age must be between 10 and 120 years (Mifflin-St Jeor formula validated for ages 10+)",
        ));
    }

    let weight_component = config.msj_weight_coef * weight_kg;
    let height_component = config.msj_height_coef * height_cm;
    let age_component = config.msj_age_coef * f64::from(age);

    let gender_constant = match gender {
        Gender::Male => config.msj_male_constant,
        Gender::Female => config.msj_female_constant,
    };

    let bmr = weight_component + height_component + age_component + gender_constant;
    Ok(bmr.max(config.min_bmr))
}

/// Calculate Total Daily Energy Expenditure as BMR × activity factor
///
/// # Errors
///
/// Returns an error if BMR is not positive
pub fn calculate_tdee(
    bmr: f64,
    activity_level: ActivityLevel,
    config: &ActivityFactorsConfig,
) -> Result<f64, AppError> {
    if bmr <= 0.0 {
        return Err(AppError::invalid_input("BMR must be positive"));
    }

    let activity_factor = match activity_level {
        ActivityLevel::Sedentary => config.sedentary,
        ActivityLevel::LightlyActive => config.lightly_active,
        ActivityLevel::ModeratelyActive => config.moderately_active,
        ActivityLevel::VeryActive => config.very_active,
        ActivityLevel::ExtraActive => config.extra_active,
    };

    Ok(bmr * activity_factor)
}

/// Daily target for a body profile
///
/// Calories are TDEE adjusted for the goal and floored at the configured
/// minimum. Protein is set per kilogram, fat takes a fixed share of calories,
/// and carbohydrates fill the remainder.
///
/// # Errors
///
/// Returns an error if the body metrics are out of range
pub fn calculate_targets(
    body: &BodyMetrics,
    config: &TargetCalculationConfig,
) -> Result<MacroTarget, AppError> {
    let bmr = calculate_mifflin_st_jeor(
        body.weight_kg,
        body.height_cm,
        body.age,
        body.gender,
        &config.bmr,
    )?;
    let tdee = calculate_tdee(bmr, body.activity_level, &config.activity_factors)?;

    let (energy_factor, protein_per_kg) = match body.goal {
        NutritionGoal::LoseWeight => (config.weight_loss_factor, config.protein_g_per_kg_loss),
        NutritionGoal::Maintain => (1.0, config.protein_g_per_kg_maintain),
        NutritionGoal::GainMuscle => (config.muscle_gain_factor, config.protein_g_per_kg_gain),
    };
    let calories = (tdee * energy_factor).max(config.min_calorie_target);

    let protein_g = body.weight_kg * protein_per_kg;
    let fat_g = calories * config.fat_calorie_share / energy::FAT_KCAL_PER_G;
    let carbs_kcal = fat_g.mul_add(
        -energy::FAT_KCAL_PER_G,
        protein_g.mul_add(-energy::PROTEIN_KCAL_PER_G, calories),
    );
    let carbs_g = (carbs_kcal / energy::CARBS_KCAL_PER_G).max(0.0);

    Ok(MacroTarget::new(
        round_output(calories),
        round_output(protein_g),
        round_output(carbs_g),
        round_output(fat_g),
    ))
}
