// ABOUTME: Coefficients for calculated daily targets: BMR, activity factors, goal adjustment
// ABOUTME: Mifflin-St Jeor constants and protein/fat distribution used by the target calculator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde::{Deserialize, Serialize};

/// Mifflin-St Jeor formula coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmrConfig {
    /// kcal per kg of body weight
    pub msj_weight_coef: f64,
    /// kcal per cm of height
    pub msj_height_coef: f64,
    /// kcal per year of age (negative)
    pub msj_age_coef: f64,
    /// Male constant
    pub msj_male_constant: f64,
    /// Female constant
    pub msj_female_constant: f64,
    /// Floor applied to the result
    pub min_bmr: f64,
}

impl Default for BmrConfig {
    fn default() -> Self {
        Self {
            msj_weight_coef: 10.0,
            msj_height_coef: 6.25,
            msj_age_coef: -5.0,
            msj_male_constant: 5.0,
            msj_female_constant: -161.0,
            min_bmr: 1000.0,
        }
    }
}

/// TDEE multipliers per activity level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityFactorsConfig {
    /// Sedentary
    pub sedentary: f64,
    /// Lightly active
    pub lightly_active: f64,
    /// Moderately active
    pub moderately_active: f64,
    /// Very active
    pub very_active: f64,
    /// Extra active
    pub extra_active: f64,
}

impl Default for ActivityFactorsConfig {
    fn default() -> Self {
        Self {
            sedentary: 1.2,
            lightly_active: 1.375,
            moderately_active: 1.55,
            very_active: 1.725,
            extra_active: 1.9,
        }
    }
}

/// Energy adjustment and macro split per nutrition goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetCalculationConfig {
    /// BMR coefficients
    pub bmr: BmrConfig,
    /// Activity multipliers
    pub activity_factors: ActivityFactorsConfig,
    /// TDEE multiplier when losing weight
    pub weight_loss_factor: f64,
    /// TDEE multiplier when gaining muscle
    pub muscle_gain_factor: f64,
    /// Protein g/kg when losing weight
    pub protein_g_per_kg_loss: f64,
    /// Protein g/kg when maintaining
    pub protein_g_per_kg_maintain: f64,
    /// Protein g/kg when gaining muscle
    pub protein_g_per_kg_gain: f64,
    /// Share of calories from fat
    pub fat_calorie_share: f64,
    /// Lowest calorie target the calculator will emit
    pub min_calorie_target: f64,
}

impl Default for TargetCalculationConfig {
    fn default() -> Self {
        Self {
            bmr: BmrConfig::default(),
            activity_factors: ActivityFactorsConfig::default(),
            weight_loss_factor: 0.8,
            muscle_gain_factor: 1.1,
            protein_g_per_kg_loss: 2.0,
            protein_g_per_kg_maintain: 1.6,
            protein_g_per_kg_gain: 1.8,
            fat_calorie_share: 0.30,
            min_calorie_target: 1200.0,
        }
    }
}
