// ABOUTME: Body metrics used to calculate daily energy and macronutrient targets
// ABOUTME: Gender, activity level, and nutrition goal enums with lossy parsers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde::{Deserialize, Serialize};

/// Gender for BMR calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male (higher BMR constant)
    Male,
    /// Female (lower BMR constant)
    Female,
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Exercise 1-3 days/week
    LightlyActive,
    /// Exercise 3-5 days/week
    #[default]
    ModeratelyActive,
    /// Exercise 6-7 days/week
    VeryActive,
    /// Hard training twice a day
    ExtraActive,
}

impl ActivityLevel {
    /// Parse labels such as `"light"`, `"moderate"` or `"very active"`
    #[must_use]
    pub fn from_str_lossy(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        if normalized.contains("sedentary") {
            Self::Sedentary
        } else if normalized.contains("extra") || normalized.contains("athlete") {
            Self::ExtraActive
        } else if normalized.contains("very") {
            Self::VeryActive
        } else if normalized.contains("light") {
            Self::LightlyActive
        } else {
            Self::ModeratelyActive
        }
    }
}

/// What the user wants their intake to achieve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionGoal {
    /// Caloric deficit
    LoseWeight,
    /// Caloric balance
    #[default]
    Maintain,
    /// Caloric surplus
    GainMuscle,
}

impl NutritionGoal {
    /// Parse labels such as `"weight loss"` or `"build muscle"`
    #[must_use]
    pub fn from_str_lossy(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        if normalized.contains("lose") || normalized.contains("loss") || normalized.contains("cut")
        {
            Self::LoseWeight
        } else if normalized.contains("gain")
            || normalized.contains("muscle")
            || normalized.contains("bulk")
        {
            Self::GainMuscle
        } else {
            Self::Maintain
        }
    }
}

/// Anthropometrics and lifestyle inputs for target calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMetrics {
    /// Body weight in kilograms
    pub weight_kg: f64,
    /// Height in centimeters
    pub height_cm: f64,
    /// Age in years
    pub age: u32,
    /// Gender for the BMR constant
    pub gender: Gender,
    /// Activity level
    #[serde(default)]
    pub activity_level: ActivityLevel,
    /// Nutrition goal
    #[serde(default)]
    pub goal: NutritionGoal,
}
