// ABOUTME: Configuration for the hybrid day composer
// ABOUTME: Scoring bonuses, cuisine-mismatch policy for generated meals, and tie-break seeding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::ConfigError;

/// What to do with a generated meal whose cuisine is outside the allow-list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CuisineMismatchPolicy {
    /// Fail the batch
    #[default]
    Reject,
    /// Keep the meal and drop its cuisine label
    StripTag,
}

impl FromStr for CuisineMismatchPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "strip" | "strip_tag" | "keep" => Ok(Self::StripTag),
            other => Err(ConfigError::Parse(format!(
                "unknown cuisine mismatch policy '{other}'"
            ))),
        }
    }
}

/// Hybrid composer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Score bonus for candidates that list ingredients
    pub ingredient_bonus: f64,
    /// Score bonus for candidates that carry instructions
    pub instruction_bonus: f64,
    /// Generated-meal cuisine handling
    pub cuisine_mismatch: CuisineMismatchPolicy,
    /// Seed for random tie-breaking between equal scores; `None` picks the first
    pub tie_break_seed: Option<u64>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            ingredient_bonus: 0.05,
            instruction_bonus: 0.05,
            cuisine_mismatch: CuisineMismatchPolicy::Reject,
            tie_break_seed: None,
        }
    }
}
