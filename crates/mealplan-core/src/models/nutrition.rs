// ABOUTME: Macronutrient value types: per-meal macros, daily targets, and macro kinds
// ABOUTME: Arithmetic helpers used for budgets, day totals, and deviation metrics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::constants::round_output;

/// One of the four tracked nutrition quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroKind {
    /// Energy in kcal
    Calories,
    /// Protein in grams
    Protein,
    /// Carbohydrates in grams
    Carbs,
    /// Fat in grams
    Fat,
}

impl MacroKind {
    /// All kinds in reporting order
    pub const ALL: [Self; 4] = [Self::Calories, Self::Protein, Self::Carbs, Self::Fat];

    /// Lowercase identifier
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::Protein => "protein",
            Self::Carbs => "carbs",
            Self::Fat => "fat",
        }
    }
}

/// Calories plus protein, carbs, and fat grams
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    /// Energy (kcal)
    #[serde(default)]
    pub calories: f64,
    /// Protein (g)
    #[serde(default)]
    pub protein: f64,
    /// Carbohydrates (g)
    #[serde(default)]
    pub carbs: f64,
    /// Fat (g)
    #[serde(default)]
    pub fat: f64,
}

impl Macros {
    /// Build from the four values
    #[must_use]
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Value of a single kind
    #[must_use]
    pub const fn get(&self, kind: MacroKind) -> f64 {
        match kind {
            MacroKind::Calories => self.calories,
            MacroKind::Protein => self.protein,
            MacroKind::Carbs => self.carbs,
            MacroKind::Fat => self.fat,
        }
    }

    /// Subtract `other`, flooring every field at zero
    #[must_use]
    pub fn saturating_sub(&self, other: &Self) -> Self {
        Self {
            calories: (self.calories - other.calories).max(0.0),
            protein: (self.protein - other.protein).max(0.0),
            carbs: (self.carbs - other.carbs).max(0.0),
            fat: (self.fat - other.fat).max(0.0),
        }
    }

    /// Divide every field by `divisor`
    #[must_use]
    pub fn divided_by(&self, divisor: f64) -> Self {
        if divisor <= 0.0 {
            return *self;
        }
        Self {
            calories: self.calories / divisor,
            protein: self.protein / divisor,
            carbs: self.carbs / divisor,
            fat: self.fat / divisor,
        }
    }

    /// Copy rounded to output precision
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            calories: round_output(self.calories),
            protein: round_output(self.protein),
            carbs: round_output(self.carbs),
            fat: round_output(self.fat),
        }
    }

    /// Calories are present and positive
    #[must_use]
    pub fn has_usable_calories(&self) -> bool {
        self.calories.is_finite() && self.calories > 0.0
    }
}

impl Add for Macros {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for Macros {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Self> for Macros {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Protein, carbs, and fat grams without calories
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroGrams {
    /// Protein (g)
    #[serde(default)]
    pub protein: f64,
    /// Carbohydrates (g)
    #[serde(default)]
    pub carbs: f64,
    /// Fat (g)
    #[serde(default)]
    pub fat: f64,
}

/// Daily calorie and macronutrient target
///
/// Serialized as `{"calorieTarget": .., "macroTargets": {"protein": .., "carbs": .., "fat": ..}}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroTarget {
    /// Daily energy target (kcal)
    pub calorie_target: f64,
    /// Daily gram targets
    pub macro_targets: MacroGrams,
}

impl MacroTarget {
    /// Build a target from the four daily values
    #[must_use]
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calorie_target: calories,
            macro_targets: MacroGrams {
                protein,
                carbs,
                fat,
            },
        }
    }

    /// The target as a [`Macros`] value
    #[must_use]
    pub const fn as_macros(&self) -> Macros {
        Macros::new(
            self.calorie_target,
            self.macro_targets.protein,
            self.macro_targets.carbs,
            self.macro_targets.fat,
        )
    }

    /// Target for a single kind
    #[must_use]
    pub const fn get(&self, kind: MacroKind) -> f64 {
        self.as_macros().get(kind)
    }

    /// All four values are finite and the calorie target is positive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let macros = self.as_macros();
        MacroKind::ALL
            .iter()
            .all(|kind| macros.get(*kind).is_finite() && macros.get(*kind) >= 0.0)
            && self.calorie_target > 0.0
    }
}
