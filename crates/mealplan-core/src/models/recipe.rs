// ABOUTME: Read-only recipe candidate snapshot consumed by the planner
// ABOUTME: Carries bucket, macros, cuisine, allergens, dietary flags, cost, and prep details
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MealType, Macros};

/// Dietary suitability flags reported by the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryFlags {
    /// Contains no animal products
    #[serde(default)]
    pub is_vegan: bool,
    /// Contains no meat or fish
    #[serde(default)]
    pub is_vegetarian: bool,
}

impl DietaryFlags {
    /// Vegan (and therefore vegetarian)
    #[must_use]
    pub const fn vegan() -> Self {
        Self {
            is_vegan: true,
            is_vegetarian: true,
        }
    }

    /// Vegetarian but not vegan
    #[must_use]
    pub const fn vegetarian() -> Self {
        Self {
            is_vegan: false,
            is_vegetarian: true,
        }
    }
}

/// Relative ingredient cost of a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    /// Inexpensive
    Cheap,
    /// Mid-range
    Moderate,
    /// Expensive ingredients
    Premium,
}

/// A catalog recipe eligible for planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCandidate {
    /// Catalog identity
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Meal-type bucket
    pub meal_type: MealType,
    /// Per-serving nutrition
    #[serde(flatten)]
    pub macros: Macros,
    /// Cuisine label, possibly listing several cuisines separated by `,` `/` `;` `|`
    #[serde(default)]
    pub cuisine: Option<String>,
    /// Declared allergens; empty means the catalog has no allergen data
    #[serde(default)]
    pub allergens: Vec<String>,
    /// Vegan / vegetarian flags
    #[serde(default)]
    pub dietary: DietaryFlags,
    /// Cost category if known
    #[serde(default)]
    pub cost: Option<CostCategory>,
    /// Total preparation and cooking time in minutes
    #[serde(default)]
    pub total_time_mins: Option<u32>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ingredient lines
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Instruction steps
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl RecipeCandidate {
    /// Minimal candidate; remaining fields are empty
    #[must_use]
    pub fn new(id: Uuid, name: impl Into<String>, meal_type: MealType, macros: Macros) -> Self {
        Self {
            id,
            name: name.into(),
            meal_type,
            macros,
            cuisine: None,
            allergens: Vec::new(),
            dietary: DietaryFlags::default(),
            cost: None,
            total_time_mins: None,
            tags: Vec::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Set the cuisine label
    #[must_use]
    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    /// Set the declared allergens
    #[must_use]
    pub fn with_allergens<S: Into<String>>(mut self, allergens: impl IntoIterator<Item = S>) -> Self {
        self.allergens = allergens.into_iter().map(Into::into).collect();
        self
    }

    /// Set dietary flags
    #[must_use]
    pub const fn with_dietary(mut self, dietary: DietaryFlags) -> Self {
        self.dietary = dietary;
        self
    }

    /// Set the cost category
    #[must_use]
    pub const fn with_cost(mut self, cost: CostCategory) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Set total time in minutes
    #[must_use]
    pub const fn with_total_time(mut self, minutes: u32) -> Self {
        self.total_time_mins = Some(minutes);
        self
    }

    /// Set ingredient lines
    #[must_use]
    pub fn with_ingredients<S: Into<String>>(
        mut self,
        ingredients: impl IntoIterator<Item = S>,
    ) -> Self {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Set instruction steps
    #[must_use]
    pub fn with_instructions<S: Into<String>>(
        mut self,
        instructions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    /// Set tags
    #[must_use]
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}
