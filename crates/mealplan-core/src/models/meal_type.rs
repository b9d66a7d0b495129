// ABOUTME: Meal-type classification used both as catalog bucket and as day slot
// ABOUTME: Encodes slot compatibility, the per-day slot layout, and lossy parsing from tags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter;

/// Meal-type classification of a recipe (its bucket) or of a day slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
    /// Snack between meals
    Snack,
}

/// Tag keywords that identify a bucket when a catalog row has no explicit meal type
const BREAKFAST_KEYWORDS: &[&str] = &["breakfast", "frokost", "brunch"];
const LUNCH_KEYWORDS: &[&str] = &["lunch", "lunsj", "sandwich", "smorbrod", "salad", "soup"];
const DINNER_KEYWORDS: &[&str] = &["dinner", "middag", "supper", "casserole", "stew", "main"];
const SNACK_KEYWORDS: &[&str] = &["snack", "mellommat", "dessert"];

impl MealType {
    /// All meal types in slot order
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snack];

    /// Lowercase identifier
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    /// Parse a meal type, tolerating case and whitespace
    #[must_use]
    pub fn from_str_lossy(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            "snack" | "snacks" => Some(Self::Snack),
            _ => None,
        }
    }

    /// Infer a bucket from free-form recipe tags
    ///
    /// Checks breakfast, lunch, dinner, then snack keywords; the first bucket with a
    /// matching tag wins.
    #[must_use]
    pub fn infer_from_tags<S: AsRef<str>>(tags: &[S]) -> Option<Self> {
        let lowered: Vec<String> = tags.iter().map(|t| t.as_ref().to_lowercase()).collect();
        [
            (Self::Breakfast, BREAKFAST_KEYWORDS),
            (Self::Lunch, LUNCH_KEYWORDS),
            (Self::Dinner, DINNER_KEYWORDS),
            (Self::Snack, SNACK_KEYWORDS),
        ]
        .into_iter()
        .find(|(_, keywords)| {
            lowered
                .iter()
                .any(|tag| keywords.iter().any(|keyword| tag.contains(keyword)))
        })
        .map(|(meal_type, _)| meal_type)
    }

    /// Whether a recipe in `bucket` may fill a slot of this type in the weekly solver
    ///
    /// Breakfast slots take only breakfast items, lunch and dinner items are
    /// interchangeable, and snack slots accept any bucket.
    #[must_use]
    pub const fn accepts(&self, bucket: Self) -> bool {
        match self {
            Self::Breakfast => matches!(bucket, Self::Breakfast),
            Self::Lunch | Self::Dinner => matches!(bucket, Self::Lunch | Self::Dinner),
            Self::Snack => true,
        }
    }

    /// Slot layout for one day
    ///
    /// Starts from breakfast, lunch, dinner and appends snacks for every meal above
    /// three. Fewer than three meals truncates the list, and dinner is always kept
    /// by replacing the last slot: one meal is `[dinner]`, two are
    /// `[breakfast, dinner]`.
    #[must_use]
    pub fn slot_layout(meals_per_day: u8) -> Vec<Self> {
        let count = usize::from(meals_per_day.max(1));
        let mut slots = vec![Self::Breakfast, Self::Lunch, Self::Dinner];
        slots.extend(iter::repeat(Self::Snack).take(count.saturating_sub(3)));
        slots.truncate(count);
        if !slots.contains(&Self::Dinner) {
            if let Some(last) = slots.last_mut() {
                *last = Self::Dinner;
            }
        }
        slots
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_layout_small_days_keep_dinner() {
        assert_eq!(MealType::slot_layout(0), vec![MealType::Dinner]);
        assert_eq!(MealType::slot_layout(1), vec![MealType::Dinner]);
        assert_eq!(
            MealType::slot_layout(2),
            vec![MealType::Breakfast, MealType::Dinner]
        );
    }

    #[test]
    fn test_slot_layout_appends_snacks() {
        assert_eq!(
            MealType::slot_layout(5),
            vec![
                MealType::Breakfast,
                MealType::Lunch,
                MealType::Dinner,
                MealType::Snack,
                MealType::Snack
            ]
        );
    }

    #[test]
    fn test_slot_compatibility() {
        assert!(MealType::Breakfast.accepts(MealType::Breakfast));
        assert!(!MealType::Breakfast.accepts(MealType::Lunch));
        assert!(MealType::Lunch.accepts(MealType::Dinner));
        assert!(MealType::Dinner.accepts(MealType::Lunch));
        assert!(!MealType::Dinner.accepts(MealType::Snack));
        assert!(MealType::Snack.accepts(MealType::Breakfast));
    }

    #[test]
    fn test_infer_from_tags() {
        assert_eq!(
            MealType::infer_from_tags(&["Middagsrett", "Fisk"]),
            Some(MealType::Dinner)
        );
        assert_eq!(MealType::infer_from_tags(&["frokost"]), Some(MealType::Breakfast));
        assert_eq!(MealType::infer_from_tags::<&str>(&[]), None);
    }
}
