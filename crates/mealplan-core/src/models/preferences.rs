// ABOUTME: User preference profile: restrictions, cuisines, cooking time, meals per day, budget
// ABOUTME: Includes lossy parsers for the restriction, budget, and cooking-time vocabularies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::{BodyMetrics, CostCategory, MealType};

/// Normalize a free-form token to lowercase `[a-z0-9_]`
///
/// Runs of other characters collapse to a single underscore, and leading or
/// trailing underscores are stripped: `"Middle-Eastern "` becomes `middle_eastern`.
#[must_use]
pub fn normalize_token(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_sep = false;
    for ch in value.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// A hard dietary rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DietaryRestriction {
    /// Explicit "no restrictions"; never filters anything
    Unrestricted,
    /// Recipe must be flagged vegan
    Vegan,
    /// Recipe must be flagged vegetarian or vegan
    Vegetarian,
    /// Allergens must not mention gluten
    GlutenFree,
    /// Allergens must not mention dairy
    DairyFree,
    /// Allergens must not mention nuts
    NutFree,
    /// Allergens must not mention the given keyword
    AllergenFree(String),
}

impl DietaryRestriction {
    /// Parse a restriction label, tolerating case, spacing, and phrasing
    ///
    /// `"Gluten-Free"`, `"no gluten"` and `"gluten_free"` all parse as
    /// [`Self::GlutenFree`]; unknown labels become an allergen keyword.
    #[must_use]
    pub fn from_str_lossy(value: &str) -> Self {
        let token = normalize_token(value);
        match token.as_str() {
            "" | "none" | "no_restrictions" | "no_restriction" => Self::Unrestricted,
            "vegan" => Self::Vegan,
            "vegetarian" | "veggie" => Self::Vegetarian,
            t if t.contains("gluten") => Self::GlutenFree,
            t if t.contains("dairy") || t.contains("lactose") => Self::DairyFree,
            t if t.contains("nut") => Self::NutFree,
            t => {
                let keyword = t
                    .trim_start_matches("no_")
                    .trim_end_matches("_free")
                    .trim_end_matches("_allergy");
                if keyword == t {
                    warn!(
                        label = value,
                        keyword,
                        "Unrecognized dietary restriction treated as an allergen keyword"
                    );
                } else {
                    debug!(label = value, keyword, "Custom allergen restriction");
                }
                Self::AllergenFree(keyword.to_owned())
            }
        }
    }

    /// Allergen keyword checked by this rule, if it is allergen based
    #[must_use]
    pub fn allergen_keyword(&self) -> Option<&str> {
        match self {
            Self::GlutenFree => Some("gluten"),
            Self::DairyFree => Some("dairy"),
            Self::NutFree => Some("nut"),
            Self::AllergenFree(keyword) => Some(keyword.as_str()),
            Self::Unrestricted | Self::Vegan | Self::Vegetarian => None,
        }
    }
}

impl From<String> for DietaryRestriction {
    fn from(value: String) -> Self {
        Self::from_str_lossy(&value)
    }
}

impl From<DietaryRestriction> for String {
    fn from(value: DietaryRestriction) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DietaryRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted => f.write_str("none"),
            Self::Vegan => f.write_str("vegan"),
            Self::Vegetarian => f.write_str("vegetarian"),
            Self::GlutenFree => f.write_str("gluten_free"),
            Self::DairyFree => f.write_str("dairy_free"),
            Self::NutFree => f.write_str("nut_free"),
            Self::AllergenFree(keyword) => write!(f, "{keyword}_free"),
        }
    }
}

/// Hard cooking-time window in minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CookingTimeSpec")]
pub struct CookingTimeBounds {
    /// Inclusive lower bound
    pub min_minutes: Option<u32>,
    /// Inclusive upper bound
    pub max_minutes: Option<u32>,
}

/// Accepted wire shapes for cooking-time bounds: a preference label or explicit bounds
#[derive(Deserialize)]
#[serde(untagged)]
enum CookingTimeSpec {
    Label(String),
    Bounds {
        #[serde(default)]
        min_minutes: Option<u32>,
        #[serde(default)]
        max_minutes: Option<u32>,
    },
}

impl From<CookingTimeSpec> for CookingTimeBounds {
    fn from(spec: CookingTimeSpec) -> Self {
        match spec {
            CookingTimeSpec::Label(label) => Self::from_preference(&label),
            CookingTimeSpec::Bounds {
                min_minutes,
                max_minutes,
            } => Self {
                min_minutes,
                max_minutes,
            },
        }
    }
}

impl CookingTimeBounds {
    /// No limit in either direction
    pub const UNBOUNDED: Self = Self {
        min_minutes: None,
        max_minutes: None,
    };

    /// Upper bound only
    #[must_use]
    pub const fn at_most(minutes: u32) -> Self {
        Self {
            min_minutes: None,
            max_minutes: Some(minutes),
        }
    }

    /// Both bounds
    #[must_use]
    pub const fn between(min: u32, max: u32) -> Self {
        Self {
            min_minutes: Some(min),
            max_minutes: Some(max),
        }
    }

    /// Map a cooking-time preference label to bounds
    ///
    /// Unknown labels are unbounded.
    #[must_use]
    pub fn from_preference(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "under_15_min" | "under15" | "<15" => return Self::at_most(15),
            "15_30_min" | "15-30" | "15_30" => return Self::between(15, 30),
            "30_60_min" | "30-60" | "30_60" => return Self::between(30, 60),
            "over_60_min" | "60_plus" | ">60" => {
                return Self {
                    min_minutes: Some(60),
                    max_minutes: None,
                }
            }
            _ => {}
        }
        if normalized.contains("quick") || normalized.contains("fast") {
            Self::at_most(30)
        } else if normalized.contains("moderate") || normalized.contains("medium") {
            Self::between(30, 60)
        } else if normalized.contains("slow") || normalized.contains("long") {
            Self {
                min_minutes: Some(60),
                max_minutes: None,
            }
        } else {
            Self::UNBOUNDED
        }
    }

    /// At least one bound is set
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.min_minutes.is_some() || self.max_minutes.is_some()
    }

    /// Whether a recipe with the given time satisfies the window
    ///
    /// An unknown time fails any bounded window.
    #[must_use]
    pub fn allows(&self, minutes: Option<u32>) -> bool {
        if !self.is_bounded() {
            return true;
        }
        let Some(minutes) = minutes else {
            return false;
        };
        self.min_minutes.is_none_or(|min| minutes >= min)
            && self.max_minutes.is_none_or(|max| minutes <= max)
    }

    /// Human-readable description for prompts and messages
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.min_minutes, self.max_minutes) {
            (None, None) => "no limit".to_owned(),
            (None, Some(max)) => format!("up to {max} minutes"),
            (Some(min), None) => format!("{min} minutes or more"),
            (Some(min), Some(max)) => format!("between {min} and {max} minutes"),
        }
    }
}

/// Soft cooking pace preference, applied only when the pool stays large enough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookingTimeBucket {
    /// 30 minutes or less
    Quick,
    /// More than 30 and at most 60 minutes
    Moderate,
}

impl CookingTimeBucket {
    /// Whether a recipe time falls in this bucket; unknown times never do
    #[must_use]
    pub fn contains(&self, minutes: Option<u32>) -> bool {
        minutes.is_some_and(|m| match self {
            Self::Quick => m <= 30,
            Self::Moderate => m > 30 && m <= 60,
        })
    }
}

/// Spending preference, a soft filter over [`CostCategory`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    /// No budget preference
    #[default]
    NoLimit,
    /// Prefer cheap recipes
    Budget,
    /// Prefer mid-range recipes
    Moderate,
    /// Prefer premium recipes
    Premium,
}

impl BudgetTier {
    /// Parse a budget label such as `"cheap"`, `"mid"` or `"high"`
    #[must_use]
    pub fn from_str_lossy(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        if normalized.contains("budget") || normalized.contains("cheap") {
            Self::Budget
        } else if normalized.contains("moderate")
            || normalized.contains("mid")
            || normalized.contains("balanced")
        {
            Self::Moderate
        } else if normalized.contains("premium")
            || normalized.contains("high")
            || normalized.contains("expensive")
        {
            Self::Premium
        } else {
            Self::NoLimit
        }
    }

    /// Whether the tier expresses a preference at all
    #[must_use]
    pub const fn is_limited(&self) -> bool {
        !matches!(self, Self::NoLimit)
    }

    /// Whether a recipe of the given cost matches the tier
    #[must_use]
    pub fn matches(&self, cost: Option<CostCategory>) -> bool {
        match self {
            Self::NoLimit => true,
            Self::Budget => cost == Some(CostCategory::Cheap),
            Self::Moderate => cost == Some(CostCategory::Moderate),
            Self::Premium => cost == Some(CostCategory::Premium),
        }
    }
}

const fn default_meals_per_day() -> u8 {
    3
}

/// Already-validated planning preferences for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    /// Hard dietary rules
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    /// Cuisine allow-list; empty means any cuisine
    #[serde(default)]
    pub preferred_cuisines: Vec<String>,
    /// Hard cooking-time window
    #[serde(default)]
    pub cooking_time: CookingTimeBounds,
    /// Soft cooking pace
    #[serde(default)]
    pub cooking_time_bucket: Option<CookingTimeBucket>,
    /// Meals per day, mapped to slots by [`MealType::slot_layout`]
    #[serde(default = "default_meals_per_day")]
    pub meals_per_day: u8,
    /// Soft budget preference
    #[serde(default)]
    pub budget: BudgetTier,
    /// Body metrics for calculated targets
    #[serde(default)]
    pub body: Option<BodyMetrics>,
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self {
            dietary_restrictions: Vec::new(),
            preferred_cuisines: Vec::new(),
            cooking_time: CookingTimeBounds::UNBOUNDED,
            cooking_time_bucket: None,
            meals_per_day: default_meals_per_day(),
            budget: BudgetTier::NoLimit,
            body: None,
        }
    }
}

impl PreferenceProfile {
    /// Set meals per day
    #[must_use]
    pub const fn with_meals_per_day(mut self, meals_per_day: u8) -> Self {
        self.meals_per_day = meals_per_day;
        self
    }

    /// Add a dietary restriction
    #[must_use]
    pub fn with_restriction(mut self, restriction: DietaryRestriction) -> Self {
        self.dietary_restrictions.push(restriction);
        self
    }

    /// Set the cuisine allow-list
    #[must_use]
    pub fn with_cuisines<S: Into<String>>(mut self, cuisines: impl IntoIterator<Item = S>) -> Self {
        self.preferred_cuisines = cuisines.into_iter().map(Into::into).collect();
        self
    }

    /// Set the hard cooking-time window
    #[must_use]
    pub const fn with_cooking_time(mut self, bounds: CookingTimeBounds) -> Self {
        self.cooking_time = bounds;
        self
    }

    /// Set the soft cooking pace
    #[must_use]
    pub const fn with_cooking_bucket(mut self, bucket: CookingTimeBucket) -> Self {
        self.cooking_time_bucket = Some(bucket);
        self
    }

    /// Set the budget tier
    #[must_use]
    pub const fn with_budget(mut self, budget: BudgetTier) -> Self {
        self.budget = budget;
        self
    }

    /// Set body metrics
    #[must_use]
    pub const fn with_body(mut self, body: BodyMetrics) -> Self {
        self.body = Some(body);
        self
    }

    /// Day slot layout for this profile
    #[must_use]
    pub fn slots(&self) -> Vec<MealType> {
        MealType::slot_layout(self.meals_per_day)
    }

    /// Restrictions that actually constrain recipes
    pub fn active_restrictions(&self) -> impl Iterator<Item = &DietaryRestriction> {
        self.dietary_restrictions
            .iter()
            .filter(|r| **r != DietaryRestriction::Unrestricted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("  Middle-Eastern "), "middle_eastern");
        assert_eq!(normalize_token("__Thai__"), "thai");
        assert_eq!(normalize_token("!!"), "");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn parse_capturing(label: &str) -> (DietaryRestriction, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let parsed = tracing::subscriber::with_default(subscriber, || {
            DietaryRestriction::from_str_lossy(label)
        });
        (parsed, logs.text())
    }

    #[test]
    fn test_unknown_restriction_warns_when_becoming_keyword() {
        let (parsed, logs) = parse_capturing("Keto");
        assert_eq!(parsed, DietaryRestriction::AllergenFree("keto".to_owned()));
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("allergen keyword"), "{logs}");
        assert!(logs.contains("keto"), "{logs}");

        let (parsed, logs) = parse_capturing("no shellfish");
        assert_eq!(parsed, DietaryRestriction::AllergenFree("shellfish".to_owned()));
        assert!(logs.is_empty(), "{logs}");

        let (_, logs) = parse_capturing("vegan");
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn test_restriction_parsing() {
        assert_eq!(
            DietaryRestriction::from_str_lossy("Gluten-Free"),
            DietaryRestriction::GlutenFree
        );
        assert_eq!(
            DietaryRestriction::from_str_lossy("no gluten"),
            DietaryRestriction::GlutenFree
        );
        assert_eq!(
            DietaryRestriction::from_str_lossy("none"),
            DietaryRestriction::Unrestricted
        );
        assert_eq!(
            DietaryRestriction::from_str_lossy("shellfish_free"),
            DietaryRestriction::AllergenFree("shellfish".to_owned())
        );
    }

    #[test]
    fn test_cooking_time_labels() {
        assert_eq!(
            CookingTimeBounds::from_preference("under_15_min"),
            CookingTimeBounds::at_most(15)
        );
        assert_eq!(
            CookingTimeBounds::from_preference("Quick meals"),
            CookingTimeBounds::at_most(30)
        );
        assert_eq!(
            CookingTimeBounds::from_preference("over_60_min").min_minutes,
            Some(60)
        );
        assert!(!CookingTimeBounds::from_preference("whatever").is_bounded());
    }

    #[test]
    fn test_bounded_window_fails_closed() {
        let bounds = CookingTimeBounds::between(15, 30);
        assert!(bounds.allows(Some(20)));
        assert!(!bounds.allows(Some(45)));
        assert!(!bounds.allows(None));
        assert!(CookingTimeBounds::UNBOUNDED.allows(None));
    }

    #[test]
    fn test_cooking_time_deserializes_from_label_or_bounds() {
        let from_label: CookingTimeBounds = serde_json::from_str("\"15_30_min\"").unwrap();
        assert_eq!(from_label, CookingTimeBounds::between(15, 30));
        let from_bounds: CookingTimeBounds =
            serde_json::from_str(r#"{"max_minutes": 45}"#).unwrap();
        assert_eq!(from_bounds, CookingTimeBounds::at_most(45));
    }

    #[test]
    fn test_budget_tier() {
        assert_eq!(BudgetTier::from_str_lossy("Cheap"), BudgetTier::Budget);
        assert!(BudgetTier::Budget.matches(Some(CostCategory::Cheap)));
        assert!(!BudgetTier::Budget.matches(None));
        assert!(BudgetTier::NoLimit.matches(None));
    }
}
