// ABOUTME: Lenient decoding of the meal generator's JSON reply into generated meals
// ABOUTME: Accepts numbers as strings, comma-separated ingredient text, and string instructions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use mealplan_core::models::{DietaryFlags, Macros, MealType};
use mealplan_intelligence::synthesis::{GeneratedMeal, SynthesizerError};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Name used when the model leaves a meal unnamed
const FALLBACK_NAME: &str = "Recipe";

/// Number that may arrive as JSON number or numeric text
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(f64),
    Text(String),
}

impl Lenient {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
        .filter(|value: &f64| value.is_finite())
    }
}

/// Boolean that may arrive as text such as `"yes"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LenientBool {
    Bool(bool),
    Text(String),
}

impl LenientBool {
    fn truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Text(text) => matches!(
                text.trim().to_lowercase().as_str(),
                "true" | "yes" | "1" | "y"
            ),
        }
    }
}

/// List that may arrive as one string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextList {
    List(Vec<Value>),
    Text(String),
}

impl TextList {
    fn items(self, split_commas: bool) -> Vec<String> {
        match self {
            Self::List(values) => values
                .into_iter()
                .filter_map(|value| match value {
                    Value::String(text) => Some(text.trim().to_owned()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .filter(|text| !text.is_empty())
                .collect(),
            Self::Text(text) if split_commas => text
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect(),
            Self::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![text.to_owned()]
                }
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireFlags {
    #[serde(default)]
    is_vegan: Option<LenientBool>,
    #[serde(default)]
    is_vegetarian: Option<LenientBool>,
}

#[derive(Debug, Deserialize)]
struct WireMeal {
    #[serde(default)]
    meal_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    calories: Option<Lenient>,
    #[serde(default)]
    protein: Option<Lenient>,
    #[serde(default)]
    carbs: Option<Lenient>,
    #[serde(default)]
    fat: Option<Lenient>,
    #[serde(default)]
    dietary_flags: Option<WireFlags>,
    #[serde(default)]
    allergens: Option<TextList>,
    #[serde(default)]
    cook_time_minutes: Option<Lenient>,
    #[serde(default)]
    cuisine: Option<String>,
    #[serde(default)]
    ingredients: Option<TextList>,
    #[serde(default)]
    instructions: Option<TextList>,
}

fn macro_value(value: Option<&Lenient>, field: &str) -> Result<f64, SynthesizerError> {
    match value {
        None => Ok(0.0),
        Some(raw) => raw.as_f64().ok_or_else(|| {
            SynthesizerError::Unparseable(format!("invalid {field} value in meal response"))
        }),
    }
}

impl WireMeal {
    fn into_generated(self) -> Result<GeneratedMeal, SynthesizerError> {
        let raw_type = self.meal_type.unwrap_or_default();
        let meal_type = MealType::from_str_lossy(&raw_type).ok_or_else(|| {
            SynthesizerError::Unparseable(format!("invalid meal_type '{}'", raw_type.trim()))
        })?;

        let macros = Macros::new(
            macro_value(self.calories.as_ref(), "calories")?,
            macro_value(self.protein.as_ref(), "protein")?,
            macro_value(self.carbs.as_ref(), "carbs")?,
            macro_value(self.fat.as_ref(), "fat")?,
        );

        let cook_time_minutes = match self.cook_time_minutes {
            None => None,
            Some(raw) => match raw.as_f64() {
                Some(minutes) if minutes >= 0.0 => Some(minutes.ceil() as u32),
                _ => {
                    return Err(SynthesizerError::Unparseable(
                        "invalid cook_time_minutes value".to_owned(),
                    ))
                }
            },
        };

        let flags = self.dietary_flags.unwrap_or_default();
        let dietary = DietaryFlags {
            is_vegan: flags.is_vegan.as_ref().is_some_and(LenientBool::truthy),
            is_vegetarian: flags.is_vegetarian.as_ref().is_some_and(LenientBool::truthy),
        };

        let name = self
            .name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_NAME.to_owned());

        Ok(GeneratedMeal {
            meal_type,
            name,
            macros,
            dietary,
            allergens: self.allergens.map(|a| a.items(true)).unwrap_or_default(),
            cook_time_minutes,
            cuisine: self
                .cuisine
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty()),
            ingredients: self.ingredients.map(|i| i.items(true)).unwrap_or_default(),
            instructions: self.instructions.map(|i| i.items(false)).unwrap_or_default(),
        })
    }
}

/// Message of a non-empty `error` field
fn refusal(error: Option<&Value>) -> Option<String> {
    match error? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) => {
            let message = message.trim();
            (!message.is_empty()).then(|| message.to_owned())
        }
        other => Some(other.to_string()),
    }
}

/// Decode a reply object into generated meals
///
/// A non-empty `error` field means the model declined the request.
///
/// # Errors
///
/// Returns [`SynthesizerError::Refused`] for a declined request and
/// [`SynthesizerError::Unparseable`] for a malformed payload
pub fn parse_meals(payload: &Map<String, Value>) -> Result<Vec<GeneratedMeal>, SynthesizerError> {
    if let Some(message) = refusal(payload.get("error")) {
        return Err(SynthesizerError::Refused(message));
    }

    let Some(Value::Array(meals)) = payload.get("meals") else {
        return Err(SynthesizerError::Unparseable(
            "meal response missing meals list".to_owned(),
        ));
    };

    meals
        .iter()
        .map(|meal| {
            if !meal.is_object() {
                return Err(SynthesizerError::Unparseable(
                    "meal entry was not an object".to_owned(),
                ));
            }
            WireMeal::deserialize(meal)
                .map_err(|e| SynthesizerError::Unparseable(format!("malformed meal entry: {e}")))?
                .into_generated()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_lenient_fields() {
        let payload = object(json!({
            "meals": [{
                "meal_type": " Dinner ",
                "name": "",
                "calories": "640.5",
                "protein": 40,
                "carbs": 55,
                "fat": "20",
                "dietary_flags": {"is_vegan": "yes"},
                "allergens": "soy, sesame",
                "cook_time_minutes": 24.2,
                "cuisine": "  ",
                "ingredients": "tofu, rice , ,broccoli",
                "instructions": "Stir-fry everything."
            }],
            "error": null
        }));

        let meals = parse_meals(&payload).unwrap();
        let meal = &meals[0];
        assert_eq!(meal.meal_type, MealType::Dinner);
        assert_eq!(meal.name, "Recipe");
        assert!((meal.macros.calories - 640.5).abs() < 1e-9);
        assert!(meal.dietary.is_vegan);
        assert!(!meal.dietary.is_vegetarian);
        assert_eq!(meal.allergens, vec!["soy", "sesame"]);
        assert_eq!(meal.cook_time_minutes, Some(25));
        assert_eq!(meal.cuisine, None);
        assert_eq!(meal.ingredients, vec!["tofu", "rice", "broccoli"]);
        assert_eq!(meal.instructions, vec!["Stir-fry everything."]);
    }

    #[test]
    fn test_error_field_refuses_batch() {
        let payload = object(json!({"meals": [], "error": "Cannot satisfy vegan keto"}));
        assert_eq!(
            parse_meals(&payload).unwrap_err(),
            SynthesizerError::Refused("Cannot satisfy vegan keto".to_owned())
        );
    }

    #[test]
    fn test_invalid_meal_type_and_missing_list() {
        let bad_type = object(json!({"meals": [{"meal_type": "brunch", "name": "Eggs"}]}));
        assert_eq!(
            parse_meals(&bad_type).unwrap_err(),
            SynthesizerError::Unparseable("invalid meal_type 'brunch'".to_owned())
        );

        let missing = object(json!({"error": ""}));
        assert!(matches!(
            parse_meals(&missing),
            Err(SynthesizerError::Unparseable(_))
        ));
    }

    #[test]
    fn test_bad_macro_value() {
        let payload = object(json!({"meals": [{"meal_type": "lunch", "calories": "lots"}]}));
        assert_eq!(
            parse_meals(&payload).unwrap_err(),
            SynthesizerError::Unparseable("invalid calories value in meal response".to_owned())
        );
    }
}
