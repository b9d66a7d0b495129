// ABOUTME: Tests for the chat-model meal synthesizer against a scripted chat provider
// ABOUTME: Request shape, reply decoding, error mapping, and a hybrid week built from generated meals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{breakfast, ids, init_test_logging, main_meal, standard_target, ScriptedLlm};
use mealplan::config::LlmSettings;
use mealplan::llm::{MessageRole, MEAL_SYSTEM_PROMPT};
use mealplan::planner::{PathPolicy, PlanGenerator, PlanPath, PlanRequest};
use mealplan::synthesizer::{synthesizer_from_settings, LlmMealSynthesizer, MEAL_TEMPERATURE};
use mealplan_core::models::{
    DietaryRestriction, MealSource, MealType, Macros, PreferenceProfile, UserHistory,
};
use mealplan_intelligence::synthesis::{MealSynthesizer, SynthesisRequest, SynthesizerError};
use mealplan_intelligence::PlannerConfig;
use serde_json::json;
use std::sync::Arc;

fn dinner_request() -> SynthesisRequest {
    let profile = PreferenceProfile::default()
        .with_restriction(DietaryRestriction::Vegetarian)
        .with_cuisines(["Italian"]);
    SynthesisRequest::for_profile(
        &profile,
        vec![MealType::Dinner],
        Macros::new(750.0, 45.0, 75.0, 22.5),
        vec!["Mushroom Risotto".to_owned()],
    )
}

fn meal_json(meal_type: &str, name: &str, calories: f64) -> serde_json::Value {
    json!({
        "meal_type": meal_type,
        "name": name,
        "calories": calories,
        "protein": calories * 0.06,
        "carbs": calories * 0.1,
        "fat": calories * 0.03,
        "dietary_flags": {"is_vegan": false, "is_vegetarian": true},
        "allergens": ["none"],
        "cook_time_minutes": 25,
        "cuisine": null,
        "ingredients": ["lentils", "spinach"],
        "instructions": ["Simmer lentils.", "Fold in spinach."]
    })
}

fn day_reply(day: usize) -> String {
    json!({
        "meals": [
            meal_json("breakfast", &format!("Lentil Toast {day}"), 500.0),
            meal_json("lunch", &format!("Lentil Bowl {day}"), 750.0),
            meal_json("dinner", &format!("Lentil Curry {day}"), 750.0),
        ],
        "error": null
    })
    .to_string()
}

// ============================================================================
// Request and reply handling
// ============================================================================

#[tokio::test]
async fn test_request_shape() {
    let llm = Arc::new(ScriptedLlm::replying(
        json!({"meals": [meal_json("dinner", "Lentil Ragu", 750.0)]}).to_string(),
    ));
    let synthesizer = LlmMealSynthesizer::new(Arc::clone(&llm) as _, 900).with_model("meal-model");

    synthesizer.synthesize(&dinner_request()).await.unwrap();

    let sent = llm.requests();
    assert_eq!(sent.len(), 1);
    let chat = &sent[0];
    assert!(chat.json_mode);
    assert_eq!(chat.temperature, Some(MEAL_TEMPERATURE));
    assert_eq!(chat.max_tokens, Some(900));
    assert_eq!(chat.model.as_deref(), Some("meal-model"));
    assert_eq!(chat.messages[0].role, MessageRole::System);
    assert_eq!(chat.messages[0].content, MEAL_SYSTEM_PROMPT);

    let prompt = &chat.messages[1].content;
    assert_eq!(chat.messages[1].role, MessageRole::User);
    assert!(prompt.contains("dinner x1"), "{prompt}");
    assert!(prompt.contains("calories: 750"), "{prompt}");
    assert!(prompt.contains("Italian"), "{prompt}");
    assert!(prompt.contains("Mushroom Risotto"), "{prompt}");
}

#[tokio::test]
async fn test_fenced_reply_decodes() {
    let reply = format!(
        "Here you go:\n```json\n{}\n```",
        json!({"meals": [meal_json("Dinner", "Lentil Ragu", 740.0)], "error": ""})
    );
    let synthesizer = LlmMealSynthesizer::new(Arc::new(ScriptedLlm::replying(reply)), 900);

    let meals = synthesizer.synthesize(&dinner_request()).await.unwrap();

    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].meal_type, MealType::Dinner);
    assert_eq!(meals[0].name, "Lentil Ragu");
    assert!((meals[0].macros.calories - 740.0).abs() < 1e-9);
    assert!(meals[0].dietary.is_vegetarian);
    assert_eq!(meals[0].cook_time_minutes, Some(25));
}

#[tokio::test]
async fn test_failures_map_to_synthesizer_errors() {
    let request = dinner_request();

    let offline = LlmMealSynthesizer::new(Arc::new(ScriptedLlm::new([None::<String>])), 900);
    assert!(matches!(
        offline.synthesize(&request).await,
        Err(SynthesizerError::Transport(_))
    ));

    let prose = LlmMealSynthesizer::new(Arc::new(ScriptedLlm::replying("I cannot help.")), 900);
    assert!(matches!(
        prose.synthesize(&request).await,
        Err(SynthesizerError::Unparseable(_))
    ));

    let refused = LlmMealSynthesizer::new(
        Arc::new(ScriptedLlm::replying(
            json!({"meals": [], "error": "No vegetarian Italian dinner fits"}).to_string(),
        )),
        900,
    );
    assert_eq!(
        refused.synthesize(&request).await.unwrap_err(),
        SynthesizerError::Refused("No vegetarian Italian dinner fits".to_owned())
    );
}

#[test]
fn test_settings_without_key_disable_generation() {
    let synthesizer = synthesizer_from_settings(&LlmSettings::default()).unwrap();
    assert!(!synthesizer.is_enabled());
}

#[test]
fn test_settings_with_key_enable_generation() {
    let settings = LlmSettings {
        api_key: Some("sk-test".to_owned()),
        ..LlmSettings::default()
    };
    let synthesizer = synthesizer_from_settings(&settings).unwrap();
    assert!(synthesizer.is_enabled());
}

// ============================================================================
// Hybrid week through the chat model
// ============================================================================

#[tokio::test]
async fn test_hybrid_week_generated_through_llm() {
    init_test_logging();
    let recipes = vec![
        breakfast("Overnight Oats"),
        main_meal("Chickpea Salad", MealType::Lunch),
        main_meal("Bean Chili", MealType::Dinner),
    ];
    let llm = Arc::new(ScriptedLlm::new((1..7).map(|day| Some(day_reply(day)))));
    let generator = PlanGenerator::new(
        PlannerConfig::default(),
        Arc::new(LlmMealSynthesizer::new(Arc::clone(&llm) as _, 1400)),
    );
    let request = PlanRequest {
        profile: PreferenceProfile::default(),
        history: UserHistory::default().with_liked(ids(&recipes)),
        target: standard_target(),
        policy: PathPolicy::HybridFirst,
    };

    let outcome = generator.generate(&recipes, request).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.path, Some(PlanPath::Hybrid));
    let plan = outcome.plan.unwrap();
    assert_eq!(plan.count_by_source(MealSource::Catalog), 3);
    assert_eq!(plan.count_by_source(MealSource::Generated), 18);
    assert_eq!(llm.requests().len(), 6);

    // Tuesday's request must avoid Monday's catalog picks
    let tuesday_prompt = &llm.requests()[0].messages[1].content;
    assert!(tuesday_prompt.contains("Overnight Oats"), "{tuesday_prompt}");
    assert!(tuesday_prompt.contains("Bean Chili"), "{tuesday_prompt}");

    let sunday = &plan.days[6];
    assert_eq!(sunday.meals.dinner.as_ref().unwrap().name, "Lentil Curry 6");
    assert!((sunday.calories - 2000.0).abs() < 1e-6);
}
