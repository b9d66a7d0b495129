// ABOUTME: Daily macro target providers: fixed, calculated from body metrics, or generated by a chat model
// ABOUTME: Every provider failure surfaces as a TargetsUnavailable error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use async_trait::async_trait;
use mealplan_core::errors::{AppError, ErrorCode};
use mealplan_core::models::{MacroTarget, PreferenceProfile};
use mealplan_intelligence::config::TargetCalculationConfig;
use mealplan_intelligence::nutrition::calculate_targets;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::LlmSettings;
use crate::llm::prompts::target_user_prompt;
use crate::llm::{
    extract_json_object, ChatMessage, ChatRequest, LlmProvider, OpenAiCompatibleProvider,
    TARGET_SYSTEM_PROMPT,
};

/// Sampling temperature for target requests
pub const TARGET_TEMPERATURE: f32 = 0.2;

/// Supplies the daily target a plan is built for
#[async_trait]
pub trait MacroTargetProvider: Send + Sync {
    /// Name for logs
    fn name(&self) -> &'static str;

    /// Daily target for the profile
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorCode::TargetsUnavailable`] error when no target can be produced
    async fn target_for(&self, profile: &PreferenceProfile) -> Result<MacroTarget, AppError>;
}

/// Always returns the same target
#[derive(Debug, Clone, Copy)]
pub struct FixedTargetProvider {
    target: MacroTarget,
}

impl FixedTargetProvider {
    /// Provider for `target`
    #[must_use]
    pub const fn new(target: MacroTarget) -> Self {
        Self { target }
    }
}

#[async_trait]
impl MacroTargetProvider for FixedTargetProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn target_for(&self, _profile: &PreferenceProfile) -> Result<MacroTarget, AppError> {
        if self.target.is_valid() {
            Ok(self.target)
        } else {
            Err(AppError::new(
                ErrorCode::TargetsUnavailable,
                "configured target must have positive calories and non-negative macros",
            ))
        }
    }
}

/// Derives the target from the profile's body metrics
#[derive(Debug, Clone, Default)]
pub struct CalculatedTargetProvider {
    config: TargetCalculationConfig,
}

impl CalculatedTargetProvider {
    /// Provider with explicit coefficients
    #[must_use]
    pub const fn new(config: TargetCalculationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MacroTargetProvider for CalculatedTargetProvider {
    fn name(&self) -> &'static str {
        "calculated"
    }

    async fn target_for(&self, profile: &PreferenceProfile) -> Result<MacroTarget, AppError> {
        let body = profile.body.as_ref().ok_or_else(|| {
            AppError::new(
                ErrorCode::MissingRequiredField,
                "body metrics are required to calculate daily targets",
            )
        })?;
        calculate_targets(body, &self.config)
            .map_err(|e| AppError::new(ErrorCode::TargetsUnavailable, e.message))
    }
}

/// Asks a chat model for the target
pub struct LlmTargetProvider {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
    max_tokens: u32,
}

impl LlmTargetProvider {
    /// Provider using the chat provider's default model
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, max_tokens: u32) -> Self {
        Self {
            provider,
            model: None,
            max_tokens,
        }
    }

    /// Override the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    fn build_request(&self, profile: &PreferenceProfile) -> ChatRequest {
        let chat = ChatRequest::new(vec![
            ChatMessage::system(TARGET_SYSTEM_PROMPT),
            ChatMessage::user(target_user_prompt(profile)),
        ])
        .with_temperature(TARGET_TEMPERATURE)
        .with_max_tokens(self.max_tokens)
        .with_json_mode();
        match &self.model {
            Some(model) => chat.with_model(model.clone()),
            None => chat,
        }
    }
}

fn unavailable(message: impl Into<String>) -> AppError {
    AppError::new(ErrorCode::TargetsUnavailable, message)
}

#[async_trait]
impl MacroTargetProvider for LlmTargetProvider {
    fn name(&self) -> &'static str {
        "llm"
    }

    #[instrument(skip_all, fields(provider = self.provider.name()))]
    async fn target_for(&self, profile: &PreferenceProfile) -> Result<MacroTarget, AppError> {
        let response = self
            .provider
            .complete(&self.build_request(profile))
            .await
            .map_err(|e| {
                warn!(error = %e, "Target generation request failed");
                unavailable(e.message)
            })?;

        let payload = extract_json_object(&response.content)
            .ok_or_else(|| unavailable("Failed to parse macro targets from the AI response."))?;
        let target: MacroTarget = serde_json::from_value(Value::Object(payload))
            .map_err(|e| unavailable(format!("Macro target response has the wrong shape: {e}")))?;
        if !target.is_valid() {
            return Err(unavailable(
                "Macro target response has non-positive calories or negative macros",
            ));
        }

        info!(
            calories = target.calorie_target,
            protein = target.macro_targets.protein,
            carbs = target.macro_targets.carbs,
            fat = target.macro_targets.fat,
            "Generated daily targets"
        );
        Ok(target)
    }
}

/// Target provider for the given settings
///
/// A configured chat model generates targets; otherwise they are calculated
/// from body metrics with `calculation`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created
pub fn target_provider_from_settings(
    settings: &LlmSettings,
    calculation: TargetCalculationConfig,
) -> Result<Arc<dyn MacroTargetProvider>, AppError> {
    if !settings.is_configured() {
        info!("No LLM API key configured, daily targets are calculated from body metrics");
        return Ok(Arc::new(CalculatedTargetProvider::new(calculation)));
    }
    let provider =
        OpenAiCompatibleProvider::new(settings.provider_config(&settings.target_model))?;
    Ok(Arc::new(LlmTargetProvider::new(
        Arc::new(provider),
        settings.target_max_tokens,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatResponse;
    use mealplan_core::models::{ActivityLevel, BodyMetrics, Gender, NutritionGoal};

    struct ScriptedProvider {
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn display_name(&self) -> &'static str {
            "Scripted"
        }

        fn default_model(&self) -> &str {
            "scripted-model"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
            assert!(request.json_mode);
            self.reply
                .map(|content| ChatResponse {
                    content: content.to_owned(),
                    model: "scripted-model".to_owned(),
                    usage: None,
                    finish_reason: Some("stop".to_owned()),
                })
                .ok_or_else(|| AppError::external_service("LLM", "connection refused"))
        }
    }

    fn llm(reply: Option<&'static str>) -> LlmTargetProvider {
        LlmTargetProvider::new(Arc::new(ScriptedProvider { reply }), 200)
    }

    #[tokio::test]
    async fn test_llm_target_from_fenced_json() {
        let provider = llm(Some(
            "Here you go:\n```json\n{\"calorieTarget\": 2100, \"macroTargets\": {\"protein\": 140, \"carbs\": 230, \"fat\": 70}}\n```",
        ));
        let target = provider
            .target_for(&PreferenceProfile::default())
            .await
            .unwrap();
        assert_eq!(target, MacroTarget::new(2100.0, 140.0, 230.0, 70.0));
    }

    #[tokio::test]
    async fn test_llm_target_failures_are_unavailable() {
        for reply in [None, Some("no json here"), Some("{\"calorieTarget\": 0, \"macroTargets\": {}}")] {
            let err = llm(reply)
                .target_for(&PreferenceProfile::default())
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::TargetsUnavailable);
        }
    }

    #[tokio::test]
    async fn test_calculated_target_requires_body() {
        let provider = CalculatedTargetProvider::default();
        let err = provider
            .target_for(&PreferenceProfile::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);

        let profile = PreferenceProfile::default().with_body(BodyMetrics {
            weight_kg: 70.0,
            height_cm: 175.0,
            age: 30,
            gender: Gender::Male,
            activity_level: ActivityLevel::ModeratelyActive,
            goal: NutritionGoal::Maintain,
        });
        let target = provider.target_for(&profile).await.unwrap();
        assert!(target.is_valid());
        assert!(target.calorie_target > 1500.0);
    }

    #[tokio::test]
    async fn test_fixed_target_rejects_invalid() {
        let fixed = FixedTargetProvider::new(MacroTarget::new(0.0, 10.0, 10.0, 10.0));
        assert!(fixed.target_for(&PreferenceProfile::default()).await.is_err());
    }
}
