// ABOUTME: Meal synthesizer backed by a chat model returning a JSON meal batch
// ABOUTME: Builds prompts from synthesis requests and decodes replies leniently; validation stays with the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # LLM Meal Synthesizer
//!
//! [`LlmMealSynthesizer`] turns a [`SynthesisRequest`] into one chat completion
//! in JSON mode and decodes the reply with [`payload::parse_meals`]. Hard-rule
//! checks run afterwards in the composer through `validate_batch`, so a model
//! that ignores its instructions cannot place a non-compliant meal.

/// Lenient reply decoding
pub mod payload;

use async_trait::async_trait;
use mealplan_core::errors::AppError;
use mealplan_intelligence::synthesis::{
    DisabledSynthesizer, GeneratedMeal, MealSynthesizer, SynthesisRequest, SynthesizerError,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::LlmSettings;
use crate::llm::prompts::meal_user_prompt;
use crate::llm::{
    extract_json_object, ChatMessage, ChatRequest, LlmProvider, OpenAiCompatibleProvider,
    MEAL_SYSTEM_PROMPT,
};

/// Sampling temperature for meal batches
pub const MEAL_TEMPERATURE: f32 = 0.3;

/// Meal synthesizer over any [`LlmProvider`]
pub struct LlmMealSynthesizer {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
    max_tokens: u32,
}

impl LlmMealSynthesizer {
    /// Synthesizer using the provider's default model
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

    /// Chat request for one batch
    #[must_use]
    pub fn build_request(&self, request: &SynthesisRequest) -> ChatRequest {
        let chat = ChatRequest::new(vec![
            ChatMessage::system(MEAL_SYSTEM_PROMPT),
            ChatMessage::user(meal_user_prompt(request)),
        ])
        .with_temperature(MEAL_TEMPERATURE)
        .with_max_tokens(self.max_tokens)
        .with_json_mode();
        match &self.model {
            Some(model) => chat.with_model(model.clone()),
            None => chat,
        }
    }
}

#[async_trait]
impl MealSynthesizer for LlmMealSynthesizer {
    fn name(&self) -> &'static str {
        self.provider.name()
    }

    #[instrument(skip_all, fields(provider = self.provider.name(), slots = request.slots.len()))]
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<Vec<GeneratedMeal>, SynthesizerError> {
        let response = self
            .provider
            .complete(&self.build_request(request))
            .await
            .map_err(|e| {
                warn!(error = %e, "Meal generation request failed");
                SynthesizerError::Transport(e.message)
            })?;

        debug!(
            model = %response.model,
            chars = response.content.len(),
            finish_reason = ?response.finish_reason,
            "Meal generation reply received"
        );

        let payload = extract_json_object(&response.content).ok_or_else(|| {
            SynthesizerError::Unparseable("failed to parse meal generation response".to_owned())
        })?;
        let meals = payload::parse_meals(&payload)?;
        info!(meals = meals.len(), "Meal batch generated");
        Ok(meals)
    }
}

/// Synthesizer for the given settings
///
/// Without an API key this is the explicit [`DisabledSynthesizer`].
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created
pub fn synthesizer_from_settings(
    settings: &LlmSettings,
) -> Result<Arc<dyn MealSynthesizer>, AppError> {
    if !settings.is_configured() {
        info!("Meal generation is disabled because no LLM API key is configured");
        return Ok(Arc::new(DisabledSynthesizer));
    }
    let provider = OpenAiCompatibleProvider::new(settings.provider_config(&settings.meal_model))?;
    Ok(Arc::new(LlmMealSynthesizer::new(
        Arc::new(provider),
        settings.meal_max_tokens,
    )))
}
