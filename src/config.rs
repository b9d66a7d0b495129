// ABOUTME: Service configuration read from the environment: LLM endpoint settings and path policy
// ABOUTME: A missing API key leaves generation disabled rather than failing startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Service configuration
//!
//! | Variable | Default |
//! |----------|---------|
//! | `MEALPLAN_LLM_BASE_URL` | `https://api.openai.com/v1` |
//! | `MEALPLAN_LLM_API_KEY` (or `OPENAI_API_KEY`) | unset, generation disabled |
//! | `MEALPLAN_MEAL_MODEL` | `gpt-4o-mini` |
//! | `MEALPLAN_TARGET_MODEL` | `gpt-4o-mini` |
//! | `MEALPLAN_LLM_TIMEOUT_SECS` | `120` |
//! | `MEALPLAN_MEAL_MAX_TOKENS` | `1400` |
//! | `MEALPLAN_TARGET_MAX_TOKENS` | `1000` |
//! | `MEALPLAN_PATH_POLICY` | `solver` |
//! | `MEALPLAN_AUTO_MIN_LIKED` | `5` |
//!
//! Planner tuning variables are read by [`PlannerConfig::load`].

use anyhow::{anyhow, Context, Result};
use mealplan_intelligence::config::PlannerConfig;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

use crate::llm::{OpenAiCompatibleConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::planner::PathPolicy;

/// Default whole-request timeout for LLM calls
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
/// Default completion budget for a meal batch
pub const DEFAULT_MEAL_MAX_TOKENS: u32 = 1400;
/// Default completion budget for a target request
pub const DEFAULT_TARGET_MAX_TOKENS: u32 = 1000;
/// Default liked-recipe count for the auto policy to pick the solver
pub const DEFAULT_AUTO_MIN_LIKED: usize = 5;

/// Chat model settings shared by the meal synthesizer and the target generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// API key; `None` disables generation
    pub api_key: Option<String>,
    /// Model for meal batches
    pub meal_model: String,
    /// Model for daily targets
    pub target_model: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Completion budget for meal batches
    pub meal_max_tokens: u32,
    /// Completion budget for target requests
    pub target_max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            meal_model: DEFAULT_MODEL.to_owned(),
            target_model: DEFAULT_MODEL.to_owned(),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            meal_max_tokens: DEFAULT_MEAL_MAX_TOKENS,
            target_max_tokens: DEFAULT_TARGET_MAX_TOKENS,
        }
    }
}

impl LlmSettings {
    /// Whether an API key is present
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Provider configuration using `model` as the default model
    #[must_use]
    pub fn provider_config(&self, model: &str) -> OpenAiCompatibleConfig {
        OpenAiCompatibleConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            default_model: model.to_owned(),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Chat model settings
    pub llm: LlmSettings,
    /// Path policy used when a request does not name one
    pub default_policy: PathPolicy,
    /// Planner tuning
    pub planner: PlannerConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            default_policy: PathPolicy::SolverFirst,
            planner: PlannerConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unparseable value or the planner
    /// configuration fails validation
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("MEALPLAN_LLM_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok()
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty());

        let llm = LlmSettings {
            base_url: env_var_or("MEALPLAN_LLM_BASE_URL", DEFAULT_BASE_URL),
            api_key,
            meal_model: env_var_or("MEALPLAN_MEAL_MODEL", DEFAULT_MODEL),
            target_model: env_var_or("MEALPLAN_TARGET_MODEL", DEFAULT_MODEL),
            timeout_secs: env_var_or(
                "MEALPLAN_LLM_TIMEOUT_SECS",
                &DEFAULT_LLM_TIMEOUT_SECS.to_string(),
            )
            .trim()
            .parse()
            .context("Invalid MEALPLAN_LLM_TIMEOUT_SECS value")?,
            meal_max_tokens: env_var_or(
                "MEALPLAN_MEAL_MAX_TOKENS",
                &DEFAULT_MEAL_MAX_TOKENS.to_string(),
            )
            .trim()
            .parse()
            .context("Invalid MEALPLAN_MEAL_MAX_TOKENS value")?,
            target_max_tokens: env_var_or(
                "MEALPLAN_TARGET_MAX_TOKENS",
                &DEFAULT_TARGET_MAX_TOKENS.to_string(),
            )
            .trim()
            .parse()
            .context("Invalid MEALPLAN_TARGET_MAX_TOKENS value")?,
        };

        let auto_min_liked: usize = env_var_or(
            "MEALPLAN_AUTO_MIN_LIKED",
            &DEFAULT_AUTO_MIN_LIKED.to_string(),
        )
        .trim()
        .parse()
        .context("Invalid MEALPLAN_AUTO_MIN_LIKED value")?;
        let default_policy = PathPolicy::parse(
            &env_var_or("MEALPLAN_PATH_POLICY", "solver"),
            auto_min_liked,
        )
        .context("Invalid MEALPLAN_PATH_POLICY value")?;

        let planner = PlannerConfig::load().context("Invalid planner configuration")?;

        let config = Self {
            llm,
            default_policy,
            planner,
        };
        config.validate()?;
        info!("{}", config.summary());
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error when a timeout or token budget is zero
    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(anyhow!(
                "MEALPLAN_LLM_TIMEOUT_SECS must be at least 1"
            ));
        }
        if self.llm.meal_max_tokens == 0 || self.llm.target_max_tokens == 0 {
            return Err(anyhow!("LLM token budgets must be positive"));
        }
        if !self.llm.is_configured() {
            warn!("No LLM API key configured; meal generation and generated targets are disabled");
        }
        Ok(())
    }

    /// Summary for logging, without secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Meal planner configuration: llm_base_url={}, llm_configured={}, meal_model={}, \
             target_model={}, llm_timeout_secs={}, default_policy={}, solver_timeout_secs={}",
            self.llm.base_url,
            self.llm.is_configured(),
            self.llm.meal_model,
            self.llm.target_model,
            self.llm.timeout_secs,
            self.default_policy,
            self.planner.solver.timeout_secs,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
