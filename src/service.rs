// ABOUTME: Planning service wiring catalog, history and target collaborators to the plan generator
// ABOUTME: Resolves everything a request needs from a user id and returns the plan outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use mealplan_core::errors::AppError;
use mealplan_core::models::{PreferenceProfile, WeeklyPlan};
use mealplan_intelligence::{MealSynthesizer, RepairReport};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::catalog::{HistoryLookup, RecipeCatalog};
use crate::config::ServiceConfig;
use crate::planner::{PathPolicy, PlanGenerator, PlanOutcome, PlanRequest};
use crate::synthesizer::synthesizer_from_settings;
use crate::targets::{target_provider_from_settings, MacroTargetProvider};

/// Plan generation for stored users
#[derive(Clone)]
pub struct PlanningService {
    catalog: Arc<dyn RecipeCatalog>,
    histories: Arc<dyn HistoryLookup>,
    targets: Arc<dyn MacroTargetProvider>,
    generator: PlanGenerator,
    default_policy: PathPolicy,
}

impl PlanningService {
    /// Service over explicit collaborators
    #[must_use]
    pub fn new(
        catalog: Arc<dyn RecipeCatalog>,
        histories: Arc<dyn HistoryLookup>,
        targets: Arc<dyn MacroTargetProvider>,
        generator: PlanGenerator,
    ) -> Self {
        Self {
            catalog,
            histories,
            targets,
            generator,
            default_policy: PathPolicy::SolverFirst,
        }
    }

    /// Service whose synthesizer and target provider come from `config`
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created
    pub fn from_config(
        config: &ServiceConfig,
        catalog: Arc<dyn RecipeCatalog>,
        histories: Arc<dyn HistoryLookup>,
    ) -> Result<Self, AppError> {
        let synthesizer = synthesizer_from_settings(&config.llm)?;
        let targets = target_provider_from_settings(&config.llm, config.planner.targets.clone())?;
        info!(
            synthesizer = synthesizer.name(),
            synthesizer_enabled = synthesizer.is_enabled(),
            targets = targets.name(),
            policy = %config.default_policy,
            "Planning service ready"
        );
        Ok(
            Self::new(
                catalog,
                histories,
                targets,
                PlanGenerator::new(config.planner.clone(), synthesizer),
            )
            .with_default_policy(config.default_policy),
        )
    }

    /// Policy used when a request names none
    #[must_use]
    pub const fn with_default_policy(mut self, policy: PathPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Synthesizer used by the generator
    #[must_use]
    pub fn synthesizer(&self) -> Arc<dyn MealSynthesizer> {
        self.generator.synthesizer()
    }

    /// Generate a weekly plan for a stored user
    ///
    /// Collaborator failures are reported in the outcome; a target failure sets
    /// `fallback_reason` to `macro_generation_failed`.
    #[instrument(skip(self, profile), fields(user_id = %user_id))]
    pub async fn generate_for_user(
        &self,
        user_id: Uuid,
        profile: PreferenceProfile,
        policy: Option<PathPolicy>,
    ) -> PlanOutcome {
        let history = match self.histories.history(user_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "History lookup failed");
                return PlanOutcome::failed(&e);
            }
        };
        info!(
            liked = history.liked.len(),
            disliked = history.disliked.len(),
            last_week = history.last_week.len(),
            "History loaded"
        );

        let target = match self.targets.target_for(&profile).await {
            Ok(target) => target,
            Err(e) => {
                warn!(provider = self.targets.name(), error = %e, "Daily targets unavailable");
                return PlanOutcome::targets_unavailable(&e);
            }
        };

        let catalog = match self.catalog.candidates(&profile, &history).await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "Recipe catalog query failed");
                return PlanOutcome::failed(&e);
            }
        };

        let request = PlanRequest {
            profile,
            history,
            target,
            policy: policy.unwrap_or(self.default_policy),
        };
        self.generator.generate(&catalog, request).await
    }

    /// Fill the empty slots of an existing plan
    ///
    /// # Errors
    ///
    /// Returns an error naming the first day that could not be filled
    pub async fn repair_plan(
        &self,
        plan: &mut WeeklyPlan,
        profile: &PreferenceProfile,
    ) -> Result<RepairReport, AppError> {
        self.generator.repair(plan, profile).await
    }
}
