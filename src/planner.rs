// ABOUTME: Plan generation entry point running the solver and hybrid paths with mutual fallback
// ABOUTME: Internal failures become fallback reasons; only infeasible inputs surface as errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! # Plan Generation
//!
//! [`PlanGenerator::generate`] filters the catalog, runs the feasibility
//! pre-check, then tries the path the [`PathPolicy`] selects first:
//!
//! - **solver-first**: the weekly assignment solver runs on the blocking pool
//!   and its result passes the quality gate. Infeasibility, a timeout, a
//!   quality rejection or a backend failure is recorded as a
//!   [`FallbackReason`] and the hybrid composer builds the plan instead.
//! - **hybrid-first**: the composer runs first; if any day cannot be filled
//!   the solver is tried as the fallback.
//!
//! The returned [`PlanOutcome`] always carries either a plan or an error.
//! Feasibility failures are the only user-facing errors produced for a valid
//! request; everything else is diagnosed through `fallback_reason`.

use chrono::{DateTime, Utc};
use mealplan_core::errors::{AppError, ErrorCode};
use mealplan_core::models::{
    MacroTarget, MealSource, PreferenceProfile, RecipeCandidate, UserHistory, WeeklyPlan,
};
use mealplan_intelligence::{
    assemble_from_assignment, assemble_from_composition, check_feasibility, evaluate,
    fill_missing_meals, filter_candidates, CandidatePool, HybridComposer, MealSynthesizer,
    PlannerConfig, QualityMetrics, RepairReport, SolveFailure, SourcingStats, WeeklySolver,
};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio::time;
use tracing::field::{display, Empty};
use tracing::{debug, error, info, instrument, warn, Span};
use uuid::Uuid;

/// Extra wall-clock allowance on top of the solver's own time limit
const SOLVER_GRACE: Duration = Duration::from_secs(2);

// ============================================================================
// Path Policy
// ============================================================================

/// Which path runs first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPolicy {
    /// Solver, falling back to the hybrid composer
    SolverFirst,
    /// Hybrid composer, falling back to the solver
    HybridFirst,
    /// Solver-first for users with enough liked recipes, hybrid-first otherwise
    Auto {
        /// Liked recipes needed to start with the solver
        min_liked: usize,
    },
}

/// Concrete path after resolving [`PathPolicy::Auto`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPath {
    /// Weekly assignment solver
    Solver,
    /// Hybrid day composer
    Hybrid,
}

impl PathPolicy {
    /// Parse a policy name; `min_liked` configures `auto`
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error for unknown names
    pub fn parse(value: &str, min_liked: usize) -> Result<Self, AppError> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "solver" | "solver_first" => Ok(Self::SolverFirst),
            "hybrid" | "hybrid_first" => Ok(Self::HybridFirst),
            "auto" => Ok(Self::Auto { min_liked }),
            other => Err(AppError::invalid_input(format!(
                "unknown path policy '{other}', expected solver, hybrid or auto"
            ))),
        }
    }

    /// Path to try first for this user
    #[must_use]
    pub fn resolve(self, history: &UserHistory) -> PlanPath {
        match self {
            Self::SolverFirst => PlanPath::Solver,
            Self::HybridFirst => PlanPath::Hybrid,
            Self::Auto { min_liked } if history.liked.len() >= min_liked => PlanPath::Solver,
            Self::Auto { .. } => PlanPath::Hybrid,
        }
    }
}

impl fmt::Display for PathPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SolverFirst => f.write_str("solver"),
            Self::HybridFirst => f.write_str("hybrid"),
            Self::Auto { min_liked } => write!(f, "auto(min_liked={min_liked})"),
        }
    }
}

// ============================================================================
// Fallback Reasons
// ============================================================================

/// Why the first-choice path did not produce the plan
///
/// Serialized as its wire code, e.g. `"quality_threshold"` or
/// `"unexpected_error: <detail>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The assignment model has no feasible solution
    ConstraintsInfeasible,
    /// The solver hit its time limit without an assignment
    Timeout,
    /// The assignment failed the quality gate
    QualityThreshold,
    /// The solver failed for another reason
    UnexpectedError(String),
    /// Daily targets could not be produced
    MacroGenerationFailed,
    /// The hybrid composer could not complete the week
    HybridFailed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstraintsInfeasible => f.write_str("constraints_infeasible"),
            Self::Timeout => f.write_str("timeout"),
            Self::QualityThreshold => f.write_str("quality_threshold"),
            Self::UnexpectedError(detail) => write!(f, "unexpected_error: {detail}"),
            Self::MacroGenerationFailed => f.write_str("macro_generation_failed"),
            Self::HybridFailed(detail) => write!(f, "hybrid_failed: {detail}"),
        }
    }
}

impl Serialize for FallbackReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<SolveFailure> for FallbackReason {
    fn from(failure: SolveFailure) -> Self {
        match failure {
            SolveFailure::ConstraintsInfeasible => Self::ConstraintsInfeasible,
            SolveFailure::Timeout => Self::Timeout,
            SolveFailure::Backend(e) => Self::UnexpectedError(e.to_string()),
        }
    }
}

// ============================================================================
// Request and Outcome
// ============================================================================

/// One plan generation request
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// Planning preferences
    pub profile: PreferenceProfile,
    /// Ratings and recent usage
    pub history: UserHistory,
    /// Daily target
    pub target: MacroTarget,
    /// Which path runs first
    pub policy: PathPolicy,
}

/// Error part of an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanError {
    /// Stable error code
    pub code: ErrorCode,
    /// Message suitable for the end user
    pub message: String,
}

impl From<&AppError> for PlanError {
    fn from(error: &AppError) -> Self {
        Self {
            code: error.code,
            message: error.message.clone(),
        }
    }
}

/// Result of one request; never an `Err`
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    /// Correlation id for logs
    pub request_id: Uuid,
    /// When the outcome was produced
    pub generated_at: DateTime<Utc>,
    /// The weekly plan, when one was produced
    pub plan: Option<WeeklyPlan>,
    /// Quality gate metrics for a solver assignment
    pub quality_metrics: Option<QualityMetrics>,
    /// Why the first-choice path was abandoned
    pub fallback_reason: Option<FallbackReason>,
    /// User-facing error when no plan was produced
    pub error: Option<PlanError>,
    /// Path that produced the plan
    pub path: Option<PlanPath>,
    /// Catalog and generated meal counts for a hybrid plan
    pub sourcing: Option<SourcingStats>,
}

impl PlanOutcome {
    fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            generated_at: Utc::now(),
            plan: None,
            quality_metrics: None,
            fallback_reason: None,
            error: None,
            path: None,
            sourcing: None,
        }
    }

    /// Outcome for a request whose daily targets could not be produced
    #[must_use]
    pub fn targets_unavailable(error: &AppError) -> Self {
        let mut outcome = Self::new(Uuid::new_v4());
        outcome.error = Some(PlanError::from(error));
        outcome.fallback_reason = Some(FallbackReason::MacroGenerationFailed);
        outcome
    }

    /// Outcome carrying only an error
    #[must_use]
    pub fn failed(error: &AppError) -> Self {
        let mut outcome = Self::new(Uuid::new_v4());
        outcome.error = Some(PlanError::from(error));
        outcome
    }

    /// A plan was produced
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.plan.is_some()
    }

    fn with_error(mut self, error: &AppError) -> Self {
        self.error = Some(PlanError::from(error));
        self
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Successful solver run
struct SolverPlan {
    plan: WeeklyPlan,
    metrics: QualityMetrics,
}

/// Failed solver run; metrics are present when the gate rejected the assignment
struct SolverMiss {
    reason: FallbackReason,
    metrics: Option<QualityMetrics>,
}

fn unavailable(detail: &str) -> AppError {
    AppError::new(
        ErrorCode::PlanUnavailable,
        format!("Could not complete the weekly plan: {detail}"),
    )
}

/// Runs the planning pipeline for one request at a time
#[derive(Clone)]
pub struct PlanGenerator {
    config: Arc<PlannerConfig>,
    synthesizer: Arc<dyn MealSynthesizer>,
}

impl PlanGenerator {
    /// Generator with explicit configuration and synthesizer
    #[must_use]
    pub fn new(config: PlannerConfig, synthesizer: Arc<dyn MealSynthesizer>) -> Self {
        Self {
            config: Arc::new(config),
            synthesizer,
        }
    }

    /// Planner configuration in use
    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Synthesizer used for hybrid plans and repairs
    #[must_use]
    pub fn synthesizer(&self) -> Arc<dyn MealSynthesizer> {
        Arc::clone(&self.synthesizer)
    }

    /// Generate a weekly plan
    ///
    /// `catalog` is the request's read-only recipe snapshot.
    #[instrument(
        skip_all,
        fields(request_id = Empty, policy = %request.policy, catalog = catalog.len())
    )]
    pub async fn generate(&self, catalog: &[RecipeCandidate], request: PlanRequest) -> PlanOutcome {
        let mut outcome = PlanOutcome::new(Uuid::new_v4());
        Span::current().record("request_id", display(outcome.request_id));

        let PlanRequest {
            profile,
            history,
            target,
            policy,
        } = request;

        if !target.is_valid() {
            return outcome.with_error(&AppError::invalid_input(
                "daily target must have positive calories and non-negative macros",
            ));
        }

        let pool = filter_candidates(catalog, &profile, &history, &self.config.filter);
        let report = pool.report();
        info!(
            catalog_size = report.catalog_size,
            after_hard_rules = report.after_hard_rules,
            after_exclusions = report.after_exclusions,
            final_size = report.final_size,
            budget_applied = report.budget_applied,
            cooking_bucket_applied = report.cooking_bucket_applied,
            "Candidates filtered"
        );

        if let Err(infeasible) = check_feasibility(pool.candidates(), &target, profile.meals_per_day) {
            warn!(reason = %infeasible, "Request is infeasible");
            return outcome.with_error(&AppError::from(infeasible));
        }

        let pool = Arc::new(pool);
        let history = Arc::new(history);
        let first = policy.resolve(&history);
        info!(path = ?first, liked = history.liked.len(), "Planning path selected");

        outcome = match first {
            PlanPath::Solver => {
                self.solver_first(outcome, &pool, &history, &target, &profile)
                    .await
            }
            PlanPath::Hybrid => {
                self.hybrid_first(outcome, &pool, &history, &target, &profile)
                    .await
            }
        };

        if let Some(plan) = &outcome.plan {
            info!(
                path = ?outcome.path,
                catalog_meals = plan.count_by_source(MealSource::Catalog),
                generated_meals = plan.count_by_source(MealSource::Generated),
                fallback_reason = outcome.fallback_reason.as_ref().map(ToString::to_string),
                "Weekly plan generated"
            );
        }
        outcome
    }

    /// Fill the empty slots of an existing plan through the synthesizer
    ///
    /// # Errors
    ///
    /// Returns a plan-unavailable error naming the first day whose batch failed
    pub async fn repair(
        &self,
        plan: &mut WeeklyPlan,
        profile: &PreferenceProfile,
    ) -> Result<RepairReport, AppError> {
        let report = fill_missing_meals(
            plan,
            profile,
            self.synthesizer.as_ref(),
            self.config.composer.cuisine_mismatch,
        )
        .await
        .map_err(|e| AppError::new(ErrorCode::PlanUnavailable, e.to_string()))?;
        info!(
            filled_slots = report.filled_slots,
            repaired_days = report.repaired_days,
            "Plan repaired"
        );
        Ok(report)
    }

    async fn solver_first(
        &self,
        mut outcome: PlanOutcome,
        pool: &Arc<CandidatePool>,
        history: &Arc<UserHistory>,
        target: &MacroTarget,
        profile: &PreferenceProfile,
    ) -> PlanOutcome {
        let miss = match self.run_solver(pool, history, target, profile).await {
            Ok(solved) => {
                outcome.plan = Some(solved.plan);
                outcome.quality_metrics = Some(solved.metrics);
                outcome.path = Some(PlanPath::Solver);
                return outcome;
            }
            Err(miss) => miss,
        };

        warn!(fallback_reason = %miss.reason, "Solver path abandoned, composing hybrid plan");
        outcome.quality_metrics = miss.metrics;
        outcome.fallback_reason = Some(miss.reason);
        match self.run_hybrid(pool, profile, target).await {
            Ok((plan, sourcing)) => {
                outcome.plan = Some(plan);
                outcome.sourcing = Some(sourcing);
                outcome.path = Some(PlanPath::Hybrid);
                outcome
            }
            Err(detail) => {
                error!(error = %detail, "Hybrid fallback failed");
                outcome.with_error(&unavailable(&detail))
            }
        }
    }

    async fn hybrid_first(
        &self,
        mut outcome: PlanOutcome,
        pool: &Arc<CandidatePool>,
        history: &Arc<UserHistory>,
        target: &MacroTarget,
        profile: &PreferenceProfile,
    ) -> PlanOutcome {
        let detail = match self.run_hybrid(pool, profile, target).await {
            Ok((plan, sourcing)) => {
                outcome.plan = Some(plan);
                outcome.sourcing = Some(sourcing);
                outcome.path = Some(PlanPath::Hybrid);
                return outcome;
            }
            Err(detail) => detail,
        };

        warn!(error = %detail, "Hybrid path failed, trying the solver");
        let error = unavailable(&detail);
        outcome.fallback_reason = Some(FallbackReason::HybridFailed(detail));
        match self.run_solver(pool, history, target, profile).await {
            Ok(solved) => {
                outcome.plan = Some(solved.plan);
                outcome.quality_metrics = Some(solved.metrics);
                outcome.path = Some(PlanPath::Solver);
                outcome
            }
            Err(miss) => {
                error!(solver = %miss.reason, "Solver fallback failed");
                outcome.quality_metrics = miss.metrics;
                outcome.with_error(&error)
            }
        }
    }

    async fn run_solver(
        &self,
        pool: &Arc<CandidatePool>,
        history: &Arc<UserHistory>,
        target: &MacroTarget,
        profile: &PreferenceProfile,
    ) -> Result<SolverPlan, SolverMiss> {
        let solver = WeeklySolver::new(self.config.solver.clone());
        let deadline = solver.time_limit() + SOLVER_GRACE;
        let slots = profile.slots();
        let solve_pool = Arc::clone(pool);
        let solve_history = Arc::clone(history);
        let solve_target = *target;
        let handle = task::spawn_blocking(move || {
            solver.solve(&solve_pool, &solve_history, &solve_target, &slots)
        });

        let assignment = match time::timeout(deadline, handle).await {
            Err(_) => {
                warn!(deadline_secs = deadline.as_secs(), "Solver exceeded its deadline");
                return Err(SolverMiss {
                    reason: FallbackReason::Timeout,
                    metrics: None,
                });
            }
            Ok(Err(join)) => {
                error!(error = %join, "Solver task failed");
                return Err(SolverMiss {
                    reason: FallbackReason::UnexpectedError(join.to_string()),
                    metrics: None,
                });
            }
            Ok(Ok(Err(failure))) => {
                return Err(SolverMiss {
                    reason: FallbackReason::from(failure),
                    metrics: None,
                });
            }
            Ok(Ok(Ok(assignment))) => assignment,
        };
        debug!(status = ?assignment.status, objective = assignment.objective, "Solver returned an assignment");

        let quality = evaluate(
            &assignment,
            history,
            target,
            &self.config.quality,
            pool.liked_count(history),
        );
        info!(
            liked_ratio = quality.metrics.liked_ratio,
            macro_deviation = quality.metrics.macro_deviation,
            liked_count = quality.metrics.liked_count,
            total_slots = quality.metrics.total_slots,
            accepted = quality.metrics.accepted,
            "Quality metrics"
        );
        if !quality.is_accepted() {
            for rejection in &quality.rejections {
                warn!(rejection = %rejection, "Assignment below quality threshold");
            }
            return Err(SolverMiss {
                reason: FallbackReason::QualityThreshold,
                metrics: Some(quality.metrics),
            });
        }

        Ok(SolverPlan {
            plan: assemble_from_assignment(target, &assignment),
            metrics: quality.metrics,
        })
    }

    async fn run_hybrid(
        &self,
        pool: &CandidatePool,
        profile: &PreferenceProfile,
        target: &MacroTarget,
    ) -> Result<(WeeklyPlan, SourcingStats), String> {
        let mut composer = HybridComposer::new(
            pool.candidates(),
            profile,
            self.synthesizer.as_ref(),
            &self.config.composer,
        );
        let composition = composer
            .compose_week(target)
            .await
            .map_err(|e| e.to_string())?;
        let sourcing = composition.sourcing;
        Ok((assemble_from_composition(target, composition), sourcing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_parsing() {
        assert_eq!(PathPolicy::parse("Solver", 5).unwrap(), PathPolicy::SolverFirst);
        assert_eq!(
            PathPolicy::parse("hybrid-first", 5).unwrap(),
            PathPolicy::HybridFirst
        );
        assert_eq!(
            PathPolicy::parse(" auto ", 3).unwrap(),
            PathPolicy::Auto { min_liked: 3 }
        );
        let err = PathPolicy::parse("greedy", 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_auto_policy_counts_liked_recipes() {
        let policy = PathPolicy::Auto { min_liked: 2 };
        let few = UserHistory::default().with_liked([Uuid::new_v4()]);
        let many = UserHistory::default().with_liked([Uuid::new_v4(), Uuid::new_v4()]);
        assert_eq!(policy.resolve(&few), PlanPath::Hybrid);
        assert_eq!(policy.resolve(&many), PlanPath::Solver);
    }

    #[test]
    fn test_fallback_reason_wire_codes() {
        assert_eq!(
            serde_json::to_value(FallbackReason::QualityThreshold).unwrap(),
            json!("quality_threshold")
        );
        assert_eq!(
            FallbackReason::UnexpectedError("boom".to_owned()).to_string(),
            "unexpected_error: boom"
        );
        assert_eq!(
            FallbackReason::HybridFailed("no dinner".to_owned()).to_string(),
            "hybrid_failed: no dinner"
        );
        assert_eq!(
            FallbackReason::from(SolveFailure::Timeout),
            FallbackReason::Timeout
        );
    }

    #[test]
    fn test_targets_unavailable_outcome() {
        let err = AppError::new(ErrorCode::TargetsUnavailable, "model offline");
        let outcome = PlanOutcome::targets_unavailable(&err);
        assert!(!outcome.is_success());
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["fallback_reason"], json!("macro_generation_failed"));
        assert_eq!(value["error"]["code"], json!("TARGETS_UNAVAILABLE"));
        assert!(value["plan"].is_null());
    }
}
