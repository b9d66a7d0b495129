// ABOUTME: Planner configuration: filter, solver, quality gate, composer, and target calculation
// ABOUTME: Defaults plus environment overrides, validated once and exposed as a global
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Planner Configuration
//!
//! Configuration is organized into domain-specific modules:
//! - `planning` - candidate filter, weekly solver, quality gate
//! - `composer` - hybrid composer scoring and generated-meal policy
//! - `nutrition` - calculated daily target coefficients
//!
//! Environment overrides (all optional):
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MEALPLAN_MIN_POOL_SIZE` | `filter.min_pool_size` |
//! | `MEALPLAN_SOLVER_TIMEOUT_SECS` | `solver.timeout_secs` |
//! | `MEALPLAN_LIKED_WEIGHT` | `solver.liked_weight` |
//! | `MEALPLAN_MACRO_TOLERANCE` | `solver.macro_tolerance` |
//! | `MEALPLAN_MIN_LIKED_RATIO` | `quality.liked_ratio` (fixed) |
//! | `MEALPLAN_MAX_MACRO_DEVIATION` | `quality.max_macro_deviation` |
//! | `MEALPLAN_CUISINE_MISMATCH` | `composer.cuisine_mismatch` |
//! | `MEALPLAN_TIE_BREAK_SEED` | `composer.tie_break_seed` |

/// Composer configuration
pub mod composer;
/// Configuration error type
pub mod error;
/// Target calculation coefficients
pub mod nutrition;
/// Filter, solver, and quality gate configuration
pub mod planning;

pub use composer::{ComposerConfig, CuisineMismatchPolicy};
pub use error::ConfigError;
pub use nutrition::{ActivityFactorsConfig, BmrConfig, TargetCalculationConfig};
pub use planning::{FilterConfig, LikedRatioPolicy, QualityConfig, SolverConfig};

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Global configuration singleton
static PLANNER_CONFIG: OnceLock<PlannerConfig> = OnceLock::new();

/// Main planner configuration container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Candidate filter
    pub filter: FilterConfig,
    /// Weekly assignment solver
    pub solver: SolverConfig,
    /// Quality gate
    pub quality: QualityConfig,
    /// Hybrid composer
    pub composer: ComposerConfig,
    /// Calculated targets
    pub targets: TargetCalculationConfig,
}

impl PlannerConfig {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        PLANNER_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("Failed to load planner config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Load configuration from defaults and environment
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns the first rule the configuration violates
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_solver()?;
        self.validate_quality()?;

        let composer = &self.composer;
        if composer.ingredient_bonus < 0.0 || composer.instruction_bonus < 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "composer bonuses must be non-negative",
            ));
        }

        let targets = &self.targets;
        if !(0.0..1.0).contains(&targets.fat_calorie_share) {
            return Err(ConfigError::ValueOutOfRange(
                "fat_calorie_share must be in [0, 1)",
            ));
        }
        if targets.weight_loss_factor <= 0.0 || targets.muscle_gain_factor <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "goal adjustment factors must be positive",
            ));
        }
        Ok(())
    }

    fn validate_solver(&self) -> Result<(), ConfigError> {
        let solver = &self.solver;
        if solver.timeout_secs == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "solver timeout must be at least 1 second",
            ));
        }
        if !(solver.macro_tolerance > 0.0 && solver.macro_tolerance < 1.0) {
            return Err(ConfigError::ValueOutOfRange(
                "macro_tolerance must be in (0, 1)",
            ));
        }
        if solver.baseline_weight <= 0.0 {
            return Err(ConfigError::InvalidWeights("baseline_weight must be positive"));
        }
        if solver.liked_weight < solver.baseline_weight {
            return Err(ConfigError::InvalidWeights(
                "liked_weight must be >= baseline_weight",
            ));
        }
        if solver.unique_use_cap == 0 {
            return Err(ConfigError::ValueOutOfRange("unique_use_cap must be >= 1"));
        }
        if solver.scarce_use_cap < solver.unique_use_cap {
            return Err(ConfigError::InvalidRange(
                "scarce_use_cap must be >= unique_use_cap",
            ));
        }
        Ok(())
    }

    fn validate_quality(&self) -> Result<(), ConfigError> {
        let quality = &self.quality;
        match quality.liked_ratio {
            LikedRatioPolicy::Fixed { threshold } => {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(ConfigError::ValueOutOfRange(
                        "liked ratio threshold must be in [0, 1]",
                    ));
                }
            }
            LikedRatioPolicy::Adaptive { floor, ceiling } => {
                if !(0.0..=1.0).contains(&floor) || !(0.0..=1.0).contains(&ceiling) {
                    return Err(ConfigError::ValueOutOfRange(
                        "adaptive liked ratio bounds must be in [0, 1]",
                    ));
                }
                if floor > ceiling {
                    return Err(ConfigError::InvalidRange(
                        "adaptive liked ratio floor must be <= ceiling",
                    ));
                }
            }
        }
        if quality.max_macro_deviation <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "max_macro_deviation must be positive",
            ));
        }
        Ok(())
    }

    /// Helper function to parse and apply an environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        Self::apply_env_var("MEALPLAN_MIN_POOL_SIZE", &mut self.filter.min_pool_size)?;
        Self::apply_env_var(
            "MEALPLAN_SOLVER_TIMEOUT_SECS",
            &mut self.solver.timeout_secs,
        )?;
        Self::apply_env_var("MEALPLAN_LIKED_WEIGHT", &mut self.solver.liked_weight)?;
        Self::apply_env_var("MEALPLAN_MACRO_TOLERANCE", &mut self.solver.macro_tolerance)?;
        Self::apply_env_var(
            "MEALPLAN_MAX_MACRO_DEVIATION",
            &mut self.quality.max_macro_deviation,
        )?;
        Self::apply_env_var(
            "MEALPLAN_CUISINE_MISMATCH",
            &mut self.composer.cuisine_mismatch,
        )?;

        if env::var("MEALPLAN_MIN_LIKED_RATIO").is_ok() {
            let mut threshold = 0.5_f64;
            Self::apply_env_var("MEALPLAN_MIN_LIKED_RATIO", &mut threshold)?;
            self.quality.liked_ratio = LikedRatioPolicy::Fixed { threshold };
        }

        if env::var("MEALPLAN_TIE_BREAK_SEED").is_ok() {
            let mut seed = 0_u64;
            Self::apply_env_var("MEALPLAN_TIE_BREAK_SEED", &mut seed)?;
            self.composer.tie_break_seed = Some(seed);
        }

        Ok(self)
    }
}
