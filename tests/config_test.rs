// ABOUTME: Tests for environment-driven service and planner configuration
// ABOUTME: Runs serially because every case mutates process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use mealplan::config::{ServiceConfig, DEFAULT_AUTO_MIN_LIKED};
use mealplan::planner::PathPolicy;
use mealplan_intelligence::config::{
    ConfigError, CuisineMismatchPolicy, LikedRatioPolicy, PlannerConfig,
};
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "MEALPLAN_LLM_BASE_URL",
    "MEALPLAN_LLM_API_KEY",
    "OPENAI_API_KEY",
    "MEALPLAN_MEAL_MODEL",
    "MEALPLAN_TARGET_MODEL",
    "MEALPLAN_LLM_TIMEOUT_SECS",
    "MEALPLAN_MEAL_MAX_TOKENS",
    "MEALPLAN_TARGET_MAX_TOKENS",
    "MEALPLAN_PATH_POLICY",
    "MEALPLAN_AUTO_MIN_LIKED",
    "MEALPLAN_MIN_POOL_SIZE",
    "MEALPLAN_SOLVER_TIMEOUT_SECS",
    "MEALPLAN_LIKED_WEIGHT",
    "MEALPLAN_MACRO_TOLERANCE",
    "MEALPLAN_MIN_LIKED_RATIO",
    "MEALPLAN_MAX_MACRO_DEVIATION",
    "MEALPLAN_CUISINE_MISMATCH",
    "MEALPLAN_TIE_BREAK_SEED",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

// ============================================================================
// Service configuration
// ============================================================================

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();

    let config = ServiceConfig::from_env().unwrap();

    assert_eq!(config, ServiceConfig::default());
    assert!(!config.llm.is_configured());
    assert_eq!(config.default_policy, PathPolicy::SolverFirst);
    assert!(!config.summary().contains("sk-"));
}

#[test]
#[serial]
fn test_llm_overrides_and_key_fallback() {
    clear_env();
    env::set_var("OPENAI_API_KEY", "  sk-fallback  ");
    env::set_var("MEALPLAN_LLM_BASE_URL", "http://localhost:11434/v1");
    env::set_var("MEALPLAN_MEAL_MODEL", "llama3.1");
    env::set_var("MEALPLAN_LLM_TIMEOUT_SECS", "30");

    let config = ServiceConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.llm.api_key.as_deref(), Some("sk-fallback"));
    assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
    assert_eq!(config.llm.meal_model, "llama3.1");
    assert_eq!(config.llm.timeout_secs, 30);
    assert!(!config.summary().contains("sk-fallback"));

    let provider = config.llm.provider_config(&config.llm.meal_model);
    assert_eq!(provider.default_model, "llama3.1");
    assert_eq!(provider.request_timeout.as_secs(), 30);
}

#[test]
#[serial]
fn test_blank_api_key_leaves_generation_disabled() {
    clear_env();
    env::set_var("MEALPLAN_LLM_API_KEY", "   ");

    let config = ServiceConfig::from_env().unwrap();
    clear_env();

    assert!(config.llm.api_key.is_none());
}

#[test]
#[serial]
fn test_path_policy_from_environment() {
    clear_env();
    env::set_var("MEALPLAN_PATH_POLICY", "Auto");
    env::set_var("MEALPLAN_AUTO_MIN_LIKED", "12");

    let config = ServiceConfig::from_env().unwrap();
    assert_eq!(config.default_policy, PathPolicy::Auto { min_liked: 12 });

    env::set_var("MEALPLAN_PATH_POLICY", "hybrid-first");
    let config = ServiceConfig::from_env().unwrap();
    clear_env();
    assert_eq!(config.default_policy, PathPolicy::HybridFirst);
    assert_eq!(DEFAULT_AUTO_MIN_LIKED, 5);
}

#[test]
#[serial]
fn test_invalid_service_values_rejected() {
    clear_env();
    env::set_var("MEALPLAN_PATH_POLICY", "random");
    assert!(ServiceConfig::from_env().is_err());

    clear_env();
    env::set_var("MEALPLAN_LLM_TIMEOUT_SECS", "0");
    assert!(ServiceConfig::from_env().is_err());

    clear_env();
    env::set_var("MEALPLAN_MEAL_MAX_TOKENS", "many");
    assert!(ServiceConfig::from_env().is_err());
    clear_env();
}

// ============================================================================
// Planner configuration
// ============================================================================

#[test]
#[serial]
fn test_planner_overrides() {
    clear_env();
    env::set_var("MEALPLAN_SOLVER_TIMEOUT_SECS", "3");
    env::set_var("MEALPLAN_MIN_LIKED_RATIO", "0.25");
    env::set_var("MEALPLAN_CUISINE_MISMATCH", "reject");
    env::set_var("MEALPLAN_TIE_BREAK_SEED", "42");

    let config = PlannerConfig::load().unwrap();
    clear_env();

    assert_eq!(config.solver.timeout_secs, 3);
    assert_eq!(
        config.quality.liked_ratio,
        LikedRatioPolicy::Fixed { threshold: 0.25 }
    );
    assert_eq!(config.composer.cuisine_mismatch, CuisineMismatchPolicy::Reject);
    assert_eq!(config.composer.tie_break_seed, Some(42));
}

#[test]
#[serial]
fn test_planner_validation_failures() {
    clear_env();
    env::set_var("MEALPLAN_SOLVER_TIMEOUT_SECS", "0");
    assert!(matches!(
        PlannerConfig::load(),
        Err(ConfigError::ValueOutOfRange(_))
    ));

    clear_env();
    env::set_var("MEALPLAN_MIN_LIKED_RATIO", "1.5");
    assert!(matches!(
        PlannerConfig::load(),
        Err(ConfigError::ValueOutOfRange(_))
    ));

    clear_env();
    env::set_var("MEALPLAN_LIKED_WEIGHT", "0.5");
    assert!(matches!(
        PlannerConfig::load(),
        Err(ConfigError::InvalidWeights(_))
    ));

    clear_env();
    env::set_var("MEALPLAN_CUISINE_MISMATCH", "ignore");
    assert!(matches!(PlannerConfig::load(), Err(ConfigError::Parse(_))));
    clear_env();
}

#[test]
#[serial]
fn test_planner_error_surfaces_through_service_config() {
    clear_env();
    env::set_var("MEALPLAN_MACRO_TOLERANCE", "1.5");

    let err = ServiceConfig::from_env().unwrap_err();
    clear_env();

    assert!(format!("{err:#}").contains("macro_tolerance"));
}
