// ABOUTME: Main library entry point for the weekly meal planner service
// ABOUTME: Plan generation with solver/hybrid fallback, LLM-backed synthesis and targets, and collaborators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![deny(unsafe_code)]

//! # Meal Planner
//!
//! Assigns meals to slots across a seven-day week for one person, subject to
//! daily macro targets, dietary and allergen rules, and personalization from
//! their ratings history.
//!
//! ## Architecture
//!
//! - **`mealplan-core`**: domain models and `AppError`
//! - **`mealplan-intelligence`**: filtering, feasibility, the weekly solver,
//!   the quality gate, the hybrid composer and the plan assembler
//! - **this crate**: the plan generation entry point and its fallback chain,
//!   collaborator traits, the chat-model synthesizer and target provider,
//!   environment configuration, and logging
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mealplan::planner::{PathPolicy, PlanGenerator, PlanRequest};
//! use mealplan_core::models::{MacroTarget, PreferenceProfile, UserHistory};
//! use mealplan_intelligence::{DisabledSynthesizer, PlannerConfig};
//!
//! async fn example(catalog: Vec<mealplan_core::models::RecipeCandidate>) {
//!     let generator = PlanGenerator::new(PlannerConfig::default(), Arc::new(DisabledSynthesizer));
//!     let request = PlanRequest {
//!         profile: PreferenceProfile::default(),
//!         history: UserHistory::default(),
//!         target: MacroTarget::new(2000.0, 150.0, 200.0, 65.0),
//!         policy: PathPolicy::SolverFirst,
//!     };
//!     let outcome = generator.generate(&catalog, request).await;
//!     println!("{}", serde_json::to_string_pretty(&outcome).unwrap_or_default());
//! }
//! ```

/// Recipe catalog and user history collaborators
pub mod catalog;

/// Environment-based service configuration
pub mod config;

/// Chat-completion client and prompts
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Plan generation entry point
pub mod planner;

/// Planning service over stored users
pub mod service;

/// Chat-model meal synthesizer
pub mod synthesizer;

/// Daily macro target providers
pub mod targets;
