// ABOUTME: Planning engine for the weekly meal planner
// ABOUTME: Candidate filtering, feasibility, assignment solving, quality gating, and hybrid composition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![deny(unsafe_code)]

//! # Meal Planner Intelligence
//!
//! The CPU-bound core of the planner. Nothing in this crate performs network
//! I/O; generative meal sources are reached through the [`MealSynthesizer`]
//! trait, implemented by the service crate.
//!
//! ## Pipeline
//!
//! 1. [`filter_candidates`] narrows the catalog with hard and soft rules
//! 2. [`check_feasibility`] rejects requests no plan can satisfy
//! 3. [`WeeklySolver`] assigns one recipe per slot for seven days
//! 4. [`evaluate`] gates the assignment on liked ratio and macro deviation
//! 5. [`HybridComposer`] builds days greedily and escalates to the synthesizer
//! 6. [`assemble_from_assignment`] / [`assemble_from_composition`] emit the plan
//!
//! [`fill_missing_meals`] repairs an existing plan, and [`calculate_targets`]
//! derives daily targets from body metrics.

/// Planner configuration
pub mod config;

/// Hard constraint rules
pub mod rules;

/// Candidate filter
pub mod filter;

/// Feasibility pre-check
pub mod feasibility;

/// Weekly assignment solver
pub mod solver;

/// Quality gate
pub mod quality;

/// Generated meal contract and validation
pub mod synthesis;

/// Hybrid day composer
pub mod composer;

/// Plan assembler
pub mod assembler;

/// Plan repair
pub mod repair;

/// Daily target calculation
pub mod nutrition;

pub use assembler::{
    aggregate_snacks, assemble_day, assemble_from_assignment, assemble_from_composition,
    assemble_week,
};
pub use composer::{ComposeError, HybridComposer, SourcingStats, UsedNames, WeekComposition};
pub use config::{
    ComposerConfig, CuisineMismatchPolicy, FilterConfig, LikedRatioPolicy, PlannerConfig,
    QualityConfig, SolverConfig, TargetCalculationConfig,
};
pub use feasibility::{check_feasibility, FeasibilityError};
pub use filter::{filter_candidates, CandidatePool, FilterReport};
pub use nutrition::calculate_targets;
pub use quality::{evaluate, QualityMetrics, QualityReport};
pub use repair::{fill_missing_meals, RepairError, RepairReport};
pub use rules::{HardConstraints, RuleViolation};
pub use solver::{SolveFailure, WeeklyAssignment, WeeklySolver};
pub use synthesis::{
    DisabledSynthesizer, GeneratedMeal, MealSynthesizer, SynthesisRequest, SynthesizerError,
};
