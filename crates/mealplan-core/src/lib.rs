// ABOUTME: Core types and constants for the weekly meal planner
// ABOUTME: Foundation crate with domain models, error handling, and planning constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

#![deny(unsafe_code)]

//! # Meal Planner Core
//!
//! Foundation crate providing the shared vocabulary of the planner. It is
//! designed to change infrequently so the algorithm and service crates
//! recompile independently.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Week layout, energy densities, output precision
//! - **models**: Recipes, preferences, history, targets, and plan output

/// Unified error handling system with standard error codes
pub mod errors;

/// Planning constants
pub mod constants;

/// Core data models
pub mod models;
