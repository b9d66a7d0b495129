// ABOUTME: Configuration for candidate filtering, the weekly solver, and the quality gate
// ABOUTME: Pool-size floor, solver weights/tolerance/timeout, and liked-ratio policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Candidate filter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Soft rules are skipped when they would leave fewer candidates than this
    pub min_pool_size: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { min_pool_size: 100 }
    }
}

/// Weekly assignment solver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock budget for one solve
    pub timeout_secs: u64,
    /// Objective weight of a liked recipe
    pub liked_weight: f64,
    /// Objective weight of any other recipe
    pub baseline_weight: f64,
    /// Relative half-width of each daily macro window
    pub macro_tolerance: f64,
    /// Uses per recipe when the pool covers every slot
    pub unique_use_cap: u32,
    /// Uses per recipe when the pool is smaller than the slot count
    pub scarce_use_cap: u32,
}

impl SolverConfig {
    /// Timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            liked_weight: 10.0,
            baseline_weight: 1.0,
            macro_tolerance: 0.10,
            unique_use_cap: 1,
            scarce_use_cap: 2,
        }
    }
}

/// How the minimum liked ratio is chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LikedRatioPolicy {
    /// Same threshold for every user
    Fixed {
        /// Minimum fraction of slots filled with liked recipes
        threshold: f64,
    },
    /// Threshold follows how many liked recipes survive filtering
    ///
    /// `clamp(liked_in_pool / total_slots, floor, ceiling)`, so users with few
    /// likes are not held to a bar they cannot reach.
    Adaptive {
        /// Lowest threshold
        floor: f64,
        /// Highest threshold
        ceiling: f64,
    },
}

impl LikedRatioPolicy {
    /// Threshold for a request with `liked_in_pool` liked candidates and `total_slots` slots
    #[must_use]
    pub fn threshold(&self, liked_in_pool: usize, total_slots: usize) -> f64 {
        match *self {
            Self::Fixed { threshold } => threshold,
            Self::Adaptive { floor, ceiling } => {
                if total_slots == 0 {
                    return floor;
                }
                (liked_in_pool as f64 / total_slots as f64).clamp(floor, ceiling)
            }
        }
    }
}

impl Default for LikedRatioPolicy {
    fn default() -> Self {
        Self::Fixed { threshold: 0.5 }
    }
}

/// Quality gate settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Minimum liked ratio policy
    pub liked_ratio: LikedRatioPolicy,
    /// Largest accepted relative error over any (day, macro)
    pub max_macro_deviation: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            liked_ratio: LikedRatioPolicy::default(),
            max_macro_deviation: 0.20,
        }
    }
}
