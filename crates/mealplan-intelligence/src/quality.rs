// ABOUTME: Quality gate over solver output: liked ratio and worst-case macro deviation
// ABOUTME: Metrics are always produced and logged; rejection sends the request to the fallback path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use mealplan_core::models::{MacroKind, MacroTarget, Macros, UserHistory};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::config::QualityConfig;
use crate::solver::WeeklyAssignment;

/// Observability metrics for one weekly assignment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Liked meals divided by total slots
    pub liked_ratio: f64,
    /// Largest `|actual - target| / target` over every day and macro
    pub macro_deviation: f64,
    /// Liked meals selected
    pub liked_count: usize,
    /// Slots in the week
    pub total_slots: usize,
    /// Liked ratio required for this request
    pub liked_threshold: f64,
    /// Largest accepted deviation
    pub max_macro_deviation: f64,
    /// Gate verdict
    pub accepted: bool,
}

/// Why the gate rejected an assignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QualityRejection {
    /// Too few liked meals
    LikedRatio {
        /// Achieved ratio
        ratio: f64,
        /// Required ratio
        threshold: f64,
    },
    /// Some day misses a macro by too much
    MacroDeviation {
        /// Achieved worst deviation
        deviation: f64,
        /// Accepted maximum
        maximum: f64,
    },
}

impl fmt::Display for QualityRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LikedRatio { ratio, threshold } => {
                write!(f, "liked ratio {ratio:.2} below {threshold:.2}")
            }
            Self::MacroDeviation { deviation, maximum } => {
                write!(f, "macro deviation {deviation:.3} above {maximum:.3}")
            }
        }
    }
}

/// Gate verdict with metrics
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    /// Metrics, present whether accepted or not
    pub metrics: QualityMetrics,
    /// Every failed check; empty when accepted
    pub rejections: Vec<QualityRejection>,
}

impl QualityReport {
    /// Assignment passed every check
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.metrics.accepted
    }
}

/// Worst relative error between any day's totals and the target
///
/// Macros with a target of zero are not measured.
#[must_use]
pub fn macro_deviation<'a>(days: impl IntoIterator<Item = &'a Macros>, target: &MacroTarget) -> f64 {
    days.into_iter()
        .flat_map(|totals| {
            MacroKind::ALL.into_iter().filter_map(move |kind| {
                let goal = target.get(kind);
                (goal > 0.0).then(|| (totals.get(kind) - goal).abs() / goal)
            })
        })
        .fold(0.0, f64::max)
}

/// Evaluate a solver assignment
///
/// `liked_in_pool` feeds the adaptive liked-ratio policy.
#[must_use]
pub fn evaluate(
    assignment: &WeeklyAssignment,
    history: &UserHistory,
    target: &MacroTarget,
    config: &QualityConfig,
    liked_in_pool: usize,
) -> QualityReport {
    let total_slots = assignment.slot_count();
    let liked_count = assignment
        .recipes()
        .filter(|recipe| history.is_liked(&recipe.id))
        .count();
    let liked_ratio = if total_slots == 0 {
        0.0
    } else {
        liked_count as f64 / total_slots as f64
    };

    let day_totals: Vec<Macros> = assignment
        .days
        .iter()
        .map(|day| day.meals.iter().map(|(_, recipe)| recipe.macros).sum())
        .collect();
    let deviation = macro_deviation(&day_totals, target);

    let threshold = config.liked_ratio.threshold(liked_in_pool, total_slots);
    let mut rejections = Vec::new();
    if liked_ratio < threshold {
        rejections.push(QualityRejection::LikedRatio {
            ratio: liked_ratio,
            threshold,
        });
    }
    if deviation > config.max_macro_deviation {
        rejections.push(QualityRejection::MacroDeviation {
            deviation,
            maximum: config.max_macro_deviation,
        });
    }

    let metrics = QualityMetrics {
        liked_ratio,
        macro_deviation: deviation,
        liked_count,
        total_slots,
        liked_threshold: threshold,
        max_macro_deviation: config.max_macro_deviation,
        accepted: rejections.is_empty(),
    };

    if metrics.accepted {
        info!(
            liked_ratio,
            macro_deviation = deviation,
            liked_count,
            total_slots,
            "Quality gate accepted assignment"
        );
    } else {
        let reasons: Vec<String> = rejections.iter().map(ToString::to_string).collect();
        warn!(
            liked_ratio,
            macro_deviation = deviation,
            liked_count,
            total_slots,
            reasons = %reasons.join("; "),
            "Quality gate rejected assignment"
        );
    }

    QualityReport {
        metrics,
        rejections,
    }
}
