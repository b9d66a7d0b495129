// ABOUTME: Per-user personalization history: liked, disliked, and recently used recipes
// ABOUTME: Consumed by the filter (exclusions), the solver (weights), and the quality gate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Ratings and recent usage for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHistory {
    /// Recipes the user rated positively
    #[serde(default)]
    pub liked: HashSet<Uuid>,
    /// Recipes the user rated negatively
    #[serde(default)]
    pub disliked: HashSet<Uuid>,
    /// Recipes served in the previous week's plan
    #[serde(default)]
    pub last_week: HashSet<Uuid>,
}

impl UserHistory {
    /// Recipe must never be planned
    #[must_use]
    pub fn is_excluded(&self, id: &Uuid) -> bool {
        self.disliked.contains(id) || self.last_week.contains(id)
    }

    /// Recipe is liked
    #[must_use]
    pub fn is_liked(&self, id: &Uuid) -> bool {
        self.liked.contains(id)
    }

    /// Set liked ids
    #[must_use]
    pub fn with_liked(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.liked = ids.into_iter().collect();
        self
    }

    /// Set disliked ids
    #[must_use]
    pub fn with_disliked(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.disliked = ids.into_iter().collect();
        self
    }

    /// Set last week's ids
    #[must_use]
    pub fn with_last_week(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.last_week = ids.into_iter().collect();
        self
    }
}
