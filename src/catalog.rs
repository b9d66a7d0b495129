// ABOUTME: Recipe catalog and user history collaborators consumed by the planning service
// ABOUTME: Async traits with in-memory adapters and a JSON-file catalog loader
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use async_trait::async_trait;
use mealplan_core::errors::AppError;
use mealplan_core::models::{PreferenceProfile, RecipeCandidate, UserHistory};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

/// Source of recipe candidates for a request
#[async_trait]
pub trait RecipeCatalog: Send + Sync {
    /// Active recipes for a profile, without excluded ids
    ///
    /// Implementations may pre-filter; the planner re-applies every rule.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot be read
    async fn candidates(
        &self,
        profile: &PreferenceProfile,
        history: &UserHistory,
    ) -> Result<Vec<RecipeCandidate>, AppError>;
}

/// Ratings and recent usage per user
#[async_trait]
pub trait HistoryLookup: Send + Sync {
    /// History for `user_id`; unknown users have an empty history
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store fails
    async fn history(&self, user_id: Uuid) -> Result<UserHistory, AppError>;
}

/// Catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    recipes: Vec<RecipeCandidate>,
}

impl InMemoryCatalog {
    /// Catalog over `recipes`
    #[must_use]
    pub const fn new(recipes: Vec<RecipeCandidate>) -> Self {
        Self { recipes }
    }

    /// Number of recipes
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Catalog has no recipes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[async_trait]
impl RecipeCatalog for InMemoryCatalog {
    async fn candidates(
        &self,
        _profile: &PreferenceProfile,
        history: &UserHistory,
    ) -> Result<Vec<RecipeCandidate>, AppError> {
        Ok(self
            .recipes
            .iter()
            .filter(|recipe| !history.is_excluded(&recipe.id))
            .cloned()
            .collect())
    }
}

/// Catalog read from a JSON array of recipes on every request
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    /// Catalog backed by the file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the whole file
    ///
    /// # Errors
    ///
    /// Returns a storage error when the file cannot be read and an
    /// invalid-format error when it is not a JSON recipe array
    pub async fn load(&self) -> Result<Vec<RecipeCandidate>, AppError> {
        let raw = fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::storage(format!(
                "failed to read recipe catalog {}: {e}",
                self.path.display()
            ))
            .with_source(e)
        })?;
        let recipes: Vec<RecipeCandidate> = serde_json::from_str(&raw).map_err(|e| {
            AppError::invalid_format(format!(
                "recipe catalog {} is not a valid recipe list: {e}",
                self.path.display()
            ))
        })?;
        info!(path = %self.path.display(), recipes = recipes.len(), "Recipe catalog loaded");
        Ok(recipes)
    }
}

#[async_trait]
impl RecipeCatalog for JsonFileCatalog {
    async fn candidates(
        &self,
        _profile: &PreferenceProfile,
        history: &UserHistory,
    ) -> Result<Vec<RecipeCandidate>, AppError> {
        let mut recipes = self.load().await?;
        let before = recipes.len();
        recipes.retain(|recipe| !history.is_excluded(&recipe.id));
        debug!(excluded = before - recipes.len(), "Excluded disliked and recent recipes");
        Ok(recipes)
    }
}

/// Histories held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    histories: HashMap<Uuid, UserHistory>,
}

impl InMemoryHistory {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with one user's history
    #[must_use]
    pub fn with_user(mut self, user_id: Uuid, history: UserHistory) -> Self {
        self.histories.insert(user_id, history);
        self
    }
}

#[async_trait]
impl HistoryLookup for InMemoryHistory {
    async fn history(&self, user_id: Uuid) -> Result<UserHistory, AppError> {
        Ok(self.histories.get(&user_id).cloned().unwrap_or_default())
    }
}
