// ABOUTME: Traits implemented by external nutrition and recipe data providers
// ABOUTME: Separates ingredient pricing from base recipe retrieval so either can be swapped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use mealplan_core::errors::ProviderError;
use mealplan_core::models::{BaseRecipe, NutritionSnapshot, RecipeSource};

/// Prices a free-text ingredient line
#[async_trait]
pub trait NutritionDataProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Canonical nutrition for the whole quantity in `ingredient_text`
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` on transport, status, or payload failures, and
    /// `EmptyResult` when the provider recognized nothing.
    async fn ingredient_nutrition(
        &self,
        ingredient_text: &str,
    ) -> Result<NutritionSnapshot, ProviderError>;
}

/// Fetches a provider's unmodified recipe
#[async_trait]
pub trait RecipeDataProvider: Send + Sync {
    /// Which recipe ids this provider owns
    fn source(&self) -> RecipeSource;

    /// Recipe with per-serving nutrition, `None` when the provider does not know the id
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` on transport, status, or payload failures.
    async fn recipe(&self, recipe_id: &str) -> Result<Option<BaseRecipe>, ProviderError>;
}
