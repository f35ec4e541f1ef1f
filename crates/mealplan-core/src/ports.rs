// ABOUTME: Collaborator traits the customization engine depends on
// ABOUTME: Nutrition lookup, base recipe resolution, and draft persistence interfaces
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Collaborator Ports
//!
//! The engine never constructs its own HTTP clients or storage handles. Hosts
//! inject implementations of these traits, and tests substitute fakes.

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{
    BaseRecipe, DraftVersion, LoadedSlot, MealSlotKey, NutritionSnapshot, RecipeCustomization,
    RecipeSource,
};

/// Resolves free-text ingredient lines (`"100 g butter"`) to absolute nutrition
#[async_trait]
pub trait IngredientNutritionLookup: Send + Sync {
    /// Nutrition for the whole stated quantity, or `None` when no provider could answer
    ///
    /// Implementations absorb provider failures and timeouts; a `None` means the
    /// caller should skip this ingredient's contribution.
    async fn lookup(&self, ingredient_text: &str) -> Option<NutritionSnapshot>;
}

/// Resolves a recipe id to its unmodified provider version
#[async_trait]
pub trait BaseRecipeResolver: Send + Sync {
    /// Base recipe, or `None` when neither cache nor provider has it
    async fn base_recipe(&self, recipe_id: &str, source: RecipeSource) -> Option<BaseRecipe>;
}

/// Draft storage with optimistic concurrency on the draft's `updated_at`
#[async_trait]
pub trait CustomizationRepository: Send + Sync {
    /// Read a slot and the draft version it was read at
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the draft or slot does not exist.
    async fn load_customization(&self, slot: &MealSlotKey) -> AppResult<LoadedSlot>;

    /// Write the slot's customization if the draft is still at `expected_version`
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` when the draft changed since `expected_version`,
    /// `ResourceNotFound` when the slot disappeared.
    async fn save_customization(
        &self,
        slot: &MealSlotKey,
        customization: RecipeCustomization,
        expected_version: DraftVersion,
    ) -> AppResult<DraftVersion>;

    /// Remove the slot's customization if the draft is still at `expected_version`
    ///
    /// # Errors
    ///
    /// Same conditions as [`CustomizationRepository::save_customization`].
    async fn delete_customization(
        &self,
        slot: &MealSlotKey,
        expected_version: DraftVersion,
    ) -> AppResult<DraftVersion>;
}
