// ABOUTME: Recipe customization service orchestrating merge, recalculation, and conditional writes
// ABOUTME: Retries the whole read-merge-recompute-write cycle on draft version conflicts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Customization Service
//!
//! One request runs:
//!
//! 1. read the meal slot and the draft version
//! 2. resolve the base recipe (provider cache, else the copy embedded in the draft)
//! 3. merge the stored canonical edits with the incoming edits
//! 4. recompute per-serving nutrition from the base snapshot
//! 5. write the customization conditioned on the version read in step 1
//!
//! A version conflict restarts from step 1. Attempts are bounded by
//! `PersistenceConfig::max_save_attempts`.

use std::sync::Arc;

use mealplan_core::constants::nutrition::DEFAULT_NUTRITION_SERVINGS;
use mealplan_core::errors::{AppError, AppResult, ErrorCode};
use mealplan_core::models::{
    Accuracy, BaseRecipe, CalculationMethod, DraftVersion, EmbeddedRecipe, Ingredient,
    MealSlotKey, Modification, NutritionSnapshot, RecipeCustomization, RecipeSource,
};
use mealplan_core::ports::{BaseRecipeResolver, CustomizationRepository, IngredientNutritionLookup};
use mealplan_intelligence::{
    IngredientListProjector, MergeStep, ModificationMerger, ModificationSummary,
    NutrientKeyStandardizer, NutritionDeltaCalculator, RecalculationStep, ServingsScaler,
};
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::PersistenceConfig;

/// Where the base recipe came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseRecipeOrigin {
    /// Recipe cache or provider API
    Provider,
    /// Copy embedded in the draft when the recipe was selected
    DraftFallback,
}

/// Edits submitted for one recipe instance
#[derive(Debug, Clone)]
pub struct CustomizationRequest {
    /// Meal slot holding the recipe
    pub slot: MealSlotKey,
    /// New edits only; stored edits are merged in by the service
    pub modifications: Vec<Modification>,
    /// Portion multiplier; `None` keeps the stored value
    pub nutrition_servings: Option<f64>,
}

/// Result of a successful customization
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationOutcome {
    /// Stored customization, canonical edits and per-serving nutrition
    pub customization: RecipeCustomization,
    /// Draft version after the write
    #[serde(skip)]
    pub version: DraftVersion,
    /// Attempts used, 1 when no conflict occurred
    pub attempts: u32,
    /// Where the base recipe came from
    pub base_origin: BaseRecipeOrigin,
    /// How each edit was merged
    pub merge_trace: Vec<MergeStep>,
    /// Every nutrition step
    pub recalculation_trace: Vec<RecalculationStep>,
    /// Ingredient list after edits
    pub ingredients: Vec<Ingredient>,
    /// Complete nutrition for the requested portion
    pub nutrition: NutritionSnapshot,
    /// Display lines for each edit
    pub summary: Vec<ModificationSummary>,
}

/// Read model of a possibly customized recipe
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizedRecipeView {
    /// Recipe id
    pub recipe_id: String,
    /// Provider
    pub source: RecipeSource,
    /// Display name from the draft
    pub name: String,
    /// Ingredient list after edits
    pub ingredients: Vec<Ingredient>,
    /// Canonical edits
    pub modifications: Vec<Modification>,
    /// Display lines for each edit
    pub summary: Vec<ModificationSummary>,
    /// Complete nutrition for one serving
    pub nutrition_per_serving: NutritionSnapshot,
    /// Complete nutrition for `nutrition_servings` portions
    pub nutrition: NutritionSnapshot,
    /// Portion multiplier
    pub nutrition_servings: f64,
    /// Whether any edit is in effect
    pub customizations_applied: bool,
    /// How the nutrition was produced
    pub calculation_method: CalculationMethod,
    /// Confidence in the nutrition
    pub accuracy: Accuracy,
}

/// Customization pipeline over injected collaborators
#[derive(Clone)]
pub struct CustomizationService {
    repository: Arc<dyn CustomizationRepository>,
    resolver: Arc<dyn BaseRecipeResolver>,
    lookup: Arc<dyn IngredientNutritionLookup>,
    max_save_attempts: u32,
}

impl CustomizationService {
    /// Create a service
    #[must_use]
    pub fn new(
        repository: Arc<dyn CustomizationRepository>,
        resolver: Arc<dyn BaseRecipeResolver>,
        lookup: Arc<dyn IngredientNutritionLookup>,
        persistence: &PersistenceConfig,
    ) -> Self {
        Self {
            repository,
            resolver,
            lookup,
            max_save_attempts: persistence.max_save_attempts.max(1),
        }
    }

    /// Merge `request.modifications` into the slot's customization and store it
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when `nutrition_servings` is not a positive number
    /// - `ResourceNotFound` when the draft or slot does not exist
    /// - `RetriesExhausted` (retryable) when every attempt hit a version conflict
    /// - any other repository error, unchanged
    pub async fn apply_customization(
        &self,
        request: CustomizationRequest,
    ) -> AppResult<CustomizationOutcome> {
        validate_nutrition_servings(request.nutrition_servings)?;

        let span = info_span!(
            "apply_customization",
            request_id = %Uuid::new_v4(),
            slot = %request.slot,
            incoming = request.modifications.len(),
        );
        self.apply_with_retries(&request).instrument(span).await
    }

    async fn apply_with_retries(
        &self,
        request: &CustomizationRequest,
    ) -> AppResult<CustomizationOutcome> {
        for attempt in 1..=self.max_save_attempts {
            match self.apply_once(request, attempt).await {
                Ok(outcome) => {
                    info!(
                        attempt,
                        modifications = outcome.customization.modifications.len(),
                        method = ?outcome.customization.calculation_method,
                        "Customization saved"
                    );
                    return Ok(outcome);
                }
                Err(e) if e.code == ErrorCode::VersionConflict => {
                    warn!(
                        attempt,
                        max_attempts = self.max_save_attempts,
                        "Draft changed during customization, retrying from a fresh read"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        error!(
            attempts = self.max_save_attempts,
            "Customization abandoned after repeated version conflicts"
        );
        Err(
            AppError::retries_exhausted("Apply recipe customization", self.max_save_attempts)
                .with_resource_id(request.slot.to_string()),
        )
    }

    async fn apply_once(
        &self,
        request: &CustomizationRequest,
        attempt: u32,
    ) -> AppResult<CustomizationOutcome> {
        let loaded = self.repository.load_customization(&request.slot).await?;
        let (base, base_origin) = self.resolve_base(&loaded.state.recipe).await;
        let stored = loaded.state.customization.as_ref();
        let existing = stored.map_or(&[][..], |c| c.modifications.as_slice());

        let merged = ModificationMerger::merge(existing, &request.modifications, &base.ingredients);
        let recalculation = NutritionDeltaCalculator::recompute(
            &base.nutrition_per_serving,
            base.servings,
            &merged.modifications,
            self.lookup.as_ref(),
        )
        .await;

        let nutrition_servings = request
            .nutrition_servings
            .or_else(|| stored.map(|c| c.nutrition_servings))
            .unwrap_or(DEFAULT_NUTRITION_SERVINGS);
        let applied = !merged.modifications.is_empty();

        let customization = RecipeCustomization {
            recipe_id: loaded.state.recipe.recipe_id.clone(),
            source: loaded.state.recipe.source,
            modifications: merged.modifications,
            custom_nutrition: applied.then(|| recalculation.snapshot.clone()),
            nutrition_servings,
            customizations_applied: applied,
            calculation_method: recalculation.method,
            accuracy: recalculation.accuracy,
        };

        let version = self
            .repository
            .save_customization(&request.slot, customization.clone(), loaded.version)
            .await?;

        let ingredients =
            IngredientListProjector::project(&base.ingredients, &customization.modifications);
        let summary = IngredientListProjector::summarize(&customization.modifications);
        let nutrition = NutrientKeyStandardizer::complete_report(&ServingsScaler::scale(
            &recalculation.snapshot,
            nutrition_servings,
        ));

        Ok(CustomizationOutcome {
            customization,
            version,
            attempts: attempt,
            base_origin,
            merge_trace: merged.trace,
            recalculation_trace: recalculation.trace,
            ingredients,
            nutrition,
            summary,
        })
    }

    /// The recipe in a slot with its stored customization applied
    ///
    /// Nutrition is scaled once from the stored per-serving snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the draft or slot does not exist.
    pub async fn customized_recipe(&self, slot: &MealSlotKey) -> AppResult<CustomizedRecipeView> {
        let loaded = self.repository.load_customization(slot).await?;
        let (base, _) = self.resolve_base(&loaded.state.recipe).await;
        let recipe = loaded.state.recipe;

        let view = match loaded.state.customization {
            Some(customization) => {
                let per_serving = customization
                    .custom_nutrition
                    .clone()
                    .unwrap_or_else(|| base.nutrition_per_serving.rounded());
                CustomizedRecipeView {
                    ingredients: IngredientListProjector::project(
                        &base.ingredients,
                        &customization.modifications,
                    ),
                    summary: IngredientListProjector::summarize(&customization.modifications),
                    nutrition: NutrientKeyStandardizer::complete_report(&ServingsScaler::scale(
                        &per_serving,
                        customization.nutrition_servings,
                    )),
                    nutrition_per_serving: NutrientKeyStandardizer::complete_report(&per_serving),
                    nutrition_servings: customization.nutrition_servings,
                    customizations_applied: customization.customizations_applied,
                    calculation_method: customization.calculation_method,
                    accuracy: customization.accuracy,
                    modifications: customization.modifications,
                    recipe_id: recipe.recipe_id,
                    source: recipe.source,
                    name: recipe.name,
                }
            }
            None => {
                let per_serving =
                    NutrientKeyStandardizer::complete_report(&base.nutrition_per_serving.rounded());
                CustomizedRecipeView {
                    ingredients: base.ingredients,
                    summary: Vec::new(),
                    nutrition: per_serving.clone(),
                    nutrition_per_serving: per_serving,
                    nutrition_servings: DEFAULT_NUTRITION_SERVINGS,
                    customizations_applied: false,
                    calculation_method: CalculationMethod::Unmodified,
                    accuracy: Accuracy::Precise,
                    modifications: Vec::new(),
                    recipe_id: recipe.recipe_id,
                    source: recipe.source,
                    name: recipe.name,
                }
            }
        };
        Ok(view)
    }

    /// Remove the slot's customization, returning the recipe to its base state
    ///
    /// Clearing a slot without a customization is a no-op.
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` when the draft or slot does not exist
    /// - `RetriesExhausted` when every attempt hit a version conflict
    pub async fn clear_customization(&self, slot: &MealSlotKey) -> AppResult<()> {
        for attempt in 1..=self.max_save_attempts {
            let loaded = self.repository.load_customization(slot).await?;
            if loaded.state.customization.is_none() {
                debug!(slot = %slot, "No customization to clear");
                return Ok(());
            }
            match self
                .repository
                .delete_customization(slot, loaded.version)
                .await
            {
                Ok(_) => {
                    info!(slot = %slot, attempt, "Customization cleared");
                    return Ok(());
                }
                Err(e) if e.code == ErrorCode::VersionConflict => {
                    warn!(slot = %slot, attempt, "Draft changed while clearing, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        error!(
            slot = %slot,
            attempts = self.max_save_attempts,
            "Clear abandoned after repeated conflicts"
        );
        Err(
            AppError::retries_exhausted("Clear recipe customization", self.max_save_attempts)
                .with_resource_id(slot.to_string()),
        )
    }

    /// Base recipe from the resolver, else the copy embedded in the draft
    async fn resolve_base(&self, embedded: &EmbeddedRecipe) -> (BaseRecipe, BaseRecipeOrigin) {
        if embedded.source != RecipeSource::Generated {
            if let Some(base) = self
                .resolver
                .base_recipe(&embedded.recipe_id, embedded.source)
                .await
            {
                return (base, BaseRecipeOrigin::Provider);
            }
            debug!(
                recipe_id = %embedded.recipe_id,
                source = %embedded.source,
                "Base recipe unavailable, using the draft's embedded copy"
            );
        }
        (embedded.to_base_recipe(), BaseRecipeOrigin::DraftFallback)
    }
}

fn validate_nutrition_servings(nutrition_servings: Option<f64>) -> AppResult<()> {
    match nutrition_servings {
        Some(value) if !value.is_finite() || value <= 0.0 => Err(AppError::invalid_input(format!(
            "nutrition_servings must be a positive number, got {value}"
        ))),
        _ => Ok(()),
    }
}
