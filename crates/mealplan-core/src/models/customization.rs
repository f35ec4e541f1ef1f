// ABOUTME: Recipe customization records stored inside meal-plan draft slots
// ABOUTME: Defines RecipeCustomization, calculation metadata, and optimistic-lock versions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::modification::Modification;
use super::nutrition::NutritionSnapshot;
use super::recipe::{EmbeddedRecipe, RecipeSource};
use crate::constants::nutrition::DEFAULT_NUTRITION_SERVINGS;

/// How the stored nutrition was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// No edits; base nutrition carried over
    #[default]
    Unmodified,
    /// Per-ingredient deltas from nutrition providers
    ProviderDelta,
    /// Every provider lookup failed; macros carried over without micronutrients
    MacroOnlyEstimate,
}

/// Confidence in the stored nutrition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    /// Every edit was accounted for
    #[default]
    Precise,
    /// At least one edit could not be priced
    Approximate,
}

/// User edits for one recipe instance in a meal slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCustomization {
    /// Recipe the edits apply to
    pub recipe_id: String,
    /// Provider of the base recipe
    pub source: RecipeSource,
    /// Canonical edit set relative to the base recipe
    #[serde(default)]
    pub modifications: Vec<Modification>,
    /// Per-serving nutrition after edits, before the portion multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_nutrition: Option<NutritionSnapshot>,
    /// Portion multiplier applied at display time
    #[serde(default = "default_nutrition_servings")]
    pub nutrition_servings: f64,
    /// Whether any edit is in effect
    #[serde(default)]
    pub customizations_applied: bool,
    /// How `custom_nutrition` was produced
    #[serde(default)]
    pub calculation_method: CalculationMethod,
    /// Confidence in `custom_nutrition`
    #[serde(default)]
    pub accuracy: Accuracy,
}

const fn default_nutrition_servings() -> f64 {
    DEFAULT_NUTRITION_SERVINGS
}

impl RecipeCustomization {
    /// Customization with no edits
    #[must_use]
    pub fn new(recipe_id: impl Into<String>, source: RecipeSource) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            source,
            modifications: Vec::new(),
            custom_nutrition: None,
            nutrition_servings: DEFAULT_NUTRITION_SERVINGS,
            customizations_applied: false,
            calculation_method: CalculationMethod::Unmodified,
            accuracy: Accuracy::Precise,
        }
    }
}

/// Optimistic-lock token: the draft's last `updated_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DraftVersion(pub DateTime<Utc>);

impl DraftVersion {
    /// Version stamped now
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Timestamp behind the version
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for DraftVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Contents of a meal slot as read from storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSlotState {
    /// Recipe copy embedded in the draft
    pub recipe: EmbeddedRecipe,
    /// Current customization, if the user edited the recipe
    #[serde(default)]
    pub customization: Option<RecipeCustomization>,
}

/// A slot read together with the draft version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSlot {
    /// Slot contents
    pub state: MealSlotState,
    /// Version to pass back on save
    pub version: DraftVersion,
}
