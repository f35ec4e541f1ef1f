// ABOUTME: Recipe models for base recipes and meal-plan draft slots
// ABOUTME: Defines Ingredient, RecipeSource, BaseRecipe, MealSlotKey, and EmbeddedRecipe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::nutrition::{FlatNutrition, NutritionSnapshot};
use crate::errors::AppError;

/// One line of a recipe's ingredient list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Ingredient name (`butter`, `all-purpose flour`)
    pub name: String,
    /// Quantity, when the source recipe states one
    #[serde(default)]
    pub amount: Option<f64>,
    /// Unit of the quantity
    #[serde(default)]
    pub unit: Option<String>,
    /// Original free-text line from the provider (`"2 tbsp unsalted butter"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

impl Ingredient {
    /// Create an ingredient with a quantity
    #[must_use]
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: Some(amount),
            unit: Some(unit.into()),
            original: None,
        }
    }

    /// Create an ingredient with no stated quantity
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
            unit: None,
            original: None,
        }
    }
}

/// Where a recipe came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeSource {
    /// Edamam recipe search
    Edamam,
    /// Spoonacular recipe API
    Spoonacular,
    /// Generated inside the meal plan; no provider can resolve it
    Generated,
}

impl RecipeSource {
    /// Lowercase identifier
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Edamam => "edamam",
            Self::Spoonacular => "spoonacular",
            Self::Generated => "generated",
        }
    }
}

impl fmt::Display for RecipeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "edamam" => Ok(Self::Edamam),
            "spoonacular" => Ok(Self::Spoonacular),
            "generated" | "ai" | "custom" => Ok(Self::Generated),
            other => Err(AppError::invalid_input(format!(
                "Unknown recipe source '{other}'"
            ))),
        }
    }
}

/// Unmodified recipe as published by its provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRecipe {
    /// Provider recipe id
    pub recipe_id: String,
    /// Provider
    pub source: RecipeSource,
    /// Ingredient list before any user edit
    pub ingredients: Vec<Ingredient>,
    /// Nutrition for one serving
    pub nutrition_per_serving: NutritionSnapshot,
    /// Number of servings the recipe yields
    pub servings: f64,
}

impl BaseRecipe {
    /// Servings usable as a divisor; anything non-positive counts as one serving
    #[must_use]
    pub fn effective_servings(&self) -> f64 {
        effective_servings(self.servings)
    }
}

/// Clamp a serving count to something safe to divide by
#[must_use]
pub fn effective_servings(servings: f64) -> f64 {
    if servings.is_finite() && servings > 0.0 {
        servings
    } else {
        1.0
    }
}

/// Address of one recipe instance inside a meal-plan draft
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSlotKey {
    /// Draft id
    pub draft_id: String,
    /// Day within the draft (ISO date or day label)
    pub day: String,
    /// Meal within the day (`breakfast`, `lunch`, `dinner`, `snack`)
    pub meal: String,
    /// Recipe selected in the slot
    pub recipe_id: String,
}

impl MealSlotKey {
    /// Create a slot key
    #[must_use]
    pub fn new(
        draft_id: impl Into<String>,
        day: impl Into<String>,
        meal: impl Into<String>,
        recipe_id: impl Into<String>,
    ) -> Self {
        Self {
            draft_id: draft_id.into(),
            day: day.into(),
            meal: meal.into(),
            recipe_id: recipe_id.into(),
        }
    }
}

impl fmt::Display for MealSlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.draft_id, self.day, self.meal, self.recipe_id
        )
    }
}

/// Recipe data copied into the draft when the recipe was selected
///
/// Used when the provider can no longer resolve the base recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedRecipe {
    /// Recipe id
    pub recipe_id: String,
    /// Provider the recipe came from
    pub source: RecipeSource,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Servings the recipe yields, when known
    #[serde(default)]
    pub servings: Option<f64>,
    /// Ingredient list as selected
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Full per-serving nutrition, when the draft stored it
    #[serde(default)]
    pub nutrition: Option<NutritionSnapshot>,
    /// Macro-only per-serving nutrition, for drafts without a full profile
    #[serde(default)]
    pub flat_nutrition: Option<FlatNutrition>,
}

impl EmbeddedRecipe {
    /// Best per-serving nutrition the draft has: full profile, else flat macros, else empty
    #[must_use]
    pub fn nutrition_per_serving(&self) -> NutritionSnapshot {
        self.nutrition.clone().unwrap_or_else(|| {
            self.flat_nutrition
                .map_or_else(NutritionSnapshot::empty, |flat| flat.to_snapshot())
        })
    }

    /// Treat the embedded copy as the base recipe
    #[must_use]
    pub fn to_base_recipe(&self) -> BaseRecipe {
        BaseRecipe {
            recipe_id: self.recipe_id.clone(),
            source: self.source,
            ingredients: self.ingredients.clone(),
            nutrition_per_serving: self.nutrition_per_serving(),
            servings: effective_servings(self.servings.unwrap_or(1.0)),
        }
    }
}
