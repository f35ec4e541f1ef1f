// ABOUTME: Spoonacular client for ingredient parsing with nutrition and recipe information
// ABOUTME: Used as the fallback nutrition source and the resolver for Spoonacular recipe ids
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use mealplan_core::constants::providers::{
    DEFAULT_SPOONACULAR_BASE_URL, SPOONACULAR, SPOONACULAR_DISPLAY,
};
use mealplan_core::errors::ProviderError;
use mealplan_core::models::{
    effective_servings, BaseRecipe, Ingredient, NutrientValue, NutritionSnapshot, RecipeSource,
};
use mealplan_intelligence::NutrientKeyStandardizer;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::circuit_breaker::ProviderBreaker;
use crate::http_client::{shared_client, success_body, transport_error};
use crate::provider::{NutritionDataProvider, RecipeDataProvider};

/// Spoonacular credentials and endpoint
#[derive(Debug, Clone)]
pub struct SpoonacularConfig {
    /// API key
    pub api_key: String,
    /// API root, without trailing path
    pub base_url: String,
}

impl Default for SpoonacularConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_SPOONACULAR_BASE_URL.to_owned(),
        }
    }
}

impl SpoonacularConfig {
    /// True when an API key is present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct SpoonacularNutrient {
    name: String,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    unit: String,
}

#[derive(Debug, Default, Deserialize)]
struct NutritionBlock {
    #[serde(default)]
    nutrients: Vec<SpoonacularNutrient>,
}

#[derive(Debug, Deserialize)]
struct ParsedIngredient {
    #[serde(default)]
    nutrition: Option<NutritionBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeInformation {
    #[serde(default)]
    servings: Option<f64>,
    #[serde(default)]
    extended_ingredients: Vec<ExtendedIngredient>,
    #[serde(default)]
    nutrition: Option<NutritionBlock>,
}

#[derive(Debug, Deserialize)]
struct ExtendedIngredient {
    #[serde(default)]
    name: String,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    original: Option<String>,
}

/// Spoonacular nutrition and recipe client
pub struct SpoonacularClient {
    config: SpoonacularConfig,
    breaker: ProviderBreaker,
}

impl SpoonacularClient {
    /// Create a client using the shared HTTP connection pool
    #[must_use]
    pub fn new(config: SpoonacularConfig) -> Self {
        Self {
            config,
            breaker: ProviderBreaker::new(SPOONACULAR),
        }
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(ProviderError::ConfigurationError {
                provider: SPOONACULAR_DISPLAY.to_owned(),
                details: "api_key is required".to_owned(),
            })
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn fetch_nutrition(&self, ingredient_text: &str) -> Result<NutritionSnapshot, ProviderError> {
        let response = shared_client()
            .post(self.endpoint("recipes/parseIngredients"))
            .query(&[("apiKey", self.config.api_key.as_str())])
            .form(&[
                ("ingredientList", ingredient_text),
                ("servings", "1"),
                ("includeNutrition", "true"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SPOONACULAR_DISPLAY, &e))?;
        let body = success_body(SPOONACULAR_DISPLAY, response).await?;
        parse_ingredient_nutrition(&body, ingredient_text)
    }

    async fn fetch_recipe(&self, recipe_id: &str) -> Result<Option<BaseRecipe>, ProviderError> {
        let response = shared_client()
            .get(self.endpoint(&format!("recipes/{recipe_id}/information")))
            .query(&[
                ("includeNutrition", "true"),
                ("apiKey", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SPOONACULAR_DISPLAY, &e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(recipe_id, "Spoonacular has no recipe with this id");
            return Ok(None);
        }
        let body = success_body(SPOONACULAR_DISPLAY, response).await?;
        parse_recipe_information(recipe_id, &body).map(Some)
    }
}

#[async_trait]
impl NutritionDataProvider for SpoonacularClient {
    fn name(&self) -> &'static str {
        SPOONACULAR
    }

    async fn ingredient_nutrition(
        &self,
        ingredient_text: &str,
    ) -> Result<NutritionSnapshot, ProviderError> {
        self.ensure_configured()?;
        self.breaker
            .guard(self.fetch_nutrition(ingredient_text))
            .await
    }
}

#[async_trait]
impl RecipeDataProvider for SpoonacularClient {
    fn source(&self) -> RecipeSource {
        RecipeSource::Spoonacular
    }

    async fn recipe(&self, recipe_id: &str) -> Result<Option<BaseRecipe>, ProviderError> {
        self.ensure_configured()?;
        self.breaker.guard(self.fetch_recipe(recipe_id)).await
    }
}

fn standardize(block: NutritionBlock) -> NutritionSnapshot {
    NutrientKeyStandardizer::standardize_snapshot(
        block
            .nutrients
            .into_iter()
            .map(|n| (n.name, NutrientValue::new(n.amount, n.unit))),
    )
}

/// Canonical snapshot for the first line of a `parseIngredients` body
fn parse_ingredient_nutrition(body: &str, query: &str) -> Result<NutritionSnapshot, ProviderError> {
    let parsed: Vec<ParsedIngredient> =
        serde_json::from_str(body).map_err(|source| ProviderError::ParseError {
            provider: SPOONACULAR_DISPLAY.to_owned(),
            field: "parseIngredients",
            source,
        })?;

    parsed
        .into_iter()
        .next()
        .and_then(|ingredient| ingredient.nutrition)
        .filter(|block| !block.nutrients.is_empty())
        .map(standardize)
        .ok_or_else(|| ProviderError::EmptyResult {
            provider: SPOONACULAR_DISPLAY.to_owned(),
            query: query.to_owned(),
        })
}

/// Base recipe from a `recipes/{id}/information` body; nutrition is already per serving
fn parse_recipe_information(recipe_id: &str, body: &str) -> Result<BaseRecipe, ProviderError> {
    let info: RecipeInformation =
        serde_json::from_str(body).map_err(|source| ProviderError::ParseError {
            provider: SPOONACULAR_DISPLAY.to_owned(),
            field: "recipe information",
            source,
        })?;

    let ingredients = info
        .extended_ingredients
        .into_iter()
        .map(|line| Ingredient {
            name: line.name,
            amount: line.amount.filter(|a| a.is_finite() && *a > 0.0),
            unit: line.unit.filter(|u| !u.trim().is_empty()),
            original: line.original,
        })
        .collect();

    Ok(BaseRecipe {
        recipe_id: recipe_id.to_owned(),
        source: RecipeSource::Spoonacular,
        ingredients,
        nutrition_per_serving: info.nutrition.map(standardize).unwrap_or_default(),
        servings: effective_servings(info.servings.unwrap_or(1.0)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mealplan_core::models::{CanonicalKey, MacroKey, MineralKey};

    use super::*;

    #[test]
    fn test_parses_first_ingredient_nutrition() {
        let body = r#"[{
            "name": "butter",
            "nutrition": {"nutrients": [
                {"name": "Calories", "amount": 717.0, "unit": "kcal"},
                {"name": "Fat", "amount": 81.1, "unit": "g"},
                {"name": "Calcium", "amount": 24.0, "unit": "mg"},
                {"name": "Alcohol", "amount": 0.0, "unit": "g"}
            ]}
        }]"#;
        let snapshot = parse_ingredient_nutrition(body, "100 g butter").unwrap();
        assert!((snapshot.calories.quantity - 717.0).abs() < f64::EPSILON);
        assert!((snapshot.quantity(CanonicalKey::Macro(MacroKey::Fat)) - 81.1).abs() < f64::EPSILON);
        assert!(
            (snapshot.quantity(CanonicalKey::Mineral(MineralKey::Calcium)) - 24.0).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_unrecognized_ingredient_is_empty_result() {
        let result = parse_ingredient_nutrition(r#"[{"name": "zzz"}]"#, "1 zzz");
        assert!(matches!(result, Err(ProviderError::EmptyResult { .. })));
        let result = parse_ingredient_nutrition("[]", "1 zzz");
        assert!(matches!(result, Err(ProviderError::EmptyResult { .. })));
    }

    #[test]
    fn test_recipe_information() {
        let body = r#"{
            "id": 716429,
            "servings": 2,
            "extendedIngredients": [
                {"name": "pasta", "amount": 200.0, "unit": "g", "original": "200 g pasta"},
                {"name": "salt", "amount": 0.0, "unit": "", "original": "salt"}
            ],
            "nutrition": {"nutrients": [
                {"name": "Calories", "amount": 540.0, "unit": "kcal"},
                {"name": "Protein", "amount": 18.0, "unit": "g"}
            ]}
        }"#;
        let recipe = parse_recipe_information("716429", body).unwrap();
        assert_eq!(recipe.source, RecipeSource::Spoonacular);
        assert!((recipe.servings - 2.0).abs() < f64::EPSILON);
        assert!((recipe.nutrition_per_serving.calories.quantity - 540.0).abs() < f64::EPSILON);
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[1].amount, None);
        assert_eq!(recipe.ingredients[1].unit, None);
    }
}
