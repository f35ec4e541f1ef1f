// ABOUTME: Edamam client for ingredient nutrition analysis and recipe lookup
// ABOUTME: Parses nutrition-data and recipes/v2 payloads into canonical snapshots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Edamam Provider
//!
//! Two endpoints are used:
//!
//! - `nutrition-data` prices one free-text ingredient line. Nutrients arrive in
//!   `totalNutrients`; some accounts only fill `ingredients[0].parsed[0].nutrients`.
//! - `recipes/v2/{id}` returns a recipe whose `totalNutrients` cover the whole
//!   yield, so they are divided by `yield` before being stored as per-serving values.

use std::collections::HashMap;

use async_trait::async_trait;
use mealplan_core::constants::providers::{
    DEFAULT_EDAMAM_NUTRITION_BASE_URL, DEFAULT_EDAMAM_RECIPE_BASE_URL, EDAMAM, EDAMAM_DISPLAY,
};
use mealplan_core::errors::ProviderError;
use mealplan_core::models::{
    effective_servings, BaseRecipe, Ingredient, NutrientValue, NutritionSnapshot, RecipeSource,
};
use mealplan_intelligence::NutrientKeyStandardizer;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::circuit_breaker::ProviderBreaker;
use crate::http_client::{shared_client, success_body, transport_error};
use crate::provider::{NutritionDataProvider, RecipeDataProvider};

/// Header Edamam uses to attribute calls to an end user on multi-user plans
const ACCOUNT_USER_HEADER: &str = "Edamam-Account-User";

/// Prefix Edamam puts on recipe ids taken from a recipe URI
const RECIPE_ID_PREFIX: &str = "recipe_";

/// Placeholder Edamam sends for unitless quantities
const NO_MEASURE: &str = "<unit>";

/// Edamam credentials and endpoints
#[derive(Debug, Clone)]
pub struct EdamamConfig {
    /// Application id
    pub app_id: String,
    /// Application key
    pub app_key: String,
    /// Value for the `Edamam-Account-User` header, when the plan requires it
    pub account_user: Option<String>,
    /// Nutrition analysis endpoint
    pub nutrition_base_url: String,
    /// Recipe lookup endpoint
    pub recipe_base_url: String,
}

impl Default for EdamamConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_key: String::new(),
            account_user: None,
            nutrition_base_url: DEFAULT_EDAMAM_NUTRITION_BASE_URL.to_owned(),
            recipe_base_url: DEFAULT_EDAMAM_RECIPE_BASE_URL.to_owned(),
        }
    }
}

impl EdamamConfig {
    /// True when both credentials are present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.app_id.trim().is_empty() && !self.app_key.trim().is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct EdamamNutrient {
    #[serde(default)]
    quantity: f64,
    #[serde(default)]
    unit: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NutritionDataResponse {
    #[serde(default)]
    total_nutrients: HashMap<String, EdamamNutrient>,
    #[serde(default)]
    ingredients: Vec<AnalyzedIngredient>,
}

#[derive(Debug, Deserialize)]
struct AnalyzedIngredient {
    #[serde(default)]
    parsed: Vec<ParsedLine>,
}

#[derive(Debug, Deserialize)]
struct ParsedLine {
    #[serde(default)]
    nutrients: HashMap<String, EdamamNutrient>,
}

#[derive(Debug, Deserialize)]
struct RecipeEnvelope {
    recipe: RecipePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipePayload {
    #[serde(rename = "yield", default)]
    recipe_yield: f64,
    #[serde(default)]
    ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    total_nutrients: HashMap<String, EdamamNutrient>,
}

#[derive(Debug, Deserialize)]
struct RecipeIngredient {
    #[serde(default)]
    food: String,
    #[serde(default)]
    quantity: Option<f64>,
    #[serde(default)]
    measure: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Edamam nutrition and recipe client
pub struct EdamamClient {
    config: EdamamConfig,
    breaker: ProviderBreaker,
}

impl EdamamClient {
    /// Create a client using the shared HTTP connection pool
    #[must_use]
    pub fn new(config: EdamamConfig) -> Self {
        Self {
            config,
            breaker: ProviderBreaker::new(EDAMAM),
        }
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(ProviderError::ConfigurationError {
                provider: EDAMAM_DISPLAY.to_owned(),
                details: "app_id and app_key are required".to_owned(),
            })
        }
    }

    fn with_account_user(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.account_user.as_deref() {
            Some(user) if !user.trim().is_empty() => request.header(ACCOUNT_USER_HEADER, user),
            _ => request,
        }
    }

    async fn fetch_nutrition(&self, ingredient_text: &str) -> Result<NutritionSnapshot, ProviderError> {
        let request = shared_client().get(&self.config.nutrition_base_url).query(&[
            ("app_id", self.config.app_id.as_str()),
            ("app_key", self.config.app_key.as_str()),
            ("nutrition-type", "cooking"),
            ("ingr", ingredient_text),
        ]);
        let response = self
            .with_account_user(request)
            .send()
            .await
            .map_err(|e| transport_error(EDAMAM_DISPLAY, &e))?;
        let body = success_body(EDAMAM_DISPLAY, response).await?;
        parse_nutrition_data(&body, ingredient_text)
    }

    async fn fetch_recipe(&self, recipe_id: &str) -> Result<Option<BaseRecipe>, ProviderError> {
        let provider_id = recipe_id
            .strip_prefix(RECIPE_ID_PREFIX)
            .unwrap_or(recipe_id);
        let url = format!(
            "{}/{provider_id}",
            self.config.recipe_base_url.trim_end_matches('/')
        );
        let request = shared_client().get(&url).query(&[
            ("type", "public"),
            ("app_id", self.config.app_id.as_str()),
            ("app_key", self.config.app_key.as_str()),
        ]);
        let response = self
            .with_account_user(request)
            .send()
            .await
            .map_err(|e| transport_error(EDAMAM_DISPLAY, &e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(recipe_id, "Edamam has no recipe with this id");
            return Ok(None);
        }
        let body = success_body(EDAMAM_DISPLAY, response).await?;
        parse_recipe(recipe_id, &body).map(Some)
    }
}

#[async_trait]
impl NutritionDataProvider for EdamamClient {
    fn name(&self) -> &'static str {
        EDAMAM
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
impl RecipeDataProvider for EdamamClient {
    fn source(&self) -> RecipeSource {
        RecipeSource::Edamam
    }

    async fn recipe(&self, recipe_id: &str) -> Result<Option<BaseRecipe>, ProviderError> {
        self.ensure_configured()?;
        self.breaker.guard(self.fetch_recipe(recipe_id)).await
    }
}

fn to_raw(nutrients: HashMap<String, EdamamNutrient>) -> Vec<(String, NutrientValue)> {
    nutrients
        .into_iter()
        .map(|(code, n)| (code, NutrientValue::new(n.quantity, n.unit)))
        .collect()
}

/// Canonical snapshot from a `nutrition-data` body
fn parse_nutrition_data(body: &str, query: &str) -> Result<NutritionSnapshot, ProviderError> {
    let response: NutritionDataResponse =
        serde_json::from_str(body).map_err(|source| ProviderError::ParseError {
            provider: EDAMAM_DISPLAY.to_owned(),
            field: "nutrition-data",
            source,
        })?;

    let nutrients = if response.total_nutrients.is_empty() {
        response
            .ingredients
            .into_iter()
            .next()
            .and_then(|ingredient| ingredient.parsed.into_iter().next())
            .map(|line| line.nutrients)
            .unwrap_or_default()
    } else {
        response.total_nutrients
    };

    if nutrients.is_empty() {
        return Err(ProviderError::EmptyResult {
            provider: EDAMAM_DISPLAY.to_owned(),
            query: query.to_owned(),
        });
    }
    Ok(NutrientKeyStandardizer::standardize_snapshot(to_raw(nutrients)))
}

/// Base recipe from a `recipes/v2/{id}` body, nutrients divided by yield
fn parse_recipe(recipe_id: &str, body: &str) -> Result<BaseRecipe, ProviderError> {
    let envelope: RecipeEnvelope =
        serde_json::from_str(body).map_err(|source| ProviderError::ParseError {
            provider: EDAMAM_DISPLAY.to_owned(),
            field: "recipe",
            source,
        })?;
    let recipe = envelope.recipe;
    let servings = effective_servings(recipe.recipe_yield);

    let ingredients = recipe
        .ingredients
        .into_iter()
        .map(|line| Ingredient {
            name: line.food,
            amount: line.quantity.filter(|q| q.is_finite() && *q > 0.0),
            unit: line.measure.filter(|m| m != NO_MEASURE && !m.trim().is_empty()),
            original: line.text,
        })
        .collect();

    let whole_recipe = NutrientKeyStandardizer::standardize_snapshot(to_raw(recipe.total_nutrients));

    Ok(BaseRecipe {
        recipe_id: recipe_id.to_owned(),
        source: RecipeSource::Edamam,
        ingredients,
        nutrition_per_serving: whole_recipe.map_quantities(|q| q / servings).rounded(),
        servings,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mealplan_core::models::{CanonicalKey, MacroKey, VitaminKey};

    use super::*;

    #[test]
    fn test_parses_total_nutrients() {
        let body = r#"{
            "calories": 102,
            "totalNutrients": {
                "ENERC_KCAL": {"label": "Energy", "quantity": 102.0, "unit": "kcal"},
                "FAT": {"label": "Fat", "quantity": 11.5, "unit": "g"},
                "FOLDFE": {"label": "Folate", "quantity": 2.0, "unit": "µg"},
                "FOLAC": {"label": "Folic acid", "quantity": 1.0, "unit": "µg"},
                "WATER": {"label": "Water", "quantity": 2.2, "unit": "g"}
            }
        }"#;
        let snapshot = parse_nutrition_data(body, "1 tbsp butter").unwrap();
        assert!((snapshot.calories.quantity - 102.0).abs() < f64::EPSILON);
        assert!((snapshot.quantity(CanonicalKey::Macro(MacroKey::Fat)) - 11.5).abs() < f64::EPSILON);
        assert!(
            (snapshot.quantity(CanonicalKey::Vitamin(VitaminKey::Folate)) - 3.0).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_falls_back_to_parsed_nutrients() {
        let body = r#"{
            "totalNutrients": {},
            "ingredients": [{"parsed": [{"nutrients": {
                "ENERC_KCAL": {"quantity": 52.0, "unit": "kcal"},
                "PROCNT": {"quantity": 0.3, "unit": "g"}
            }}]}]
        }"#;
        let snapshot = parse_nutrition_data(body, "1 apple").unwrap();
        assert!((snapshot.calories.quantity - 52.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_payload_is_empty_result() {
        let result = parse_nutrition_data(r#"{"totalNutrients": {}}"#, "1 unobtainium");
        assert!(matches!(result, Err(ProviderError::EmptyResult { .. })));
    }

    #[test]
    fn test_recipe_nutrients_divided_by_yield() {
        let body = r#"{"recipe": {
            "yield": 4.0,
            "ingredients": [
                {"food": "butter", "quantity": 100.0, "measure": "gram", "text": "100 g butter"},
                {"food": "salt", "quantity": 0.0, "measure": "<unit>", "text": "salt to taste"}
            ],
            "totalNutrients": {
                "ENERC_KCAL": {"quantity": 2000.0, "unit": "kcal"},
                "PROCNT": {"quantity": 40.0, "unit": "g"}
            }
        }}"#;
        let recipe = parse_recipe("recipe_abc", body).unwrap();
        assert!((recipe.servings - 4.0).abs() < f64::EPSILON);
        assert!((recipe.nutrition_per_serving.calories.quantity - 500.0).abs() < f64::EPSILON);
        assert_eq!(recipe.ingredients[0].unit.as_deref(), Some("gram"));
        assert_eq!(recipe.ingredients[1].amount, None);
        assert_eq!(recipe.ingredients[1].unit, None);
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let result = parse_recipe("abc", "{not json");
        assert!(matches!(result, Err(ProviderError::ParseError { .. })));
    }
}
