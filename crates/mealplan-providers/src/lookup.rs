// ABOUTME: Ingredient nutrition lookup that tries each configured provider in order
// ABOUTME: Absorbs provider errors and timeouts so the calculator only sees Some or None
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mealplan_core::constants::providers::DEFAULT_PROVIDER_TIMEOUT_SECS;
use mealplan_core::models::NutritionSnapshot;
use mealplan_core::ports::IngredientNutritionLookup;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::provider::NutritionDataProvider;

/// Primary-then-fallback nutrition lookup
///
/// A provider's answer is used when it arrives in time and carries calories,
/// protein, or fat. An all-zero payload is how providers say they did not
/// recognize the ingredient, so it moves on to the next provider.
pub struct FallbackNutritionLookup {
    providers: Vec<Arc<dyn NutritionDataProvider>>,
    per_provider_timeout: Duration,
}

impl FallbackNutritionLookup {
    /// Lookup over `providers`, tried in the given order
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn NutritionDataProvider>>) -> Self {
        Self {
            providers,
            per_provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }

    /// Override the per-provider deadline
    #[must_use]
    pub const fn with_timeout(mut self, per_provider_timeout: Duration) -> Self {
        self.per_provider_timeout = per_provider_timeout;
        self
    }

    /// Number of providers consulted
    #[must_use]
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}

#[async_trait]
impl IngredientNutritionLookup for FallbackNutritionLookup {
    async fn lookup(&self, ingredient_text: &str) -> Option<NutritionSnapshot> {
        if ingredient_text.trim().is_empty() {
            return None;
        }

        for provider in &self.providers {
            let name = provider.name();
            match timeout(
                self.per_provider_timeout,
                provider.ingredient_nutrition(ingredient_text),
            )
            .await
            {
                Ok(Ok(snapshot)) if !snapshot.is_effectively_empty() => {
                    debug!(
                        provider = name,
                        ingredient = ingredient_text,
                        calories = snapshot.calories.quantity,
                        "Priced ingredient"
                    );
                    return Some(snapshot);
                }
                Ok(Ok(_)) => {
                    debug!(
                        provider = name,
                        ingredient = ingredient_text,
                        "Provider returned empty nutrition, trying next"
                    );
                }
                Ok(Err(error)) => {
                    warn!(
                        provider = name,
                        ingredient = ingredient_text,
                        error = %error,
                        "Nutrition provider failed, trying next"
                    );
                }
                Err(_) => {
                    warn!(
                        provider = name,
                        ingredient = ingredient_text,
                        timeout_ms = u64::try_from(self.per_provider_timeout.as_millis())
                            .unwrap_or(u64::MAX),
                        "Nutrition provider timed out, trying next"
                    );
                }
            }
        }
        None
    }
}
