// ABOUTME: Provider configuration for Edamam and Spoonacular nutrition and recipe APIs
// ABOUTME: Loads credentials and endpoints from the environment and derives the lookup order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;

use mealplan_core::constants::providers::{
    DEFAULT_EDAMAM_NUTRITION_BASE_URL, DEFAULT_EDAMAM_RECIPE_BASE_URL,
    DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_SPOONACULAR_BASE_URL, EDAMAM, SPOONACULAR,
};
use mealplan_core::errors::{AppError, AppResult};
use mealplan_providers::{EdamamConfig, SpoonacularConfig};

use super::{env_parse_or, env_var_opt, env_var_or};

/// Nutrition provider identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NutritionProviderKind {
    /// Edamam nutrition-data
    #[default]
    Edamam,
    /// Spoonacular parseIngredients
    Spoonacular,
}

impl NutritionProviderKind {
    /// The other provider
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Edamam => Self::Spoonacular,
            Self::Spoonacular => Self::Edamam,
        }
    }
}

impl fmt::Display for NutritionProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edamam => f.write_str(EDAMAM),
            Self::Spoonacular => f.write_str(SPOONACULAR),
        }
    }
}

impl FromStr for NutritionProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            EDAMAM => Ok(Self::Edamam),
            SPOONACULAR => Ok(Self::Spoonacular),
            other => Err(AppError::config(format!(
                "Unknown nutrition provider '{other}', expected 'edamam' or 'spoonacular'"
            ))),
        }
    }
}

/// External provider settings
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Edamam credentials and endpoints
    pub edamam: EdamamConfig,
    /// Spoonacular credentials and endpoint
    pub spoonacular: SpoonacularConfig,
    /// Provider tried first for ingredient nutrition
    pub primary: NutritionProviderKind,
    /// Deadline for one provider answering one ingredient
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            edamam: EdamamConfig::default(),
            spoonacular: SpoonacularConfig::default(),
            primary: NutritionProviderKind::default(),
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    /// Load provider configuration from environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `NUTRITION_PRIMARY_PROVIDER` names an unknown provider.
    pub fn from_env() -> AppResult<Self> {
        let primary = match env_var_opt("NUTRITION_PRIMARY_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => NutritionProviderKind::default(),
        };

        Ok(Self {
            edamam: EdamamConfig {
                app_id: env_var_or("EDAMAM_APP_ID", ""),
                app_key: env_var_or("EDAMAM_APP_KEY", ""),
                account_user: env_var_opt("EDAMAM_ACCOUNT_USER"),
                nutrition_base_url: env_var_or(
                    "EDAMAM_NUTRITION_BASE_URL",
                    DEFAULT_EDAMAM_NUTRITION_BASE_URL,
                ),
                recipe_base_url: env_var_or(
                    "EDAMAM_RECIPE_BASE_URL",
                    DEFAULT_EDAMAM_RECIPE_BASE_URL,
                ),
            },
            spoonacular: SpoonacularConfig {
                api_key: env_var_or("SPOONACULAR_API_KEY", ""),
                base_url: env_var_or("SPOONACULAR_BASE_URL", DEFAULT_SPOONACULAR_BASE_URL),
            },
            primary,
            timeout_secs: env_parse_or("PROVIDER_TIMEOUT_SECS", DEFAULT_PROVIDER_TIMEOUT_SECS)
                .max(1),
        })
    }

    /// Whether the given provider has credentials
    #[must_use]
    pub fn is_configured(&self, kind: NutritionProviderKind) -> bool {
        match kind {
            NutritionProviderKind::Edamam => self.edamam.is_configured(),
            NutritionProviderKind::Spoonacular => self.spoonacular.is_configured(),
        }
    }

    /// Configured providers, primary first
    #[must_use]
    pub fn lookup_order(&self) -> Vec<NutritionProviderKind> {
        [self.primary, self.primary.other()]
            .into_iter()
            .filter(|kind| self.is_configured(*kind))
            .collect()
    }
}
