// ABOUTME: Environment-driven configuration for the customization engine
// ABOUTME: Aggregates provider credentials, HTTP timeouts, recipe cache sizing, and save retry limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration is read from environment variables only.
//!
//! - **Providers**: Edamam and Spoonacular credentials, endpoints, lookup order
//! - **HTTP**: shared client timeouts
//! - **Cache**: base recipe cache TTL and capacity
//! - **Persistence**: bounded optimistic-concurrency retries

use std::env;
use std::str::FromStr;

use mealplan_core::errors::{AppError, AppResult, ErrorCode};
use tracing::{info, warn};

/// HTTP, cache, and persistence limits
pub mod limits;
/// Nutrition and recipe provider settings
pub mod providers;

pub use limits::{HttpClientConfig, PersistenceConfig, RecipeCacheConfig};
pub use providers::{NutritionProviderKind, ProviderConfig};

/// Complete engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Provider credentials and lookup order
    pub providers: ProviderConfig,
    /// Shared HTTP client timeouts
    pub http: HttpClientConfig,
    /// Base recipe cache sizing
    pub recipe_cache: RecipeCacheConfig,
    /// Save retry policy
    pub persistence: PersistenceConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable holds a value that cannot be used,
    /// such as an unknown `NUTRITION_PRIMARY_PROVIDER`.
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            providers: ProviderConfig::from_env()?,
            http: HttpClientConfig::from_env(),
            recipe_cache: RecipeCacheConfig::from_env(),
            persistence: PersistenceConfig::from_env(),
        };

        info!(
            edamam = config.providers.edamam.is_configured(),
            spoonacular = config.providers.spoonacular.is_configured(),
            primary = %config.providers.primary,
            max_save_attempts = config.persistence.max_save_attempts,
            "Engine configuration loaded"
        );
        Ok(config)
    }

    /// Check that the configuration can actually price ingredients
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when no nutrition provider has credentials.
    pub fn validate(&self) -> AppResult<()> {
        if self.providers.lookup_order().is_empty() {
            return Err(AppError::new(
                ErrorCode::ConfigMissing,
                "No nutrition provider configured: set EDAMAM_APP_ID/EDAMAM_APP_KEY or SPOONACULAR_API_KEY",
            ));
        }
        Ok(())
    }
}

/// Get environment variable or default value
pub(crate) fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Non-empty environment variable, trimmed
pub(crate) fn env_var_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parse an environment variable, warning and falling back when it is malformed
pub(crate) fn env_parse_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring malformed environment value");
            default
        }),
        Err(_) => default,
    }
}
