// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for the customization engine (limits, providers, rounding)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large list.

/// Cache-related constants (TTL, sizes)
pub mod cache;

/// External provider identifiers and endpoints
pub mod providers {
    /// Edamam provider name used in logs and errors
    pub const EDAMAM: &str = "edamam";
    /// Spoonacular provider name used in logs and errors
    pub const SPOONACULAR: &str = "spoonacular";
    /// Display name for Edamam errors
    pub const EDAMAM_DISPLAY: &str = "Edamam API";
    /// Display name for Spoonacular errors
    pub const SPOONACULAR_DISPLAY: &str = "Spoonacular API";

    /// Default Edamam nutrition-data base URL
    pub const DEFAULT_EDAMAM_NUTRITION_BASE_URL: &str = "https://api.edamam.com/api/nutrition-data";
    /// Default Edamam recipe search base URL
    pub const DEFAULT_EDAMAM_RECIPE_BASE_URL: &str = "https://api.edamam.com/api/recipes/v2";
    /// Default Spoonacular API base URL
    pub const DEFAULT_SPOONACULAR_BASE_URL: &str = "https://api.spoonacular.com";

    /// Default per-request timeout for provider lookups
    pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;
}

/// HTTP client defaults
pub mod http {
    /// Overall request timeout for the shared client
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
    /// Connect timeout for the shared client
    pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Persistence and retry limits
pub mod persistence {
    /// Attempts for the read-merge-recompute-write cycle before giving up
    pub const DEFAULT_MAX_SAVE_ATTEMPTS: u32 = 3;
    /// Hard ceiling for the configurable attempt count
    pub const MAX_SAVE_ATTEMPTS_CEILING: u32 = 10;
}

/// Numeric behavior of nutrition arithmetic
pub mod nutrition {
    /// Decimal places kept on every nutrient quantity
    pub const ROUNDING_DECIMALS: i32 = 2;
    /// Tolerance used when comparing modification amounts
    pub const AMOUNT_EPSILON: f64 = 1e-9;
    /// Portion multiplier applied when none was requested
    pub const DEFAULT_NUTRITION_SERVINGS: f64 = 1.0;
    /// Amount assumed for an omitted ingredient that cannot be found in the base list
    pub const DEFAULT_OMIT_AMOUNT: f64 = 1.0;
    /// Calorie unit label
    pub const CALORIES_UNIT: &str = "kcal";
    /// Gram unit label
    pub const GRAMS_UNIT: &str = "g";
    /// Milligram unit label
    pub const MILLIGRAMS_UNIT: &str = "mg";
    /// Microgram unit label
    pub const MICROGRAMS_UNIT: &str = "µg";
}
