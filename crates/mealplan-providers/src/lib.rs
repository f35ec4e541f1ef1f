// ABOUTME: Nutrition and recipe provider implementations for Edamam and Spoonacular
// ABOUTME: Circuit breaker, shared HTTP client, fallback ingredient lookup, and cached recipe resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! External data providers and the port adapters built on them.
//!
//! The engine only depends on the ports in `mealplan_core::ports`. This crate
//! supplies the production implementations: [`FallbackNutritionLookup`] prices
//! ingredient lines against Edamam then Spoonacular, and [`CachedRecipeResolver`]
//! fetches base recipes through an LRU cache.

/// Circuit breaker for provider resilience
pub mod circuit_breaker;
/// Edamam nutrition-data and recipe client
pub mod edamam;
/// Shared HTTP client for provider API calls
pub mod http_client;
/// Ordered multi-provider ingredient lookup
pub mod lookup;
/// Provider traits
pub mod provider;
/// LRU-cached base recipe resolver
pub mod recipe_cache;
/// Spoonacular ingredient parsing and recipe client
pub mod spoonacular;

pub use circuit_breaker::{BreakerSettings, BreakerState, ProviderBreaker};
pub use edamam::{EdamamClient, EdamamConfig};
pub use http_client::{initialize_shared_client, shared_client};
pub use lookup::FallbackNutritionLookup;
pub use provider::{NutritionDataProvider, RecipeDataProvider};
pub use recipe_cache::{CachedRecipeResolver, RecipeCacheSettings};
pub use spoonacular::{SpoonacularClient, SpoonacularConfig};
