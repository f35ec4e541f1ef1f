// ABOUTME: Wires configured providers, caches, and storage into a customization service
// ABOUTME: Builds the nutrition lookup chain in primary-then-fallback order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Duration;

use mealplan_core::errors::AppResult;
use mealplan_core::ports::CustomizationRepository;
use mealplan_providers::{
    initialize_shared_client, CachedRecipeResolver, EdamamClient, FallbackNutritionLookup,
    NutritionDataProvider, RecipeDataProvider, SpoonacularClient,
};
use tracing::info;

use crate::config::{EngineConfig, NutritionProviderKind};
use crate::services::CustomizationService;

/// Build a production service over `repository`
///
/// Providers without credentials are left out of both the lookup chain and the
/// recipe resolver.
///
/// # Errors
///
/// Returns `ConfigMissing` when no nutrition provider is configured.
pub fn build_service(
    config: &EngineConfig,
    repository: Arc<dyn CustomizationRepository>,
) -> AppResult<CustomizationService> {
    config.validate()?;
    initialize_shared_client(config.http.timeout_secs, config.http.connect_timeout_secs);

    let edamam = Arc::new(EdamamClient::new(config.providers.edamam.clone()));
    let spoonacular = Arc::new(SpoonacularClient::new(config.providers.spoonacular.clone()));

    let lookup_chain: Vec<Arc<dyn NutritionDataProvider>> = config
        .providers
        .lookup_order()
        .into_iter()
        .map(|kind| match kind {
            NutritionProviderKind::Edamam => Arc::clone(&edamam) as Arc<dyn NutritionDataProvider>,
            NutritionProviderKind::Spoonacular => {
                Arc::clone(&spoonacular) as Arc<dyn NutritionDataProvider>
            }
        })
        .collect();

    let mut recipe_providers: Vec<Arc<dyn RecipeDataProvider>> = Vec::new();
    if config.providers.edamam.is_configured() {
        recipe_providers.push(edamam);
    }
    if config.providers.spoonacular.is_configured() {
        recipe_providers.push(spoonacular);
    }

    info!(
        lookup_providers = lookup_chain.len(),
        recipe_providers = recipe_providers.len(),
        "Customization service wired"
    );

    let lookup = FallbackNutritionLookup::new(lookup_chain)
        .with_timeout(Duration::from_secs(config.providers.timeout_secs));
    let resolver = CachedRecipeResolver::new(recipe_providers, &config.recipe_cache.settings());

    Ok(CustomizationService::new(
        repository,
        Arc::new(resolver),
        Arc::new(lookup),
        &config.persistence,
    ))
}
