// ABOUTME: Base recipe resolver backed by an LRU cache with TTL in front of recipe providers
// ABOUTME: Routes each recipe id to the provider owning its source and remembers the answer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use mealplan_core::constants::cache::{DEFAULT_RECIPE_CACHE_MAX_ENTRIES, DEFAULT_RECIPE_CACHE_TTL_SECS};
use mealplan_core::models::{BaseRecipe, RecipeSource};
use mealplan_core::ports::BaseRecipeResolver;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::provider::RecipeDataProvider;

type RecipeKey = (RecipeSource, String);

#[derive(Debug, Clone)]
struct CacheEntry {
    recipe: BaseRecipe,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(recipe: BaseRecipe, ttl: Duration) -> Self {
        Self {
            recipe,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Cache sizing for [`CachedRecipeResolver`]
#[derive(Debug, Clone)]
pub struct RecipeCacheSettings {
    /// Entries kept before least-recently-used eviction
    pub max_entries: usize,
    /// Lifetime of a cached recipe
    pub ttl: Duration,
}

impl Default for RecipeCacheSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_RECIPE_CACHE_MAX_ENTRIES,
            ttl: Duration::from_secs(DEFAULT_RECIPE_CACHE_TTL_SECS),
        }
    }
}

/// Cache-then-provider base recipe resolution
#[derive(Clone)]
pub struct CachedRecipeResolver {
    providers: Vec<Arc<dyn RecipeDataProvider>>,
    store: Arc<RwLock<LruCache<RecipeKey, CacheEntry>>>,
    ttl: Duration,
}

impl CachedRecipeResolver {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_RECIPE_CACHE_MAX_ENTRIES) {
        Some(n) => n,
        None => NonZeroUsize::MIN,
    };

    /// Resolver over `providers`; the first provider matching a source wins
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn RecipeDataProvider>>, settings: &RecipeCacheSettings) -> Self {
        let capacity = NonZeroUsize::new(settings.max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            providers,
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl: settings.ttl,
        }
    }

    /// Insert a recipe obtained elsewhere
    pub async fn prime(&self, recipe: BaseRecipe) {
        let key = (recipe.source, recipe.recipe_id.clone());
        self.store
            .write()
            .await
            .put(key, CacheEntry::new(recipe, self.ttl));
    }

    /// Drop every cached recipe
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Number of cached recipes, expired ones included until they are touched
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// True when nothing is cached
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    async fn cached(&self, key: &RecipeKey) -> Option<BaseRecipe> {
        let mut store = self.store.write().await;
        match store.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.recipe.clone()),
            Some(_) => {
                store.pop(key);
                None
            }
            None => None,
        }
    }

    fn provider_for(&self, source: RecipeSource) -> Option<&Arc<dyn RecipeDataProvider>> {
        self.providers.iter().find(|p| p.source() == source)
    }
}

#[async_trait]
impl BaseRecipeResolver for CachedRecipeResolver {
    async fn base_recipe(&self, recipe_id: &str, source: RecipeSource) -> Option<BaseRecipe> {
        let key = (source, recipe_id.to_owned());
        if let Some(recipe) = self.cached(&key).await {
            debug!(recipe_id, %source, "Base recipe cache hit");
            return Some(recipe);
        }

        let provider = self.provider_for(source)?;
        match provider.recipe(recipe_id).await {
            Ok(Some(recipe)) => {
                self.store
                    .write()
                    .await
                    .put(key, CacheEntry::new(recipe.clone(), self.ttl));
                Some(recipe)
            }
            Ok(None) => {
                debug!(recipe_id, %source, "Provider does not know this recipe");
                None
            }
            Err(error) => {
                warn!(recipe_id, %source, error = %error, "Base recipe fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mealplan_core::errors::ProviderError;
    use mealplan_core::models::{Ingredient, NutritionSnapshot};

    use super::*;

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecipeDataProvider for CountingProvider {
        fn source(&self) -> RecipeSource {
            RecipeSource::Spoonacular
        }

        async fn recipe(&self, recipe_id: &str) -> Result<Option<BaseRecipe>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if recipe_id == "missing" {
                return Ok(None);
            }
            Ok(Some(BaseRecipe {
                recipe_id: recipe_id.to_owned(),
                source: RecipeSource::Spoonacular,
                ingredients: vec![Ingredient::new("pasta", 200.0, "g")],
                nutrition_per_serving: NutritionSnapshot::empty(),
                servings: 2.0,
            }))
        }
    }

    fn resolver(ttl: Duration) -> (CachedRecipeResolver, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let resolver = CachedRecipeResolver::new(
            vec![Arc::clone(&provider) as Arc<dyn RecipeDataProvider>],
            &RecipeCacheSettings {
                max_entries: 8,
                ttl,
            },
        );
        (resolver, provider)
    }

    #[tokio::test]
    async fn test_second_lookup_served_from_cache() {
        let (resolver, provider) = resolver(Duration::from_secs(60));
        assert!(resolver.base_recipe("42", RecipeSource::Spoonacular).await.is_some());
        assert!(resolver.base_recipe("42", RecipeSource::Spoonacular).await.is_some());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetched() {
        let (resolver, provider) = resolver(Duration::ZERO);
        resolver.base_recipe("42", RecipeSource::Spoonacular).await;
        resolver.base_recipe("42", RecipeSource::Spoonacular).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_source_and_missing_recipe() {
        let (resolver, _) = resolver(Duration::from_secs(60));
        assert!(resolver.base_recipe("42", RecipeSource::Edamam).await.is_none());
        assert!(resolver.base_recipe("x", RecipeSource::Generated).await.is_none());
        assert!(resolver
            .base_recipe("missing", RecipeSource::Spoonacular)
            .await
            .is_none());
        assert!(resolver.is_empty().await);
    }
}
