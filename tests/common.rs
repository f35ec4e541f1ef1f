// ABOUTME: Shared fixtures for customization engine integration tests
// ABOUTME: Fake nutrition lookup, fake recipe resolver, conflict-injecting repository, and builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `mealplan_engine`

use std::collections::HashMap;
use std::env;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use mealplan_engine::config::PersistenceConfig;
use mealplan_engine::errors::AppResult;
use mealplan_engine::models::{
    BaseRecipe, CanonicalKey, DraftVersion, EmbeddedRecipe, Ingredient, LoadedSlot, MacroKey,
    MealSlotKey, NutrientValue, NutritionSnapshot, RecipeCustomization, RecipeSource,
};
use mealplan_engine::persistence::InMemoryDraftStore;
use mealplan_engine::ports::{BaseRecipeResolver, CustomizationRepository, IngredientNutritionLookup};
use mealplan_engine::services::CustomizationService;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Snapshot with calories, protein, and fat set
pub fn snapshot(calories: f64, protein: f64, fat: f64) -> NutritionSnapshot {
    let mut snapshot = NutritionSnapshot::empty();
    snapshot.calories.quantity = calories;
    snapshot.set(
        CanonicalKey::Macro(MacroKey::Protein),
        NutrientValue::new(protein, "g"),
    );
    snapshot.set(
        CanonicalKey::Macro(MacroKey::Fat),
        NutrientValue::new(fat, "g"),
    );
    snapshot
}

/// Nutrition lookup answering from a fixed table of ingredient lines
#[derive(Default)]
pub struct FakeNutritionLookup {
    answers: HashMap<String, NutritionSnapshot>,
    queries: Mutex<Vec<String>>,
}

impl FakeNutritionLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `nutrition`; any other query is a lookup failure
    pub fn with(mut self, query: &str, nutrition: NutritionSnapshot) -> Self {
        self.answers.insert(query.to_owned(), nutrition);
        self
    }

    /// Every query received, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl IngredientNutritionLookup for FakeNutritionLookup {
    async fn lookup(&self, ingredient_text: &str) -> Option<NutritionSnapshot> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(ingredient_text.to_owned());
        }
        self.answers.get(ingredient_text).cloned()
    }
}

/// Base recipe resolver backed by a map, counting calls
#[derive(Default)]
pub struct FakeRecipeResolver {
    recipes: HashMap<(RecipeSource, String), BaseRecipe>,
    calls: AtomicUsize,
}

impl FakeRecipeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, recipe: BaseRecipe) -> Self {
        self.recipes
            .insert((recipe.source, recipe.recipe_id.clone()), recipe);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseRecipeResolver for FakeRecipeResolver {
    async fn base_recipe(&self, recipe_id: &str, source: RecipeSource) -> Option<BaseRecipe> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.recipes.get(&(source, recipe_id.to_owned())).cloned()
    }
}

/// Repository that bumps the draft version before the first `conflicts` writes
///
/// Models another request editing the same draft between our read and our write.
pub struct ConflictingRepository {
    store: InMemoryDraftStore,
    remaining_conflicts: AtomicU32,
    saves: AtomicU32,
}

impl ConflictingRepository {
    pub fn new(store: InMemoryDraftStore, conflicts: u32) -> Self {
        Self {
            store,
            remaining_conflicts: AtomicU32::new(conflicts),
            saves: AtomicU32::new(0),
        }
    }

    /// Write attempts seen, including rejected ones
    pub fn saves(&self) -> u32 {
        self.saves.load(Ordering::SeqCst)
    }

    fn interfere(&self, slot: &MealSlotKey) -> AppResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let should_conflict = self
            .remaining_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_conflict {
            self.store.touch(&slot.draft_id)?;
        }
        Ok(())
    }
}

#[async_trait]
impl CustomizationRepository for ConflictingRepository {
    async fn load_customization(&self, slot: &MealSlotKey) -> AppResult<LoadedSlot> {
        self.store.load_customization(slot).await
    }

    async fn save_customization(
        &self,
        slot: &MealSlotKey,
        customization: RecipeCustomization,
        expected_version: DraftVersion,
    ) -> AppResult<DraftVersion> {
        self.interfere(slot)?;
        self.store
            .save_customization(slot, customization, expected_version)
            .await
    }

    async fn delete_customization(
        &self,
        slot: &MealSlotKey,
        expected_version: DraftVersion,
    ) -> AppResult<DraftVersion> {
        self.interfere(slot)?;
        self.store.delete_customization(slot, expected_version).await
    }
}

/// Slot for recipe `recipe_id` in a fixed draft
pub fn slot(recipe_id: &str) -> MealSlotKey {
    MealSlotKey::new("draft-1", "2025-03-03", "dinner", recipe_id)
}

/// Brownies: 4 servings, 200 kcal and 10 g protein per serving
pub fn brownie_recipe(source: RecipeSource) -> BaseRecipe {
    BaseRecipe {
        recipe_id: "brownies".to_owned(),
        source,
        ingredients: vec![
            Ingredient::new("butter", 100.0, "g"),
            Ingredient::new("sugar", 50.0, "g"),
            Ingredient::new("flour", 120.0, "g"),
        ],
        nutrition_per_serving: snapshot(200.0, 10.0, 12.0),
        servings: 4.0,
    }
}

/// Copy of a base recipe as a draft would embed it
pub fn embedded(base: &BaseRecipe, name: &str) -> EmbeddedRecipe {
    EmbeddedRecipe {
        recipe_id: base.recipe_id.clone(),
        source: base.source,
        name: name.to_owned(),
        servings: Some(base.servings),
        ingredients: base.ingredients.clone(),
        nutrition: Some(base.nutrition_per_serving.clone()),
        flat_nutrition: None,
    }
}

/// Service over the given collaborators with the default retry policy
pub fn service(
    repository: Arc<dyn CustomizationRepository>,
    resolver: Arc<dyn BaseRecipeResolver>,
    lookup: Arc<dyn IngredientNutritionLookup>,
) -> CustomizationService {
    CustomizationService::new(repository, resolver, lookup, &PersistenceConfig::default())
}
