// ABOUTME: End-to-end tests for the customization service over in-memory collaborators
// ABOUTME: Apply, optimistic retries, retry exhaustion, scaled views, clearing, and draft fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{
    brownie_recipe, embedded, service, slot, snapshot, ConflictingRepository,
    FakeNutritionLookup, FakeRecipeResolver,
};
use mealplan_engine::config::PersistenceConfig;
use mealplan_engine::errors::ErrorCode;
use mealplan_engine::models::{
    Accuracy, CalculationMethod, CanonicalKey, MacroKey, MealSlotKey, Modification, RecipeSource,
    VitaminKey,
};
use mealplan_engine::persistence::InMemoryDraftStore;
use mealplan_engine::services::{BaseRecipeOrigin, CustomizationRequest, CustomizationService};

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

fn egg_lookup() -> Arc<FakeNutritionLookup> {
    Arc::new(
        FakeNutritionLookup::new()
            .with("1 whole egg", snapshot(72.0, 6.0, 5.0))
            .with("30 g walnuts", snapshot(196.0, 4.6, 19.6)),
    )
}

fn request(slot: &MealSlotKey, modifications: Vec<Modification>) -> CustomizationRequest {
    CustomizationRequest {
        slot: slot.clone(),
        modifications,
        nutrition_servings: None,
    }
}

/// Store with the brownie recipe selected, plus a service resolving it from the provider
fn provider_backed() -> (InMemoryDraftStore, Arc<FakeRecipeResolver>, CustomizationService) {
    common::init_test_logging();
    let base = brownie_recipe(RecipeSource::Edamam);
    let store = InMemoryDraftStore::new();
    store.seed_slot(&slot("brownies"), embedded(&base, "Fudgy Brownies"));
    let resolver = Arc::new(FakeRecipeResolver::new().with(base));
    let service = service(Arc::new(store.clone()), resolver.clone(), egg_lookup());
    (store, resolver, service)
}

#[tokio::test]
async fn test_apply_stores_per_serving_and_returns_scaled_nutrition() {
    let (store, _, service) = provider_backed();
    let slot = slot("brownies");

    let outcome = service
        .apply_customization(CustomizationRequest {
            nutrition_servings: Some(2.0),
            ..request(&slot, vec![Modification::add("egg", 1.0, "whole")])
        })
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.base_origin, BaseRecipeOrigin::Provider);
    let stored_nutrition = outcome.customization.custom_nutrition.as_ref().unwrap();
    assert!(close(stored_nutrition.calories.quantity, 218.0));
    assert!(close(outcome.nutrition.calories.quantity, 436.0));
    assert!(close(
        outcome
            .nutrition
            .quantity(CanonicalKey::Macro(MacroKey::Protein)),
        23.0
    ));
    assert!(outcome
        .nutrition
        .get(CanonicalKey::Vitamin(VitaminKey::Biotin))
        .is_some());
    assert!(outcome.ingredients.iter().any(|i| i.name == "egg"));

    let persisted = store.slot(&slot).unwrap().customization.unwrap();
    assert_eq!(persisted, outcome.customization);
    assert!(persisted.customizations_applied);
    assert!(close(persisted.nutrition_servings, 2.0));
    assert_eq!(persisted.calculation_method, CalculationMethod::ProviderDelta);
    assert_eq!(persisted.accuracy, Accuracy::Precise);
}

#[tokio::test]
async fn test_later_requests_merge_into_stored_history() {
    let (store, _, service) = provider_backed();
    let slot = slot("brownies");

    service
        .apply_customization(request(&slot, vec![Modification::add("walnuts", 30.0, "g")]))
        .await
        .unwrap();
    let outcome = service
        .apply_customization(request(&slot, vec![Modification::add("egg", 1.0, "whole")]))
        .await
        .unwrap();

    assert_eq!(outcome.customization.modifications.len(), 2);
    let per_serving = outcome.customization.custom_nutrition.unwrap();
    assert!(close(per_serving.calories.quantity, 200.0 + 196.0 / 4.0 + 72.0 / 4.0));
    assert_eq!(
        store.slot(&slot).unwrap().customization.unwrap().modifications.len(),
        2
    );
}

#[tokio::test]
async fn test_edits_that_cancel_leave_an_unapplied_customization() {
    let (store, _, service) = provider_backed();
    let slot = slot("brownies");

    service
        .apply_customization(request(&slot, vec![Modification::add("walnuts", 30.0, "g")]))
        .await
        .unwrap();
    let outcome = service
        .apply_customization(request(&slot, vec![Modification::omit("walnuts")]))
        .await
        .unwrap();

    let persisted = store.slot(&slot).unwrap().customization.unwrap();
    assert!(persisted.modifications.is_empty());
    assert!(persisted.custom_nutrition.is_none());
    assert!(!persisted.customizations_applied);
    assert_eq!(persisted.calculation_method, CalculationMethod::Unmodified);
    assert!(close(outcome.nutrition.calories.quantity, 200.0));
}

#[tokio::test]
async fn test_version_conflicts_are_retried_from_a_fresh_read() {
    common::init_test_logging();
    let base = brownie_recipe(RecipeSource::Edamam);
    let store = InMemoryDraftStore::new();
    let slot = slot("brownies");
    store.seed_slot(&slot, embedded(&base, "Fudgy Brownies"));
    let repository = Arc::new(ConflictingRepository::new(store.clone(), 2));
    let service = service(
        repository.clone(),
        Arc::new(FakeRecipeResolver::new().with(base)),
        egg_lookup(),
    );

    let outcome = service
        .apply_customization(request(&slot, vec![Modification::add("egg", 1.0, "whole")]))
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 3);
    assert_eq!(repository.saves(), 3);
    assert_eq!(
        store.slot(&slot).unwrap().customization.unwrap().modifications,
        vec![Modification::add("egg", 1.0, "whole")]
    );
}

#[tokio::test]
async fn test_persistent_conflicts_exhaust_retries() {
    common::init_test_logging();
    let base = brownie_recipe(RecipeSource::Edamam);
    let store = InMemoryDraftStore::new();
    let slot = slot("brownies");
    store.seed_slot(&slot, embedded(&base, "Fudgy Brownies"));
    let repository = Arc::new(ConflictingRepository::new(store.clone(), u32::MAX));
    let service = CustomizationService::new(
        repository.clone(),
        Arc::new(FakeRecipeResolver::new().with(base)),
        egg_lookup(),
        &PersistenceConfig::with_max_save_attempts(4),
    );

    let err = service
        .apply_customization(request(&slot, vec![Modification::add("egg", 1.0, "whole")]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::RetriesExhausted);
    assert!(err.is_retryable());
    assert_eq!(repository.saves(), 4);
    assert!(store.slot(&slot).unwrap().customization.is_none());
}

#[tokio::test]
async fn test_invalid_portion_multiplier_is_rejected() {
    let (store, _, service) = provider_backed();
    let slot = slot("brownies");

    for bad in [0.0, -2.0, f64::NAN, f64::INFINITY] {
        let err = service
            .apply_customization(CustomizationRequest {
                nutrition_servings: Some(bad),
                ..request(&slot, vec![Modification::add("egg", 1.0, "whole")])
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }
    assert!(store.slot(&slot).unwrap().customization.is_none());
}

#[tokio::test]
async fn test_unknown_slot_is_not_found() {
    let (_, _, service) = provider_backed();
    let err = service
        .apply_customization(request(
            &slot("lasagna"),
            vec![Modification::add("egg", 1.0, "whole")],
        ))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_view_scales_stored_nutrition_once() {
    let (_, _, service) = provider_backed();
    let slot = slot("brownies");

    service
        .apply_customization(CustomizationRequest {
            nutrition_servings: Some(2.0),
            ..request(&slot, vec![Modification::add("egg", 1.0, "whole")])
        })
        .await
        .unwrap();
    let outcome = service
        .apply_customization(request(&slot, vec![Modification::add("walnuts", 30.0, "g")]))
        .await
        .unwrap();
    assert!(close(outcome.customization.nutrition_servings, 2.0));

    let first = service.customized_recipe(&slot).await.unwrap();
    let second = service.customized_recipe(&slot).await.unwrap();

    let per_serving = 200.0 + 72.0 / 4.0 + 196.0 / 4.0;
    assert!(close(first.nutrition_per_serving.calories.quantity, per_serving));
    assert!(close(first.nutrition.calories.quantity, per_serving * 2.0));
    assert!(close(
        second.nutrition.calories.quantity,
        first.nutrition.calories.quantity
    ));
    assert_eq!(first.name, "Fudgy Brownies");
    assert!(first.customizations_applied);
    assert_eq!(first.summary.len(), 2);
}

#[tokio::test]
async fn test_clear_returns_recipe_to_base() {
    let (store, _, service) = provider_backed();
    let slot = slot("brownies");

    service
        .apply_customization(request(&slot, vec![Modification::omit("sugar")]))
        .await
        .unwrap();
    service.clear_customization(&slot).await.unwrap();
    service.clear_customization(&slot).await.unwrap();

    assert!(store.slot(&slot).unwrap().customization.is_none());
    let view = service.customized_recipe(&slot).await.unwrap();
    assert!(!view.customizations_applied);
    assert_eq!(view.calculation_method, CalculationMethod::Unmodified);
    assert_eq!(view.ingredients.len(), 3);
    assert!(close(view.nutrition.calories.quantity, 200.0));
}

#[tokio::test]
async fn test_missing_provider_recipe_falls_back_to_draft_copy() {
    common::init_test_logging();
    let base = brownie_recipe(RecipeSource::Spoonacular);
    let store = InMemoryDraftStore::new();
    let slot = slot("brownies");
    store.seed_slot(&slot, embedded(&base, "Fudgy Brownies"));
    let resolver = Arc::new(FakeRecipeResolver::new());
    let service = service(Arc::new(store), resolver.clone(), egg_lookup());

    let outcome = service
        .apply_customization(request(&slot, vec![Modification::add("egg", 1.0, "whole")]))
        .await
        .unwrap();

    assert_eq!(outcome.base_origin, BaseRecipeOrigin::DraftFallback);
    assert_eq!(resolver.calls(), 1);
    assert!(close(
        outcome.customization.custom_nutrition.unwrap().calories.quantity,
        218.0
    ));
}

#[tokio::test]
async fn test_generated_recipes_skip_the_resolver() {
    common::init_test_logging();
    let base = brownie_recipe(RecipeSource::Generated);
    let store = InMemoryDraftStore::new();
    let slot = slot("brownies");
    store.seed_slot(&slot, embedded(&base, "AI Brownies"));
    let resolver = Arc::new(FakeRecipeResolver::new().with(base));
    let service = service(Arc::new(store), resolver.clone(), egg_lookup());

    let outcome = service
        .apply_customization(request(&slot, vec![Modification::omit("sugar")]))
        .await
        .unwrap();

    assert_eq!(outcome.base_origin, BaseRecipeOrigin::DraftFallback);
    assert_eq!(resolver.calls(), 0);
    assert_eq!(
        outcome.customization.modifications,
        vec![Modification::omit_with_amount("sugar", 50.0, "g")]
    );
}
