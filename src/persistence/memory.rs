// ABOUTME: In-memory meal-plan draft store implementing CustomizationRepository
// ABOUTME: Compare-and-swap writes on a strictly increasing per-draft updated_at version
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use dashmap::DashMap;
use mealplan_core::errors::{AppError, AppResult};
use mealplan_core::models::{
    DraftVersion, EmbeddedRecipe, LoadedSlot, MealSlotKey, MealSlotState, RecipeCustomization,
};
use mealplan_core::ports::CustomizationRepository;
use tracing::debug;

/// One draft: its version and the recipe slots it holds
#[derive(Debug, Clone)]
struct DraftRecord {
    version: DraftVersion,
    slots: HashMap<MealSlotKey, MealSlotState>,
}

impl DraftRecord {
    fn new() -> Self {
        Self {
            version: DraftVersion::now(),
            slots: HashMap::new(),
        }
    }

    /// Advance the version; never returns a timestamp at or before the previous one
    fn bump(&mut self) -> DraftVersion {
        let floor = self.version.updated_at() + TimeDelta::microseconds(1);
        self.version = DraftVersion(Utc::now().max(floor));
        self.version
    }
}

/// Meal-plan drafts held in process memory
///
/// `DashMap` shards locking per draft, so concurrent requests on different
/// drafts never contend. Each draft's `updated_at` is the optimistic-lock token.
#[derive(Clone, Default)]
pub struct InMemoryDraftStore {
    drafts: Arc<DashMap<String, DraftRecord>>,
}

impl InMemoryDraftStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a recipe into a slot, creating the draft if needed
    ///
    /// Any previous customization in the slot is discarded.
    pub fn seed_slot(&self, slot: &MealSlotKey, recipe: EmbeddedRecipe) -> DraftVersion {
        let mut draft = self
            .drafts
            .entry(slot.draft_id.clone())
            .or_insert_with(DraftRecord::new);
        draft.slots.insert(
            slot.clone(),
            MealSlotState {
                recipe,
                customization: None,
            },
        );
        draft.bump()
    }

    /// Current state of a slot
    #[must_use]
    pub fn slot(&self, slot: &MealSlotKey) -> Option<MealSlotState> {
        self.drafts
            .get(&slot.draft_id)
            .and_then(|draft| draft.slots.get(slot).cloned())
    }

    /// Current version of a draft
    #[must_use]
    pub fn version(&self, draft_id: &str) -> Option<DraftVersion> {
        self.drafts.get(draft_id).map(|draft| draft.version)
    }

    /// Advance a draft's version without changing its contents
    ///
    /// Models an unrelated edit elsewhere in the draft.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the draft does not exist.
    pub fn touch(&self, draft_id: &str) -> AppResult<DraftVersion> {
        self.drafts
            .get_mut(draft_id)
            .map(|mut draft| draft.bump())
            .ok_or_else(|| AppError::not_found(format!("Draft {draft_id}")))
    }

    /// Deselect a recipe, destroying its slot and customization
    pub fn remove_slot(&self, slot: &MealSlotKey) -> bool {
        self.drafts
            .get_mut(&slot.draft_id)
            .is_some_and(|mut draft| {
                let removed = draft.slots.remove(slot).is_some();
                if removed {
                    draft.bump();
                }
                removed
            })
    }

    /// Drop an expired draft
    pub fn remove_draft(&self, draft_id: &str) -> bool {
        self.drafts.remove(draft_id).is_some()
    }

    /// Conditionally replace a slot's customization
    fn write_customization(
        &self,
        slot: &MealSlotKey,
        customization: Option<RecipeCustomization>,
        expected_version: DraftVersion,
    ) -> AppResult<DraftVersion> {
        let mut draft = self
            .drafts
            .get_mut(&slot.draft_id)
            .ok_or_else(|| AppError::not_found(format!("Draft {}", slot.draft_id)))?;

        if draft.version != expected_version {
            debug!(
                slot = %slot,
                expected = %expected_version,
                current = %draft.version,
                "Rejecting stale draft write"
            );
            return Err(AppError::version_conflict(format!("Draft {}", slot.draft_id))
                .with_resource_id(slot.draft_id.clone()));
        }

        let state = draft
            .slots
            .get_mut(slot)
            .ok_or_else(|| AppError::not_found(format!("Meal slot {slot}")))?;
        state.customization = customization;
        Ok(draft.bump())
    }
}

#[async_trait]
impl CustomizationRepository for InMemoryDraftStore {
    async fn load_customization(&self, slot: &MealSlotKey) -> AppResult<LoadedSlot> {
        let draft = self
            .drafts
            .get(&slot.draft_id)
            .ok_or_else(|| AppError::not_found(format!("Draft {}", slot.draft_id)))?;
        let state = draft
            .slots
            .get(slot)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Meal slot {slot}")))?;
        Ok(LoadedSlot {
            state,
            version: draft.version,
        })
    }

    async fn save_customization(
        &self,
        slot: &MealSlotKey,
        customization: RecipeCustomization,
        expected_version: DraftVersion,
    ) -> AppResult<DraftVersion> {
        self.write_customization(slot, Some(customization), expected_version)
    }

    async fn delete_customization(
        &self,
        slot: &MealSlotKey,
        expected_version: DraftVersion,
    ) -> AppResult<DraftVersion> {
        self.write_customization(slot, None, expected_version)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mealplan_core::errors::ErrorCode;
    use mealplan_core::models::RecipeSource;

    use super::*;

    fn embedded() -> EmbeddedRecipe {
        EmbeddedRecipe {
            recipe_id: "r1".to_owned(),
            source: RecipeSource::Generated,
            name: "Toast".to_owned(),
            servings: Some(1.0),
            ingredients: Vec::new(),
            nutrition: None,
            flat_nutrition: None,
        }
    }

    #[tokio::test]
    async fn test_stale_version_rejected() {
        let store = InMemoryDraftStore::new();
        let slot = MealSlotKey::new("d1", "2025-01-06", "breakfast", "r1");
        store.seed_slot(&slot, embedded());

        let loaded = store.load_customization(&slot).await.unwrap();
        store.touch("d1").unwrap();

        let err = store
            .save_customization(
                &slot,
                RecipeCustomization::new("r1", RecipeSource::Generated),
                loaded.version,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VersionConflict);
    }

    #[tokio::test]
    async fn test_versions_strictly_increase() {
        let store = InMemoryDraftStore::new();
        let slot = MealSlotKey::new("d1", "mon", "lunch", "r1");
        let first = store.seed_slot(&slot, embedded());
        let second = store.touch("d1").unwrap();
        let third = store.touch("d1").unwrap();
        assert!(first < second && second < third);
    }

    #[tokio::test]
    async fn test_missing_slot_is_not_found() {
        let store = InMemoryDraftStore::new();
        let slot = MealSlotKey::new("nope", "mon", "lunch", "r1");
        let err = store.load_customization(&slot).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound);
    }
}
