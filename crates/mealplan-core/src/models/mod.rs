// ABOUTME: Core data models for recipe customization and nutrition
// ABOUTME: Re-exports modification, nutrition, recipe, and customization types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Stored customization records and draft versions
pub mod customization;
/// Replace, omit, and add edits
pub mod modification;
/// Nutrient values, keys, and snapshots
pub mod nutrition;
/// Ingredients, base recipes, and meal slots
pub mod recipe;

pub use customization::{
    Accuracy, CalculationMethod, DraftVersion, LoadedSlot, MealSlotState, RecipeCustomization,
};
pub use modification::{
    amounts_equal, names_match, names_overlap, units_match, AddModification, Modification,
    ModificationKind, OmitModification, ReplaceModification,
};
pub use nutrition::{
    round_quantity, CanonicalKey, FlatNutrition, MacroKey, Micronutrients, MineralKey,
    NutrientValue, NutritionSnapshot, VitaminKey,
};
pub use recipe::{
    effective_servings, BaseRecipe, EmbeddedRecipe, Ingredient, MealSlotKey, RecipeSource,
};
