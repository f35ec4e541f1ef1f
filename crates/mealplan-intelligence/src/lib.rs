// ABOUTME: Recipe customization engine: edit merging, nutrient standardization, and recalculation
// ABOUTME: Pure algorithms over mealplan-core models with injected nutrition lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Meal-plan Intelligence
//!
//! Data flow for one customization request:
//!
//! ```text
//! stored edits + new edits ──► ModificationMerger ──► canonical edits
//!                                                       │
//!                         ┌─────────────────────────────┴────────────┐
//!                         ▼                                          ▼
//!              NutritionDeltaCalculator                   IngredientListProjector
//!                         │
//!                         ▼
//!                  ServingsScaler (display only)
//! ```

/// Per-ingredient nutrition deltas
pub mod delta;
/// Canonical edit-set merging
pub mod merger;
/// Display ingredient list projection
pub mod projector;
/// Portion multiplier
pub mod scaler;
/// Provider nutrient code translation
pub mod standardizer;
/// Ingredient text formatting
pub mod text;

pub use delta::{
    DeltaOperation, NutritionDeltaCalculator, Recalculation, RecalculationStep, StepStatus,
};
pub use merger::{MergeAction, MergeOutcome, MergeStep, ModificationMerger};
pub use projector::{IngredientListProjector, ModificationSummary};
pub use scaler::ServingsScaler;
pub use standardizer::NutrientKeyStandardizer;
pub use text::{format_amount, format_ingredient_text};
