// ABOUTME: Recomputes per-serving nutrition by applying ingredient deltas to the base snapshot
// ABOUTME: Looks up each edited ingredient, divides by recipe servings, and records a trace
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Delta Calculator
//!
//! Starting from the base recipe's per-serving snapshot, each canonical edit
//! contributes a delta equal to the looked-up nutrition of the ingredient line
//! divided by the recipe's serving count:
//!
//! - `add` adds the new ingredient
//! - `omit` subtracts the base ingredient, flooring each nutrient at zero
//! - `replace` subtracts the base ingredient, then adds the new one
//!
//! Edits are processed one at a time in canonical order. A failed lookup skips
//! that edit's contribution; when every edit fails the result degrades to the
//! base recipe's macros without micronutrients.

use mealplan_core::models::{
    effective_servings, Accuracy, CalculationMethod, Modification, ModificationKind,
    NutritionSnapshot,
};
use mealplan_core::ports::IngredientNutritionLookup;
use serde::Serialize;
use tracing::{debug, warn};

use crate::text::format_ingredient_text;

/// Direction a step moved the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaOperation {
    /// Nutrients added
    Add,
    /// Nutrients subtracted (floored at zero)
    Subtract,
}

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Delta applied
    Applied,
    /// No provider could price the ingredient
    LookupFailed,
    /// Lookup worked but the other half of the replace failed, so nothing was applied
    Skipped,
}

/// One line of the recalculation audit trail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecalculationStep {
    /// Edit that produced the step
    pub modification: ModificationKind,
    /// Ingredient name
    pub ingredient: String,
    /// Text sent to the nutrition lookup
    pub query: String,
    /// Add or subtract
    pub operation: DeltaOperation,
    /// Per-serving calories before the step
    pub calories_before: f64,
    /// Per-serving calories after the step
    pub calories_after: f64,
    /// Whether the delta was applied
    pub status: StepStatus,
}

/// Recomputed nutrition with its audit trail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recalculation {
    /// Per-serving nutrition after all edits, before any portion multiplier
    pub snapshot: NutritionSnapshot,
    /// Every step in processing order
    pub trace: Vec<RecalculationStep>,
    /// How the snapshot was produced
    pub method: CalculationMethod,
    /// Whether any edit went unpriced
    pub accuracy: Accuracy,
}

/// A looked-up ingredient line waiting to be applied
struct PricedLine {
    ingredient: String,
    query: String,
    nutrition: Option<NutritionSnapshot>,
}

/// Applies canonical edits to a base nutrition snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NutritionDeltaCalculator;

impl NutritionDeltaCalculator {
    /// Recompute per-serving nutrition for `modifications` applied to `base`
    ///
    /// `base` is per serving; `recipe_servings` converts whole-recipe ingredient
    /// nutrition into per-serving deltas. Lookup failures never abort.
    pub async fn recompute(
        base: &NutritionSnapshot,
        recipe_servings: f64,
        modifications: &[Modification],
        lookup: &dyn IngredientNutritionLookup,
    ) -> Recalculation {
        if modifications.is_empty() {
            return Recalculation {
                snapshot: base.rounded(),
                trace: Vec::new(),
                method: CalculationMethod::Unmodified,
                accuracy: Accuracy::Precise,
            };
        }

        let servings = effective_servings(recipe_servings);
        let mut accumulator = base.clone();
        let mut trace = Vec::new();
        let mut applied = 0_usize;
        let mut failed = 0_usize;

        for modification in modifications {
            let kind = modification.kind();
            let ok = match modification {
                Modification::Add(add) => {
                    let line = price(
                        lookup,
                        &add.new_ingredient,
                        add.amount,
                        add.unit.as_deref(),
                    )
                    .await;
                    apply_line(
                        &mut accumulator,
                        kind,
                        line,
                        DeltaOperation::Add,
                        servings,
                        &mut trace,
                    )
                }
                Modification::Omit(omit) => {
                    let line = price(
                        lookup,
                        &omit.original_ingredient,
                        omit.original_amount,
                        omit.original_unit.as_deref(),
                    )
                    .await;
                    apply_line(
                        &mut accumulator,
                        kind,
                        line,
                        DeltaOperation::Subtract,
                        servings,
                        &mut trace,
                    )
                }
                Modification::Replace(replace) => {
                    let removed = price(
                        lookup,
                        &replace.original_ingredient,
                        replace.original_amount,
                        replace.original_unit.as_deref(),
                    )
                    .await;
                    let added = price(
                        lookup,
                        &replace.new_ingredient,
                        replace.amount,
                        replace.unit.as_deref(),
                    )
                    .await;
                    if removed.nutrition.is_some() && added.nutrition.is_some() {
                        apply_line(
                            &mut accumulator,
                            kind,
                            removed,
                            DeltaOperation::Subtract,
                            servings,
                            &mut trace,
                        ) && apply_line(
                            &mut accumulator,
                            kind,
                            added,
                            DeltaOperation::Add,
                            servings,
                            &mut trace,
                        )
                    } else {
                        let calories = accumulator.calories.quantity;
                        for (line, operation) in [
                            (removed, DeltaOperation::Subtract),
                            (added, DeltaOperation::Add),
                        ] {
                            trace.push(skipped_step(kind, line, operation, calories));
                        }
                        false
                    }
                }
            };

            if ok {
                applied += 1;
            } else {
                failed += 1;
            }
        }

        if applied == 0 {
            warn!(
                modifications = modifications.len(),
                "Every nutrition lookup failed; falling back to macro-only estimate"
            );
            return Recalculation {
                snapshot: base.to_flat().to_snapshot().rounded(),
                trace,
                method: CalculationMethod::MacroOnlyEstimate,
                accuracy: Accuracy::Approximate,
            };
        }

        debug!(
            applied,
            failed,
            calories = accumulator.calories.quantity,
            "Recomputed nutrition from ingredient deltas"
        );

        Recalculation {
            snapshot: accumulator.rounded(),
            trace,
            method: CalculationMethod::ProviderDelta,
            accuracy: if failed == 0 {
                Accuracy::Precise
            } else {
                Accuracy::Approximate
            },
        }
    }
}

async fn price(
    lookup: &dyn IngredientNutritionLookup,
    ingredient: &str,
    amount: Option<f64>,
    unit: Option<&str>,
) -> PricedLine {
    let query = format_ingredient_text(amount, unit, ingredient);
    let nutrition = lookup.lookup(&query).await;
    if nutrition.is_none() {
        warn!(ingredient, query = %query, "Nutrition lookup failed; skipping contribution");
    }
    PricedLine {
        ingredient: ingredient.to_owned(),
        query,
        nutrition,
    }
}

fn apply_line(
    accumulator: &mut NutritionSnapshot,
    kind: ModificationKind,
    line: PricedLine,
    operation: DeltaOperation,
    servings: f64,
    trace: &mut Vec<RecalculationStep>,
) -> bool {
    let calories_before = accumulator.calories.quantity;
    let status = match &line.nutrition {
        Some(nutrition) => {
            let delta = nutrition.map_quantities(|quantity| quantity / servings);
            match operation {
                DeltaOperation::Add => add_into(accumulator, &delta),
                DeltaOperation::Subtract => subtract_from(accumulator, &delta),
            }
            StepStatus::Applied
        }
        None => StepStatus::LookupFailed,
    };
    trace.push(RecalculationStep {
        modification: kind,
        ingredient: line.ingredient,
        query: line.query,
        operation,
        calories_before,
        calories_after: accumulator.calories.quantity,
        status,
    });
    status == StepStatus::Applied
}

fn skipped_step(
    kind: ModificationKind,
    line: PricedLine,
    operation: DeltaOperation,
    calories: f64,
) -> RecalculationStep {
    RecalculationStep {
        modification: kind,
        status: if line.nutrition.is_some() {
            StepStatus::Skipped
        } else {
            StepStatus::LookupFailed
        },
        ingredient: line.ingredient,
        query: line.query,
        operation,
        calories_before: calories,
        calories_after: calories,
    }
}

/// Add every nutrient present in `delta`; keys missing from the accumulator are inserted
fn add_into(accumulator: &mut NutritionSnapshot, delta: &NutritionSnapshot) {
    for (key, value) in delta.entries() {
        let updated = accumulator.get(key).map_or_else(
            || value.clone(),
            |existing| existing.with_quantity(existing.quantity + value.quantity),
        );
        accumulator.set(key, updated);
    }
}

/// Subtract every nutrient present in `delta`, never going below zero
fn subtract_from(accumulator: &mut NutritionSnapshot, delta: &NutritionSnapshot) {
    for (key, value) in delta.entries() {
        let updated = accumulator.get(key).map_or_else(
            || value.with_quantity(0.0),
            |existing| existing.with_quantity((existing.quantity - value.quantity).max(0.0)),
        );
        accumulator.set(key, updated);
    }
}
