// ABOUTME: Applies the portion multiplier to a per-serving nutrition snapshot
// ABOUTME: Pure function over snapshots; callers always scale from the stored per-serving value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use mealplan_core::constants::nutrition::DEFAULT_NUTRITION_SERVINGS;
use mealplan_core::models::{round_quantity, NutritionSnapshot};
use tracing::warn;

/// Multiplies nutrition by the number of portions eaten
///
/// Borrows the per-serving snapshot and returns a new one; the input is never mutated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServingsScaler;

impl ServingsScaler {
    /// Scale every leaf quantity by `nutrition_servings`, keeping units and labels
    ///
    /// Non-finite or non-positive multipliers are treated as 1.
    #[must_use]
    pub fn scale(snapshot: &NutritionSnapshot, nutrition_servings: f64) -> NutritionSnapshot {
        let multiplier = if nutrition_servings.is_finite() && nutrition_servings > 0.0 {
            nutrition_servings
        } else {
            warn!(
                nutrition_servings,
                "Invalid portion multiplier; using {DEFAULT_NUTRITION_SERVINGS}"
            );
            DEFAULT_NUTRITION_SERVINGS
        };
        snapshot.map_quantities(|quantity| round_quantity(quantity * multiplier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealplan_core::models::{CanonicalKey, MineralKey, NutrientValue};

    #[test]
    fn test_invalid_multiplier_is_identity() {
        let mut snapshot = NutritionSnapshot::empty();
        snapshot.calories.quantity = 410.0;
        snapshot.set(
            CanonicalKey::Mineral(MineralKey::Iron),
            NutrientValue::new(2.5, "mg"),
        );

        for multiplier in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(ServingsScaler::scale(&snapshot, multiplier), snapshot);
        }
    }
}
