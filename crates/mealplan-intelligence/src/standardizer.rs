// ABOUTME: Maps provider-specific nutrient codes onto canonical nutrient keys
// ABOUTME: Sums duplicate codes, drops unknown ones, and builds complete vitamin/mineral reports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrient Key Standardization
//!
//! Edamam reports nutrients by USDA-style tag (`PROCNT`, `VITB6A`, `FOLDFE`),
//! Spoonacular by display name (`Protein`, `Vitamin B6`, `Folic Acid`). Both are
//! folded into [`CanonicalKey`] here so the rest of the engine never sees a
//! provider vocabulary.

use std::collections::BTreeMap;

use mealplan_core::models::{
    round_quantity, CanonicalKey, MacroKey, MineralKey, NutrientValue, NutritionSnapshot,
    VitaminKey,
};
use tracing::trace;

/// Stateless nutrient code translator
#[derive(Debug, Clone, Copy, Default)]
pub struct NutrientKeyStandardizer;

impl NutrientKeyStandardizer {
    /// Canonical key for a provider code or name, `None` when the nutrient is not tracked
    ///
    /// Matching is case-insensitive and accepts Edamam tags, Spoonacular names, and
    /// the canonical camelCase names themselves.
    #[must_use]
    pub fn canonical_key(code: &str) -> Option<CanonicalKey> {
        let normalized = code.trim().to_lowercase();
        let key = match normalized.as_str() {
            "enerc_kcal" | "calories" | "energy" => CanonicalKey::Calories,

            "procnt" | "protein" => CanonicalKey::Macro(MacroKey::Protein),
            "chocdf" | "carbohydrates" | "carbs" => CanonicalKey::Macro(MacroKey::Carbs),
            "chocdf.net" | "net carbohydrates" | "netcarbs" => {
                CanonicalKey::Macro(MacroKey::NetCarbs)
            }
            "fat" => CanonicalKey::Macro(MacroKey::Fat),
            "fibtg" | "fiber" => CanonicalKey::Macro(MacroKey::Fiber),
            "sugar" | "sugars" => CanonicalKey::Macro(MacroKey::Sugar),
            "sugar.added" | "added sugars" | "addedsugar" => {
                CanonicalKey::Macro(MacroKey::AddedSugar)
            }
            "na" | "sodium" => CanonicalKey::Macro(MacroKey::Sodium),
            "chole" | "cholesterol" => CanonicalKey::Macro(MacroKey::Cholesterol),
            "fasat" | "saturated fat" | "saturatedfat" => {
                CanonicalKey::Macro(MacroKey::SaturatedFat)
            }
            "fatrn" | "trans fat" | "transfat" => CanonicalKey::Macro(MacroKey::TransFat),
            "fams" | "monounsaturated fat" | "mono unsaturated fat" | "monounsaturatedfat" => {
                CanonicalKey::Macro(MacroKey::MonounsaturatedFat)
            }
            "fapu" | "polyunsaturated fat" | "poly unsaturated fat" | "polyunsaturatedfat" => {
                CanonicalKey::Macro(MacroKey::PolyunsaturatedFat)
            }

            "vita_rae" | "vitamin a" | "vitamina" => CanonicalKey::Vitamin(VitaminKey::VitaminA),
            "vitc" | "vitamin c" | "vitaminc" => CanonicalKey::Vitamin(VitaminKey::VitaminC),
            "vitd" | "vitamin d" | "vitamind" => CanonicalKey::Vitamin(VitaminKey::VitaminD),
            "tocpha" | "vitamin e" | "vitamine" => CanonicalKey::Vitamin(VitaminKey::VitaminE),
            "vitk1" | "vitamin k" | "vitamink" => CanonicalKey::Vitamin(VitaminKey::VitaminK),
            "thia" | "thiamin" | "vitamin b1" => CanonicalKey::Vitamin(VitaminKey::Thiamin),
            "ribf" | "riboflavin" | "vitamin b2" => CanonicalKey::Vitamin(VitaminKey::Riboflavin),
            "nia" | "niacin" | "vitamin b3" => CanonicalKey::Vitamin(VitaminKey::Niacin),
            "vitb6a" | "vitamin b6" | "vitaminb6" => CanonicalKey::Vitamin(VitaminKey::VitaminB6),
            "vitb12" | "vitamin b12" | "vitaminb12" => {
                CanonicalKey::Vitamin(VitaminKey::VitaminB12)
            }
            "foldfe" | "folfd" | "folac" | "folate" | "folic acid" => {
                CanonicalKey::Vitamin(VitaminKey::Folate)
            }
            "pantac" | "pantothenic acid" | "vitamin b5" | "pantothenicacid" => {
                CanonicalKey::Vitamin(VitaminKey::PantothenicAcid)
            }
            "biot" | "biotin" => CanonicalKey::Vitamin(VitaminKey::Biotin),

            "ca" | "calcium" => CanonicalKey::Mineral(MineralKey::Calcium),
            "fe" | "iron" => CanonicalKey::Mineral(MineralKey::Iron),
            "mg" | "magnesium" => CanonicalKey::Mineral(MineralKey::Magnesium),
            "p" | "phosphorus" => CanonicalKey::Mineral(MineralKey::Phosphorus),
            "k" | "potassium" => CanonicalKey::Mineral(MineralKey::Potassium),
            "zn" | "zinc" => CanonicalKey::Mineral(MineralKey::Zinc),
            "cu" | "copper" => CanonicalKey::Mineral(MineralKey::Copper),
            "mn" | "manganese" => CanonicalKey::Mineral(MineralKey::Manganese),
            "se" | "selenium" => CanonicalKey::Mineral(MineralKey::Selenium),
            "id" | "iodine" => CanonicalKey::Mineral(MineralKey::Iodine),
            "cr" | "chromium" => CanonicalKey::Mineral(MineralKey::Chromium),
            "mo" | "molybdenum" => CanonicalKey::Mineral(MineralKey::Molybdenum),

            _ => return None,
        };
        Some(key)
    }

    /// Translate raw provider nutrients to canonical keys
    ///
    /// Codes that share a canonical key are summed. The first unit seen for a key
    /// is kept. Untracked codes and non-finite quantities are dropped. Quantities
    /// are rounded to two decimals.
    pub fn standardize<I, K>(raw: I) -> BTreeMap<CanonicalKey, NutrientValue>
    where
        I: IntoIterator<Item = (K, NutrientValue)>,
        K: AsRef<str>,
    {
        let mut standardized: BTreeMap<CanonicalKey, NutrientValue> = BTreeMap::new();

        for (code, value) in raw {
            let code = code.as_ref();
            let Some(key) = Self::canonical_key(code) else {
                trace!(code, "Dropping untracked nutrient code");
                continue;
            };
            if !value.quantity.is_finite() {
                continue;
            }

            standardized
                .entry(key)
                .and_modify(|existing| existing.quantity += value.quantity)
                .or_insert_with(|| {
                    let unit = if value.unit.trim().is_empty() {
                        key.default_unit().to_owned()
                    } else {
                        value.unit.clone()
                    };
                    NutrientValue::labeled(value.quantity, unit, key.label())
                });
        }

        for value in standardized.values_mut() {
            value.quantity = round_quantity(value.quantity);
        }
        standardized
    }

    /// Translate raw provider nutrients straight into a snapshot
    pub fn standardize_snapshot<I, K>(raw: I) -> NutritionSnapshot
    where
        I: IntoIterator<Item = (K, NutrientValue)>,
        K: AsRef<str>,
    {
        NutritionSnapshot::from_canonical(Self::standardize(raw))
    }

    /// Snapshot with every vitamin and mineral key present
    ///
    /// Missing keys get quantity 0 with the reference unit and label, so report
    /// consumers never need to null-check.
    #[must_use]
    pub fn complete_report(snapshot: &NutritionSnapshot) -> NutritionSnapshot {
        let mut report = snapshot.clone();
        if report.calories.label.is_none() {
            report.calories.label = Some(CanonicalKey::Calories.label().to_owned());
        }

        for key in VitaminKey::ALL {
            let entry = report
                .micros
                .vitamins
                .entry(key)
                .or_insert_with(|| NutrientValue::labeled(0.0, key.default_unit(), key.label()));
            if entry.label.is_none() {
                entry.label = Some(key.label().to_owned());
            }
        }
        for key in MineralKey::ALL {
            let entry = report
                .micros
                .minerals
                .entry(key)
                .or_insert_with(|| NutrientValue::labeled(0.0, key.default_unit(), key.label()));
            if entry.label.is_none() {
                entry.label = Some(key.label().to_owned());
            }
        }
        report
    }
}
