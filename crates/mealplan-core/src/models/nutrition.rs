// ABOUTME: Nutrition snapshot model with canonical macro, vitamin, and mineral keys
// ABOUTME: Defines NutrientValue, NutritionSnapshot, FlatNutrition, and rounding helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::fmt;
use std::iter;

use serde::{Deserialize, Serialize};

use crate::constants::nutrition::{
    CALORIES_UNIT, GRAMS_UNIT, MICROGRAMS_UNIT, MILLIGRAMS_UNIT, ROUNDING_DECIMALS,
};

/// Round a quantity to the engine's fixed precision (2 decimal places)
#[must_use]
pub fn round_quantity(value: f64) -> f64 {
    let factor = 10_f64.powi(ROUNDING_DECIMALS);
    (value * factor).round() / factor
}

/// A single nutrient amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientValue {
    /// Amount of the nutrient
    pub quantity: f64,
    /// Unit the amount is expressed in (`kcal`, `g`, `mg`, `µg`)
    pub unit: String,
    /// Human-readable name, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl NutrientValue {
    /// Create an unlabeled value
    #[must_use]
    pub fn new(quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            quantity,
            unit: unit.into(),
            label: None,
        }
    }

    /// Create a labeled value
    #[must_use]
    pub fn labeled(quantity: f64, unit: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            quantity,
            unit: unit.into(),
            label: Some(label.into()),
        }
    }

    /// Same unit and label with a different quantity
    #[must_use]
    pub fn with_quantity(&self, quantity: f64) -> Self {
        Self {
            quantity,
            unit: self.unit.clone(),
            label: self.label.clone(),
        }
    }
}

/// Macronutrient keys (plus sodium and cholesterol, which labels list with macros)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MacroKey {
    /// Protein
    Protein,
    /// Total carbohydrates
    Carbs,
    /// Net carbohydrates (total minus fiber)
    NetCarbs,
    /// Total fat
    Fat,
    /// Dietary fiber
    Fiber,
    /// Total sugars
    Sugar,
    /// Added sugars
    AddedSugar,
    /// Sodium
    Sodium,
    /// Cholesterol
    Cholesterol,
    /// Saturated fat
    SaturatedFat,
    /// Trans fat
    TransFat,
    /// Monounsaturated fat
    MonounsaturatedFat,
    /// Polyunsaturated fat
    PolyunsaturatedFat,
}

impl MacroKey {
    /// Every macro key in display order
    pub const ALL: [Self; 13] = [
        Self::Protein,
        Self::Carbs,
        Self::NetCarbs,
        Self::Fat,
        Self::Fiber,
        Self::Sugar,
        Self::AddedSugar,
        Self::Sodium,
        Self::Cholesterol,
        Self::SaturatedFat,
        Self::TransFat,
        Self::MonounsaturatedFat,
        Self::PolyunsaturatedFat,
    ];

    /// Canonical camelCase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Protein => "protein",
            Self::Carbs => "carbs",
            Self::NetCarbs => "netCarbs",
            Self::Fat => "fat",
            Self::Fiber => "fiber",
            Self::Sugar => "sugar",
            Self::AddedSugar => "addedSugar",
            Self::Sodium => "sodium",
            Self::Cholesterol => "cholesterol",
            Self::SaturatedFat => "saturatedFat",
            Self::TransFat => "transFat",
            Self::MonounsaturatedFat => "monounsaturatedFat",
            Self::PolyunsaturatedFat => "polyunsaturatedFat",
        }
    }

    /// Reference unit
    #[must_use]
    pub const fn default_unit(&self) -> &'static str {
        match self {
            Self::Sodium | Self::Cholesterol => MILLIGRAMS_UNIT,
            _ => GRAMS_UNIT,
        }
    }

    /// Reference label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Protein => "Protein",
            Self::Carbs => "Carbohydrates",
            Self::NetCarbs => "Net Carbohydrates",
            Self::Fat => "Fat",
            Self::Fiber => "Fiber",
            Self::Sugar => "Sugars",
            Self::AddedSugar => "Added Sugars",
            Self::Sodium => "Sodium",
            Self::Cholesterol => "Cholesterol",
            Self::SaturatedFat => "Saturated Fat",
            Self::TransFat => "Trans Fat",
            Self::MonounsaturatedFat => "Monounsaturated Fat",
            Self::PolyunsaturatedFat => "Polyunsaturated Fat",
        }
    }
}

/// Vitamin keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VitaminKey {
    /// Vitamin A (RAE)
    VitaminA,
    /// Vitamin C
    VitaminC,
    /// Vitamin D
    VitaminD,
    /// Vitamin E
    VitaminE,
    /// Vitamin K
    VitaminK,
    /// Thiamin (B1)
    Thiamin,
    /// Riboflavin (B2)
    Riboflavin,
    /// Niacin (B3)
    Niacin,
    /// Vitamin B6
    #[serde(rename = "vitaminB6")]
    VitaminB6,
    /// Vitamin B12
    #[serde(rename = "vitaminB12")]
    VitaminB12,
    /// Folate (DFE, food and folic acid summed)
    Folate,
    /// Pantothenic acid (B5)
    PantothenicAcid,
    /// Biotin (B7)
    Biotin,
}

impl VitaminKey {
    /// Every vitamin key in report order
    pub const ALL: [Self; 13] = [
        Self::VitaminA,
        Self::VitaminC,
        Self::VitaminD,
        Self::VitaminE,
        Self::VitaminK,
        Self::Thiamin,
        Self::Riboflavin,
        Self::Niacin,
        Self::VitaminB6,
        Self::VitaminB12,
        Self::Folate,
        Self::PantothenicAcid,
        Self::Biotin,
    ];

    /// Canonical camelCase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VitaminA => "vitaminA",
            Self::VitaminC => "vitaminC",
            Self::VitaminD => "vitaminD",
            Self::VitaminE => "vitaminE",
            Self::VitaminK => "vitaminK",
            Self::Thiamin => "thiamin",
            Self::Riboflavin => "riboflavin",
            Self::Niacin => "niacin",
            Self::VitaminB6 => "vitaminB6",
            Self::VitaminB12 => "vitaminB12",
            Self::Folate => "folate",
            Self::PantothenicAcid => "pantothenicAcid",
            Self::Biotin => "biotin",
        }
    }

    /// Reference unit
    #[must_use]
    pub const fn default_unit(&self) -> &'static str {
        match self {
            Self::VitaminA
            | Self::VitaminD
            | Self::VitaminK
            | Self::VitaminB12
            | Self::Folate
            | Self::Biotin => MICROGRAMS_UNIT,
            Self::VitaminC
            | Self::VitaminE
            | Self::Thiamin
            | Self::Riboflavin
            | Self::Niacin
            | Self::VitaminB6
            | Self::PantothenicAcid => MILLIGRAMS_UNIT,
        }
    }

    /// Reference label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::VitaminA => "Vitamin A",
            Self::VitaminC => "Vitamin C",
            Self::VitaminD => "Vitamin D",
            Self::VitaminE => "Vitamin E",
            Self::VitaminK => "Vitamin K",
            Self::Thiamin => "Thiamin (B1)",
            Self::Riboflavin => "Riboflavin (B2)",
            Self::Niacin => "Niacin (B3)",
            Self::VitaminB6 => "Vitamin B6",
            Self::VitaminB12 => "Vitamin B12",
            Self::Folate => "Folate",
            Self::PantothenicAcid => "Pantothenic Acid (B5)",
            Self::Biotin => "Biotin",
        }
    }
}

/// Mineral keys (sodium lives with the macros)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MineralKey {
    /// Calcium
    Calcium,
    /// Iron
    Iron,
    /// Magnesium
    Magnesium,
    /// Phosphorus
    Phosphorus,
    /// Potassium
    Potassium,
    /// Zinc
    Zinc,
    /// Copper
    Copper,
    /// Manganese
    Manganese,
    /// Selenium
    Selenium,
    /// Iodine
    Iodine,
    /// Chromium
    Chromium,
    /// Molybdenum
    Molybdenum,
}

impl MineralKey {
    /// Every mineral key in report order
    pub const ALL: [Self; 12] = [
        Self::Calcium,
        Self::Iron,
        Self::Magnesium,
        Self::Phosphorus,
        Self::Potassium,
        Self::Zinc,
        Self::Copper,
        Self::Manganese,
        Self::Selenium,
        Self::Iodine,
        Self::Chromium,
        Self::Molybdenum,
    ];

    /// Canonical camelCase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Calcium => "calcium",
            Self::Iron => "iron",
            Self::Magnesium => "magnesium",
            Self::Phosphorus => "phosphorus",
            Self::Potassium => "potassium",
            Self::Zinc => "zinc",
            Self::Copper => "copper",
            Self::Manganese => "manganese",
            Self::Selenium => "selenium",
            Self::Iodine => "iodine",
            Self::Chromium => "chromium",
            Self::Molybdenum => "molybdenum",
        }
    }

    /// Reference unit
    #[must_use]
    pub const fn default_unit(&self) -> &'static str {
        match self {
            Self::Selenium | Self::Iodine | Self::Chromium | Self::Molybdenum => MICROGRAMS_UNIT,
            _ => MILLIGRAMS_UNIT,
        }
    }

    /// Reference label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Calcium => "Calcium",
            Self::Iron => "Iron",
            Self::Magnesium => "Magnesium",
            Self::Phosphorus => "Phosphorus",
            Self::Potassium => "Potassium",
            Self::Zinc => "Zinc",
            Self::Copper => "Copper",
            Self::Manganese => "Manganese",
            Self::Selenium => "Selenium",
            Self::Iodine => "Iodine",
            Self::Chromium => "Chromium",
            Self::Molybdenum => "Molybdenum",
        }
    }
}

/// Any nutrient the engine tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalKey {
    /// Energy
    Calories,
    /// A macronutrient
    Macro(MacroKey),
    /// A vitamin
    Vitamin(VitaminKey),
    /// A mineral
    Mineral(MineralKey),
}

impl CanonicalKey {
    /// Canonical camelCase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::Macro(key) => key.as_str(),
            Self::Vitamin(key) => key.as_str(),
            Self::Mineral(key) => key.as_str(),
        }
    }

    /// Reference unit
    #[must_use]
    pub const fn default_unit(&self) -> &'static str {
        match self {
            Self::Calories => CALORIES_UNIT,
            Self::Macro(key) => key.default_unit(),
            Self::Vitamin(key) => key.default_unit(),
            Self::Mineral(key) => key.default_unit(),
        }
    }

    /// Reference label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Calories => "Calories",
            Self::Macro(key) => key.label(),
            Self::Vitamin(key) => key.label(),
            Self::Mineral(key) => key.label(),
        }
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vitamins and minerals of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Micronutrients {
    /// Vitamins keyed by canonical name
    #[serde(default)]
    pub vitamins: BTreeMap<VitaminKey, NutrientValue>,
    /// Minerals keyed by canonical name
    #[serde(default)]
    pub minerals: BTreeMap<MineralKey, NutrientValue>,
}

/// Full nutrient profile, per one recipe serving unless stated otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionSnapshot {
    /// Energy
    pub calories: NutrientValue,
    /// Macronutrients present in the snapshot
    #[serde(default)]
    pub macros: BTreeMap<MacroKey, NutrientValue>,
    /// Vitamins and minerals present in the snapshot
    #[serde(default)]
    pub micros: Micronutrients,
}

impl Default for NutritionSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl NutritionSnapshot {
    /// Zero calories, no other nutrients
    #[must_use]
    pub fn empty() -> Self {
        Self {
            calories: NutrientValue::new(0.0, CALORIES_UNIT),
            macros: BTreeMap::new(),
            micros: Micronutrients::default(),
        }
    }

    /// Build a snapshot from a canonical-keyed map; calories default to zero
    #[must_use]
    pub fn from_canonical(values: BTreeMap<CanonicalKey, NutrientValue>) -> Self {
        let mut snapshot = Self::empty();
        for (key, value) in values {
            snapshot.set(key, value);
        }
        snapshot
    }

    /// Value stored under `key`
    #[must_use]
    pub fn get(&self, key: CanonicalKey) -> Option<&NutrientValue> {
        match key {
            CanonicalKey::Calories => Some(&self.calories),
            CanonicalKey::Macro(k) => self.macros.get(&k),
            CanonicalKey::Vitamin(k) => self.micros.vitamins.get(&k),
            CanonicalKey::Mineral(k) => self.micros.minerals.get(&k),
        }
    }

    /// Quantity stored under `key`, zero when absent
    #[must_use]
    pub fn quantity(&self, key: CanonicalKey) -> f64 {
        self.get(key).map_or(0.0, |v| v.quantity)
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set(&mut self, key: CanonicalKey, value: NutrientValue) {
        match key {
            CanonicalKey::Calories => self.calories = value,
            CanonicalKey::Macro(k) => {
                self.macros.insert(k, value);
            }
            CanonicalKey::Vitamin(k) => {
                self.micros.vitamins.insert(k, value);
            }
            CanonicalKey::Mineral(k) => {
                self.micros.minerals.insert(k, value);
            }
        }
    }

    /// Every leaf of the snapshot, calories first
    pub fn entries(&self) -> impl Iterator<Item = (CanonicalKey, &NutrientValue)> {
        iter::once((CanonicalKey::Calories, &self.calories))
            .chain(
                self.macros
                    .iter()
                    .map(|(k, v)| (CanonicalKey::Macro(*k), v)),
            )
            .chain(
                self.micros
                    .vitamins
                    .iter()
                    .map(|(k, v)| (CanonicalKey::Vitamin(*k), v)),
            )
            .chain(
                self.micros
                    .minerals
                    .iter()
                    .map(|(k, v)| (CanonicalKey::Mineral(*k), v)),
            )
    }

    /// Canonical keys present in the snapshot
    #[must_use]
    pub fn keys(&self) -> Vec<CanonicalKey> {
        self.entries().map(|(key, _)| key).collect()
    }

    /// New snapshot with `transform` applied to every leaf quantity
    #[must_use]
    pub fn map_quantities(&self, transform: impl Fn(f64) -> f64) -> Self {
        Self {
            calories: self.calories.with_quantity(transform(self.calories.quantity)),
            macros: self
                .macros
                .iter()
                .map(|(k, v)| (*k, v.with_quantity(transform(v.quantity))))
                .collect(),
            micros: Micronutrients {
                vitamins: self
                    .micros
                    .vitamins
                    .iter()
                    .map(|(k, v)| (*k, v.with_quantity(transform(v.quantity))))
                    .collect(),
                minerals: self
                    .micros
                    .minerals
                    .iter()
                    .map(|(k, v)| (*k, v.with_quantity(transform(v.quantity))))
                    .collect(),
            },
        }
    }

    /// Every quantity rounded to two decimals
    #[must_use]
    pub fn rounded(&self) -> Self {
        self.map_quantities(round_quantity)
    }

    /// True when calories, protein and fat are all zero
    ///
    /// Providers answer unknown ingredients with an all-zero payload instead of an error.
    #[must_use]
    pub fn is_effectively_empty(&self) -> bool {
        self.calories.quantity == 0.0
            && self.quantity(CanonicalKey::Macro(MacroKey::Protein)) == 0.0
            && self.quantity(CanonicalKey::Macro(MacroKey::Fat)) == 0.0
    }

    /// Macro-only view of the snapshot
    #[must_use]
    pub fn to_flat(&self) -> FlatNutrition {
        let macro_quantity = |key| self.quantity(CanonicalKey::Macro(key));
        FlatNutrition {
            calories: self.calories.quantity,
            protein: macro_quantity(MacroKey::Protein),
            carbs: macro_quantity(MacroKey::Carbs),
            fat: macro_quantity(MacroKey::Fat),
            fiber: macro_quantity(MacroKey::Fiber),
            sugar: macro_quantity(MacroKey::Sugar),
            sodium: macro_quantity(MacroKey::Sodium),
        }
    }
}

/// Simplified macro-only nutrition, as stored on drafts without a full profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatNutrition {
    /// Calories (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein: f64,
    /// Carbohydrates (g)
    pub carbs: f64,
    /// Fat (g)
    pub fat: f64,
    /// Fiber (g)
    pub fiber: f64,
    /// Sugar (g)
    pub sugar: f64,
    /// Sodium (mg)
    pub sodium: f64,
}

impl FlatNutrition {
    /// Expand into a snapshot with labeled macro entries and no micronutrients
    #[must_use]
    pub fn to_snapshot(&self) -> NutritionSnapshot {
        let mut snapshot = NutritionSnapshot::empty();
        snapshot.calories = NutrientValue::labeled(self.calories, CALORIES_UNIT, "Calories");
        for (key, quantity) in [
            (MacroKey::Protein, self.protein),
            (MacroKey::Carbs, self.carbs),
            (MacroKey::Fat, self.fat),
            (MacroKey::Fiber, self.fiber),
            (MacroKey::Sugar, self.sugar),
            (MacroKey::Sodium, self.sodium),
        ] {
            snapshot.macros.insert(
                key,
                NutrientValue::labeled(quantity, key.default_unit(), key.label()),
            );
        }
        snapshot
    }
}
