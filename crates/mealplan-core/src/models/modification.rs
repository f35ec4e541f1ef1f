// ABOUTME: Ingredient modification model for recipe customization
// ABOUTME: Tagged replace/omit/add variants with tolerant amount parsing and identity helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::nutrition::AMOUNT_EPSILON;

/// A single user edit applied to a recipe's ingredient list
///
/// Serialized with a `type` tag (`replace`, `omit`, `add`) and camelCase fields,
/// which is the shape request handlers and stored drafts use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Modification {
    /// Substitute one ingredient (or quantity) for another
    Replace(ReplaceModification),
    /// Remove an ingredient entirely
    Omit(OmitModification),
    /// Introduce an ingredient that is not in the base recipe
    Add(AddModification),
}

/// Payload of [`Modification::Replace`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceModification {
    /// Ingredient being replaced, as named in the base recipe
    pub original_ingredient: String,
    /// Base quantity, backfilled from the base recipe when unknown
    #[serde(default, deserialize_with = "lenient_amount")]
    pub original_amount: Option<f64>,
    /// Base unit, backfilled from the base recipe when unknown
    #[serde(default)]
    pub original_unit: Option<String>,
    /// Ingredient used instead
    pub new_ingredient: String,
    /// Quantity of the new ingredient
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    /// Unit of the new ingredient
    #[serde(default)]
    pub unit: Option<String>,
    /// Free-form note from the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload of [`Modification::Omit`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OmitModification {
    /// Ingredient being removed
    pub original_ingredient: String,
    /// Base quantity, backfilled from the base recipe when unknown
    #[serde(default, deserialize_with = "lenient_amount")]
    pub original_amount: Option<f64>,
    /// Base unit, backfilled from the base recipe when unknown
    #[serde(default)]
    pub original_unit: Option<String>,
    /// Free-form note from the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload of [`Modification::Add`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddModification {
    /// Ingredient being introduced
    pub new_ingredient: String,
    /// Quantity added
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    /// Unit of the quantity added
    #[serde(default)]
    pub unit: Option<String>,
    /// Free-form note from the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Discriminant of a [`Modification`], used in traces and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationKind {
    /// Replace
    Replace,
    /// Omit
    Omit,
    /// Add
    Add,
}

impl fmt::Display for ModificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Replace => "replace",
            Self::Omit => "omit",
            Self::Add => "add",
        };
        f.write_str(name)
    }
}

impl Modification {
    /// Build a replace edit with a known base quantity
    #[must_use]
    pub fn replace(
        original_ingredient: impl Into<String>,
        original_amount: f64,
        original_unit: impl Into<String>,
        new_ingredient: impl Into<String>,
        amount: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self::Replace(ReplaceModification {
            original_ingredient: original_ingredient.into(),
            original_amount: Some(original_amount),
            original_unit: Some(original_unit.into()),
            new_ingredient: new_ingredient.into(),
            amount: Some(amount),
            unit: Some(unit.into()),
            notes: None,
        })
    }

    /// Build an omit edit whose base quantity is left for backfill
    #[must_use]
    pub fn omit(original_ingredient: impl Into<String>) -> Self {
        Self::Omit(OmitModification {
            original_ingredient: original_ingredient.into(),
            original_amount: None,
            original_unit: None,
            notes: None,
        })
    }

    /// Build an omit edit with a known base quantity
    #[must_use]
    pub fn omit_with_amount(
        original_ingredient: impl Into<String>,
        original_amount: f64,
        original_unit: impl Into<String>,
    ) -> Self {
        Self::Omit(OmitModification {
            original_ingredient: original_ingredient.into(),
            original_amount: Some(original_amount),
            original_unit: Some(original_unit.into()),
            notes: None,
        })
    }

    /// Build an add edit
    #[must_use]
    pub fn add(new_ingredient: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self::Add(AddModification {
            new_ingredient: new_ingredient.into(),
            amount: Some(amount),
            unit: Some(unit.into()),
            notes: None,
        })
    }

    /// Attach a note to the edit
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        *self.notes_mut() = Some(notes.into());
        self
    }

    /// Which kind of edit this is
    #[must_use]
    pub const fn kind(&self) -> ModificationKind {
        match self {
            Self::Replace(_) => ModificationKind::Replace,
            Self::Omit(_) => ModificationKind::Omit,
            Self::Add(_) => ModificationKind::Add,
        }
    }

    /// Ingredient name the edit is about: the base ingredient for replace/omit, the new one for add
    #[must_use]
    pub fn target_ingredient(&self) -> &str {
        match self {
            Self::Replace(r) => &r.original_ingredient,
            Self::Omit(o) => &o.original_ingredient,
            Self::Add(a) => &a.new_ingredient,
        }
    }

    /// User note, if any
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        match self {
            Self::Replace(r) => r.notes.as_deref(),
            Self::Omit(o) => o.notes.as_deref(),
            Self::Add(a) => a.notes.as_deref(),
        }
    }

    /// Mutable access to the note slot shared by every variant
    pub fn notes_mut(&mut self) -> &mut Option<String> {
        match self {
            Self::Replace(r) => &mut r.notes,
            Self::Omit(o) => &mut o.notes,
            Self::Add(a) => &mut a.notes,
        }
    }

    /// True when applying the edit leaves the base recipe unchanged
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        match self {
            Self::Replace(r) => r.is_no_op(),
            Self::Omit(_) | Self::Add(_) => false,
        }
    }
}

impl ReplaceModification {
    /// Same ingredient on both sides, so this only edits quantity or unit
    #[must_use]
    pub fn is_quantity_edit(&self) -> bool {
        names_match(&self.original_ingredient, &self.new_ingredient)
    }

    /// Returning to the base ingredient at its base quantity
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        self.is_quantity_edit()
            && amounts_equal(self.original_amount, self.amount)
            && units_match(self.original_unit.as_deref(), self.unit.as_deref())
    }
}

/// Case-insensitive, whitespace-trimmed ingredient name equality
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Case-insensitive substring containment in either direction
///
/// Empty names never match, otherwise every ingredient would contain them.
#[must_use]
pub fn names_overlap(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Unit equality; a missing unit compares equal to an empty one
#[must_use]
pub fn units_match(a: Option<&str>, b: Option<&str>) -> bool {
    let a = a.unwrap_or_default().trim().to_lowercase();
    let b = b.unwrap_or_default().trim().to_lowercase();
    a == b
}

/// Numeric-tolerant amount equality where a missing or NaN amount equals nothing
#[must_use]
pub fn amounts_equal(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) if a.is_finite() && b.is_finite() => (a - b).abs() <= AMOUNT_EPSILON,
        _ => false,
    }
}

/// Accepts JSON numbers, numeric strings and null for amount fields
///
/// Clients send quantities both as numbers and as strings such as `"100"`.
/// Strings that do not parse become NaN so they compare unequal to every amount
/// without failing the request.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.parse::<f64>().unwrap_or(f64::NAN))
            }
        }
        Some(_) => Some(f64::NAN),
    })
}
