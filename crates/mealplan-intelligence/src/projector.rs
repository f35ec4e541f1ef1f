// ABOUTME: Projects canonical ingredient edits onto the base ingredient list for display
// ABOUTME: Two passes (add/replace, then omit) plus a human-readable edit summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use mealplan_core::models::{
    names_match, names_overlap, Ingredient, Modification, ModificationKind,
};
use serde::Serialize;
use tracing::debug;

use crate::text::{format_amount, format_ingredient_text};

/// Display line describing one edit (`Replaced butter → olive oil`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationSummary {
    /// Kind of edit
    pub kind: ModificationKind,
    /// Past-tense verb (`Added`, `Removed`, `Replaced`)
    pub action: String,
    /// Ingredient, or `old → new` for replacements
    pub ingredient: String,
    /// Resulting quantity, when stated
    pub amount: Option<String>,
    /// User note
    pub notes: Option<String>,
}

/// Builds the customer-visible ingredient list
#[derive(Debug, Clone, Copy, Default)]
pub struct IngredientListProjector;

impl IngredientListProjector {
    /// Apply edits to the base ingredient list
    ///
    /// Adds and replaces run first so an omit in the same batch can remove the
    /// ingredient an add or replace just produced.
    #[must_use]
    pub fn project(base: &[Ingredient], modifications: &[Modification]) -> Vec<Ingredient> {
        let mut ingredients = base.to_vec();

        for modification in modifications {
            match modification {
                Modification::Add(add) => {
                    if ingredients
                        .iter()
                        .any(|existing| names_match(&existing.name, &add.new_ingredient))
                    {
                        continue;
                    }
                    ingredients.push(Ingredient {
                        name: add.new_ingredient.clone(),
                        amount: add.amount,
                        unit: add.unit.clone(),
                        original: Some(format_ingredient_text(
                            add.amount,
                            add.unit.as_deref(),
                            &add.new_ingredient,
                        )),
                    });
                }
                Modification::Replace(replace) => {
                    let target = ingredients
                        .iter_mut()
                        .find(|existing| names_overlap(&existing.name, &replace.original_ingredient));
                    let Some(target) = target else {
                        debug!(
                            ingredient = %replace.original_ingredient,
                            "Replace target not present in ingredient list"
                        );
                        continue;
                    };
                    target.name.clone_from(&replace.new_ingredient);
                    target.amount = replace.amount.or(target.amount);
                    if replace.unit.is_some() {
                        target.unit.clone_from(&replace.unit);
                    }
                    target.original = Some(format_ingredient_text(
                        target.amount,
                        target.unit.as_deref(),
                        &target.name,
                    ));
                }
                Modification::Omit(_) => {}
            }
        }

        for modification in modifications {
            if let Modification::Omit(omit) = modification {
                ingredients
                    .retain(|existing| !names_overlap(&existing.name, &omit.original_ingredient));
            }
        }

        ingredients
    }

    /// One display line per edit, in edit order
    #[must_use]
    pub fn summarize(modifications: &[Modification]) -> Vec<ModificationSummary> {
        modifications
            .iter()
            .map(|modification| {
                let (action, ingredient, amount, unit) = match modification {
                    Modification::Replace(r) => (
                        "Replaced",
                        format!("{} → {}", r.original_ingredient, r.new_ingredient),
                        r.amount,
                        r.unit.as_deref(),
                    ),
                    Modification::Omit(o) => ("Removed", o.original_ingredient.clone(), None, None),
                    Modification::Add(a) => {
                        ("Added", a.new_ingredient.clone(), a.amount, a.unit.as_deref())
                    }
                };
                let amount = amount.and_then(format_amount).map(|value| {
                    match unit.map(str::trim).filter(|u| !u.is_empty()) {
                        Some(unit) => format!("{value} {unit}"),
                        None => value,
                    }
                });
                ModificationSummary {
                    kind: modification.kind(),
                    action: action.to_owned(),
                    ingredient,
                    amount,
                    notes: modification
                        .notes()
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(str::to_owned),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealplan_core::models::ReplaceModification;

    #[test]
    fn test_replace_keeps_base_quantity_when_none_given() {
        let base = vec![Ingredient::new("whole milk", 250.0, "ml")];
        let replace = Modification::Replace(ReplaceModification {
            original_ingredient: "milk".to_owned(),
            original_amount: None,
            original_unit: None,
            new_ingredient: "oat milk".to_owned(),
            amount: None,
            unit: None,
            notes: None,
        });

        let projected = IngredientListProjector::project(&base, &[replace]);
        assert_eq!(projected[0].name, "oat milk");
        assert_eq!(projected[0].amount, Some(250.0));
        assert_eq!(projected[0].original.as_deref(), Some("250 ml oat milk"));
    }

    #[test]
    fn test_summary_lines() {
        let mods = vec![
            Modification::replace("butter", 100.0, "g", "olive oil", 80.0, "ml"),
            Modification::omit("sugar").with_notes("  "),
            Modification::add("walnuts", 30.0, "g").with_notes("toasted"),
        ];
        let summary = IngredientListProjector::summarize(&mods);

        assert_eq!(summary[0].ingredient, "butter → olive oil");
        assert_eq!(summary[0].amount.as_deref(), Some("80 ml"));
        assert_eq!(summary[1].action, "Removed");
        assert_eq!(summary[1].notes, None);
        assert_eq!(summary[2].notes.as_deref(), Some("toasted"));
    }
}
