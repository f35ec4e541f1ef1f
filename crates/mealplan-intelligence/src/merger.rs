// ABOUTME: Merges newly submitted ingredient edits into the stored canonical edit set
// ABOUTME: Identity matching, chained replacements, cancellation, and no-net-change elimination
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Modification Merger
//!
//! Callers only ever submit the edits they just made. The merger folds them into
//! the stored history so the result holds at most one entry per ingredient, each
//! expressing the net change from the base recipe.
//!
//! Incoming edits are matched against stored ones in a fixed priority order:
//!
//! 1. replace/replace where both only change quantity of the same ingredient
//! 2. replace/replace where the incoming edit targets the stored edit's result (chained)
//! 3. replace/replace on the same base ingredient
//! 4. omit/omit on the same ingredient
//! 5. omit over a replace of, or to, the same ingredient
//! 6. add/add of the same ingredient
//! 7. omit of an added ingredient, which cancels both
//!
//! Anything unmatched is appended. A replace that ends up restoring the base
//! ingredient at its base quantity is removed.

use mealplan_core::constants::nutrition::DEFAULT_OMIT_AMOUNT;
use mealplan_core::models::{
    names_match, names_overlap, AddModification, Ingredient, Modification, ModificationKind,
    OmitModification, ReplaceModification,
};
use serde::Serialize;
use tracing::debug;

/// What the merger did with one incoming edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeAction {
    /// Missing base quantity taken from the base ingredient list
    OriginalBackfilled,
    /// Missing base quantity could not be found; defaults used
    OriginalDefaulted,
    /// Quantity edit merged into an earlier quantity edit of the same ingredient
    QuantityEdited,
    /// Replace of a previous replacement's result, folded back onto the true base
    ChainedReplace,
    /// Replace of an ingredient that was already replaced
    ReplacedSameBase,
    /// Second omit of the same ingredient
    DuplicateOmit,
    /// Omit replaced a stored replace of the same ingredient
    OmitSupersededReplace,
    /// Add of an ingredient that was already added; quantity updated
    AddUpdated,
    /// Omit of an added ingredient; both edits dropped
    AddCancelled,
    /// Replace of an ingredient that was previously omitted
    ReplaceSupersededOmit,
    /// Replace of an ingredient that was itself added; the add now carries the new ingredient
    AddedIngredientReplaced,
    /// Add of an ingredient that was previously omitted; turned into a quantity edit
    OmittedIngredientRestored,
    /// No stored edit matched
    Appended,
    /// Entry restored the base ingredient unchanged and was removed
    NoNetChangeRemoved,
}

/// One line of the merge audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeStep {
    /// Kind of the edit being processed
    pub kind: ModificationKind,
    /// Ingredient the edit targets
    pub ingredient: String,
    /// Outcome
    pub action: MergeAction,
}

/// Canonical edit set plus the audit trail that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeOutcome {
    /// Canonical edits, at most one per ingredient
    pub modifications: Vec<Modification>,
    /// What happened to each edit
    pub trace: Vec<MergeStep>,
}

/// Folds incoming edits into the stored canonical set
#[derive(Debug, Clone, Copy, Default)]
pub struct ModificationMerger;

impl ModificationMerger {
    /// Merge `incoming` into `existing`, relative to the base recipe's ingredient list
    ///
    /// Never fails: unresolved base quantities fall back to defaults.
    #[must_use]
    pub fn merge(
        existing: &[Modification],
        incoming: &[Modification],
        base_ingredients: &[Ingredient],
    ) -> MergeOutcome {
        let mut trace = Vec::new();
        let mut canonical: Vec<Modification> =
            Vec::with_capacity(existing.len() + incoming.len());

        for modification in existing {
            let modification = Self::backfill(modification.clone(), base_ingredients, &mut trace);
            if modification.is_no_op() {
                trace.push(step(&modification, MergeAction::NoNetChangeRemoved));
            } else {
                canonical.push(modification);
            }
        }

        for modification in incoming {
            let modification = Self::backfill(modification.clone(), base_ingredients, &mut trace);
            match modification {
                Modification::Replace(replace) => {
                    Self::apply_replace(&mut canonical, replace, &mut trace);
                }
                Modification::Omit(omit) => Self::apply_omit(&mut canonical, omit, &mut trace),
                Modification::Add(add) => Self::apply_add(&mut canonical, add, &mut trace),
            }
        }

        debug!(
            existing = existing.len(),
            incoming = incoming.len(),
            canonical = canonical.len(),
            "Merged ingredient modifications"
        );

        MergeOutcome {
            modifications: canonical,
            trace,
        }
    }

    /// Fill in missing base quantities from the base ingredient list
    ///
    /// Matching is case-insensitive substring in either direction. A matched base
    /// ingredient supplies its own quantity, an empty unit when it has none.
    /// Unresolved replaces default to the new quantity (or 1), unresolved omits to 1.
    #[must_use]
    pub fn backfill(
        modification: Modification,
        base_ingredients: &[Ingredient],
        trace: &mut Vec<MergeStep>,
    ) -> Modification {
        match modification {
            Modification::Replace(mut replace) => {
                if replace.original_amount.is_some() && replace.original_unit.is_some() {
                    return Modification::Replace(replace);
                }
                let found = find_base_ingredient(base_ingredients, &replace.original_ingredient);
                let fallback = OriginalQuantity {
                    amount: replace.amount,
                    unit: replace.unit.clone(),
                };
                let action = fill_original(
                    &mut replace.original_amount,
                    &mut replace.original_unit,
                    found,
                    fallback,
                );
                let modification = Modification::Replace(replace);
                trace.push(step(&modification, action));
                modification
            }
            Modification::Omit(mut omit) => {
                if omit.original_amount.is_some() && omit.original_unit.is_some() {
                    return Modification::Omit(omit);
                }
                let found = find_base_ingredient(base_ingredients, &omit.original_ingredient);
                let action = fill_original(
                    &mut omit.original_amount,
                    &mut omit.original_unit,
                    found,
                    OriginalQuantity::default(),
                );
                let modification = Modification::Omit(omit);
                trace.push(step(&modification, action));
                modification
            }
            add @ Modification::Add(_) => add,
        }
    }

    fn apply_replace(
        canonical: &mut Vec<Modification>,
        incoming: ReplaceModification,
        trace: &mut Vec<MergeStep>,
    ) {
        let matched = find_replace(canonical, |existing| {
            existing.is_quantity_edit()
                && incoming.is_quantity_edit()
                && names_match(&existing.original_ingredient, &incoming.original_ingredient)
        })
        .map(|found| (found, MergeAction::QuantityEdited))
        .or_else(|| {
            find_replace(canonical, |existing| {
                names_match(&incoming.original_ingredient, &existing.new_ingredient)
            })
            .map(|found| (found, MergeAction::ChainedReplace))
        })
        .or_else(|| {
            find_replace(canonical, |existing| {
                names_match(&incoming.original_ingredient, &existing.original_ingredient)
            })
            .map(|found| (found, MergeAction::ReplacedSameBase))
        });

        if let Some(((index, existing), action)) = matched {
            let merged = chain_onto_base(&existing, incoming);
            store(canonical, index, Modification::Replace(merged), action, trace);
            return;
        }

        if let Some((index, omitted)) = find_omit(canonical, |existing| {
            names_match(&incoming.original_ingredient, &existing.original_ingredient)
        }) {
            let merged = ReplaceModification {
                original_ingredient: omitted.original_ingredient,
                original_amount: omitted.original_amount.or(incoming.original_amount),
                original_unit: omitted.original_unit.or(incoming.original_unit),
                new_ingredient: incoming.new_ingredient,
                amount: incoming.amount,
                unit: incoming.unit,
                notes: incoming.notes.or(omitted.notes),
            };
            store(
                canonical,
                index,
                Modification::Replace(merged),
                MergeAction::ReplaceSupersededOmit,
                trace,
            );
            return;
        }

        if let Some((index, added)) = find_add(canonical, |existing| {
            names_match(&incoming.original_ingredient, &existing.new_ingredient)
        }) {
            let merged = AddModification {
                new_ingredient: incoming.new_ingredient,
                amount: incoming.amount,
                unit: incoming.unit,
                notes: incoming.notes.or(added.notes),
            };
            store(
                canonical,
                index,
                Modification::Add(merged),
                MergeAction::AddedIngredientReplaced,
                trace,
            );
            return;
        }

        append(canonical, Modification::Replace(incoming), trace);
    }

    fn apply_omit(
        canonical: &mut Vec<Modification>,
        incoming: OmitModification,
        trace: &mut Vec<MergeStep>,
    ) {
        if let Some((index, mut existing)) = find_omit(canonical, |existing| {
            names_match(&incoming.original_ingredient, &existing.original_ingredient)
        }) {
            if incoming.notes.is_some() {
                existing.notes = incoming.notes;
            }
            store(
                canonical,
                index,
                Modification::Omit(existing),
                MergeAction::DuplicateOmit,
                trace,
            );
            return;
        }

        if let Some((index, replaced)) = find_replace(canonical, |existing| {
            names_match(&incoming.original_ingredient, &existing.original_ingredient)
                || names_match(&incoming.original_ingredient, &existing.new_ingredient)
        }) {
            let merged = OmitModification {
                original_ingredient: replaced.original_ingredient,
                original_amount: replaced.original_amount,
                original_unit: replaced.original_unit,
                notes: incoming.notes.or(replaced.notes),
            };
            store(
                canonical,
                index,
                Modification::Omit(merged),
                MergeAction::OmitSupersededReplace,
                trace,
            );
            return;
        }

        if let Some((index, _)) = find_add(canonical, |existing| {
            names_match(&incoming.original_ingredient, &existing.new_ingredient)
        }) {
            canonical.remove(index);
            trace.push(MergeStep {
                kind: ModificationKind::Omit,
                ingredient: incoming.original_ingredient,
                action: MergeAction::AddCancelled,
            });
            return;
        }

        append(canonical, Modification::Omit(incoming), trace);
    }

    fn apply_add(
        canonical: &mut Vec<Modification>,
        incoming: AddModification,
        trace: &mut Vec<MergeStep>,
    ) {
        if let Some((index, mut existing)) = find_add(canonical, |existing| {
            names_match(&incoming.new_ingredient, &existing.new_ingredient)
        }) {
            existing.amount = incoming.amount;
            existing.unit = incoming.unit;
            if incoming.notes.is_some() {
                existing.notes = incoming.notes;
            }
            store(
                canonical,
                index,
                Modification::Add(existing),
                MergeAction::AddUpdated,
                trace,
            );
            return;
        }

        if let Some((index, omitted)) = find_omit(canonical, |existing| {
            names_match(&incoming.new_ingredient, &existing.original_ingredient)
        }) {
            let restored_amount = incoming.amount.or(omitted.original_amount);
            let restored_unit = if incoming.amount.is_some() {
                incoming.unit
            } else {
                omitted.original_unit.clone()
            };
            let merged = ReplaceModification {
                original_ingredient: omitted.original_ingredient,
                original_amount: omitted.original_amount,
                original_unit: omitted.original_unit,
                new_ingredient: incoming.new_ingredient,
                amount: restored_amount,
                unit: restored_unit,
                notes: incoming.notes.or(omitted.notes),
            };
            store(
                canonical,
                index,
                Modification::Replace(merged),
                MergeAction::OmittedIngredientRestored,
                trace,
            );
            return;
        }

        append(canonical, Modification::Add(incoming), trace);
    }
}

/// Keep the stored entry's base side and adopt the incoming entry's result side
fn chain_onto_base(
    existing: &ReplaceModification,
    incoming: ReplaceModification,
) -> ReplaceModification {
    ReplaceModification {
        original_ingredient: existing.original_ingredient.clone(),
        original_amount: existing.original_amount,
        original_unit: existing.original_unit.clone(),
        new_ingredient: incoming.new_ingredient,
        amount: incoming.amount,
        unit: incoming.unit,
        notes: incoming.notes.or_else(|| existing.notes.clone()),
    }
}

fn store(
    canonical: &mut Vec<Modification>,
    index: usize,
    merged: Modification,
    action: MergeAction,
    trace: &mut Vec<MergeStep>,
) {
    trace.push(step(&merged, action));
    if merged.is_no_op() {
        trace.push(step(&merged, MergeAction::NoNetChangeRemoved));
        canonical.remove(index);
    } else if let Some(slot) = canonical.get_mut(index) {
        *slot = merged;
    }
}

fn append(canonical: &mut Vec<Modification>, incoming: Modification, trace: &mut Vec<MergeStep>) {
    if incoming.is_no_op() {
        trace.push(step(&incoming, MergeAction::NoNetChangeRemoved));
        return;
    }
    trace.push(step(&incoming, MergeAction::Appended));
    canonical.push(incoming);
}

fn step(modification: &Modification, action: MergeAction) -> MergeStep {
    MergeStep {
        kind: modification.kind(),
        ingredient: modification.target_ingredient().to_owned(),
        action,
    }
}

/// Quantity used when the base ingredient list has nothing to offer
#[derive(Default)]
struct OriginalQuantity {
    amount: Option<f64>,
    unit: Option<String>,
}

/// Complete a missing original amount and unit
///
/// Fields the caller already supplied are kept. A resolved base ingredient wins
/// over `fallback`; a unitless one ("2 eggs") yields an empty unit.
fn fill_original(
    amount: &mut Option<f64>,
    unit: &mut Option<String>,
    base: Option<&Ingredient>,
    fallback: OriginalQuantity,
) -> MergeAction {
    match base {
        Some(base) => {
            if unit.is_none() {
                *unit = Some(base.unit.clone().unwrap_or_default());
            }
            match amount.or(base.amount) {
                Some(resolved) => {
                    *amount = Some(resolved);
                    MergeAction::OriginalBackfilled
                }
                None => {
                    *amount = Some(DEFAULT_OMIT_AMOUNT);
                    MergeAction::OriginalDefaulted
                }
            }
        }
        None => {
            *amount = amount.or(fallback.amount).or(Some(DEFAULT_OMIT_AMOUNT));
            if unit.is_none() {
                *unit = Some(fallback.unit.unwrap_or_default());
            }
            MergeAction::OriginalDefaulted
        }
    }
}

fn find_base_ingredient<'a>(base: &'a [Ingredient], name: &str) -> Option<&'a Ingredient> {
    base.iter()
        .find(|ingredient| names_overlap(&ingredient.name, name))
}

fn find_replace(
    canonical: &[Modification],
    predicate: impl Fn(&ReplaceModification) -> bool,
) -> Option<(usize, ReplaceModification)> {
    canonical
        .iter()
        .enumerate()
        .find_map(|(index, modification)| match modification {
            Modification::Replace(replace) if predicate(replace) => Some((index, replace.clone())),
            _ => None,
        })
}

fn find_omit(
    canonical: &[Modification],
    predicate: impl Fn(&OmitModification) -> bool,
) -> Option<(usize, OmitModification)> {
    canonical
        .iter()
        .enumerate()
        .find_map(|(index, modification)| match modification {
            Modification::Omit(omit) if predicate(omit) => Some((index, omit.clone())),
            _ => None,
        })
}

fn find_add(
    canonical: &[Modification],
    predicate: impl Fn(&AddModification) -> bool,
) -> Option<(usize, AddModification)> {
    canonical
        .iter()
        .enumerate()
        .find_map(|(index, modification)| match modification {
            Modification::Add(add) if predicate(add) => Some((index, add.clone())),
            _ => None,
        })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn base() -> Vec<Ingredient> {
        vec![
            Ingredient::new("unsalted butter", 100.0, "g"),
            Ingredient::new("sugar", 50.0, "g"),
            Ingredient::named("salt"),
        ]
    }

    #[test]
    fn test_backfill_uses_substring_match() {
        let mut trace = Vec::new();
        let filled = ModificationMerger::backfill(Modification::omit("Butter"), &base(), &mut trace);
        assert_eq!(
            filled,
            Modification::omit_with_amount("Butter", 100.0, "g")
        );
        assert_eq!(trace[0].action, MergeAction::OriginalBackfilled);
    }

    #[test]
    fn test_backfill_defaults_when_unresolved() {
        let mut trace = Vec::new();
        let filled = ModificationMerger::backfill(Modification::omit("saffron"), &base(), &mut trace);
        assert_eq!(filled, Modification::omit_with_amount("saffron", 1.0, ""));
        assert_eq!(trace[0].action, MergeAction::OriginalDefaulted);

        let replace = Modification::Replace(ReplaceModification {
            original_ingredient: "saffron".to_owned(),
            original_amount: None,
            original_unit: None,
            new_ingredient: "turmeric".to_owned(),
            amount: Some(2.0),
            unit: Some("tsp".to_owned()),
            notes: None,
        });
        let filled = ModificationMerger::backfill(replace, &base(), &mut trace);
        match filled {
            Modification::Replace(r) => {
                assert_eq!(r.original_amount, Some(2.0));
                assert_eq!(r.original_unit.as_deref(), Some("tsp"));
            }
            other => panic!("expected replace, got {other:?}"),
        }
    }

    #[test]
    fn test_ingredient_without_amount_defaults_amount_only() {
        let mut trace = Vec::new();
        let filled = ModificationMerger::backfill(Modification::omit("salt"), &base(), &mut trace);
        assert_eq!(filled, Modification::omit_with_amount("salt", 1.0, ""));
    }

    #[test]
    fn test_replace_after_omit_supersedes_it() {
        let existing = vec![Modification::omit_with_amount("sugar", 50.0, "g")];
        let incoming = vec![Modification::replace("sugar", 50.0, "g", "maple syrup", 40.0, "ml")];

        let outcome = ModificationMerger::merge(&existing, &incoming, &base());
        assert_eq!(
            outcome.modifications,
            vec![Modification::replace("sugar", 50.0, "g", "maple syrup", 40.0, "ml")]
        );
        assert_eq!(
            outcome.trace.last().map(|s| s.action),
            Some(MergeAction::ReplaceSupersededOmit)
        );
    }

    #[test]
    fn test_add_after_omit_restores_base() {
        let existing = vec![Modification::omit_with_amount("sugar", 50.0, "g")];
        let incoming = vec![Modification::add("sugar", 50.0, "g")];

        let outcome = ModificationMerger::merge(&existing, &incoming, &base());
        assert!(outcome.modifications.is_empty());
    }
}
