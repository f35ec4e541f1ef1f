// ABOUTME: Integration tests for the display ingredient list built from canonical edits
// ABOUTME: Two-pass behavior, substring replace matching, and human-readable summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use mealplan_engine::intelligence::IngredientListProjector;
use mealplan_engine::models::{Ingredient, Modification, ModificationKind};

fn names(ingredients: &[Ingredient]) -> Vec<&str> {
    ingredients.iter().map(|i| i.name.as_str()).collect()
}

#[test]
fn test_add_then_omit_in_same_batch_nets_to_nothing() {
    common::init_test_logging();
    let base = vec![
        Ingredient::new("flour", 200.0, "g"),
        Ingredient::new("sugar", 50.0, "g"),
    ];
    let projected = IngredientListProjector::project(
        &base,
        &[
            Modification::add("cinnamon", 1.0, "tsp"),
            Modification::omit("cinnamon"),
        ],
    );
    assert_eq!(projected, base);
}

#[test]
fn test_omit_removes_the_replacement_result() {
    let base = vec![
        Ingredient::new("unsalted butter", 100.0, "g"),
        Ingredient::new("flour", 200.0, "g"),
    ];
    let projected = IngredientListProjector::project(
        &base,
        &[
            Modification::omit("olive oil"),
            Modification::replace("butter", 100.0, "g", "olive oil", 80.0, "ml"),
        ],
    );
    assert_eq!(names(&projected), vec!["flour"]);
}

#[test]
fn test_replace_edits_first_substring_match_in_place() {
    let base = vec![
        Ingredient::new("flour", 200.0, "g"),
        Ingredient::new("unsalted butter", 100.0, "g"),
        Ingredient::new("butter milk", 100.0, "ml"),
    ];
    let projected = IngredientListProjector::project(
        &base,
        &[Modification::replace("Butter", 100.0, "g", "olive oil", 80.0, "ml")],
    );

    assert_eq!(names(&projected), vec!["flour", "olive oil", "butter milk"]);
    assert_eq!(projected[1].amount, Some(80.0));
    assert_eq!(projected[1].unit.as_deref(), Some("ml"));
    assert_eq!(projected[1].original.as_deref(), Some("80 ml olive oil"));
}

#[test]
fn test_replace_without_match_changes_nothing() {
    let base = vec![Ingredient::new("flour", 200.0, "g")];
    let projected = IngredientListProjector::project(
        &base,
        &[Modification::replace("saffron", 1.0, "g", "turmeric", 1.0, "tsp")],
    );
    assert_eq!(projected, base);
}

#[test]
fn test_add_of_existing_ingredient_is_not_duplicated() {
    let base = vec![Ingredient::new("Walnuts", 20.0, "g")];
    let projected =
        IngredientListProjector::project(&base, &[Modification::add("walnuts", 30.0, "g")]);
    assert_eq!(projected, base);
}

#[test]
fn test_added_ingredient_is_appended_with_display_text() {
    let base = vec![Ingredient::new("oats", 50.0, "g")];
    let projected =
        IngredientListProjector::project(&base, &[Modification::add("blueberries", 0.5, "cup")]);
    assert_eq!(names(&projected), vec!["oats", "blueberries"]);
    assert_eq!(projected[1].original.as_deref(), Some("0.5 cup blueberries"));
}

#[test]
fn test_summary_follows_edit_order() {
    let summary = IngredientListProjector::summarize(&[
        Modification::add("walnuts", 30.0, "g"),
        Modification::omit_with_amount("sugar", 50.0, "g").with_notes("less sweet"),
        Modification::replace("butter", 100.0, "g", "olive oil", 80.0, "ml"),
    ]);

    let kinds: Vec<_> = summary.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ModificationKind::Add,
            ModificationKind::Omit,
            ModificationKind::Replace
        ]
    );
    assert_eq!(summary[0].action, "Added");
    assert_eq!(summary[0].amount.as_deref(), Some("30 g"));
    assert_eq!(summary[1].amount, None);
    assert_eq!(summary[1].notes.as_deref(), Some("less sweet"));
    assert_eq!(summary[2].ingredient, "butter → olive oil");
}
