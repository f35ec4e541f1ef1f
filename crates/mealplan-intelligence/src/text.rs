// ABOUTME: Ingredient text formatting for provider queries and display lines
// ABOUTME: Builds "<amount> <unit> <name>" strings with compact number rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use mealplan_core::models::round_quantity;

/// Render an amount without trailing zeros (`100`, `1.5`, `0.33`)
#[must_use]
pub fn format_amount(amount: f64) -> Option<String> {
    if !amount.is_finite() {
        return None;
    }
    let rounded = round_quantity(amount);
    if rounded.fract() == 0.0 {
        Some(format!("{rounded:.0}"))
    } else {
        let text = format!("{rounded:.2}");
        Some(text.trim_end_matches('0').to_owned())
    }
}

/// Build the free-text line a nutrition provider parses, e.g. `100 g butter`
///
/// Missing or unparseable parts are left out, so `walnuts` alone is valid.
#[must_use]
pub fn format_ingredient_text(amount: Option<f64>, unit: Option<&str>, name: &str) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(3);
    if let Some(amount) = amount.and_then(format_amount) {
        parts.push(amount);
    }
    if let Some(unit) = unit.map(str::trim).filter(|u| !u.is_empty()) {
        parts.push(unit.to_owned());
    }
    let name = name.trim();
    if !name.is_empty() {
        parts.push(name.to_owned());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_amounts_have_no_decimal_point() {
        assert_eq!(
            format_ingredient_text(Some(100.0), Some("g"), "butter"),
            "100 g butter"
        );
    }

    #[test]
    fn test_fractional_amounts_trimmed() {
        assert_eq!(
            format_ingredient_text(Some(1.5), Some("cup"), "milk"),
            "1.5 cup milk"
        );
        assert_eq!(format_amount(0.333), Some("0.33".to_owned()));
    }

    #[test]
    fn test_missing_parts_are_skipped() {
        assert_eq!(format_ingredient_text(None, None, " walnuts "), "walnuts");
        assert_eq!(
            format_ingredient_text(Some(f64::NAN), Some(" "), "salt"),
            "salt"
        );
        assert_eq!(format_ingredient_text(Some(2.0), None, "eggs"), "2 eggs");
    }
}
