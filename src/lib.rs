// ABOUTME: Meal-plan recipe customization engine library
// ABOUTME: Merges ingredient edits, recalculates nutrition, and persists customizations in drafts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Meal-plan Customization Engine
//!
//! Users edit recipes inside a meal-plan draft by replacing, omitting, or adding
//! ingredients. This crate keeps one canonical edit set per recipe instance,
//! recomputes full nutrition (calories, macros, vitamins, minerals) from the
//! base recipe, and stores the result with optimistic concurrency.
//!
//! ## Crates
//!
//! - `mealplan-core`: errors, constants, models, collaborator ports
//! - `mealplan-intelligence`: merge, recalculation, scaling, projection
//! - `mealplan-providers`: Edamam and Spoonacular clients
//! - this crate: configuration, logging, the service, draft storage

/// Service construction from configuration
pub mod bootstrap;
/// Environment configuration
pub mod config;
/// Structured logging setup
pub mod logging;
/// Draft storage
pub mod persistence;
/// Customization service
pub mod services;

pub use mealplan_core::{constants, errors, models, ports};
pub use mealplan_intelligence as intelligence;
pub use mealplan_providers as providers;
