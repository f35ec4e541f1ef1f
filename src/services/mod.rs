// ABOUTME: Business services built on the customization engine
// ABOUTME: Recipe customization orchestration with bounded optimistic-concurrency retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Read-merge-recompute-write pipeline for recipe edits
pub mod customization;

pub use customization::{
    BaseRecipeOrigin, CustomizationOutcome, CustomizationRequest, CustomizationService,
    CustomizedRecipeView,
};
