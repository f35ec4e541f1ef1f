// ABOUTME: Core types and constants for the meal-plan customization engine
// ABOUTME: Foundation crate with error handling, nutrition models, and collaborator ports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Meal-plan Core
//!
//! Foundation crate providing shared types for the recipe customization engine.
//! This crate is designed to change infrequently, enabling incremental compilation
//! benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `ProviderError`
//! - **constants**: Engine-wide constants (defaults, limits, provider names)
//! - **models**: Modifications, nutrition snapshots, recipes and customizations
//! - **ports**: Traits for the external collaborators (lookup, resolver, persistence)

/// Unified error handling system with standard error codes
pub mod errors;

/// Engine constants organized by domain
pub mod constants;

/// Core data models (modifications, nutrition, recipes)
pub mod models;

/// Collaborator interfaces injected into the engine
pub mod ports;
