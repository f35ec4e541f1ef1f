// ABOUTME: Cache-related constants for base recipe caching
// ABOUTME: TTL and capacity defaults for the in-memory LRU recipe cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default maximum number of base recipes held in memory
pub const DEFAULT_RECIPE_CACHE_MAX_ENTRIES: usize = 1_000;

/// Base recipe cache TTL (24 hours) - provider recipes rarely change
pub const DEFAULT_RECIPE_CACHE_TTL_SECS: u64 = 86_400; // 24 hours
