// ABOUTME: HTTP client, recipe cache, and persistence retry configuration
// ABOUTME: Numeric limits loaded from the environment with clamping to safe ranges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use mealplan_core::constants::cache::{
    DEFAULT_RECIPE_CACHE_MAX_ENTRIES, DEFAULT_RECIPE_CACHE_TTL_SECS,
};
use mealplan_core::constants::http::{
    DEFAULT_HTTP_CONNECT_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS,
};
use mealplan_core::constants::persistence::{
    DEFAULT_MAX_SAVE_ATTEMPTS, MAX_SAVE_ATTEMPTS_CEILING,
};
use mealplan_providers::RecipeCacheSettings;

use super::env_parse_or;

/// Shared HTTP client timeouts
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl HttpClientConfig {
    /// Load HTTP client configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            timeout_secs: env_parse_or("HTTP_CLIENT_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            connect_timeout_secs: env_parse_or(
                "HTTP_CLIENT_CONNECT_TIMEOUT_SECS",
                DEFAULT_HTTP_CONNECT_TIMEOUT_SECS,
            ),
        }
    }
}

/// Base recipe cache sizing
#[derive(Debug, Clone)]
pub struct RecipeCacheConfig {
    /// Lifetime of a cached recipe in seconds
    pub ttl_secs: u64,
    /// Maximum cached recipes
    pub max_entries: usize,
}

impl Default for RecipeCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_RECIPE_CACHE_TTL_SECS,
            max_entries: DEFAULT_RECIPE_CACHE_MAX_ENTRIES,
        }
    }
}

impl RecipeCacheConfig {
    /// Load cache configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            ttl_secs: env_parse_or("RECIPE_CACHE_TTL_SECS", DEFAULT_RECIPE_CACHE_TTL_SECS),
            max_entries: env_parse_or("RECIPE_CACHE_MAX_ENTRIES", DEFAULT_RECIPE_CACHE_MAX_ENTRIES),
        }
    }

    /// Settings for the provider-side resolver
    #[must_use]
    pub const fn settings(&self) -> RecipeCacheSettings {
        RecipeCacheSettings {
            max_entries: self.max_entries,
            ttl: Duration::from_secs(self.ttl_secs),
        }
    }
}

/// Optimistic-concurrency retry policy
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Read-merge-recompute-write attempts before giving up, within `1..=10`
    pub max_save_attempts: u32,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            max_save_attempts: DEFAULT_MAX_SAVE_ATTEMPTS,
        }
    }
}

impl PersistenceConfig {
    /// Load persistence configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_max_save_attempts(env_parse_or(
            "CUSTOMIZATION_MAX_SAVE_ATTEMPTS",
            DEFAULT_MAX_SAVE_ATTEMPTS,
        ))
    }

    /// Policy with the attempt count clamped to `1..=10`
    #[must_use]
    pub fn with_max_save_attempts(attempts: u32) -> Self {
        Self {
            max_save_attempts: attempts.clamp(1, MAX_SAVE_ATTEMPTS_CEILING),
        }
    }
}
