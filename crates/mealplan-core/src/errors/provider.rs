// ABOUTME: Structured error types for nutrition and recipe provider operations
// ABOUTME: Provides domain-specific errors with retry information and rate limit handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

/// Errors raised while talking to an external nutrition or recipe provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider answered with a non-success status
    #[error("{provider} API error ({status_code}): {message}")]
    ApiError {
        /// Provider name
        provider: String,
        /// HTTP status code returned
        status_code: u16,
        /// Error message from the provider
        message: String,
        /// Whether the request may succeed when retried
        retryable: bool,
    },

    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request did not complete within the configured deadline
    #[error("{provider} request timed out after {timeout_secs}s")]
    Timeout {
        /// Provider name
        provider: String,
        /// Deadline that elapsed
        timeout_secs: u64,
    },

    /// Provider payload did not have the expected shape
    #[error("Failed to parse {provider} response field '{field}': {source}")]
    ParseError {
        /// Provider name
        provider: String,
        /// Field or payload section that failed
        field: &'static str,
        /// Underlying parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Provider quota hit
    #[error("{provider} rate limit exceeded ({limit_type}), retry after {retry_after_secs}s")]
    RateLimitExceeded {
        /// Provider name
        provider: String,
        /// Seconds until the quota resets
        retry_after_secs: u64,
        /// Which quota was hit
        limit_type: String,
    },

    /// Circuit breaker refused the call
    #[error("{provider} circuit breaker open, retry after {retry_after_secs}s")]
    CircuitBreakerOpen {
        /// Provider name
        provider: String,
        /// Seconds until a recovery probe is allowed
        retry_after_secs: u64,
    },

    /// Provider is missing credentials or has a bad base URL
    #[error("{provider} configuration error: {details}")]
    ConfigurationError {
        /// Provider name
        provider: String,
        /// What is wrong
        details: String,
    },

    /// Provider answered successfully but had nothing usable
    #[error("{provider} returned no data for '{query}'")]
    EmptyResult {
        /// Provider name
        provider: String,
        /// Query that produced nothing
        query: String,
    },
}

impl ProviderError {
    /// Whether the failure is transient and worth retrying or counting against a breaker
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError { retryable, .. } => *retryable,
            Self::NetworkError(_)
            | Self::Timeout { .. }
            | Self::RateLimitExceeded { .. }
            | Self::CircuitBreakerOpen { .. } => true,
            Self::ParseError { .. } | Self::ConfigurationError { .. } | Self::EmptyResult { .. } => {
                false
            }
        }
    }

    /// Seconds a caller should wait before retrying, when the provider told us
    #[must_use]
    pub const fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimitExceeded {
                retry_after_secs, ..
            }
            | Self::CircuitBreakerOpen {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        }
    }
}
