// ABOUTME: Shared HTTP client with connection pooling for nutrition and recipe provider calls
// ABOUTME: Process-wide singleton whose timeouts are fixed once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::OnceLock;
use std::time::Duration;

use mealplan_core::constants::http::{
    DEFAULT_HTTP_CONNECT_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS,
};
use mealplan_core::errors::ProviderError;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use tracing::warn;

/// Wait assumed when a 429 carries no `Retry-After`
const RATE_LIMIT_FALLBACK_SECS: u64 = 60;

/// Timeouts chosen at startup
static CLIENT_TIMEOUTS: OnceLock<(u64, u64)> = OnceLock::new();

/// Pooled client reused by every provider
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Record the shared client's timeouts
///
/// Only the first call wins. Calls made after the client was first used are ignored.
pub fn initialize_shared_client(timeout_secs: u64, connect_timeout_secs: u64) {
    if CLIENT_TIMEOUTS
        .set((timeout_secs, connect_timeout_secs))
        .is_err()
    {
        warn!("Shared HTTP client timeouts already initialized, ignoring new values");
    }
}

/// Pooled HTTP client for provider requests
///
/// Uses the defaults from `constants::http` when `initialize_shared_client` never ran.
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let (timeout, connect_timeout) = CLIENT_TIMEOUTS
            .get()
            .copied()
            .unwrap_or((DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_HTTP_CONNECT_TIMEOUT_SECS));

        ClientBuilder::new()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(connect_timeout))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// Body of a successful response, or the error its status maps to
///
/// 429 becomes `RateLimitExceeded` honoring `Retry-After`; 5xx is retryable; other
/// statuses are not.
pub(crate) async fn success_body(
    provider: &str,
    response: Response,
) -> Result<String, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return response
            .text()
            .await
            .map_err(|e| transport_error(provider, &e));
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let message = response.text().await.unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimitExceeded {
            provider: provider.to_owned(),
            retry_after_secs: retry_after.unwrap_or(RATE_LIMIT_FALLBACK_SECS),
            limit_type: "requests".to_owned(),
        });
    }

    Err(ProviderError::ApiError {
        provider: provider.to_owned(),
        status_code: status.as_u16(),
        message,
        retryable: status.is_server_error(),
    })
}

/// Map a `reqwest` failure onto the provider error vocabulary
pub(crate) fn transport_error(provider: &str, error: &reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout {
            provider: provider.to_owned(),
            timeout_secs: CLIENT_TIMEOUTS
                .get()
                .map_or(DEFAULT_HTTP_TIMEOUT_SECS, |(timeout, _)| *timeout),
        }
    } else {
        ProviderError::NetworkError(format!("{provider}: {error}"))
    }
}
