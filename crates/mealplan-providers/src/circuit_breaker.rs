// ABOUTME: Circuit breaker guarding nutrition and recipe provider API calls
// ABOUTME: Fails fast while a provider is down and lets one probe through after a cool-down
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant};

use mealplan_core::errors::ProviderError;
use tracing::{info, warn};

/// Breaker position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls pass through; consecutive failures are counted
    Closed,
    /// Calls are refused until the cool-down elapses
    Open,
    /// One probe call is in flight
    HalfOpen,
}

impl BreakerState {
    const fn encode(self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::HalfOpen => 2,
        }
    }

    const fn decode(raw: u8) -> Self {
        match raw {
            0 => Self::Closed,
            1 => Self::Open,
            _ => Self::HalfOpen,
        }
    }
}

/// Thresholds for one provider's breaker
#[derive(Debug, Clone)]
pub struct BreakerSettings {
    /// Consecutive transient failures that open the breaker
    pub trip_after: u32,
    /// Time the breaker stays open before a probe is allowed
    pub cool_down: Duration,
    /// Successful probes needed to close again
    pub close_after: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            trip_after: 5,
            cool_down: Duration::from_secs(30),
            close_after: 1,
        }
    }
}

/// Lock-free breaker shared by all requests hitting one provider
pub struct ProviderBreaker {
    provider: &'static str,
    settings: BreakerSettings,
    state: AtomicU8,
    consecutive_failures: AtomicU32,
    probe_successes: AtomicU32,
    opened_at_ms: AtomicU64,
    epoch: Instant,
}

impl ProviderBreaker {
    /// Breaker with default thresholds
    #[must_use]
    pub fn new(provider: &'static str) -> Self {
        Self::with_settings(provider, BreakerSettings::default())
    }

    /// Breaker with custom thresholds
    #[must_use]
    pub fn with_settings(provider: &'static str, settings: BreakerSettings) -> Self {
        Self {
            provider,
            settings,
            state: AtomicU8::new(BreakerState::Closed.encode()),
            consecutive_failures: AtomicU32::new(0),
            probe_successes: AtomicU32::new(0),
            opened_at_ms: AtomicU64::new(0),
            epoch: Instant::now(),
        }
    }

    /// Current position
    #[must_use]
    pub fn state(&self) -> BreakerState {
        BreakerState::decode(self.state.load(Ordering::SeqCst))
    }

    /// Run `operation` unless the breaker is open
    ///
    /// Only retryable errors count toward tripping; a 4xx or a parse failure says
    /// nothing about provider health.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::CircuitBreakerOpen` while open, otherwise whatever
    /// `operation` returns.
    pub async fn guard<F, T>(&self, operation: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        self.admit()?;
        match operation.await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(error) => {
                if error.is_retryable() {
                    self.on_failure();
                } else if self.state() == BreakerState::HalfOpen {
                    // The provider answered, so it is reachable again
                    self.on_success();
                }
                Err(error)
            }
        }
    }

    fn admit(&self) -> Result<(), ProviderError> {
        match self.state() {
            BreakerState::Closed => Ok(()),
            BreakerState::HalfOpen => Err(self.open_error()),
            BreakerState::Open => {
                if self.remaining_cool_down_ms() > 0 {
                    return Err(self.open_error());
                }
                let probing = self
                    .state
                    .compare_exchange(
                        BreakerState::Open.encode(),
                        BreakerState::HalfOpen.encode(),
                        Ordering::SeqCst,
                        Ordering::SeqCst,
                    )
                    .is_ok();
                if probing {
                    info!(provider = self.provider, "Circuit half-open, probing provider");
                    Ok(())
                } else {
                    Err(self.open_error())
                }
            }
        }
    }

    fn on_success(&self) {
        match self.state() {
            BreakerState::Closed => self.consecutive_failures.store(0, Ordering::SeqCst),
            BreakerState::HalfOpen => {
                let successes = self.probe_successes.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.settings.close_after {
                    self.close();
                } else {
                    // Let the next probe through
                    self.state
                        .store(BreakerState::Open.encode(), Ordering::SeqCst);
                    self.opened_at_ms.store(0, Ordering::SeqCst);
                }
            }
            BreakerState::Open => {}
        }
    }

    fn on_failure(&self) {
        match self.state() {
            BreakerState::Closed => {
                let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                if failures >= self.settings.trip_after {
                    self.trip();
                    warn!(
                        provider = self.provider,
                        failures,
                        cool_down_secs = self.settings.cool_down.as_secs(),
                        "Circuit opened after consecutive provider failures"
                    );
                }
            }
            BreakerState::HalfOpen => {
                self.trip();
                warn!(provider = self.provider, "Recovery probe failed, circuit re-opened");
            }
            BreakerState::Open => self.opened_at_ms.store(self.now_ms(), Ordering::SeqCst),
        }
    }

    /// Force the breaker closed
    pub fn reset(&self) {
        self.close();
    }

    fn trip(&self) {
        self.opened_at_ms.store(self.now_ms(), Ordering::SeqCst);
        self.probe_successes.store(0, Ordering::SeqCst);
        self.state
            .store(BreakerState::Open.encode(), Ordering::SeqCst);
    }

    fn close(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.probe_successes.store(0, Ordering::SeqCst);
        self.state
            .store(BreakerState::Closed.encode(), Ordering::SeqCst);
        info!(provider = self.provider, "Circuit closed, provider recovered");
    }

    fn open_error(&self) -> ProviderError {
        ProviderError::CircuitBreakerOpen {
            provider: self.provider.to_owned(),
            retry_after_secs: self.remaining_cool_down_ms().div_ceil(1000),
        }
    }

    fn remaining_cool_down_ms(&self) -> u64 {
        let cool_down_ms = u64::try_from(self.settings.cool_down.as_millis()).unwrap_or(u64::MAX);
        let opened_at = self.opened_at_ms.load(Ordering::SeqCst);
        let elapsed = self.now_ms().saturating_sub(opened_at);
        cool_down_ms.saturating_sub(elapsed)
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn transient() -> ProviderError {
        ProviderError::NetworkError("connection reset".to_owned())
    }

    #[tokio::test]
    async fn test_opens_after_threshold() {
        let breaker = ProviderBreaker::with_settings(
            "edamam",
            BreakerSettings {
                trip_after: 2,
                cool_down: Duration::from_secs(60),
                close_after: 1,
            },
        );

        for _ in 0..2 {
            let result: Result<(), _> = breaker.guard(async { Err(transient()) }).await;
            assert!(result.is_err());
        }
        assert_eq!(breaker.state(), BreakerState::Open);

        let refused: Result<(), _> = breaker.guard(async { Ok(()) }).await;
        assert!(matches!(
            refused,
            Err(ProviderError::CircuitBreakerOpen { .. })
        ));
    }

    #[tokio::test]
    async fn test_trial_call_closes_after_cool_down() {
        let breaker = ProviderBreaker::with_settings(
            "spoonacular",
            BreakerSettings {
                trip_after: 1,
                cool_down: Duration::from_millis(0),
                close_after: 1,
            },
        );

        let _: Result<(), _> = breaker.guard(async { Err(transient()) }).await;
        assert_eq!(breaker.state(), BreakerState::Open);

        let trial: Result<u8, _> = breaker.guard(async { Ok(7) }).await;
        assert_eq!(trial.unwrap(), 7);
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test]
    async fn test_client_errors_do_not_trip() {
        let breaker = ProviderBreaker::with_settings(
            "edamam",
            BreakerSettings {
                trip_after: 1,
                ..BreakerSettings::default()
            },
        );
        let _: Result<(), _> = breaker
            .guard(async {
                Err(ProviderError::ApiError {
                    provider: "edamam".to_owned(),
                    status_code: 401,
                    message: "bad key".to_owned(),
                    retryable: false,
                })
            })
            .await;
        assert_eq!(breaker.state(), BreakerState::Closed);
    }
}
