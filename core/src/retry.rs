//! Backoff strategies and retry policy configuration
//!
//! Pure delay math lives here; the async retry loop (and jitter, which needs
//! a random source) lives in the SDK.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How the delay between retry attempts grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackoffStrategy {
    /// Same delay every attempt.
    Constant,
    /// Delay grows proportionally to the attempt number.
    Linear,
    /// Delay doubles each attempt.
    #[default]
    Exponential,
    /// Delay follows the Fibonacci sequence (1, 1, 2, 3, 5, 8, ...).
    Fibonacci,
}

impl BackoffStrategy {
    /// Raw delay in seconds for a 1-based attempt number, before capping.
    ///
    /// Attempt numbers below 1 are treated as 1.
    pub fn delay_seconds(&self, attempt: u32, base_seconds: f64) -> f64 {
        let attempt = attempt.max(1);
        match self {
            Self::Constant => base_seconds,
            Self::Linear => base_seconds * attempt as f64,
            Self::Exponential => base_seconds * 2f64.powi(attempt.saturating_sub(1) as i32),
            Self::Fibonacci => base_seconds * fibonacci(attempt),
        }
    }

    /// The wire name of this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "CONSTANT",
            Self::Linear => "LINEAR",
            Self::Exponential => "EXPONENTIAL",
            Self::Fibonacci => "FIBONACCI",
        }
    }
}

impl fmt::Display for BackoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backoff strategy: {0}")]
pub struct ParseStrategyError(pub String);

impl FromStr for BackoffStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONSTANT" => Ok(Self::Constant),
            "LINEAR" => Ok(Self::Linear),
            "EXPONENTIAL" => Ok(Self::Exponential),
            "FIBONACCI" => Ok(Self::Fibonacci),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

/// Nth Fibonacci number (1-based: 1, 1, 2, 3, 5, 8, ...), in f64 so large
/// attempt numbers degrade gracefully instead of overflowing.
fn fibonacci(n: u32) -> f64 {
    let (mut a, mut b) = (1.0f64, 1.0f64);
    for _ in 1..n {
        if !b.is_finite() {
            return b;
        }
        let next = a + b;
        a = b;
        b = next;
    }
    a
}

/// Configuration for the retry manager.
///
/// `jitter_factor` is the maximum relative perturbation applied to a delay,
/// clamped to `[0, 1]` on use. Zero disables jitter and makes delays fully
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// How delays grow between attempts.
    pub strategy: BackoffStrategy,
    /// Delay for the first retry.
    pub base_delay: Duration,
    /// Cap applied to the computed delay, before jitter.
    pub max_delay: Duration,
    /// Relative jitter magnitude in `[0, 1]`.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl RetryPolicy {
    /// Default policy suitable for most resolvers.
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        strategy: BackoffStrategy::Exponential,
        base_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(60),
        jitter_factor: 0.1,
    };

    /// Quick retries for interactive paths.
    pub const AGGRESSIVE: Self = Self {
        max_retries: 5,
        strategy: BackoffStrategy::Linear,
        base_delay: Duration::from_millis(200),
        max_delay: Duration::from_secs(5),
        jitter_factor: 0.1,
    };

    /// Slow, widely spaced retries for flaky upstreams.
    pub const PATIENT: Self = Self {
        max_retries: 5,
        strategy: BackoffStrategy::Fibonacci,
        base_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(300),
        jitter_factor: 0.2,
    };

    /// Create a policy with validation.
    pub fn new(
        max_retries: u32,
        strategy: BackoffStrategy,
        base_delay: Duration,
        max_delay: Duration,
        jitter_factor: f64,
    ) -> Result<Self, PolicyError> {
        if !(0.0..=1.0).contains(&jitter_factor) {
            return Err(PolicyError::InvalidValue(
                "jitter_factor must be between 0 and 1".to_string(),
            ));
        }
        if max_delay < base_delay {
            return Err(PolicyError::InvalidValue(
                "max_delay must be at least base_delay".to_string(),
            ));
        }

        Ok(Self {
            max_retries,
            strategy,
            base_delay,
            max_delay,
            jitter_factor,
        })
    }

    /// Set the maximum retry attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff strategy.
    pub fn with_strategy(mut self, strategy: BackoffStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the base delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the delay cap.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the jitter factor.
    pub fn with_jitter_factor(mut self, jitter_factor: f64) -> Self {
        self.jitter_factor = jitter_factor;
        self
    }

    /// Delay for a 1-based attempt number: strategy math capped at
    /// `max_delay`. Jitter is not applied here.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_secs_f64();
        let delay_ms = (self.strategy.delay_seconds(attempt, base) * 1000.0).round() as u64;
        std::cmp::min(Duration::from_millis(delay_ms), self.max_delay)
    }
}

/// Retry policy validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PolicyError {
    /// A policy value is out of range.
    #[error("Invalid policy value: {0}")]
    InvalidValue(String),
}
