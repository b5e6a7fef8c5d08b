//! TaskMetadata - ownership, retry limits, and deadline bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Metadata attached to every task.
///
/// `retry_count` is mutated by retry logic only; everything else is set at
/// construction. `expires_at` is derived once from `created_at` when a
/// timeout is configured and never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Who owns or requested the task. Empty when unknown.
    #[serde(default)]
    pub owner: String,
    /// Advisory priority. Higher means more urgent; nothing in this crate
    /// orders by it.
    #[serde(default)]
    pub priority: i32,
    /// Free-form labels for categorization and filtering.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Maximum retry attempts the task itself advertises.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Advisory delay between retries, in seconds, for callers that schedule
    /// without a retry manager.
    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: f64,
    /// Number of retries consumed so far.
    #[serde(default)]
    pub retry_count: u32,
    /// Execution timeout in seconds, if any.
    #[serde(default)]
    pub timeout_seconds: Option<f64>,
    /// Wall-clock deadline derived from the timeout, if any.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// When the task was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_seconds() -> f64 {
    5.0
}

impl Default for TaskMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskMetadata {
    /// Create metadata with the default limits and the current timestamp.
    pub fn new() -> Self {
        Self {
            owner: String::new(),
            priority: 0,
            tags: Vec::new(),
            max_retries: default_max_retries(),
            retry_delay_seconds: default_retry_delay_seconds(),
            retry_count: 0,
            timeout_seconds: None,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Set the advisory priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the maximum retry attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the advisory retry delay in seconds.
    pub fn with_retry_delay_seconds(mut self, seconds: f64) -> Self {
        self.retry_delay_seconds = seconds;
        self
    }

    /// Set the execution timeout and derive `expires_at` from `created_at`.
    ///
    /// An explicitly set deadline wins: the derivation only runs when no
    /// deadline is present yet.
    pub fn with_timeout_seconds(mut self, seconds: f64) -> Self {
        self.timeout_seconds = Some(seconds);
        if self.expires_at.is_none() {
            let timeout = chrono::Duration::milliseconds((seconds * 1000.0).round() as i64);
            self.expires_at = Some(self.created_at + timeout);
        }
        self
    }

    /// Set an explicit deadline, overriding any derived one.
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// The advisory retry delay as a `Duration`.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis((self.retry_delay_seconds * 1000.0).round() as u64)
    }

    /// Whether the retry budget still has room.
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// Consume one retry from the budget.
    pub fn increment_retry_count(&mut self) {
        self.retry_count += 1;
    }
}
