//! RetryManager - drives resolution attempts with backoff
//!
//! The manager owns a [`RetryPolicy`] and a seedable jitter source. It
//! mutates only the task's retry counter; moving the task through its
//! lifecycle statuses stays the caller's job.

use crate::resolver::{Resolution, ResolveFuture, TaskResolver};
use opswell_core::{RetryPolicy, Task, TaskFault, TaskResult};
use parking_lot::RwLock;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Retries a resolution function against a task with configurable backoff.
///
/// A single manager is immutable configuration plus a jitter source and can
/// drive any number of tasks; per-task exclusivity comes from the `&mut
/// Task` borrow in [`execute_with_retry`](Self::execute_with_retry).
pub struct RetryManager {
    policy: RetryPolicy,
    jitter_rng: RwLock<ChaCha8Rng>,
}

impl RetryManager {
    /// Create a manager with an entropy-seeded jitter source.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            jitter_rng: RwLock::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// Create a manager whose jittered delays are reproducible.
    pub fn with_jitter_seed(policy: RetryPolicy, seed: u64) -> Self {
        Self {
            policy,
            jitter_rng: RwLock::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// The policy this manager runs with.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Delay before the given 1-based attempt: strategy math, capped at the
    /// policy maximum, then jitter.
    ///
    /// Jitter perturbs the capped delay by a random factor in
    /// `[-jitter_factor, +jitter_factor]`, so a jittered delay can exceed
    /// the cap by at most that fraction. With `jitter_factor` zero the
    /// random source is never consulted and delays are exact.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.policy.delay_for_attempt(attempt);
        let jitter_factor = self.policy.jitter_factor.clamp(0.0, 1.0);
        if jitter_factor == 0.0 {
            return delay;
        }
        let spread = self.jitter_rng.write().gen_range(-jitter_factor..=jitter_factor);
        let jittered_ms = (delay.as_millis() as f64 * (1.0 + spread)).round() as u64;
        Duration::from_millis(jittered_ms)
    }

    /// Whether the task has retry budget left under this manager's policy.
    ///
    /// Terminal statuses never retry. Non-terminal tasks, including those in
    /// `Error` status, retry while their counter is under the policy limit.
    /// The limit comes from the policy; [`Task::can_retry`] consults the
    /// task's own metadata instead.
    pub fn should_retry(&self, task: &Task) -> bool {
        if task.status.is_terminal() {
            return false;
        }
        task.metadata.retry_count < self.policy.max_retries
    }

    /// Drive a resolve function against the task until success, permanent
    /// failure, or an exhausted retry budget.
    ///
    /// The function is handed a fresh borrow of the task on every attempt
    /// and returns a boxed attempt future:
    ///
    /// ```ignore
    /// let result = manager
    ///     .execute_with_retry(&mut task, |task| {
    ///         Box::pin(async move {
    ///             let url = task.input_data.require_str("url")?;
    ///             Ok(fetch(url).await?.into())
    ///         })
    ///     })
    ///     .await;
    /// ```
    ///
    /// Transient faults consume one retry each and back off before the next
    /// attempt. A permanent fault returns an `Error` result immediately with
    /// the counter untouched. When the budget runs out the last cause is
    /// wrapped in a `Failed` result. Only the retry counter is mutated; the
    /// task's status is never changed here.
    pub async fn execute_with_retry<F>(&self, task: &mut Task, mut resolve_fn: F) -> TaskResult
    where
        F: for<'t> FnMut(&'t mut Task) -> ResolveFuture<'t> + Send,
    {
        loop {
            match resolve_fn(task).await {
                Ok(Resolution::Output(output)) => {
                    debug!(
                        task_id = %task.id,
                        retries = task.metadata.retry_count,
                        "task resolved"
                    );
                    return TaskResult::success(task, output);
                }
                Ok(Resolution::Explicit(result)) => {
                    debug!(
                        task_id = %task.id,
                        status = %result.status,
                        "task resolved with explicit result"
                    );
                    return result;
                }
                Err(TaskFault::Permanent(error)) => {
                    warn!(
                        task_id = %task.id,
                        error_type = %error.error_type,
                        error = %error,
                        "permanent failure, not retrying"
                    );
                    return TaskResult::from_error(task, error);
                }
                Err(TaskFault::Transient(cause)) => {
                    task.increment_retry_count();
                    if self.should_retry(task) {
                        let delay = self.delay_for_attempt(task.metadata.retry_count);
                        debug!(
                            task_id = %task.id,
                            attempt = task.metadata.retry_count,
                            delay_ms = delay.as_millis() as u64,
                            cause = %cause,
                            "transient fault, backing off before retry"
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        warn!(
                            task_id = %task.id,
                            retries = task.metadata.retry_count,
                            cause = %cause,
                            "retry budget exhausted"
                        );
                        return TaskResult::failure(task, cause.to_string(), None);
                    }
                }
            }
        }
    }

    /// Feed a [`TaskResolver`]'s `resolve` through the retry loop.
    ///
    /// Convenience over [`execute_with_retry`](Self::execute_with_retry) for
    /// callers that hold a resolver rather than a bare function.
    pub async fn run_resolver(
        &self,
        resolver: Arc<dyn TaskResolver>,
        task: &mut Task,
    ) -> TaskResult {
        self.execute_with_retry(task, move |task| {
            let resolver = Arc::clone(&resolver);
            Box::pin(async move { resolver.resolve(task).await })
        })
        .await
    }
}

impl Default for RetryManager {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl std::fmt::Debug for RetryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryManager")
            .field("policy", &self.policy)
            .finish()
    }
}
