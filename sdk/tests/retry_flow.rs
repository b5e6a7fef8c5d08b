//! End-to-end retry behavior through the public API.

use opswell_sdk::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Resolver that always raises a transient fault.
struct AlwaysBoom {
    calls: AtomicU32,
}

impl AlwaysBoom {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl TaskResolver for AlwaysBoom {
    fn name(&self) -> &str {
        "always-boom"
    }

    async fn resolve(&self, _task: &mut Task) -> Result<Resolution, TaskFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TaskFault::transient(anyhow!("boom")))
    }
}

/// Resolver that rejects every task with a classified failure.
struct Rejecting;

#[async_trait]
impl TaskResolver for Rejecting {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn resolve(&self, task: &mut Task) -> Result<Resolution, TaskFault> {
        Err(TaskError::for_task(task, "nope").into())
    }
}

/// Resolver that fails transiently twice, then succeeds.
struct SucceedsThird {
    calls: AtomicU32,
}

impl SucceedsThird {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl TaskResolver for SucceedsThird {
    fn name(&self) -> &str {
        "succeeds-third"
    }

    async fn resolve(&self, _task: &mut Task) -> Result<Resolution, TaskFault> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < 2 {
            return Err(TaskFault::transient(anyhow!("not yet")));
        }
        let mut output = Payload::new();
        output.insert("success", true);
        Ok(output.into())
    }
}

fn quick_manager(max_retries: u32) -> RetryManager {
    RetryManager::new(
        RetryPolicy::default()
            .with_max_retries(max_retries)
            .with_strategy(BackoffStrategy::Constant)
            .with_base_delay(Duration::from_millis(10))
            .with_jitter_factor(0.0),
    )
}

#[tokio::test]
async fn always_failing_fn_exhausts_budget_and_fails() {
    let manager = quick_manager(3);
    let mut task = Task::new("doomed");
    let calls = AtomicU32::new(0);

    let result = manager
        .execute_with_retry(&mut task, |_task| {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(TaskFault::transient(anyhow!("boom"))) })
        })
        .await;

    assert_eq!(result.status, TaskStatus::Failed);
    assert!(result.message.as_deref().unwrap().contains("boom"));
    assert!(result.error.as_ref().unwrap().message.contains("boom"));
    assert_eq!(task.metadata.retry_count, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // The manager only touches the retry counter.
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.history.len(), 1);
}

#[tokio::test]
async fn classified_failure_fn_is_never_retried() {
    let manager = quick_manager(3);
    let mut task = Task::new("rejected");
    let calls = AtomicU32::new(0);

    let result = manager
        .execute_with_retry(&mut task, |task| {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Err(TaskError::for_task(task, "nope").into()) })
        })
        .await;

    assert_eq!(result.status, TaskStatus::Error);
    assert_eq!(result.error.as_ref().unwrap().message, "nope");
    assert_eq!(
        result.error.as_ref().unwrap().task_id.as_deref(),
        Some(task.id.as_str())
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(task.metadata.retry_count, 0);
}

#[tokio::test]
async fn fn_recovery_within_budget_completes() {
    let manager = quick_manager(3);
    let mut task = Task::new("eventually");
    let calls = AtomicU32::new(0);

    let result = manager
        .execute_with_retry(&mut task, |_task| {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if call < 2 {
                    return Err(TaskFault::transient(anyhow!("not yet")));
                }
                let mut output = Payload::new();
                output.insert("success", true);
                Ok(output.into())
            })
        })
        .await;

    assert_eq!(result.status, TaskStatus::Completed);
    assert_eq!(result.output_data.unwrap().get_bool("success"), Some(true));
    assert_eq!(task.metadata.retry_count, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn resolver_exhausts_budget_and_fails() {
    let manager = quick_manager(3);
    let resolver = Arc::new(AlwaysBoom::new());
    let mut task = Task::new("doomed");

    let result = manager.run_resolver(resolver.clone(), &mut task).await;

    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(task.metadata.retry_count, 3);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn resolver_classified_failure_is_never_retried() {
    let manager = quick_manager(3);
    let mut task = Task::new("rejected");

    let result = manager.run_resolver(Arc::new(Rejecting), &mut task).await;

    assert_eq!(result.status, TaskStatus::Error);
    assert_eq!(result.error.as_ref().unwrap().message, "nope");
    assert_eq!(task.metadata.retry_count, 0);
}

#[tokio::test]
async fn resolver_recovery_within_budget_completes() {
    let manager = quick_manager(3);
    let resolver = Arc::new(SucceedsThird::new());
    let mut task = Task::new("eventually");

    let result = manager.run_resolver(resolver.clone(), &mut task).await;

    assert_eq!(result.status, TaskStatus::Completed);
    assert_eq!(result.output_data.unwrap().get_bool("success"), Some(true));
    assert_eq!(task.metadata.retry_count, 2);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn run_wrapper_never_propagates() {
    // Transient faults surface as an Error result with an UnexpectedError,
    // not as a Rust error.
    let resolver = AlwaysBoom::new();
    let mut task = Task::new("wrapped");

    let result = resolver.run(&mut task).await;

    assert_eq!(result.status, TaskStatus::Error);
    let error = result.error.unwrap();
    assert_eq!(error.error_type, "UnexpectedError");
    assert_eq!(error.message, "boom");
    assert_eq!(error.task_id.as_deref(), Some(task.id.as_str()));
}

#[tokio::test]
async fn run_wrapper_completes_with_output() {
    let resolver = FnResolver::new("shout", |input: Payload| async move {
        let word = input.require_str("word")?.to_uppercase();
        let mut output = Payload::new();
        output.insert("word", word);
        Ok(Resolution::Output(output))
    });

    let mut task = Task::new("shout").with_input("word", "quiet");
    let result = resolver.run(&mut task).await;

    assert!(result.is_success());
    assert_eq!(result.output_data.unwrap().get_str("word"), Some("QUIET"));
}

#[tokio::test]
async fn run_wrapper_surfaces_validation_failures() {
    let resolver = FnResolver::new("shout", |input: Payload| async move {
        let word = input.require_str("word")?.to_uppercase();
        let mut output = Payload::new();
        output.insert("word", word);
        Ok(Resolution::Output(output))
    });

    let mut task = Task::new("shout"); // no input
    let result = resolver.run(&mut task).await;

    assert_eq!(result.status, TaskStatus::Error);
    assert_eq!(result.error.unwrap().error_type, "ValidationError");
}

#[tokio::test]
async fn routing_key_selects_resolver() {
    let mut task = Task::new("routed").with_input(RESOLVER_NAME_KEY, "rejecting");
    assert!(Rejecting.can_handle(&task));
    assert!(!AlwaysBoom::new().can_handle(&task));

    task.input_data.remove(RESOLVER_NAME_KEY);
    assert!(Rejecting.can_handle(&task));
    assert!(AlwaysBoom::new().can_handle(&task));

    // A non-string routing key matches no resolver at all.
    task.input_data.insert(RESOLVER_NAME_KEY, 7);
    assert!(!Rejecting.can_handle(&task));
    assert!(!AlwaysBoom::new().can_handle(&task));
}

#[tokio::test]
async fn lifecycle_walk_with_resolution() {
    // A typical driver: pick up the task, resolve it with retries, then
    // record the outcome on the task itself.
    let manager = quick_manager(3);
    let resolver = Arc::new(SucceedsThird::new());
    let mut task = Task::new("driven");

    assert!(task.update_status(TaskStatus::InProgress));
    let result = manager.run_resolver(resolver, &mut task).await;

    assert!(result.is_success());
    task.add_result(result.output_data.clone().unwrap());
    assert!(task.update_status(TaskStatus::Completed));

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.history.len(), 3);
    assert_eq!(task.results.len(), 1);
    // Terminal now: nothing moves it again.
    assert!(!task.update_status(TaskStatus::Pending));
}

#[tokio::test]
async fn expired_task_observation() {
    let mut task = Task::new("stale").with_metadata(
        TaskMetadata::new().with_expires_at(chrono::Utc::now() - chrono::Duration::seconds(5)),
    );
    assert!(task.is_expired());

    // Expiry is advisory: the retry machinery still works if a caller
    // chooses to push on.
    let manager = quick_manager(1);
    let result = manager
        .run_resolver(Arc::new(AlwaysBoom::new()), &mut task)
        .await;
    assert_eq!(result.status, TaskStatus::Failed);
}

#[tokio::test]
async fn timed_resolution_records_elapsed() {
    let resolver = SucceedsThird::new();
    let mut task = Task::new("timed");

    // First two attempts fail; time just the successful third.
    assert!(resolver.resolve(&mut task).await.is_err());
    assert!(resolver.resolve(&mut task).await.is_err());
    let timed = with_timing(resolver.resolve(&mut task)).await;

    assert!(timed.is_success());
    assert!(timed.elapsed_seconds() >= 0.0);
}
