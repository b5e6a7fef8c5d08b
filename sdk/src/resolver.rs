//! TaskResolver trait - the uniform execution contract
//!
//! A resolver consumes a task and produces either plain output or a
//! fully-formed result. The provided [`TaskResolver::run`] wrapper normalizes
//! every outcome, including faults, into a [`TaskResult`], so callers never
//! see an error escape a resolver.

use async_trait::async_trait;
use opswell_core::{Payload, Task, TaskError, TaskFault, TaskResult};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// Input field that routes a task to a specific resolver by name.
pub const RESOLVER_NAME_KEY: &str = "resolver_name";

/// Boxed future produced by one resolution attempt.
///
/// The lifetime ties the future to the task borrow it was started with;
/// resolve functions handed to the retry manager return this shape.
pub type ResolveFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Resolution, TaskFault>> + Send + 'a>>;

/// What a successful resolution produced.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Plain output; the wrapper turns it into a completed result.
    Output(Payload),
    /// A fully-formed result, passed through unchanged.
    Explicit(TaskResult),
}

impl From<Payload> for Resolution {
    fn from(output: Payload) -> Self {
        Self::Output(output)
    }
}

impl From<TaskResult> for Resolution {
    fn from(result: TaskResult) -> Self {
        Self::Explicit(result)
    }
}

/// A pluggable unit of work.
///
/// Implementors provide [`resolve`](Self::resolve); the remaining methods
/// have defaults. `resolve` distinguishes two failure modes through
/// [`TaskFault`]: a permanent failure carries a classified [`TaskError`] and
/// is never retried, while a transient fault is retry-eligible.
#[async_trait]
pub trait TaskResolver: Send + Sync {
    /// Registered name of this resolver.
    fn name(&self) -> &str;

    /// Resolve the task.
    ///
    /// Return `Resolution::Output` (or just `payload.into()`) for the common
    /// case; return `Resolution::Explicit` to take full control of the
    /// result's status and message.
    async fn resolve(&self, task: &mut Task) -> Result<Resolution, TaskFault>;

    /// Whether this resolver can handle the given task.
    ///
    /// The default accepts tasks whose input carries no `resolver_name`
    /// field, and tasks whose `resolver_name` is a string equal to this
    /// resolver's name. A present non-string value matches no resolver.
    fn can_handle(&self, task: &Task) -> bool {
        match task.input_data.get(RESOLVER_NAME_KEY) {
            Some(requested) => requested.as_str() == Some(self.name()),
            None => true,
        }
    }

    /// Liveness probe, consulted by schedulers before dispatch.
    async fn health_check(&self) -> bool {
        true
    }

    /// Execute `resolve` and normalize the outcome into a [`TaskResult`].
    ///
    /// Every path lands in a result: plain output becomes a `Completed`
    /// result, an explicit result passes through unchanged, a permanent
    /// fault becomes an `Error` result carrying its `TaskError`, and a
    /// transient fault becomes an `Error` result with an `UnexpectedError`.
    /// This method never returns an error.
    async fn run(&self, task: &mut Task) -> TaskResult {
        match self.resolve(task).await {
            Ok(Resolution::Output(output)) => {
                debug!(task_id = %task.id, resolver = self.name(), "task resolved");
                TaskResult::success(task, output)
            }
            Ok(Resolution::Explicit(result)) => {
                debug!(
                    task_id = %task.id,
                    resolver = self.name(),
                    status = %result.status,
                    "task resolved with explicit result"
                );
                result
            }
            Err(TaskFault::Permanent(error)) => {
                warn!(
                    task_id = %task.id,
                    resolver = self.name(),
                    error_type = %error.error_type,
                    error = %error,
                    "permanent failure"
                );
                TaskResult::from_error(task, error)
            }
            Err(TaskFault::Transient(cause)) => {
                warn!(
                    task_id = %task.id,
                    resolver = self.name(),
                    cause = %cause,
                    "unclassified fault"
                );
                TaskResult::from_error(task, TaskError::unexpected(cause.to_string()))
            }
        }
    }
}

type BoxedResolveFn = Box<dyn Fn(Payload) -> ResolveFuture<'static> + Send + Sync>;

/// Adapter turning a name and an async closure into a [`TaskResolver`].
///
/// The closure receives a copy of the task's input payload, so it cannot
/// mutate the task; implement the trait directly when mutation is needed.
pub struct FnResolver {
    name: String,
    func: BoxedResolveFn,
}

impl FnResolver {
    /// Wrap an async closure as a resolver.
    pub fn new<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resolution, TaskFault>> + Send + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(move |input| Box::pin(func(input))),
        }
    }
}

#[async_trait]
impl TaskResolver for FnResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(&self, task: &mut Task) -> Result<Resolution, TaskFault> {
        (self.func)(task.input_data.clone()).await
    }
}

impl std::fmt::Debug for FnResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnResolver").field("name", &self.name).finish()
    }
}
