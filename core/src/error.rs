//! Error types for task resolution
//!
//! Two tiers: [`TaskError`] is the classified, serializable error record that
//! travels inside results and task logs. [`TaskFault`] is the boundary type
//! resolvers return, separating permanent failures (a `TaskError`) from
//! transient faults (an untyped cause) that are worth retrying.

use crate::payload::Payload;
use crate::task::Task;
use serde::{Deserialize, Serialize};

/// Classified error record attached to results and task error logs.
///
/// Displays as its message alone; the remaining fields are context for
/// reporting and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct TaskError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Id of the task this error is bound to, when known.
    #[serde(default)]
    pub task_id: Option<String>,
    /// Machine-readable classification, e.g. `ValidationError`.
    #[serde(default = "default_error_type")]
    pub error_type: String,
    /// Optional structured context.
    #[serde(default)]
    pub details: Option<Payload>,
}

fn default_error_type() -> String {
    "TaskError".to_string()
}

impl TaskError {
    /// Create an unbound error with the default `TaskError` type.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            task_id: None,
            error_type: default_error_type(),
            details: None,
        }
    }

    /// Create an error bound to the given task.
    pub fn for_task(task: &Task, message: impl Into<String>) -> Self {
        Self::new(message).with_task_id(task.id.clone())
    }

    /// Create a `ValidationError`, used when task input fails validation.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message).with_error_type("ValidationError")
    }

    /// Create an `UnsupportedOperationError`, used when a resolver is handed
    /// a task it does not know how to process.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(message).with_error_type("UnsupportedOperationError")
    }

    /// Create an `UnexpectedError`, the classification given to unclassified
    /// faults when they are normalized into a result.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(message).with_error_type("UnexpectedError")
    }

    /// Bind the error to a task id.
    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Set the error classification.
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = error_type.into();
        self
    }

    /// Attach structured context.
    pub fn with_details(mut self, details: Payload) -> Self {
        self.details = Some(details);
        self
    }
}

/// Boundary error returned by resolvers.
///
/// `Permanent` carries a classified [`TaskError`] and is never retried.
/// `Transient` carries an unclassified cause and is eligible for retry up to
/// the configured limit.
#[derive(Debug, thiserror::Error)]
pub enum TaskFault {
    /// Classified domain failure. Retrying will not help.
    #[error(transparent)]
    Permanent(#[from] TaskError),
    /// Unclassified fault, typically infrastructure trouble.
    #[error(transparent)]
    Transient(#[from] anyhow::Error),
}

impl TaskFault {
    /// Wrap any error as a transient fault.
    pub fn transient(cause: impl Into<anyhow::Error>) -> Self {
        Self::Transient(cause.into())
    }

    /// Wrap a message as a transient fault.
    pub fn transient_msg(message: impl Into<String>) -> Self {
        Self::Transient(anyhow::Error::msg(message.into()))
    }

    /// Whether this fault is a classified permanent failure.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    /// Whether this fault is eligible for retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<std::io::Error> for TaskFault {
    fn from(err: std::io::Error) -> Self {
        Self::Transient(err.into())
    }
}

impl From<serde_json::Error> for TaskFault {
    fn from(err: serde_json::Error) -> Self {
        Self::Transient(err.into())
    }
}
