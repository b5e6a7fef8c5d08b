//! TaskResult - outcome of one resolution attempt

use crate::error::TaskError;
use crate::payload::Payload;
use crate::task::{Task, TaskStatus};
use serde::{Deserialize, Serialize};

/// Outcome of one resolution attempt against a task.
///
/// Results are value objects: constructed once, never mutated. A successful
/// result carries output, a failed one carries an error, and both carry the
/// id of the task they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Id of the task this result belongs to.
    pub task_id: String,
    /// Status the attempt ended in.
    pub status: TaskStatus,
    /// Output of a successful attempt.
    #[serde(default)]
    pub output_data: Option<Payload>,
    /// Error of a failed attempt.
    #[serde(default)]
    pub error: Option<TaskError>,
    /// Optional human-readable summary.
    #[serde(default)]
    pub message: Option<String>,
}

impl TaskResult {
    /// Successful outcome with the given output. Status `Completed`.
    pub fn success(task: &Task, output_data: Payload) -> Self {
        Self {
            task_id: task.id.clone(),
            status: TaskStatus::Completed,
            output_data: Some(output_data),
            error: None,
            message: None,
        }
    }

    /// Permanently failed outcome. Status `Failed`, with an error
    /// synthesized from the message and optional details.
    pub fn failure(task: &Task, message: impl Into<String>, details: Option<Payload>) -> Self {
        let message = message.into();
        let mut error = TaskError::for_task(task, message.clone());
        if let Some(details) = details {
            error = error.with_details(details);
        }
        Self {
            task_id: task.id.clone(),
            status: TaskStatus::Failed,
            output_data: None,
            error: Some(error),
            message: Some(message),
        }
    }

    /// Reportable-but-not-final outcome carrying an existing error. Status
    /// `Error`. The error is bound to the task if it was unbound.
    pub fn from_error(task: &Task, mut error: TaskError) -> Self {
        if error.task_id.is_none() {
            error.task_id = Some(task.id.clone());
        }
        Self {
            task_id: task.id.clone(),
            status: TaskStatus::Error,
            output_data: None,
            message: Some(error.message.clone()),
            error: Some(error),
        }
    }

    /// Set the summary message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Whether the attempt completed successfully.
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Whether the attempt ended in `Failed` or `Error`.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, TaskStatus::Failed | TaskStatus::Error)
    }
}
