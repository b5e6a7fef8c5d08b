//! Task - the unit of work moving through the lifecycle
//!
//! A [`Task`] carries identity, input, status, and three append-only logs:
//! status history, errors, and results. Status only moves through
//! [`Task::update_status`], which consults the transition table in
//! [`TaskStatus`].

mod metadata;
mod status;

pub use metadata::TaskMetadata;
pub use status::{ParseStatusError, TaskStatus};

use crate::payload::Payload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One accepted status transition. The entry recorded at creation has no
/// `from` status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: Option<TaskStatus>,
    pub to: TaskStatus,
    pub at: DateTime<Utc>,
}

/// One logged error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    #[serde(default)]
    pub details: Option<Payload>,
    pub at: DateTime<Utc>,
}

/// One logged intermediate or final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub data: Payload,
    pub at: DateTime<Utc>,
}

/// A unit of work.
///
/// The id is generated at construction when not supplied and never changes
/// afterwards. Exclusive mutation is enforced by `&mut` borrows; there is no
/// interior locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique id.
    #[serde(default = "generate_task_id")]
    pub id: String,
    /// Short name of what the task does.
    #[serde(default)]
    pub name: String,
    /// Longer human-readable description.
    #[serde(default)]
    pub description: String,
    /// Input handed to the resolver.
    #[serde(default)]
    pub input_data: Payload,
    /// Limits, ownership, and deadline bookkeeping.
    #[serde(default)]
    pub metadata: TaskMetadata,
    /// Current lifecycle status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Accepted transitions, oldest first.
    #[serde(default)]
    pub history: Vec<StatusChange>,
    /// Logged errors, oldest first.
    #[serde(default)]
    pub errors: Vec<ErrorRecord>,
    /// Logged results, oldest first.
    #[serde(default)]
    pub results: Vec<ResultRecord>,
}

fn generate_task_id() -> String {
    Uuid::new_v4().to_string()
}

impl Task {
    /// Create a pending task with a fresh id and empty input.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_task_id(),
            name: name.into(),
            description: String::new(),
            input_data: Payload::new(),
            metadata: TaskMetadata::new(),
            status: TaskStatus::Pending,
            history: vec![StatusChange {
                from: None,
                to: TaskStatus::Pending,
                at: now,
            }],
            errors: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Use the given id instead of a generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the input payload.
    pub fn with_input_data(mut self, input_data: Payload) -> Self {
        self.input_data = input_data;
        self
    }

    /// Add a single input field.
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.input_data.insert(key, value);
        self
    }

    /// Replace the metadata.
    pub fn with_metadata(mut self, metadata: TaskMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Move the task to a new status if the transition table allows it.
    ///
    /// Returns `true` and appends a history entry on success. On a rejected
    /// transition the task is left untouched and `false` is returned.
    pub fn update_status(&mut self, new_status: TaskStatus) -> bool {
        if !self.status.can_transition_to(new_status) {
            return false;
        }
        self.history.push(StatusChange {
            from: Some(self.status),
            to: new_status,
            at: Utc::now(),
        });
        self.status = new_status;
        true
    }

    /// Append an error to the error log. The status is not touched.
    pub fn add_error(&mut self, message: impl Into<String>, details: Option<Payload>) {
        self.errors.push(ErrorRecord {
            message: message.into(),
            details,
            at: Utc::now(),
        });
    }

    /// Append a result to the result log.
    pub fn add_result(&mut self, data: Payload) {
        self.results.push(ResultRecord {
            data,
            at: Utc::now(),
        });
    }

    /// Whether the task's deadline has passed.
    ///
    /// Tasks without a deadline never expire. Once true this stays true,
    /// since the deadline is fixed at construction.
    pub fn is_expired(&self) -> bool {
        match self.metadata.expires_at {
            Some(expires_at) => Utc::now() > expires_at,
            None => false,
        }
    }

    /// Whether the task's own retry budget has room.
    pub fn can_retry(&self) -> bool {
        self.metadata.can_retry()
    }

    /// Consume one retry from the task's budget.
    pub fn increment_retry_count(&mut self) {
        self.metadata.increment_retry_count();
    }
}
