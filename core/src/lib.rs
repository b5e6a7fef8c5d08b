//! # Opswell Core
//!
//! Value types and pure logic for the Opswell task-resolution platform.
//!
//! This crate holds everything that does not need an async runtime: the task
//! lifecycle state machine, the task entity and its metadata, the error and
//! result records, and the backoff math behind retries. It is designed to be
//! consumed by storage and API layers that only need the wire types.
//!
//! ## What's in Core vs SDK
//!
//! **Core** contains plain types and pure functions:
//! - Task, metadata, and the status transition table
//! - Payload (schema-less JSON input/output with typed accessors)
//! - Error taxonomy (classified `TaskError`, two-tier `TaskFault`)
//! - Result records for resolution attempts
//! - Backoff strategies and retry policy configuration
//!
//! **SDK** contains the execution surface:
//! - The async `TaskResolver` trait and its uniform run wrapper
//! - The retry manager (attempt loop, jittered sleeps)
//! - Timing helpers and testing utilities
//!
//! ## Modules
//!
//! - [`task`] - Task entity, metadata, and lifecycle statuses
//! - [`payload`] - JSON object payloads with typed accessors
//! - [`error`] - `TaskError` and the permanent/transient fault split
//! - [`result`] - Per-attempt outcome records
//! - [`retry`] - Backoff strategies and retry policy

pub mod error;
pub mod payload;
pub mod result;
pub mod retry;
pub mod task;

// Re-export the working set at the crate root
pub use error::{TaskError, TaskFault};
pub use payload::Payload;
pub use result::TaskResult;
pub use retry::{BackoffStrategy, ParseStrategyError, PolicyError, RetryPolicy};
pub use task::{
    ErrorRecord, ParseStatusError, ResultRecord, StatusChange, Task, TaskMetadata, TaskStatus,
};
