//! Opswell SDK for Rust
//!
//! Execution surface for Opswell resolvers: the [`TaskResolver`] contract,
//! the [`RetryManager`] that drives attempts with backoff, and timing and
//! testing helpers. The underlying value types (tasks, statuses, errors,
//! results, retry policies) live in `opswell-core` and are re-exported here.

pub mod resolver;
pub mod retry;
pub mod timing;

/// Canned resolvers and fixtures for tests.
/// Available to downstream crates with the `testing` feature enabled.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export the core types
pub use opswell_core::{
    BackoffStrategy, ErrorRecord, ParseStatusError, ParseStrategyError, Payload, PolicyError,
    ResultRecord, RetryPolicy, StatusChange, Task, TaskError, TaskFault, TaskMetadata, TaskResult,
    TaskStatus,
};

// Re-export the execution surface
pub use resolver::{FnResolver, Resolution, ResolveFuture, TaskResolver, RESOLVER_NAME_KEY};
pub use retry::RetryManager;
pub use timing::{with_timing, Timed};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::resolver::{
        FnResolver, Resolution, ResolveFuture, TaskResolver, RESOLVER_NAME_KEY,
    };
    pub use crate::retry::RetryManager;
    pub use crate::timing::{with_timing, Timed};
    pub use opswell_core::{
        BackoffStrategy, Payload, RetryPolicy, Task, TaskError, TaskFault, TaskMetadata,
        TaskResult, TaskStatus,
    };

    pub use anyhow::anyhow;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{json, Map, Value};
    pub use uuid::Uuid;
}
