//! Test utilities for resolver and retry code
//!
//! Canned resolvers and task fixtures for exercising execution paths without
//! writing a bespoke implementation per test. Available to downstream crates
//! through the `testing` feature.

use crate::resolver::{Resolution, TaskResolver};
use async_trait::async_trait;
use opswell_core::{Payload, Task, TaskError, TaskFault, TaskMetadata};
use std::sync::atomic::{AtomicU32, Ordering};

/// A small pending task with canned input and a fast retry budget, for
/// tests that need a task but do not care about its contents.
pub fn task_fixture(name: &str) -> Task {
    let mut input = Payload::new();
    input.insert("fixture", true);
    Task::new(name)
        .with_description("test fixture")
        .with_input_data(input)
        .with_metadata(
            TaskMetadata::new()
                .with_owner("tests")
                .with_retry_delay_seconds(0.01),
        )
}

/// Resolver that echoes the task's input back as its output.
#[derive(Debug, Default)]
pub struct EchoResolver;

#[async_trait]
impl TaskResolver for EchoResolver {
    fn name(&self) -> &str {
        "echo"
    }

    async fn resolve(&self, task: &mut Task) -> Result<Resolution, TaskFault> {
        Ok(Resolution::Output(task.input_data.clone()))
    }
}

/// Resolver that raises a transient fault a fixed number of times, then
/// echoes the input. Tracks how often it was called.
#[derive(Debug)]
pub struct FlakyResolver {
    failures: u32,
    calls: AtomicU32,
}

impl FlakyResolver {
    /// Fail with a transient fault for the first `failures` calls.
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    /// How many times `resolve` has been called.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskResolver for FlakyResolver {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn resolve(&self, task: &mut Task) -> Result<Resolution, TaskFault> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(TaskFault::transient_msg(format!(
                "boom (call {})",
                call + 1
            )));
        }
        Ok(Resolution::Output(task.input_data.clone()))
    }
}

/// Resolver that always reports a permanent failure with a fixed message.
/// Tracks how often it was called.
#[derive(Debug)]
pub struct PermanentFailureResolver {
    message: String,
    calls: AtomicU32,
}

impl PermanentFailureResolver {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicU32::new(0),
        }
    }

    /// How many times `resolve` has been called.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskResolver for PermanentFailureResolver {
    fn name(&self) -> &str {
        "permanent-failure"
    }

    async fn resolve(&self, task: &mut Task) -> Result<Resolution, TaskFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TaskError::for_task(task, self.message.clone()).into())
    }
}
