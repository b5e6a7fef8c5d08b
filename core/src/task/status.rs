//! TaskStatus - task lifecycle states and the transition table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a task.
///
/// Serializes as the upper-case string name (`"PENDING"`, `"IN_PROGRESS"`,
/// ...). `Completed` and `Failed` are terminal; `Error` marks a reportable
/// failure that may still be retried or resumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Created, not yet picked up.
    #[default]
    Pending,
    /// Parked until a dependency or schedule releases it.
    Waiting,
    /// Currently being resolved.
    InProgress,
    /// Finished successfully. Terminal.
    Completed,
    /// Gave up permanently. Terminal.
    Failed,
    /// Hit a reportable failure, still eligible for resumption.
    Error,
}

impl TaskStatus {
    /// Every status, in declaration order.
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Pending,
        TaskStatus::Waiting,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Failed,
        TaskStatus::Error,
    ];

    /// The wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Waiting => "WAITING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a transition from this status to `to` is allowed.
    ///
    /// Self-transitions are always rejected, and terminal statuses reject
    /// every outgoing transition.
    pub fn can_transition_to(&self, to: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, to),
            (Pending, Waiting | InProgress | Failed | Error)
                | (Waiting, Pending | InProgress | Failed | Error)
                | (InProgress, Waiting | Completed | Failed | Error)
                | (Error, Pending | InProgress | Failed)
        )
    }

    /// The statuses reachable from this one in a single transition.
    pub fn allowed_transitions(&self) -> &'static [TaskStatus] {
        use TaskStatus::*;
        match self {
            Pending => &[Waiting, InProgress, Failed, Error],
            Waiting => &[Pending, InProgress, Failed, Error],
            InProgress => &[Waiting, Completed, Failed, Error],
            Error => &[Pending, InProgress, Failed],
            Completed | Failed => &[],
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "WAITING" => Ok(Self::Waiting),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            "ERROR" => Ok(Self::Error),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
