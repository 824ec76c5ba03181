//! Domain primitive types used across the cradle workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a container instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a new container ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContainerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Handle to the execution task associated with a container.
///
/// A task is the daemon's record of the container's (formerly) live process
/// group; a container without one is an orphan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    /// The container this task belongs to.
    pub container_id: ContainerId,
    /// PID of the task's init process on the host.
    pub pid: u32,
}

/// Execution state of a task as reported by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// State could not be determined.
    Unknown,
    /// Task has been created but not yet started.
    Created,
    /// Task is actively running.
    Running,
    /// Task has exited.
    Stopped,
    /// Task is paused.
    Paused,
}

impl TaskState {
    /// Returns whether the task is actively running.
    ///
    /// Everything that is not running — created, stopped, paused, unknown —
    /// makes its container a reclamation candidate.
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Paused => write!(f, "paused"),
        }
    }
}
