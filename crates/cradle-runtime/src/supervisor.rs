//! Task supervision: status queries, termination, and deletion.

use async_trait::async_trait;
use cradle_common::error::{CradleError, Result};
use cradle_common::types::{ContainerId, TaskHandle, TaskState};
use cradle_proto::containerd::services::tasks::v1::{DeleteTaskRequest, GetRequest, KillRequest};
use cradle_proto::containerd::v1::types::Status;

use crate::client::RuntimeClient;

/// Signal used for forced termination.
pub const SIGKILL: u32 = 9;

/// Access to the execution tasks of one namespace.
#[async_trait]
pub trait TaskSupervisor: Send + Sync {
    /// Looks up the task associated with a container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container has no task or the lookup fails;
    /// the two cases are not distinguished by the daemon API.
    async fn task(&self, id: &ContainerId) -> Result<TaskHandle>;

    /// Fetches the current state of a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the status query fails.
    async fn state(&self, task: &TaskHandle) -> Result<TaskState>;

    /// Forcibly terminates a task (SIGKILL to the whole process group).
    ///
    /// # Errors
    ///
    /// Returns an error if the kill request is rejected.
    async fn kill(&self, task: &TaskHandle) -> Result<()>;

    /// Deletes a task record from the daemon.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot be deleted.
    async fn delete_task(&self, task: &TaskHandle) -> Result<()>;
}

/// [`TaskSupervisor`] backed by the containerd tasks service.
#[derive(Debug, Clone)]
pub struct ContainerdSupervisor {
    client: RuntimeClient,
}

impl ContainerdSupervisor {
    /// Creates a supervisor over an established client.
    #[must_use]
    pub fn new(client: RuntimeClient) -> Self {
        Self { client }
    }

    async fn get_process(
        &self,
        id: &ContainerId,
    ) -> Result<cradle_proto::containerd::v1::types::Process> {
        let response = self
            .client
            .tasks()
            .get(self.client.request(GetRequest {
                container_id: id.to_string(),
                exec_id: String::new(),
            }))
            .await
            .map_err(|status| CradleError::rpc("Tasks/Get", status))?;
        response
            .into_inner()
            .process
            .ok_or(CradleError::MalformedResponse {
                operation: "Tasks/Get",
                message: "response carried no process".into(),
            })
    }
}

#[async_trait]
impl TaskSupervisor for ContainerdSupervisor {
    async fn task(&self, id: &ContainerId) -> Result<TaskHandle> {
        let process = self.get_process(id).await?;
        Ok(TaskHandle {
            container_id: id.clone(),
            pid: process.pid,
        })
    }

    async fn state(&self, task: &TaskHandle) -> Result<TaskState> {
        let process = self.get_process(&task.container_id).await?;
        Ok(state_from_status(process.status))
    }

    async fn kill(&self, task: &TaskHandle) -> Result<()> {
        let _ = self
            .client
            .tasks()
            .kill(self.client.request(KillRequest {
                container_id: task.container_id.to_string(),
                exec_id: String::new(),
                signal: SIGKILL,
                all: true,
            }))
            .await
            .map_err(|status| CradleError::rpc("Tasks/Kill", status))?;
        Ok(())
    }

    async fn delete_task(&self, task: &TaskHandle) -> Result<()> {
        let response = self
            .client
            .tasks()
            .delete(self.client.request(DeleteTaskRequest {
                container_id: task.container_id.to_string(),
            }))
            .await
            .map_err(|status| CradleError::rpc("Tasks/Delete", status))?;
        let deleted = response.into_inner();
        tracing::debug!(
            container = %task.container_id,
            pid = deleted.pid,
            exit_status = deleted.exit_status,
            "task deleted"
        );
        Ok(())
    }
}

/// Maps a wire task status to the domain state.
fn state_from_status(status: i32) -> TaskState {
    match Status::try_from(status).unwrap_or(Status::Unknown) {
        Status::Created => TaskState::Created,
        Status::Running => TaskState::Running,
        Status::Stopped => TaskState::Stopped,
        Status::Paused | Status::Pausing => TaskState::Paused,
        Status::Unknown => TaskState::Unknown,
    }
}
