//! Garbage collection of orphaned and stopped containers.
//!
//! A container is reclaimed when it carries the content-id label and either
//! has no execution task (an orphan) or its task is no longer running.
//! Containers without the label belong to other consumers of the daemon and
//! are never touched.

use std::sync::Arc;

use cradle_common::constants::CONTENT_ID_LABEL;
use cradle_common::error::Result;
use cradle_common::types::ContainerId;

use crate::directory::ContainerDirectory;
use crate::supervisor::TaskSupervisor;

/// Scans a namespace and deletes orphaned or stopped managed containers.
pub struct Reclaimer {
    directory: Arc<dyn ContainerDirectory>,
    supervisor: Arc<dyn TaskSupervisor>,
    namespace: String,
}

impl Reclaimer {
    /// Creates a reclaimer over the given collaborators.
    ///
    /// `namespace` is informational: both collaborators are already scoped
    /// to it, and the reclaimer only uses it for logging.
    #[must_use]
    pub fn new(
        directory: Arc<dyn ContainerDirectory>,
        supervisor: Arc<dyn TaskSupervisor>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            supervisor,
            namespace: namespace.into(),
        }
    }

    /// Runs one reclamation pass and returns how many containers were
    /// deleted.
    ///
    /// Containers are processed strictly one at a time, in directory order.
    /// Only directory enumeration failure aborts the pass; every
    /// per-container failure is logged and that container is skipped.
    ///
    /// Note: a task lookup failure is indistinguishable from a genuinely
    /// absent task and routes the container to the orphan path. A transient
    /// lookup error can therefore misclassify a running container as an
    /// orphan and delete it. This mirrors the historical behavior and is
    /// deliberate until the intended semantics are confirmed.
    ///
    /// # Errors
    ///
    /// Returns an error only if container enumeration itself fails.
    pub async fn reclaim(&self) -> Result<usize> {
        let containers = self.directory.list().await?;
        tracing::info!(
            namespace = %self.namespace,
            count = containers.len(),
            "scanning containers"
        );

        let mut deleted = 0usize;
        for id in &containers {
            if self.reclaim_one(id).await {
                deleted += 1;
            }
        }

        tracing::info!(namespace = %self.namespace, deleted, "reclamation pass finished");
        Ok(deleted)
    }

    /// Evaluates a single container; returns whether it was deleted.
    async fn reclaim_one(&self, id: &ContainerId) -> bool {
        let labels = match self.directory.labels(id).await {
            Ok(labels) => labels,
            Err(err) => {
                tracing::warn!(container = %id, error = %err, "failed to read labels, skipping");
                return false;
            }
        };

        if !labels.contains_key(CONTENT_ID_LABEL) {
            tracing::debug!(container = %id, "unmanaged container, skipping");
            return false;
        }

        let task = match self.supervisor.task(id).await {
            Ok(task) => task,
            Err(err) => {
                tracing::debug!(container = %id, error = %err, "no task found, treating as orphan");
                return self.delete_container(id, "orphan").await;
            }
        };

        let state = match self.supervisor.state(&task).await {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(container = %id, error = %err, "failed to read task state, skipping");
                return false;
            }
        };

        if state.is_running() {
            tracing::debug!(container = %id, "task is running, skipping");
            return false;
        }

        // Best-effort: a kill failure (e.g. the process is already gone)
        // does not block deletion.
        if let Err(err) = self.supervisor.kill(&task).await {
            tracing::warn!(container = %id, error = %err, "failed to kill task, deleting anyway");
        }

        if let Err(err) = self.supervisor.delete_task(&task).await {
            tracing::warn!(container = %id, error = %err, "failed to delete task, skipping");
            return false;
        }

        self.delete_container(id, "stopped").await
    }

    async fn delete_container(&self, id: &ContainerId, reason: &str) -> bool {
        match self.directory.delete(id).await {
            Ok(()) => {
                tracing::info!(container = %id, reason, "reclaimed container");
                true
            }
            Err(err) => {
                tracing::warn!(container = %id, error = %err, "failed to delete container");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use cradle_common::error::CradleError;
    use cradle_common::types::{TaskHandle, TaskState};

    use super::*;

    fn labeled() -> HashMap<String, String> {
        HashMap::from([(CONTENT_ID_LABEL.to_string(), "content-1".to_string())])
    }

    #[derive(Default)]
    struct MockDirectory {
        containers: Mutex<Vec<ContainerId>>,
        labels: HashMap<ContainerId, HashMap<String, String>>,
        fail_list: bool,
        fail_labels_for: Option<ContainerId>,
        fail_delete_for: Option<ContainerId>,
    }

    impl MockDirectory {
        fn with_containers(entries: Vec<(&str, HashMap<String, String>)>) -> Self {
            Self {
                containers: Mutex::new(
                    entries.iter().map(|(id, _)| ContainerId::new(*id)).collect(),
                ),
                labels: entries
                    .into_iter()
                    .map(|(id, labels)| (ContainerId::new(id), labels))
                    .collect(),
                ..Self::default()
            }
        }

        fn live(&self) -> Vec<ContainerId> {
            self.containers.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContainerDirectory for MockDirectory {
        async fn list(&self) -> Result<Vec<ContainerId>> {
            if self.fail_list {
                return Err(CradleError::rpc(
                    "Containers/List",
                    tonic::Status::unavailable("daemon down"),
                ));
            }
            Ok(self.live())
        }

        async fn labels(&self, id: &ContainerId) -> Result<HashMap<String, String>> {
            if self.fail_labels_for.as_ref() == Some(id) {
                return Err(CradleError::rpc(
                    "Containers/Get",
                    tonic::Status::internal("label store corrupt"),
                ));
            }
            Ok(self.labels.get(id).cloned().unwrap_or_default())
        }

        async fn delete(&self, id: &ContainerId) -> Result<()> {
            if self.fail_delete_for.as_ref() == Some(id) {
                return Err(CradleError::rpc(
                    "Containers/Delete",
                    tonic::Status::internal("delete refused"),
                ));
            }
            self.containers.lock().unwrap().retain(|c| c != id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockSupervisor {
        states: Mutex<HashMap<ContainerId, TaskState>>,
        fail_state_for: Option<ContainerId>,
        fail_kill: bool,
        killed: Mutex<Vec<ContainerId>>,
        deleted_tasks: Mutex<Vec<ContainerId>>,
    }

    impl MockSupervisor {
        fn with_tasks(entries: Vec<(&str, TaskState)>) -> Self {
            Self {
                states: Mutex::new(
                    entries
                        .into_iter()
                        .map(|(id, state)| (ContainerId::new(id), state))
                        .collect(),
                ),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl TaskSupervisor for MockSupervisor {
        async fn task(&self, id: &ContainerId) -> Result<TaskHandle> {
            if self.states.lock().unwrap().contains_key(id) {
                Ok(TaskHandle {
                    container_id: id.clone(),
                    pid: 42,
                })
            } else {
                Err(CradleError::NotFound {
                    kind: "task",
                    id: id.to_string(),
                })
            }
        }

        async fn state(&self, task: &TaskHandle) -> Result<TaskState> {
            if self.fail_state_for.as_ref() == Some(&task.container_id) {
                return Err(CradleError::rpc(
                    "Tasks/Get",
                    tonic::Status::internal("status probe failed"),
                ));
            }
            self.states
                .lock()
                .unwrap()
                .get(&task.container_id)
                .copied()
                .ok_or(CradleError::NotFound {
                    kind: "task",
                    id: task.container_id.to_string(),
                })
        }

        async fn kill(&self, task: &TaskHandle) -> Result<()> {
            if self.fail_kill {
                return Err(CradleError::rpc(
                    "Tasks/Kill",
                    tonic::Status::internal("kill refused"),
                ));
            }
            self.killed.lock().unwrap().push(task.container_id.clone());
            Ok(())
        }

        async fn delete_task(&self, task: &TaskHandle) -> Result<()> {
            let _ = self.states.lock().unwrap().remove(&task.container_id);
            self.deleted_tasks
                .lock()
                .unwrap()
                .push(task.container_id.clone());
            Ok(())
        }
    }

    fn reclaimer(directory: Arc<MockDirectory>, supervisor: Arc<MockSupervisor>) -> Reclaimer {
        Reclaimer::new(directory, supervisor, "test.io")
    }

    #[tokio::test]
    async fn unlabeled_containers_are_never_deleted() {
        let directory = Arc::new(MockDirectory::with_containers(vec![(
            "plain",
            HashMap::new(),
        )]));
        let supervisor = Arc::new(MockSupervisor::default());

        let deleted = reclaimer(Arc::clone(&directory), supervisor)
            .reclaim()
            .await
            .unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(directory.live(), vec![ContainerId::new("plain")]);
    }

    #[tokio::test]
    async fn eligible_orphan_is_deleted() {
        let directory = Arc::new(MockDirectory::with_containers(vec![("orphan", labeled())]));
        let supervisor = Arc::new(MockSupervisor::default());

        let deleted = reclaimer(Arc::clone(&directory), supervisor)
            .reclaim()
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(directory.live().is_empty());
    }

    #[tokio::test]
    async fn running_container_is_kept() {
        let directory = Arc::new(MockDirectory::with_containers(vec![("busy", labeled())]));
        let supervisor = Arc::new(MockSupervisor::with_tasks(vec![(
            "busy",
            TaskState::Running,
        )]));

        let deleted = reclaimer(Arc::clone(&directory), Arc::clone(&supervisor))
            .reclaim()
            .await
            .unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(directory.live(), vec![ContainerId::new("busy")]);
        assert!(supervisor.killed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stopped_container_loses_task_and_record() {
        let directory = Arc::new(MockDirectory::with_containers(vec![("done", labeled())]));
        let supervisor = Arc::new(MockSupervisor::with_tasks(vec![(
            "done",
            TaskState::Stopped,
        )]));

        let deleted = reclaimer(Arc::clone(&directory), Arc::clone(&supervisor))
            .reclaim()
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(directory.live().is_empty());
        assert_eq!(
            *supervisor.deleted_tasks.lock().unwrap(),
            vec![ContainerId::new("done")]
        );
        assert_eq!(
            *supervisor.killed.lock().unwrap(),
            vec![ContainerId::new("done")]
        );
    }

    #[tokio::test]
    async fn kill_failure_does_not_block_deletion() {
        let mut supervisor = MockSupervisor::with_tasks(vec![("done", TaskState::Stopped)]);
        supervisor.fail_kill = true;
        let directory = Arc::new(MockDirectory::with_containers(vec![("done", labeled())]));

        let deleted = reclaimer(Arc::clone(&directory), Arc::new(supervisor))
            .reclaim()
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(directory.live().is_empty());
    }

    #[tokio::test]
    async fn state_probe_failure_skips_container() {
        let mut supervisor = MockSupervisor::with_tasks(vec![("flaky", TaskState::Stopped)]);
        supervisor.fail_state_for = Some(ContainerId::new("flaky"));
        let directory = Arc::new(MockDirectory::with_containers(vec![("flaky", labeled())]));

        let deleted = reclaimer(Arc::clone(&directory), Arc::new(supervisor))
            .reclaim()
            .await
            .unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(directory.live(), vec![ContainerId::new("flaky")]);
    }

    #[tokio::test]
    async fn label_failure_isolated_to_one_container() {
        let mut directory = MockDirectory::with_containers(vec![
            ("broken", labeled()),
            ("orphan-a", labeled()),
            ("orphan-b", labeled()),
        ]);
        directory.fail_labels_for = Some(ContainerId::new("broken"));
        let directory = Arc::new(directory);
        let supervisor = Arc::new(MockSupervisor::default());

        let deleted = reclaimer(Arc::clone(&directory), supervisor)
            .reclaim()
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(directory.live(), vec![ContainerId::new("broken")]);
    }

    #[tokio::test]
    async fn delete_failure_is_not_counted() {
        let mut directory = MockDirectory::with_containers(vec![
            ("sticky", labeled()),
            ("orphan", labeled()),
        ]);
        directory.fail_delete_for = Some(ContainerId::new("sticky"));
        let directory = Arc::new(directory);
        let supervisor = Arc::new(MockSupervisor::default());

        let deleted = reclaimer(Arc::clone(&directory), supervisor)
            .reclaim()
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(directory.live(), vec![ContainerId::new("sticky")]);
    }

    #[tokio::test]
    async fn mixed_namespace_scenario() {
        // X: no label; Y: labeled, no task; Z: labeled, running; W: labeled,
        // stopped. Expected survivors: X and Z.
        let directory = Arc::new(MockDirectory::with_containers(vec![
            ("x", HashMap::new()),
            ("y", labeled()),
            ("z", labeled()),
            ("w", labeled()),
        ]));
        let supervisor = Arc::new(MockSupervisor::with_tasks(vec![
            ("z", TaskState::Running),
            ("w", TaskState::Stopped),
        ]));

        let deleted = reclaimer(Arc::clone(&directory), Arc::clone(&supervisor))
            .reclaim()
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(
            directory.live(),
            vec![ContainerId::new("x"), ContainerId::new("z")]
        );
    }

    #[tokio::test]
    async fn second_pass_deletes_nothing() {
        let directory = Arc::new(MockDirectory::with_containers(vec![
            ("y", labeled()),
            ("w", labeled()),
        ]));
        let supervisor = Arc::new(MockSupervisor::with_tasks(vec![(
            "w",
            TaskState::Stopped,
        )]));
        let reclaimer = reclaimer(Arc::clone(&directory), Arc::clone(&supervisor));

        assert_eq!(reclaimer.reclaim().await.unwrap(), 2);
        assert_eq!(reclaimer.reclaim().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn enumeration_failure_is_fatal() {
        let directory = Arc::new(MockDirectory {
            fail_list: true,
            ..MockDirectory::default()
        });
        let supervisor = Arc::new(MockSupervisor::default());

        let result = reclaimer(directory, supervisor).reclaim().await;
        assert!(result.is_err());
    }
}
