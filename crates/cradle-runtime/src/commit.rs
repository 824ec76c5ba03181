//! Committing a container's filesystem to a named snapshot.
//!
//! The commit is snapshot-level: the container's active snapshot is frozen
//! under the target name through the snapshots service. A running task is
//! force-stopped first so the filesystem is quiescent.

use cradle_common::error::{CradleError, Result};
use cradle_common::types::ContainerId;
use cradle_proto::containerd::services::snapshots::v1::CommitSnapshotRequest;

use crate::client::RuntimeClient;
use crate::directory::ContainerdDirectory;
use crate::supervisor::{ContainerdSupervisor, TaskSupervisor};

/// Commits `id`'s active snapshot under `image_name`.
///
/// # Errors
///
/// Returns an error if the container record cannot be read, has no
/// snapshot, or the snapshot commit fails. A kill failure on a running
/// task is logged and tolerated.
pub async fn commit(client: &RuntimeClient, id: &ContainerId, image_name: &str) -> Result<()> {
    let record = ContainerdDirectory::new(client.clone()).record(id).await?;
    if record.snapshot_key.is_empty() {
        return Err(CradleError::NotFound {
            kind: "snapshot",
            id: id.to_string(),
        });
    }

    let supervisor = ContainerdSupervisor::new(client.clone());
    match supervisor.task(id).await {
        Ok(task) => {
            let running = supervisor
                .state(&task)
                .await
                .map(cradle_common::types::TaskState::is_running)
                .unwrap_or(false);
            if running {
                tracing::info!(container = %id, "stopping task before commit");
                if let Err(err) = supervisor.kill(&task).await {
                    tracing::warn!(container = %id, error = %err, "failed to stop task");
                }
            }
        }
        Err(err) if err.is_not_found() => {}
        Err(err) => {
            tracing::warn!(container = %id, error = %err, "task lookup failed before commit");
        }
    }

    let _ = client
        .snapshots()
        .commit(client.request(CommitSnapshotRequest {
            snapshotter: record.snapshotter.clone(),
            name: image_name.to_string(),
            key: record.snapshot_key.clone(),
            labels: std::collections::HashMap::new(),
        }))
        .await
        .map_err(|status| CradleError::rpc("Snapshots/Commit", status))?;

    tracing::info!(
        container = %id,
        image = image_name,
        snapshotter = %record.snapshotter,
        "snapshot committed"
    );
    Ok(())
}
