//! Container inspection and listing.

use std::collections::HashMap;

use cradle_common::error::{CradleError, Result};
use cradle_common::types::ContainerId;
use cradle_proto::containerd::services::containers::v1::ListContainersRequest;
use cradle_proto::runtime::v1::{ContainerState, ContainerStatusRequest};
use serde::Serialize;

use crate::client::RuntimeClient;
use crate::directory::ContainerdDirectory;

/// One row of `cradle list` output.
#[derive(Debug, Clone)]
pub struct ContainerSummary {
    /// Container identifier.
    pub id: ContainerId,
    /// Image the container was created from.
    pub image: String,
    /// Whether the container carries the cradle content-id label.
    pub managed: bool,
}

/// Full inspection record for one container.
#[derive(Debug, Serialize)]
pub struct ContainerReport {
    /// Container identifier.
    pub id: ContainerId,
    /// Image the container was created from.
    pub image: String,
    /// Runtime shim name.
    pub runtime: Option<String>,
    /// Snapshotter backing the rootfs.
    pub snapshotter: String,
    /// Key of the active snapshot.
    pub snapshot_key: String,
    /// Container labels.
    pub labels: HashMap<String, String>,
    /// Creation time as Unix seconds, if recorded.
    pub created_at_unix: Option<i64>,
    /// CRI-level status, when the container is CRI-managed.
    pub cri: Option<CriStatusReport>,
}

/// CRI status subset included in the report.
#[derive(Debug, Serialize)]
pub struct CriStatusReport {
    /// CRI lifecycle state.
    pub state: String,
    /// Creation time (nanoseconds since epoch).
    pub created_at: i64,
    /// Start time (nanoseconds since epoch).
    pub started_at: i64,
    /// Exit time (nanoseconds since epoch).
    pub finished_at: i64,
    /// Exit code of a finished container.
    pub exit_code: i32,
    /// Resolved image reference.
    pub image_ref: String,
    /// Container log path.
    pub log_path: String,
}

/// Fetches only the labels of a container.
///
/// # Errors
///
/// Returns an error if the container record cannot be read.
pub async fn labels(client: &RuntimeClient, id: &ContainerId) -> Result<HashMap<String, String>> {
    Ok(ContainerdDirectory::new(client.clone()).record(id).await?.labels)
}

/// Builds the full inspection report for a container.
///
/// The native record is authoritative; CRI status is attached when the CRI
/// runtime knows the container, and silently absent when it does not
/// (natively provisioned containers are invisible to CRI).
///
/// # Errors
///
/// Returns an error if the native container record cannot be read.
pub async fn report(client: &RuntimeClient, id: &ContainerId) -> Result<ContainerReport> {
    let record = ContainerdDirectory::new(client.clone()).record(id).await?;

    let cri = match client
        .cri_runtime()
        .container_status(client.request(ContainerStatusRequest {
            container_id: id.to_string(),
            verbose: false,
        }))
        .await
    {
        Ok(response) => response.into_inner().status.map(|status| CriStatusReport {
            state: cri_state_name(status.state),
            created_at: status.created_at,
            started_at: status.started_at,
            finished_at: status.finished_at,
            exit_code: status.exit_code,
            image_ref: status.image_ref,
            log_path: status.log_path,
        }),
        Err(status) => {
            tracing::debug!(container = %id, error = %status, "no CRI status available");
            None
        }
    };

    Ok(ContainerReport {
        id: id.clone(),
        image: record.image,
        runtime: record.runtime.map(|r| r.name),
        snapshotter: record.snapshotter,
        snapshot_key: record.snapshot_key,
        labels: record.labels,
        created_at_unix: record.created_at.map(|ts| ts.seconds),
        cri,
    })
}

/// Lists all containers in the namespace with their image and managed
/// flag.
///
/// # Errors
///
/// Returns an error if enumeration fails.
pub async fn summaries(client: &RuntimeClient) -> Result<Vec<ContainerSummary>> {
    let response = client
        .containers()
        .list(client.request(ListContainersRequest { filters: vec![] }))
        .await
        .map_err(|status| CradleError::rpc("Containers/List", status))?;
    Ok(response
        .into_inner()
        .containers
        .into_iter()
        .map(|c| ContainerSummary {
            managed: c
                .labels
                .contains_key(cradle_common::constants::CONTENT_ID_LABEL),
            id: ContainerId::new(c.id),
            image: c.image,
        })
        .collect())
}

fn cri_state_name(state: i32) -> String {
    match ContainerState::try_from(state).unwrap_or(ContainerState::ContainerUnknown) {
        ContainerState::ContainerCreated => "created",
        ContainerState::ContainerRunning => "running",
        ContainerState::ContainerExited => "exited",
        ContainerState::ContainerUnknown => "unknown",
    }
    .to_string()
}
