//! Container provisioning over two parallel daemon surfaces.
//!
//! The same capability — create a container, delete a container — exists
//! both behind the CRI (`runtime.v1`) interface and behind the containerd
//! native services. Each is a named [`Provisioner`] variant and the caller
//! picks one explicitly; nothing dispatches between them implicitly.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use cradle_common::constants::{
    APP_NAME, CONTENT_ID_LABEL, DEFAULT_CGROUP_PARENT, DEFAULT_RUNTIME, DEFAULT_SNAPSHOTTER,
};
use cradle_common::error::{CradleError, Result};
use cradle_common::types::ContainerId;
use cradle_proto::containerd::services::containers::v1::container::Runtime;
use cradle_proto::containerd::services::containers::v1::{
    Container, CreateContainerRequest as NativeCreateRequest,
};
use cradle_proto::containerd::services::snapshots::v1::PrepareSnapshotRequest;
use cradle_proto::containerd::services::tasks::v1::{CreateTaskRequest, StartRequest};
use cradle_proto::runtime::v1::{
    ContainerConfig, ContainerMetadata, CreateContainerRequest, ImageSpec,
    LinuxPodSandboxConfig, PodSandboxConfig, PodSandboxMetadata, RemoveContainerRequest,
    RunPodSandboxRequest, StartContainerRequest,
};

use crate::client::RuntimeClient;
use crate::supervisor::{ContainerdSupervisor, TaskSupervisor};
use crate::{directory, image, oci};

/// Default command for provisioned containers: keep the task alive so the
/// container can be exec'd into or committed.
const DEFAULT_COMMAND: [&str; 3] = ["/bin/sh", "-c", "while true; do sleep 5; done"];

/// Which daemon surface provisions the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionPath {
    /// Kubernetes CRI: pod sandbox plus container, visible to a kubelet.
    Cri,
    /// Containerd native API: invisible to CRI consumers.
    Native,
}

impl fmt::Display for ProvisionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cri => write!(f, "cri"),
            Self::Native => write!(f, "native"),
        }
    }
}

/// Create/delete capability over one provisioning path.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Creates and starts a container from `image`, returning its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if any provisioning step fails.
    async fn create(&self, name: &str, image: &str) -> Result<ContainerId>;

    /// Deletes a container created through this path.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    async fn delete(&self, id: &ContainerId) -> Result<()>;
}

/// Returns the provisioner for the selected path.
#[must_use]
pub fn provisioner_for(path: ProvisionPath, client: RuntimeClient) -> Box<dyn Provisioner> {
    match path {
        ProvisionPath::Cri => Box::new(CriProvisioner::new(client)),
        ProvisionPath::Native => Box::new(NativeProvisioner::new(client)),
    }
}

/// Starts a created CRI container.
///
/// # Errors
///
/// Returns an error if the start RPC fails.
pub async fn start(client: &RuntimeClient, id: &ContainerId) -> Result<()> {
    let _ = client
        .cri_runtime()
        .start_container(client.request(StartContainerRequest {
            container_id: id.to_string(),
        }))
        .await
        .map_err(|status| CradleError::rpc("RuntimeService/StartContainer", status))?;
    tracing::info!(container = %id, "container started");
    Ok(())
}

fn default_command() -> Vec<String> {
    DEFAULT_COMMAND.iter().map(ToString::to_string).collect()
}

fn content_labels(content_id: &str) -> HashMap<String, String> {
    HashMap::from([(CONTENT_ID_LABEL.to_string(), content_id.to_string())])
}

/// Provisioner over the CRI runtime service.
pub struct CriProvisioner {
    client: RuntimeClient,
}

impl CriProvisioner {
    /// Creates a CRI provisioner over an established client.
    #[must_use]
    pub fn new(client: RuntimeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provisioner for CriProvisioner {
    async fn create(&self, name: &str, image: &str) -> Result<ContainerId> {
        let image_ref = image::pull(&self.client, image).await?;

        let pod_uid = uuid::Uuid::new_v4();
        let pod_name = format!("{APP_NAME}-pod-{}", pod_uid.simple());
        let content_id = format!("content-{pod_uid}");

        let sandbox_config = PodSandboxConfig {
            metadata: Some(PodSandboxMetadata {
                name: pod_name.clone(),
                uid: pod_uid.to_string(),
                namespace: self.client.namespace().to_string(),
                attempt: 1,
            }),
            hostname: format!("{APP_NAME}-pod"),
            log_directory: format!("/var/log/pods/{pod_name}"),
            labels: HashMap::from([("app".to_string(), APP_NAME.to_string())]),
            annotations: content_labels(&content_id),
            linux: Some(LinuxPodSandboxConfig {
                cgroup_parent: DEFAULT_CGROUP_PARENT.to_string(),
            }),
        };

        tracing::info!(pod = %pod_name, "running pod sandbox");
        let sandbox = self
            .client
            .cri_runtime()
            .run_pod_sandbox(self.client.request(RunPodSandboxRequest {
                config: Some(sandbox_config.clone()),
                runtime_handler: String::new(),
            }))
            .await
            .map_err(|status| CradleError::rpc("RuntimeService/RunPodSandbox", status))?
            .into_inner();
        if sandbox.pod_sandbox_id.is_empty() {
            return Err(CradleError::MalformedResponse {
                operation: "RuntimeService/RunPodSandbox",
                message: "empty pod sandbox ID".into(),
            });
        }
        tracing::debug!(sandbox = %sandbox.pod_sandbox_id, "pod sandbox running");

        let container_config = ContainerConfig {
            metadata: Some(ContainerMetadata {
                name: name.to_string(),
                attempt: 1,
            }),
            image: Some(ImageSpec {
                image: image_ref,
                annotations: HashMap::new(),
            }),
            command: default_command(),
            args: vec![],
            working_dir: "/root".to_string(),
            envs: vec![],
            labels: content_labels(&content_id),
            annotations: HashMap::new(),
            log_path: format!("{name}.log"),
            stdin: true,
            stdin_once: true,
            tty: false,
        };

        let created = self
            .client
            .cri_runtime()
            .create_container(self.client.request(CreateContainerRequest {
                pod_sandbox_id: sandbox.pod_sandbox_id,
                config: Some(container_config),
                sandbox_config: Some(sandbox_config),
            }))
            .await
            .map_err(|status| CradleError::rpc("RuntimeService/CreateContainer", status))?
            .into_inner();
        let id = ContainerId::new(created.container_id);

        start(&self.client, &id).await?;
        tracing::info!(container = %id, "container created and started via CRI");
        Ok(id)
    }

    async fn delete(&self, id: &ContainerId) -> Result<()> {
        let _ = self
            .client
            .cri_runtime()
            .remove_container(self.client.request(RemoveContainerRequest {
                container_id: id.to_string(),
            }))
            .await
            .map_err(|status| CradleError::rpc("RuntimeService/RemoveContainer", status))?;
        tracing::info!(container = %id, "container removed via CRI");
        Ok(())
    }
}

/// Provisioner over the containerd native services, bypassing CRI so the
/// container stays invisible to any kubelet watching the same daemon.
pub struct NativeProvisioner {
    client: RuntimeClient,
}

impl NativeProvisioner {
    /// Creates a native provisioner over an established client.
    #[must_use]
    pub fn new(client: RuntimeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provisioner for NativeProvisioner {
    async fn create(&self, name: &str, image: &str) -> Result<ContainerId> {
        let parent = image::resolve_snapshot_parent(&self.client, image).await?;
        tracing::debug!(image, parent = %parent, "resolved snapshot parent");

        let snapshot_key = format!("{name}-snapshot");
        let prepared = self
            .client
            .snapshots()
            .prepare(self.client.request(PrepareSnapshotRequest {
                snapshotter: DEFAULT_SNAPSHOTTER.to_string(),
                key: snapshot_key.clone(),
                parent,
                labels: HashMap::new(),
            }))
            .await
            .map_err(|status| CradleError::rpc("Snapshots/Prepare", status))?
            .into_inner();

        let spec = oci::default_spec(&default_command(), name);
        let content_id = format!("content-{}", uuid::Uuid::new_v4());

        let _ = self
            .client
            .containers()
            .create(self.client.request(NativeCreateRequest {
                container: Some(Container {
                    id: name.to_string(),
                    labels: content_labels(&content_id),
                    image: image.to_string(),
                    runtime: Some(Runtime {
                        name: DEFAULT_RUNTIME.to_string(),
                        options: None,
                    }),
                    spec: Some(oci::to_any(&spec)?),
                    snapshotter: DEFAULT_SNAPSHOTTER.to_string(),
                    snapshot_key: snapshot_key.clone(),
                    created_at: None,
                    updated_at: None,
                }),
            }))
            .await
            .map_err(|status| CradleError::rpc("Containers/Create", status))?;
        tracing::debug!(container = name, snapshot = %snapshot_key, "container record created");

        let task = self
            .client
            .tasks()
            .create(self.client.request(CreateTaskRequest {
                container_id: name.to_string(),
                rootfs: prepared.mounts,
                stdin: String::new(),
                stdout: String::new(),
                stderr: String::new(),
                terminal: false,
            }))
            .await
            .map_err(|status| CradleError::rpc("Tasks/Create", status))?
            .into_inner();

        let started = self
            .client
            .tasks()
            .start(self.client.request(StartRequest {
                container_id: name.to_string(),
                exec_id: String::new(),
            }))
            .await
            .map_err(|status| CradleError::rpc("Tasks/Start", status))?
            .into_inner();

        tracing::info!(
            container = name,
            pid = if started.pid > 0 { started.pid } else { task.pid },
            "container created and started natively"
        );
        Ok(ContainerId::new(name))
    }

    async fn delete(&self, id: &ContainerId) -> Result<()> {
        let supervisor = ContainerdSupervisor::new(self.client.clone());
        match supervisor.task(id).await {
            Ok(task) => {
                if let Err(err) = supervisor.kill(&task).await {
                    tracing::warn!(container = %id, error = %err, "failed to kill task");
                }
                supervisor.delete_task(&task).await?;
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                tracing::warn!(container = %id, error = %err, "task lookup failed, deleting record");
            }
        }

        directory::delete_with_snapshot(&self.client, id).await?;
        tracing::info!(container = %id, "container deleted natively");
        Ok(())
    }
}
