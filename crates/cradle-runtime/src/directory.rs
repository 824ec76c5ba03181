//! Container directory: enumeration, label access, and deletion.

use std::collections::HashMap;

use async_trait::async_trait;
use cradle_common::error::{CradleError, Result};
use cradle_common::types::ContainerId;
use cradle_proto::containerd::services::containers::v1::{
    Container, DeleteContainerRequest, GetContainerRequest, ListContainersRequest,
};
use cradle_proto::containerd::services::snapshots::v1::RemoveSnapshotRequest;

use crate::client::RuntimeClient;

/// Read/delete access to the containers of one namespace.
///
/// The implementor is already scoped to a namespace; callers never pass one
/// per call.
#[async_trait]
pub trait ContainerDirectory: Send + Sync {
    /// Enumerates all container IDs in the namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if enumeration fails; callers treat this as fatal.
    async fn list(&self) -> Result<Vec<ContainerId>>;

    /// Fetches the labels of one container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container record cannot be read.
    async fn labels(&self, id: &ContainerId) -> Result<HashMap<String, String>>;

    /// Deletes a container together with its snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the container record or its snapshot cannot be
    /// removed.
    async fn delete(&self, id: &ContainerId) -> Result<()>;
}

/// [`ContainerDirectory`] backed by the containerd containers and
/// snapshots services.
#[derive(Debug, Clone)]
pub struct ContainerdDirectory {
    client: RuntimeClient,
}

impl ContainerdDirectory {
    /// Creates a directory over an established client.
    #[must_use]
    pub fn new(client: RuntimeClient) -> Self {
        Self { client }
    }

    /// Fetches the full container record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or the daemon omits it
    /// from the response.
    pub async fn record(&self, id: &ContainerId) -> Result<Container> {
        let response = self
            .client
            .containers()
            .get(self.client.request(GetContainerRequest {
                id: id.to_string(),
            }))
            .await
            .map_err(|status| CradleError::rpc("Containers/Get", status))?;
        response
            .into_inner()
            .container
            .ok_or(CradleError::MalformedResponse {
                operation: "Containers/Get",
                message: "response carried no container".into(),
            })
    }
}

#[async_trait]
impl ContainerDirectory for ContainerdDirectory {
    async fn list(&self) -> Result<Vec<ContainerId>> {
        let response = self
            .client
            .containers()
            .list(self.client.request(ListContainersRequest { filters: vec![] }))
            .await
            .map_err(|status| CradleError::rpc("Containers/List", status))?;
        Ok(response
            .into_inner()
            .containers
            .into_iter()
            .map(|c| ContainerId::new(c.id))
            .collect())
    }

    async fn labels(&self, id: &ContainerId) -> Result<HashMap<String, String>> {
        Ok(self.record(id).await?.labels)
    }

    async fn delete(&self, id: &ContainerId) -> Result<()> {
        delete_with_snapshot(&self.client, id).await
    }
}

/// Removes a container's backing snapshot and then its record.
///
/// The snapshot goes first: if its removal fails the record is still in
/// place, so a later delete or reclamation pass can retry and reach the
/// snapshot again. A snapshot that is already gone is tolerated; any other
/// snapshot removal failure is surfaced and leaves the record untouched.
pub(crate) async fn delete_with_snapshot(client: &RuntimeClient, id: &ContainerId) -> Result<()> {
    // The record has to be read first: it names the snapshotter and key.
    let record = ContainerdDirectory::new(client.clone()).record(id).await?;

    if !record.snapshot_key.is_empty() {
        let removal = client
            .snapshots()
            .remove(client.request(RemoveSnapshotRequest {
                snapshotter: record.snapshotter.clone(),
                key: record.snapshot_key.clone(),
            }))
            .await
            .map_err(|status| CradleError::rpc("Snapshots/Remove", status));
        match removal {
            Ok(_) => {
                tracing::debug!(
                    container = %id,
                    snapshotter = %record.snapshotter,
                    key = %record.snapshot_key,
                    "snapshot removed"
                );
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
    }

    let _ = client
        .containers()
        .delete(client.request(DeleteContainerRequest {
            id: id.to_string(),
        }))
        .await
        .map_err(|status| CradleError::rpc("Containers/Delete", status))?;
    tracing::debug!(container = %id, "container record deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::result::Result;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use cradle_proto::containerd::services::containers::v1::containers_server::{
        Containers, ContainersServer,
    };
    use cradle_proto::containerd::services::containers::v1::{
        CreateContainerRequest, CreateContainerResponse, GetContainerResponse,
        ListContainersResponse,
    };
    use cradle_proto::containerd::services::snapshots::v1::snapshots_server::{
        Snapshots, SnapshotsServer,
    };
    use cradle_proto::containerd::services::snapshots::v1::{
        CommitSnapshotRequest, PrepareSnapshotRequest, PrepareSnapshotResponse,
    };
    use tokio::net::TcpListener;
    use tokio_stream::wrappers::TcpListenerStream;
    use tonic::transport::{Channel, Server};
    use tonic::{Request, Response, Status};

    use super::*;

    struct DaemonState {
        record_present: AtomicBool,
        fail_snapshot_remove: AtomicBool,
        snapshot_missing: AtomicBool,
        ops: Mutex<Vec<&'static str>>,
    }

    impl DaemonState {
        fn new() -> Self {
            Self {
                record_present: AtomicBool::new(true),
                fail_snapshot_remove: AtomicBool::new(false),
                snapshot_missing: AtomicBool::new(false),
                ops: Mutex::new(Vec::new()),
            }
        }

        fn ops(&self) -> Vec<&'static str> {
            self.ops.lock().unwrap().clone()
        }
    }

    #[derive(Clone)]
    struct MockDaemon(Arc<DaemonState>);

    #[tonic::async_trait]
    impl Containers for MockDaemon {
        async fn get(
            &self,
            request: Request<GetContainerRequest>,
        ) -> Result<Response<GetContainerResponse>, Status> {
            if !self.0.record_present.load(Ordering::SeqCst) {
                return Err(Status::not_found("no such container"));
            }
            Ok(Response::new(GetContainerResponse {
                container: Some(Container {
                    id: request.into_inner().id,
                    labels: HashMap::new(),
                    image: "docker.io/library/busybox:latest".into(),
                    runtime: None,
                    spec: None,
                    snapshotter: "overlayfs".into(),
                    snapshot_key: "c1-snapshot".into(),
                    created_at: None,
                    updated_at: None,
                }),
            }))
        }

        async fn list(
            &self,
            _request: Request<ListContainersRequest>,
        ) -> Result<Response<ListContainersResponse>, Status> {
            Err(Status::unimplemented("list"))
        }

        async fn create(
            &self,
            _request: Request<CreateContainerRequest>,
        ) -> Result<Response<CreateContainerResponse>, Status> {
            Err(Status::unimplemented("create"))
        }

        async fn delete(
            &self,
            _request: Request<DeleteContainerRequest>,
        ) -> Result<Response<()>, Status> {
            self.0.ops.lock().unwrap().push("container-delete");
            self.0.record_present.store(false, Ordering::SeqCst);
            Ok(Response::new(()))
        }
    }

    #[tonic::async_trait]
    impl Snapshots for MockDaemon {
        async fn prepare(
            &self,
            _request: Request<PrepareSnapshotRequest>,
        ) -> Result<Response<PrepareSnapshotResponse>, Status> {
            Err(Status::unimplemented("prepare"))
        }

        async fn commit(
            &self,
            _request: Request<CommitSnapshotRequest>,
        ) -> Result<Response<()>, Status> {
            Err(Status::unimplemented("commit"))
        }

        async fn remove(
            &self,
            _request: Request<RemoveSnapshotRequest>,
        ) -> Result<Response<()>, Status> {
            if self.0.fail_snapshot_remove.load(Ordering::SeqCst) {
                return Err(Status::internal("snapshotter busy"));
            }
            if self.0.snapshot_missing.load(Ordering::SeqCst) {
                return Err(Status::not_found("snapshot does not exist"));
            }
            self.0.ops.lock().unwrap().push("snapshot-remove");
            Ok(Response::new(()))
        }
    }

    async fn serve(daemon: MockDaemon) -> RuntimeClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let incoming = TcpListenerStream::new(listener);
        let _ = tokio::spawn(async move {
            Server::builder()
                .add_service(ContainersServer::new(daemon.clone()))
                .add_service(SnapshotsServer::new(daemon))
                .serve_with_incoming(incoming)
                .await
        });
        let channel = Channel::from_shared(format!("http://{addr}"))
            .unwrap()
            .connect()
            .await
            .unwrap();
        RuntimeClient::from_channel(channel, "test.io")
    }

    #[tokio::test]
    async fn failed_snapshot_removal_keeps_record_for_retry() {
        let state = Arc::new(DaemonState::new());
        state.fail_snapshot_remove.store(true, Ordering::SeqCst);
        let client = serve(MockDaemon(Arc::clone(&state))).await;
        let directory = ContainerdDirectory::new(client);
        let id = ContainerId::new("c1");

        assert!(directory.delete(&id).await.is_err());
        assert!(state.record_present.load(Ordering::SeqCst));
        assert!(state.ops().is_empty());

        // The record survived, so a second attempt still finds the
        // snapshot key and can finish the job.
        state.fail_snapshot_remove.store(false, Ordering::SeqCst);
        directory.delete(&id).await.unwrap();
        assert_eq!(state.ops(), vec!["snapshot-remove", "container-delete"]);
        assert!(!state.record_present.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn snapshot_is_removed_before_the_record() {
        let state = Arc::new(DaemonState::new());
        let client = serve(MockDaemon(Arc::clone(&state))).await;

        ContainerdDirectory::new(client)
            .delete(&ContainerId::new("c1"))
            .await
            .unwrap();

        assert_eq!(state.ops(), vec!["snapshot-remove", "container-delete"]);
    }

    #[tokio::test]
    async fn already_missing_snapshot_is_tolerated() {
        let state = Arc::new(DaemonState::new());
        state.snapshot_missing.store(true, Ordering::SeqCst);
        let client = serve(MockDaemon(Arc::clone(&state))).await;

        ContainerdDirectory::new(client)
            .delete(&ContainerId::new("c1"))
            .await
            .unwrap();

        assert_eq!(state.ops(), vec!["container-delete"]);
        assert!(!state.record_present.load(Ordering::SeqCst));
    }
}
