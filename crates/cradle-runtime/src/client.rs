//! Namespace-scoped handle to the containerd daemon.
//!
//! Every native-API request carries the `containerd-namespace` metadata
//! header; the namespace is fixed at construction time rather than read
//! from any process-wide state.

use cradle_common::config::ConnectionConfig;
use cradle_common::error::{CradleError, Result};
use cradle_proto::containerd::services::containers::v1::containers_client::ContainersClient;
use cradle_proto::containerd::services::content::v1::content_client::ContentClient;
use cradle_proto::containerd::services::images::v1::images_client::ImagesClient;
use cradle_proto::containerd::services::snapshots::v1::snapshots_client::SnapshotsClient;
use cradle_proto::containerd::services::tasks::v1::tasks_client::TasksClient;
use cradle_proto::runtime::v1::image_service_client::ImageServiceClient;
use cradle_proto::runtime::v1::runtime_service_client::RuntimeServiceClient;
use tonic::Request;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::Channel;

/// Metadata header containerd uses for namespace scoping.
const NAMESPACE_HEADER: &str = "containerd-namespace";

/// Connected, namespace-scoped containerd client.
///
/// Cloning is cheap: the underlying [`Channel`] is reference-counted and
/// the per-service clients are constructed on demand.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    channel: Channel,
    namespace: String,
    namespace_header: MetadataValue<Ascii>,
}

impl RuntimeClient {
    /// Connects to the daemon described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CradleError::Config`] if the namespace is not a valid
    /// header value, or [`CradleError::Connection`] if dialing fails.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let namespace_header = MetadataValue::try_from(config.namespace.as_str())
            .map_err(|_| CradleError::Config {
                message: format!("namespace {:?} is not a valid header value", config.namespace),
            })?;

        tracing::debug!(address = %config.address, "connecting to containerd");
        let channel = crate::channel::connect_uds(&config.address).await?;
        tracing::info!(
            address = %config.address,
            namespace = %config.namespace,
            "connected to containerd"
        );

        Ok(Self {
            channel,
            namespace: config.namespace.clone(),
            namespace_header,
        })
    }

    /// Builds a client over an already-established channel.
    #[cfg(test)]
    pub(crate) fn from_channel(channel: Channel, namespace: &str) -> Self {
        Self {
            channel,
            namespace: namespace.to_string(),
            namespace_header: MetadataValue::try_from(namespace).unwrap(),
        }
    }

    /// Returns the namespace every call on this client is scoped to.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Wraps a message in a request carrying the namespace header.
    pub fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        let _ = request
            .metadata_mut()
            .insert(NAMESPACE_HEADER, self.namespace_header.clone());
        request
    }

    /// Containers metadata service.
    #[must_use]
    pub fn containers(&self) -> ContainersClient<Channel> {
        ContainersClient::new(self.channel.clone())
    }

    /// Task lifecycle service.
    #[must_use]
    pub fn tasks(&self) -> TasksClient<Channel> {
        TasksClient::new(self.channel.clone())
    }

    /// Snapshot management service.
    #[must_use]
    pub fn snapshots(&self) -> SnapshotsClient<Channel> {
        SnapshotsClient::new(self.channel.clone())
    }

    /// Image metadata service.
    #[must_use]
    pub fn images(&self) -> ImagesClient<Channel> {
        ImagesClient::new(self.channel.clone())
    }

    /// Content-addressed blob store.
    #[must_use]
    pub fn content(&self) -> ContentClient<Channel> {
        ContentClient::new(self.channel.clone())
    }

    /// CRI runtime service.
    #[must_use]
    pub fn cri_runtime(&self) -> RuntimeServiceClient<Channel> {
        RuntimeServiceClient::new(self.channel.clone())
    }

    /// CRI image service.
    #[must_use]
    pub fn cri_images(&self) -> ImageServiceClient<Channel> {
        ImageServiceClient::new(self.channel.clone())
    }
}
