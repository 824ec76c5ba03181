//! Unix-socket transport for the containerd gRPC API.

use cradle_common::error::{CradleError, Result};
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;
use tonic::transport::{Channel, Endpoint, Uri};
use tower::service_fn;

/// Opens a gRPC channel over the containerd Unix socket.
///
/// Accepts either a bare path or a `unix://` URI.
///
/// # Errors
///
/// Returns [`CradleError::Connection`] if the socket cannot be dialed.
pub async fn connect_uds(address: &str) -> Result<Channel> {
    let path = address
        .strip_prefix("unix://")
        .unwrap_or(address)
        .to_string();

    // The endpoint URI is a placeholder; the connector below dials the
    // socket directly and the authority is never resolved.
    let endpoint = Endpoint::try_from("http://[::1]:50051").map_err(|source| {
        CradleError::Connection {
            address: path.clone(),
            source,
        }
    })?;

    let connect_path = path.clone();
    let channel = endpoint
        .connect_with_connector(service_fn(move |_: Uri| {
            let path = connect_path.clone();
            async move {
                let stream = UnixStream::connect(path).await?;
                Ok::<_, std::io::Error>(TokioIo::new(stream))
            }
        }))
        .await
        .map_err(|source| CradleError::Connection {
            address: path,
            source,
        })?;

    Ok(channel)
}
