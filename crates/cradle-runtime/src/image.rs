//! Image access: CRI pulls and native image-store resolution.
//!
//! The native provisioning path needs the rootfs chain ID of an image to
//! prepare a snapshot; resolving it means walking the content store from
//! the image's target descriptor down to the config's `diff_ids`.

use cradle_common::error::{CradleError, Result};
use cradle_proto::containerd::services::content::v1::ReadContentRequest;
use cradle_proto::containerd::services::images::v1::GetImageRequest;
use cradle_proto::runtime::v1::{ImageSpec, PullImageRequest};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::client::RuntimeClient;

/// Reference to a blob inside an OCI manifest or index.
#[derive(Debug, Deserialize)]
struct BlobRef {
    #[serde(rename = "mediaType", default)]
    media_type: String,
    digest: String,
}

/// OCI image manifest, reduced to the fields the resolver reads.
#[derive(Debug, Deserialize)]
struct Manifest {
    config: BlobRef,
}

/// OCI image index.
#[derive(Debug, Deserialize)]
struct Index {
    manifests: Vec<BlobRef>,
}

/// OCI image config, reduced to the rootfs section.
#[derive(Debug, Deserialize)]
struct ImageConfig {
    rootfs: RootFs,
}

#[derive(Debug, Deserialize)]
struct RootFs {
    diff_ids: Vec<String>,
}

/// Pulls an image through the CRI image service and returns the resolved
/// reference.
///
/// # Errors
///
/// Returns an error if the pull RPC fails.
pub async fn pull(client: &RuntimeClient, image: &str) -> Result<String> {
    tracing::info!(image, "pulling image");
    let response = client
        .cri_images()
        .pull_image(client.request(PullImageRequest {
            image: Some(ImageSpec {
                image: image.to_string(),
                annotations: std::collections::HashMap::new(),
            }),
            auth: None,
            sandbox_config: None,
        }))
        .await
        .map_err(|status| CradleError::rpc("ImageService/PullImage", status))?;
    let image_ref = response.into_inner().image_ref;
    tracing::info!(image, image_ref = %image_ref, "image pulled");
    Ok(image_ref)
}

/// Resolves the rootfs chain ID of an image already present in the native
/// image store. The result is the snapshot parent key for preparing a new
/// container snapshot.
///
/// # Errors
///
/// Returns [`CradleError::NotFound`] if the image is not in the store, and
/// other errors if the content walk or manifest parsing fails.
pub async fn resolve_snapshot_parent(client: &RuntimeClient, image: &str) -> Result<String> {
    let response = client
        .images()
        .get(client.request(GetImageRequest {
            name: image.to_string(),
        }))
        .await
        .map_err(|status| CradleError::rpc("Images/Get", status))?;
    let record = response
        .into_inner()
        .image
        .ok_or(CradleError::NotFound {
            kind: "image",
            id: image.to_string(),
        })?;
    let target = record.target.ok_or(CradleError::MalformedResponse {
        operation: "Images/Get",
        message: "image record carried no target descriptor".into(),
    })?;

    let manifest_digest = if is_index(&target.media_type) {
        let index: Index = serde_json::from_slice(&read_blob(client, &target.digest).await?)?;
        index
            .manifests
            .first()
            .map(|m| m.digest.clone())
            .ok_or(CradleError::MalformedResponse {
                operation: "Content/Read",
                message: format!("image index for {image} lists no manifests"),
            })?
    } else {
        target.digest
    };

    let manifest: Manifest = serde_json::from_slice(&read_blob(client, &manifest_digest).await?)?;
    let config: ImageConfig =
        serde_json::from_slice(&read_blob(client, &manifest.config.digest).await?)?;

    chain_id(&config.rootfs.diff_ids).ok_or(CradleError::MalformedResponse {
        operation: "Content/Read",
        message: format!("image config for {image} lists no diff_ids"),
    })
}

/// Reads a complete blob from the content store.
async fn read_blob(client: &RuntimeClient, digest: &str) -> Result<Vec<u8>> {
    let mut stream = client
        .content()
        .read(client.request(ReadContentRequest {
            digest: digest.to_string(),
            offset: 0,
            size: 0,
        }))
        .await
        .map_err(|status| CradleError::rpc("Content/Read", status))?
        .into_inner();

    let mut data = Vec::new();
    while let Some(chunk) = stream
        .message()
        .await
        .map_err(|status| CradleError::rpc("Content/Read", status))?
    {
        data.extend(chunk.data);
    }
    Ok(data)
}

fn is_index(media_type: &str) -> bool {
    media_type.ends_with("image.index.v1+json")
        || media_type.ends_with("manifest.list.v2+json")
}

/// Computes the rootfs chain ID from layer diff IDs, per the OCI image
/// spec: the chain ID of a single layer is its diff ID, and each further
/// layer digests `"{parent} {diff_id}"`.
fn chain_id(diff_ids: &[String]) -> Option<String> {
    let mut ids = diff_ids.iter();
    let mut chain = ids.next()?.clone();
    for diff_id in ids {
        let mut hasher = Sha256::new();
        hasher.update(chain.as_bytes());
        hasher.update(b" ");
        hasher.update(diff_id.as_bytes());
        chain = format!("sha256:{:x}", hasher.finalize());
    }
    Some(chain)
}
