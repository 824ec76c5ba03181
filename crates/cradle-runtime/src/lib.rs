//! # cradle-runtime
//!
//! Client-side containerd integration: the gRPC channel and namespace
//! plumbing, the container/task access traits and their daemon-backed
//! implementations, the dual (CRI and native) provisioning paths, and the
//! garbage collector that reclaims orphaned and stopped containers.

pub mod channel;
pub mod client;
pub mod commit;
pub mod directory;
pub mod image;
pub mod inspect;
pub mod oci;
pub mod provision;
pub mod reclaim;
pub mod supervisor;
