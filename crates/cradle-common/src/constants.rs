//! System-wide constants and defaults.

/// Default path of the containerd gRPC socket.
pub const DEFAULT_ADDRESS: &str = "/run/containerd/containerd.sock";

/// Default containerd namespace for native (non-CRI) operations.
pub const DEFAULT_NAMESPACE: &str = "test.io";

/// Default namespace for CRI-provisioned containers.
pub const CRI_NAMESPACE: &str = "k8s.io";

/// Label key marking a container as managed by cradle.
///
/// Only containers carrying this label are ever touched by garbage
/// collection; the match is an exact string comparison on the key.
pub const CONTENT_ID_LABEL: &str = "cradle.io/content-id";

/// Snapshotter used for container root filesystems.
pub const DEFAULT_SNAPSHOTTER: &str = "overlayfs";

/// Runtime shim used for natively provisioned containers.
pub const DEFAULT_RUNTIME: &str = "io.containerd.runc.v2";

/// Cgroup parent slice for CRI pod sandboxes.
pub const DEFAULT_CGROUP_PARENT: &str = "system.slice";

/// Application name used in CLI output and generated resource names.
pub const APP_NAME: &str = "cradle";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "cradle";
