//! Minimal OCI runtime spec generation for natively provisioned
//! containers.
//!
//! Containerd stores the spec as a JSON-encoded protobuf `Any`; only the
//! fields this tool sets are modeled here.

use cradle_common::error::Result;
use serde::{Deserialize, Serialize};

/// `Any` type URL containerd uses for OCI runtime specs.
const SPEC_TYPE_URL: &str = "types.containerd.io/opencontainers/runtime-spec/1/Spec";

/// OCI runtime specification document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSpec {
    /// OCI runtime spec version.
    pub oci_version: String,
    /// Init process description.
    pub process: Process,
    /// Root filesystem description.
    pub root: Root,
    /// Hostname inside the container.
    pub hostname: String,
    /// Linux-specific configuration.
    pub linux: Linux,
}

/// Init process of the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    /// Command and arguments.
    pub args: Vec<String>,
    /// Working directory.
    pub cwd: String,
    /// Environment variables as `KEY=value` strings.
    pub env: Vec<String>,
    /// Whether a terminal is attached.
    pub terminal: bool,
}

/// Root filesystem of the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Root {
    /// Path to the rootfs, relative to the bundle.
    pub path: String,
    /// Whether the rootfs is mounted read-only.
    pub readonly: bool,
}

/// Linux platform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Linux {
    /// Namespaces to create for the container.
    pub namespaces: Vec<LinuxNamespace>,
}

/// A single Linux namespace entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinuxNamespace {
    /// Namespace type (pid, ipc, uts, mount, network).
    #[serde(rename = "type")]
    pub ns_type: String,
}

/// Builds the default spec for a container running `args`.
#[must_use]
pub fn default_spec(args: &[String], hostname: &str) -> RuntimeSpec {
    RuntimeSpec {
        oci_version: "1.1.0".to_string(),
        process: Process {
            args: args.to_vec(),
            cwd: "/".to_string(),
            env: vec!["PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin".into()],
            terminal: false,
        },
        root: Root {
            path: "rootfs".to_string(),
            readonly: false,
        },
        hostname: hostname.to_string(),
        linux: Linux {
            namespaces: ["pid", "ipc", "uts", "mount", "network"]
                .into_iter()
                .map(|ns| LinuxNamespace {
                    ns_type: ns.to_string(),
                })
                .collect(),
        },
    }
}

/// Encodes a spec into the protobuf `Any` containerd expects.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn to_any(spec: &RuntimeSpec) -> Result<prost_types::Any> {
    Ok(prost_types::Any {
        type_url: SPEC_TYPE_URL.to_string(),
        value: serde_json::to_vec(spec)?,
    })
}
