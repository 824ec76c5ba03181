//! Connection configuration for the containerd client.
//!
//! The daemon address and namespace are explicit values passed in at
//! construction; nothing in the workspace reads them from process-wide
//! state.

use serde::{Deserialize, Serialize};

/// Where and how to reach the containerd daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Path to the containerd Unix socket.
    pub address: String,
    /// Containerd namespace scoping every call made over this connection.
    pub namespace: String,
}

impl ConnectionConfig {
    /// Creates a config for the given socket address and namespace.
    #[must_use]
    pub fn new(address: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            namespace: namespace.into(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            address: crate::constants::DEFAULT_ADDRESS.to_string(),
            namespace: crate::constants::DEFAULT_NAMESPACE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_constants() {
        let cfg = ConnectionConfig::default();
        assert_eq!(cfg.address, crate::constants::DEFAULT_ADDRESS);
        assert_eq!(cfg.namespace, crate::constants::DEFAULT_NAMESPACE);
    }
}
