//! Unified error types for the cradle workspace.
//!
//! Every gRPC failure is wrapped in [`CradleError::Rpc`] with the name of
//! the failing operation; the NotFound status code is surfaced through
//! [`CradleError::is_not_found`] because the garbage collector treats a
//! missing task differently from every other failure.

use thiserror::Error;
use tonic::Code;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CradleError {
    /// Establishing the gRPC channel to the daemon failed.
    #[error("failed to connect to containerd at {address}: {source}")]
    Connection {
        /// Socket address that was dialed.
        address: String,
        /// Underlying transport error.
        source: tonic::transport::Error,
    },

    /// A gRPC call to the daemon failed.
    #[error("{operation} failed: {status}")]
    Rpc {
        /// Name of the RPC that failed.
        operation: &'static str,
        /// Status returned by the daemon.
        status: tonic::Status,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// The daemon returned a response missing a required field.
    #[error("malformed response from {operation}: {message}")]
    MalformedResponse {
        /// Name of the RPC that produced the response.
        operation: &'static str,
        /// Description of what was missing.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl CradleError {
    /// Wraps a gRPC status with the name of the failing operation.
    #[must_use]
    pub fn rpc(operation: &'static str, status: tonic::Status) -> Self {
        Self::Rpc { operation, status }
    }

    /// Returns whether this error represents a missing resource, either as
    /// an explicit [`CradleError::NotFound`] or as a gRPC NotFound status.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Rpc { status, .. } => status.code() == Code::NotFound,
            _ => false,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CradleError>;
