//! # cradle-proto
//!
//! Generated gRPC bindings for the two API surfaces cradle speaks:
//! the Kubernetes CRI `runtime.v1` interface and the containerd native
//! services (containers, tasks, snapshots, images, content).
//!
//! The proto files under `proto/` are hand-trimmed client-side subsets of
//! the upstream definitions; message names and field numbers are preserved
//! so the generated code is wire-compatible with a real daemon.

/// Kubernetes CRI API surface.
pub mod runtime {
    /// CRI `runtime.v1`.
    #[allow(missing_docs, clippy::pedantic, clippy::nursery, clippy::derive_partial_eq_without_eq)]
    pub mod v1 {
        tonic::include_proto!("runtime.v1");
    }
}

/// Containerd native API surface.
pub mod containerd {
    /// Shared containerd wire types (`containerd.types`).
    #[allow(missing_docs, clippy::pedantic, clippy::nursery, clippy::derive_partial_eq_without_eq)]
    pub mod types {
        tonic::include_proto!("containerd.types");
    }

    /// Versioned containerd types (`containerd.v1.types`).
    pub mod v1 {
        /// Task process types.
        #[allow(missing_docs, clippy::pedantic, clippy::nursery, clippy::derive_partial_eq_without_eq)]
        pub mod types {
            tonic::include_proto!("containerd.v1.types");
        }
    }

    /// Containerd gRPC services.
    pub mod services {
        /// Container metadata store.
        pub mod containers {
            /// `containerd.services.containers.v1`.
            #[allow(missing_docs, clippy::pedantic, clippy::nursery, clippy::derive_partial_eq_without_eq)]
            pub mod v1 {
                tonic::include_proto!("containerd.services.containers.v1");
            }
        }

        /// Task lifecycle service.
        pub mod tasks {
            /// `containerd.services.tasks.v1`.
            #[allow(missing_docs, clippy::pedantic, clippy::nursery, clippy::derive_partial_eq_without_eq)]
            pub mod v1 {
                tonic::include_proto!("containerd.services.tasks.v1");
            }
        }

        /// Snapshot management service.
        pub mod snapshots {
            /// `containerd.services.snapshots.v1`.
            #[allow(missing_docs, clippy::pedantic, clippy::nursery, clippy::derive_partial_eq_without_eq)]
            pub mod v1 {
                tonic::include_proto!("containerd.services.snapshots.v1");
            }
        }

        /// Image metadata store.
        pub mod images {
            /// `containerd.services.images.v1`.
            #[allow(missing_docs, clippy::pedantic, clippy::nursery, clippy::derive_partial_eq_without_eq)]
            pub mod v1 {
                tonic::include_proto!("containerd.services.images.v1");
            }
        }

        /// Content-addressed blob store.
        pub mod content {
            /// `containerd.services.content.v1`.
            #[allow(missing_docs, clippy::pedantic, clippy::nursery, clippy::derive_partial_eq_without_eq)]
            pub mod v1 {
                tonic::include_proto!("containerd.services.content.v1");
            }
        }
    }
}
